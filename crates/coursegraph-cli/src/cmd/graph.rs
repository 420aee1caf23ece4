//! `cgraph graph`: drawable layout of a plan.
//!
//! Emits node positions and colored edges, or a Graphviz DOT document with
//! `--dot`.
//!
//! # Edge Direction
//!
//! Edges run `requirement → course`. Layer 0 is drawn at the top.

use std::fmt::Write as FmtWrite;
use std::io::Write;

use clap::Args;
use coursegraph_core::{Layout, RelationKind};

use crate::cmd::{Context, SelectionArgs, warn_unknown_targets};
use crate::output::{CliError, pretty_kv, pretty_section, render_error, render_mode};

/// Arguments for `cgraph graph`.
#[derive(Args, Debug)]
pub struct GraphArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print a Graphviz DOT document instead of the layout.
    #[arg(long)]
    pub dot: bool,
}

/// Execute `cgraph graph`.
pub fn run_graph(args: &GraphArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = ctx.open_graph()?;
    let selection = args
        .selection
        .to_selection(&ctx.project.plan, ctx.code_style());
    warn_unknown_targets(&graph, &selection);

    let plan = match graph.plan(&selection) {
        Ok(plan) => plan,
        Err(err) => {
            render_error(ctx.output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };
    let layout = Layout::from_plan(&plan, &ctx.project.render);

    if args.dot {
        let mut out = std::io::stdout().lock();
        out.write_all(to_dot(&layout).as_bytes())?;
        return Ok(());
    }

    render_mode(ctx.output, &layout, render_layout_text, render_layout_pretty)
}

fn quoted(raw: &str) -> String {
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Graphviz document with one `rank=same` group per layer.
pub fn to_dot(layout: &Layout) -> String {
    let mut dot = String::from("digraph prerequisites {\n    rankdir=TB;\n    node [shape=box];\n");

    let mut layer = None;
    for node in &layout.nodes {
        if layer != Some(node.layer) {
            if layer.is_some() {
                dot.push_str(" }\n");
            }
            dot.push_str("    { rank=same;");
            layer = Some(node.layer);
        }
        let _ = write!(dot, " {};", quoted(node.course.as_str()));
    }
    if layer.is_some() {
        dot.push_str(" }\n");
    }

    for edge in &layout.edges {
        let style = match edge.kind {
            RelationKind::Prerequisite => "solid",
            RelationKind::Corequisite => "dashed",
        };
        let _ = writeln!(
            dot,
            "    {} -> {} [color={}, style={style}];",
            quoted(edge.from.as_str()),
            quoted(edge.to.as_str()),
            quoted(&edge.color),
        );
    }

    for course in &layout.unplaced {
        let _ = writeln!(dot, "    {} [style=dotted];", quoted(course.as_str()));
    }

    dot.push_str("}\n");
    dot
}

fn render_layout_text(layout: &Layout, w: &mut dyn Write) -> std::io::Result<()> {
    for node in &layout.nodes {
        writeln!(w, "node\t{}\t{}\t{}", node.course, node.x, node.y)?;
    }
    for edge in &layout.edges {
        writeln!(w, "edge\t{}\t{}\t{}\t{}", edge.from, edge.to, edge.kind, edge.color)?;
    }
    for course in &layout.unplaced {
        writeln!(w, "unplaced\t{course}")?;
    }
    Ok(())
}

fn render_layout_pretty(layout: &Layout, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Layout")?;
    pretty_kv(w, "Courses", layout.nodes.len().to_string())?;
    pretty_kv(w, "Edges", layout.edges.len().to_string())?;
    writeln!(w)?;
    for node in &layout.nodes {
        writeln!(
            w,
            "  {:<12} layer {:<3} at ({:>5.1}, {:>5.1})",
            node.course.as_str(),
            node.layer,
            node.x,
            node.y
        )?;
    }
    if !layout.edges.is_empty() {
        writeln!(w)?;
    }
    for edge in &layout.edges {
        writeln!(w, "  {} → {}  [{}, {}]", edge.from, edge.to, edge.kind, edge.color)?;
    }
    if !layout.unplaced.is_empty() {
        writeln!(w)?;
        let unplaced: Vec<&str> = layout.unplaced.iter().map(|c| c.as_str()).collect();
        pretty_kv(w, "Not placed", unplaced.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursegraph_core::config::RenderConfig;
    use coursegraph_core::{Catalog, CourseGraph, Selection};

    fn layout(selection: &Selection) -> Layout {
        let plan = CourseGraph::new(Catalog::from_pairs([
            ("M332", vec![("M220", "prereq"), ("M251", "coreq")]),
            ("M220", vec![("M100", "prereq")]),
        ]))
        .plan(selection)
        .expect("acyclic");
        Layout::from_plan(&plan, &RenderConfig::default())
    }

    #[test]
    fn graph_args_parse_dot() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: GraphArgs,
        }

        let parsed = Wrapper::parse_from(["test", "M332", "--dot", "--no-coreqs"]);
        assert!(parsed.args.dot);
        assert!(parsed.args.selection.no_coreqs);
    }

    #[test]
    fn dot_groups_layers_and_colors_edges() {
        let dot = to_dot(&layout(&Selection::new(["M332"])));
        assert!(dot.starts_with("digraph prerequisites {"));
        assert!(dot.contains("{ rank=same; \"M100\"; \"M251\"; }"));
        assert!(dot.contains("\"M220\" -> \"M332\" [color=\"green\", style=solid];"));
        assert!(dot.contains("\"M251\" -> \"M332\" [color=\"blue\", style=dashed];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn dot_escapes_quotes() {
        assert_eq!(quoted("A \"B\""), "\"A \\\"B\\\"\"");
    }

    #[test]
    fn text_layout_lists_nodes_and_edges() {
        let mut out = Vec::new();
        render_layout_text(&layout(&Selection::new(["M332"]).with_coreqs(false)), &mut out)
            .expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("node\tM332\t0\t-2\n"));
        assert!(text.contains("edge\tM100\tM220\tprereq\tgreen\n"));
        assert!(!text.contains("coreq"));
    }
}
