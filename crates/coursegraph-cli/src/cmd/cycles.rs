//! `cgraph cycles`: list requirement loops in the loaded catalogs.

use std::io::Write;

use clap::Args;
use coursegraph_core::{CycleReport, report_cycles};
use serde::Serialize;

use crate::cmd::Context;
use crate::output::render;

/// Arguments for `cgraph cycles`.
#[derive(Args, Debug, Default)]
pub struct CyclesArgs {
    /// Ignore corequisite relations when looking for loops.
    #[arg(long)]
    pub no_coreqs: bool,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    cycles: Vec<CycleReport>,
}

/// Execute `cgraph cycles`.
pub fn run_cycles(args: &CyclesArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = ctx.open_graph()?;
    let include_coreqs = ctx.project.plan.include_coreqs && !args.no_coreqs;
    let payload = CyclesOutput {
        cycles: graph.span().in_scope(|| report_cycles(graph.catalog(), include_coreqs)),
    };

    render(ctx.output, &payload, render_cycles_human)
}

fn render_cycles_human(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.cycles.is_empty() {
        writeln!(w, "No requirement cycles found.")?;
        return Ok(());
    }

    writeln!(w, "Requirement cycles ({})", payload.cycles.len())?;

    for (idx, cycle) in payload.cycles.iter().enumerate() {
        writeln!(w, "\nCycle {}:", idx + 1)?;
        for course in &cycle.members {
            writeln!(w, "  - {course}")?;
        }
        for (prereq, course) in &cycle.suggested_breaks {
            writeln!(w, "  break: {course} requires {prereq}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursegraph_core::Course;

    #[test]
    fn cycles_args_parse_no_flags() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: CyclesArgs,
        }

        let parsed = Wrapper::parse_from(["test"]);
        assert!(!parsed.args.no_coreqs);
    }

    #[test]
    fn render_cycles_human_no_cycles() {
        let payload = CyclesOutput { cycles: Vec::new() };
        let mut out = Vec::new();

        render_cycles_human(&payload, &mut out).expect("render");

        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("No requirement cycles found."));
    }

    #[test]
    fn render_cycles_human_lists_groups() {
        let payload = CyclesOutput {
            cycles: vec![CycleReport {
                members: vec![Course::from("A"), Course::from("B")],
                suggested_breaks: vec![(Course::from("B"), Course::from("A"))],
            }],
        };
        let mut out = Vec::new();

        render_cycles_human(&payload, &mut out).expect("render");

        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("Requirement cycles (1)"));
        assert!(rendered.contains("  - A\n  - B\n"));
        assert!(rendered.contains("break: A requires B"));
    }
}
