//! `cgraph stats`: catalog size and shape.

use std::io::Write;

use clap::Args;
use coursegraph_core::{Catalog, find_all_cycles};
use serde::Serialize;

use crate::cmd::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `cgraph stats`.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct StatsOutput {
    courses: usize,
    listed: usize,
    with_prerequisites: usize,
    required_by_others: usize,
    edges: usize,
    corequisites: usize,
    cycles: usize,
    content_hash: String,
}

impl StatsOutput {
    fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            courses: catalog.node_count(),
            listed: catalog.listed_courses().count(),
            with_prerequisites: catalog.courses_with_prerequisites().len(),
            required_by_others: catalog.gateway_count(),
            edges: catalog.edge_count(),
            corequisites: catalog.corequisite_count(),
            cycles: find_all_cycles(catalog, true).len(),
            content_hash: catalog.content_hash().to_string(),
        }
    }
}

/// Execute `cgraph stats`.
pub fn run_stats(_args: &StatsArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = ctx.open_graph()?;
    let payload = graph.span().in_scope(|| StatsOutput::from_catalog(graph.catalog()));
    render_mode(ctx.output, &payload, render_stats_text, render_stats_pretty)
}

fn render_stats_text(stats: &StatsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "courses\t{}", stats.courses)?;
    writeln!(w, "listed\t{}", stats.listed)?;
    writeln!(w, "with_prerequisites\t{}", stats.with_prerequisites)?;
    writeln!(w, "required_by_others\t{}", stats.required_by_others)?;
    writeln!(w, "edges\t{}", stats.edges)?;
    writeln!(w, "corequisites\t{}", stats.corequisites)?;
    writeln!(w, "cycles\t{}", stats.cycles)?;
    writeln!(w, "content_hash\t{}", stats.content_hash)
}

fn render_stats_pretty(stats: &StatsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Catalog")?;
    pretty_kv(w, "Courses", stats.courses.to_string())?;
    pretty_kv(w, "Listed", stats.listed.to_string())?;
    pretty_kv(w, "With reqs", stats.with_prerequisites.to_string())?;
    pretty_kv(w, "Required", stats.required_by_others.to_string())?;
    pretty_kv(
        w,
        "Relations",
        format!("{} ({} corequisite)", stats.edges, stats.corequisites),
    )?;
    pretty_kv(w, "Cycles", stats.cycles.to_string())?;
    pretty_kv(w, "Hash", &stats.content_hash)
}
