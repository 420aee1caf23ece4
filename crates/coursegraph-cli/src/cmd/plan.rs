//! `cgraph plan`: layered course plan for a set of targets.
//!
//! Layer 0 holds courses with no requirements inside the plan; every later
//! layer can be taken once the layers above it are done.

use std::collections::BTreeMap;
use std::io::Write;

use clap::Args;
use coursegraph_core::{Plan, RelationKind};
use serde::Serialize;
use tracing::info;

use crate::cmd::{Context, SelectionArgs, warn_unknown_targets};
use crate::output::{CliError, pretty_kv, pretty_section, render_error, render_mode};

/// Arguments for `cgraph plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// List each course's requirements next to it.
    #[arg(long)]
    pub explain: bool,
}

#[derive(Debug, Serialize)]
pub struct RequirementOutput {
    pub course: String,
    pub kind: RelationKind,
}

#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub targets: Vec<String>,
    pub excluded: Vec<String>,
    pub include_coreqs: bool,
    pub excluded_targets: &'static str,
    pub layers: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_targets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<BTreeMap<String, Vec<RequirementOutput>>>,
}

impl PlanOutput {
    /// Flatten `plan` for output; requirements are listed only if `explain`.
    pub fn from_plan(plan: &Plan, explain: bool) -> Self {
        let strings = |courses: &[coursegraph_core::Course]| -> Vec<String> {
            courses.iter().map(ToString::to_string).collect()
        };
        let requirements = explain.then(|| {
            plan.subgraph
                .iter()
                .map(|(course, relations)| {
                    let reqs = relations
                        .iter()
                        .filter(|rel| {
                            plan.selection.include_coreqs || rel.kind == RelationKind::Prerequisite
                        })
                        .map(|rel| RequirementOutput {
                            course: rel.prereq.to_string(),
                            kind: rel.kind,
                        })
                        .collect();
                    (course.to_string(), reqs)
                })
                .collect()
        });

        Self {
            targets: strings(&plan.selection.targets),
            excluded: strings(&plan.selection.excluded),
            include_coreqs: plan.selection.include_coreqs,
            excluded_targets: plan.selection.policy.as_str(),
            layers: plan.layers.iter().map(|layer| strings(layer)).collect(),
            unknown_targets: Vec::new(),
            requirements,
        }
    }
}

/// Execute `cgraph plan`.
pub fn run_plan(args: &PlanArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = ctx.open_graph()?;
    let selection = args
        .selection
        .to_selection(&ctx.project.plan, ctx.code_style());
    let unknown = warn_unknown_targets(&graph, &selection);

    let plan = match graph.plan(&selection) {
        Ok(plan) => plan,
        Err(err) => {
            render_error(ctx.output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };
    info!(
        layers = plan.layers.len(),
        courses = plan.placed_count(),
        "plan computed"
    );

    let mut payload = PlanOutput::from_plan(&plan, args.explain);
    payload.unknown_targets = unknown.iter().map(ToString::to_string).collect();

    render_mode(ctx.output, &payload, render_plan_text, render_plan_pretty)
}

pub fn render_plan_text(payload: &PlanOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for (depth, layer) in payload.layers.iter().enumerate() {
        writeln!(w, "{depth}\t{}", layer.join(" "))?;
    }
    if let Some(requirements) = &payload.requirements {
        for (course, reqs) in requirements {
            for req in reqs {
                writeln!(w, "{course}\t{}\t{}", req.kind, req.course)?;
            }
        }
    }
    Ok(())
}

pub fn render_plan_pretty(payload: &PlanOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Plan for {}", payload.targets.join(", ")))?;
    if !payload.excluded.is_empty() {
        pretty_kv(w, "Excluded", payload.excluded.join(", "))?;
    }
    pretty_kv(
        w,
        "Corequisites",
        if payload.include_coreqs {
            "included"
        } else {
            "ignored"
        },
    )?;
    for course in &payload.unknown_targets {
        writeln!(w, "warning: {course} is not in the catalog; shown as a standalone course")?;
    }
    writeln!(w)?;

    if payload.layers.is_empty() {
        writeln!(w, "Nothing to plan.")?;
        return Ok(());
    }

    for (depth, layer) in payload.layers.iter().enumerate() {
        writeln!(w, "Layer {depth}")?;
        for course in layer {
            let reqs = payload
                .requirements
                .as_ref()
                .and_then(|requirements| requirements.get(course))
                .filter(|reqs| !reqs.is_empty());
            match reqs {
                Some(reqs) => {
                    let listed: Vec<String> = reqs
                        .iter()
                        .map(|req| match req.kind {
                            RelationKind::Prerequisite => req.course.clone(),
                            RelationKind::Corequisite => format!("{} (coreq)", req.course),
                        })
                        .collect();
                    writeln!(w, "  {course}  ← {}", listed.join(", "))?;
                }
                None => writeln!(w, "  {course}")?,
            }
        }
    }
    Ok(())
}
