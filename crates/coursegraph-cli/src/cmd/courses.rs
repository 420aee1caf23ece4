//! `cgraph courses`: list catalog courses.

use std::io::Write;

use clap::Args;
use serde::Serialize;

use crate::cmd::Context;
use crate::output::{pretty_section, render_mode};

/// Arguments for `cgraph courses`.
#[derive(Args, Debug, Default)]
pub struct CoursesArgs {
    /// Only list courses that have at least one requirement (selectable targets).
    #[arg(long)]
    pub with_prereqs: bool,
}

#[derive(Debug, Serialize)]
struct CoursesOutput {
    count: usize,
    courses: Vec<String>,
}

/// Execute `cgraph courses`.
pub fn run_courses(args: &CoursesArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = ctx.open_graph()?;
    let catalog = graph.catalog();

    let courses: Vec<String> = if args.with_prereqs {
        catalog
            .courses_with_prerequisites()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    } else {
        catalog.courses().map(ToString::to_string).collect()
    };

    let payload = CoursesOutput {
        count: courses.len(),
        courses,
    };
    render_mode(ctx.output, &payload, render_courses_text, |p, w| {
        render_courses_pretty(p, args.with_prereqs, w)
    })
}

fn render_courses_text(payload: &CoursesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for course in &payload.courses {
        writeln!(w, "{course}")?;
    }
    Ok(())
}

fn render_courses_pretty(
    payload: &CoursesOutput,
    with_prereqs: bool,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let heading = if with_prereqs {
        format!("Courses with requirements ({})", payload.count)
    } else {
        format!("Courses ({})", payload.count)
    };
    pretty_section(w, &heading)?;
    if payload.courses.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for course in &payload.courses {
        writeln!(w, "  {course}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courses_args_parse_flag() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: CoursesArgs,
        }

        assert!(!Wrapper::parse_from(["test"]).args.with_prereqs);
        assert!(Wrapper::parse_from(["test", "--with-prereqs"]).args.with_prereqs);
    }

    #[test]
    fn pretty_lists_courses_under_heading() {
        let payload = CoursesOutput {
            count: 2,
            courses: vec!["M220".to_string(), "M332".to_string()],
        };
        let mut out = Vec::new();
        render_courses_pretty(&payload, true, &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.starts_with("Courses with requirements (2)"));
        assert!(rendered.contains("  M332"));
    }

    #[test]
    fn pretty_marks_empty_list() {
        let payload = CoursesOutput {
            count: 0,
            courses: Vec::new(),
        };
        let mut out = Vec::new();
        render_courses_pretty(&payload, false, &mut out).expect("render");
        assert!(String::from_utf8(out).expect("utf8").contains("(none)"));
    }
}
