pub mod completions;
pub mod courses;
pub mod cycles;
pub mod explore;
pub mod graph;
pub mod plan;
pub mod stats;

use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::{Args, ValueEnum};
use coursegraph_core::config::{PlanConfig, ProjectConfig};
use coursegraph_core::{
    CodeStyle, Course, CourseGraph, ErrorCode, Selection, TargetExclusionPolicy, load_catalogs,
};
use tracing::{info_span, warn};

use crate::output::{CliError, OutputMode, render_error};

/// Everything a command needs besides its own arguments.
#[derive(Debug)]
pub struct Context {
    pub project_root: PathBuf,
    pub project: ProjectConfig,
    pub catalogs: Vec<PathBuf>,
    pub short_codes: bool,
    pub output: OutputMode,
}

impl Context {
    /// Code style for catalogs and user-typed codes.
    pub const fn code_style(&self) -> CodeStyle {
        if self.short_codes {
            CodeStyle::Short
        } else {
            self.project.catalog.code_style
        }
    }

    fn catalog_files(&self) -> Vec<PathBuf> {
        if self.catalogs.is_empty() {
            self.project.catalog.resolved_files(&self.project_root)
        } else {
            self.catalogs.clone()
        }
    }

    /// Load the configured catalogs into an engine.
    ///
    /// Failures are rendered in the active output mode before being returned.
    pub fn open_graph(&self) -> anyhow::Result<CourseGraph> {
        let files = self.catalog_files();
        if files.is_empty() {
            render_error(
                self.output,
                &CliError::with_code("no catalog files given", ErrorCode::NoCatalog),
            )?;
            bail!("no catalog files given");
        }

        let catalog = match load_catalogs(&files, self.code_style()) {
            Ok(catalog) => catalog,
            Err(err) => {
                render_error(self.output, &CliError::from(&err))?;
                return Err(err.into());
            }
        };

        let span = info_span!("course_graph", catalog = catalog.content_hash(), files = files.len());
        Ok(CourseGraph::with_span(catalog, span))
    }
}

/// Resolve a relative catalog path against the working directory.
pub fn absolutize(path: &Path, project_root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

/// CLI spelling of [`TargetExclusionPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Excluding a target removes it.
    Drop,
    /// Targets are never removed by exclusion.
    Retain,
}

impl From<PolicyArg> for TargetExclusionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Drop => Self::Drop,
            PolicyArg::Retain => Self::Retain,
        }
    }
}

/// Selection flags shared by `plan` and `graph`.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Target courses to plan for.
    #[arg(required = true, value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Course to leave out, e.g. one already taken (repeatable).
    #[arg(short = 'x', long = "exclude", value_name = "COURSE")]
    pub exclude: Vec<String>,

    /// Ignore corequisite relations.
    #[arg(long)]
    pub no_coreqs: bool,

    /// What happens to a target that is also excluded.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub excluded_targets: Option<PolicyArg>,
}

impl SelectionArgs {
    /// Build the engine selection, filling unset flags from `[plan]` config.
    pub fn to_selection(&self, plan: &PlanConfig, style: CodeStyle) -> Selection {
        let normalize = |raw: &String| Course::normalized(raw, style);
        Selection {
            targets: self.targets.iter().map(normalize).collect(),
            excluded: self.exclude.iter().map(normalize).collect(),
            include_coreqs: plan.include_coreqs && !self.no_coreqs,
            policy: self
                .excluded_targets
                .map_or(plan.excluded_targets, TargetExclusionPolicy::from),
        }
    }
}

/// Log targets the catalog does not know; they are planned as isolated
/// courses.
pub fn warn_unknown_targets(graph: &CourseGraph, selection: &Selection) -> Vec<Course> {
    let unknown: Vec<Course> = selection
        .targets
        .iter()
        .filter(|target| !graph.catalog().contains(target.as_str()))
        .cloned()
        .collect();
    for course in &unknown {
        warn!(course = %course, "target not in catalog");
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: SelectionArgs,
    }

    #[test]
    fn selection_args_parse_repeated_flags() {
        let parsed = Wrapper::parse_from([
            "test",
            "MATH 332",
            "CS 201",
            "-x",
            "MATH 100",
            "--exclude",
            "CS 100",
            "--no-coreqs",
            "--excluded-targets",
            "retain",
        ]);
        assert_eq!(parsed.args.targets, vec!["MATH 332", "CS 201"]);
        assert_eq!(parsed.args.exclude, vec!["MATH 100", "CS 100"]);
        assert!(parsed.args.no_coreqs);
        assert_eq!(parsed.args.excluded_targets, Some(PolicyArg::Retain));
    }

    #[test]
    fn selection_args_require_a_target() {
        assert!(Wrapper::try_parse_from(["test"]).is_err());
    }

    #[test]
    fn selection_uses_config_defaults() {
        let parsed = Wrapper::parse_from(["test", "MATH\u{a0}332"]);
        let plan = PlanConfig {
            include_coreqs: false,
            excluded_targets: TargetExclusionPolicy::Retain,
        };
        let selection = parsed.args.to_selection(&plan, CodeStyle::Short);
        assert_eq!(selection.targets, vec![Course::from("M332")]);
        assert!(!selection.include_coreqs);
        assert_eq!(selection.policy, TargetExclusionPolicy::Retain);
    }

    #[test]
    fn flags_override_config() {
        let parsed = Wrapper::parse_from(["test", "A", "--no-coreqs", "--excluded-targets", "drop"]);
        let plan = PlanConfig {
            include_coreqs: true,
            excluded_targets: TargetExclusionPolicy::Retain,
        };
        let selection = parsed.args.to_selection(&plan, CodeStyle::Full);
        assert!(!selection.include_coreqs);
        assert_eq!(selection.policy, TargetExclusionPolicy::Drop);
    }

    #[test]
    fn relative_catalog_paths_are_resolved() {
        let root = Path::new("/work");
        assert_eq!(absolutize(Path::new("math.json"), root), PathBuf::from("/work/math.json"));
        assert_eq!(absolutize(Path::new("/data/cs.json"), root), PathBuf::from("/data/cs.json"));
    }
}
