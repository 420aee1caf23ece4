//! `cgraph explore`: interactive plan editing on stdin.
//!
//! Each line is one command. The plan is recomputed after every change
//! through a [`PlanCache`], so toggling back to an earlier selection is free.
//!
//! Course lists are comma separated so codes may contain spaces:
//! `target MATH 332, CS 201`.

use std::io::{BufRead, IsTerminal, Write};

use clap::Args;
use coursegraph_core::{
    CodeStyle, Course, CourseGraph, ErrorCode, PlanCache, Selection, TargetExclusionPolicy,
};
use tracing::{debug, info};

use crate::cmd::plan::{PlanOutput, render_plan_pretty, render_plan_text};
use crate::cmd::{Context, PolicyArg, SelectionArgs};
use crate::output::{CliError, OutputMode, write_error};

const HELP: &str = "\
commands:
  target <COURSE>[, <COURSE>...]     add targets
  untarget <COURSE>[, <COURSE>...]   remove targets
  exclude <COURSE>[, <COURSE>...]    leave courses out
  include <COURSE>[, <COURSE>...]    stop leaving courses out
  coreqs on|off                      follow corequisites or not
  policy drop|retain                 what happens to excluded targets
  show                               print the current plan
  clear                              drop all targets and exclusions
  help                               this message
  quit                               end the session
";

/// Arguments for `cgraph explore`.
#[derive(Args, Debug, Default)]
pub struct ExploreArgs {
    /// Courses to start with as targets.
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Course to start with excluded (repeatable).
    #[arg(short = 'x', long = "exclude", value_name = "COURSE")]
    pub exclude: Vec<String>,

    /// Start with corequisite relations ignored.
    #[arg(long)]
    pub no_coreqs: bool,

    /// Starting policy for targets that are also excluded.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub excluded_targets: Option<PolicyArg>,
}

/// One parsed session line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExploreCommand {
    Target(Vec<Course>),
    Untarget(Vec<Course>),
    Exclude(Vec<Course>),
    Include(Vec<Course>),
    Coreqs(bool),
    Policy(TargetExclusionPolicy),
    Show,
    Clear,
    Help,
    Quit,
}

impl ExploreCommand {
    const fn changes_selection(&self) -> bool {
        !matches!(self, Self::Show | Self::Help | Self::Quit)
    }
}

/// Parse one session line. Blank lines and `#` comments yield `Ok(None)`.
///
/// # Errors
///
/// Returns a message naming the problem for unknown commands or missing
/// and malformed arguments.
pub fn parse_command(line: &str, style: CodeStyle) -> Result<Option<ExploreCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let courses = || -> Result<Vec<Course>, String> {
        let courses: Vec<Course> = rest
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| Course::normalized(raw, style))
            .collect();
        if courses.is_empty() {
            Err(format!("`{word}` needs at least one course"))
        } else {
            Ok(courses)
        }
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "target" | "add" => ExploreCommand::Target(courses()?),
        "untarget" | "remove" => ExploreCommand::Untarget(courses()?),
        "exclude" | "taken" => ExploreCommand::Exclude(courses()?),
        "include" => ExploreCommand::Include(courses()?),
        "coreqs" => match rest.to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" => ExploreCommand::Coreqs(true),
            "off" | "false" | "no" => ExploreCommand::Coreqs(false),
            other => return Err(format!("`coreqs` takes on or off, got `{other}`")),
        },
        "policy" => match rest.to_ascii_lowercase().as_str() {
            "drop" => ExploreCommand::Policy(TargetExclusionPolicy::Drop),
            "retain" => ExploreCommand::Policy(TargetExclusionPolicy::Retain),
            other => return Err(format!("`policy` takes drop or retain, got `{other}`")),
        },
        "show" | "plan" => ExploreCommand::Show,
        "clear" | "reset" => ExploreCommand::Clear,
        "help" | "?" => ExploreCommand::Help,
        "quit" | "exit" => ExploreCommand::Quit,
        other => return Err(format!("unknown command `{other}`")),
    };
    Ok(Some(command))
}

fn add_all(into: &mut Vec<Course>, courses: Vec<Course>) {
    for course in courses {
        if !into.contains(&course) {
            into.push(course);
        }
    }
}

/// State of one interactive session.
pub struct Session<'g> {
    graph: &'g CourseGraph,
    style: CodeStyle,
    mode: OutputMode,
    selection: Selection,
    cache: PlanCache,
}

impl<'g> Session<'g> {
    pub fn new(
        graph: &'g CourseGraph,
        style: CodeStyle,
        mode: OutputMode,
        selection: Selection,
    ) -> Self {
        Self {
            graph,
            style,
            mode,
            selection,
            cache: PlanCache::new(),
        }
    }

    pub const fn cache(&self) -> &PlanCache {
        &self.cache
    }

    /// Read commands until `quit` or end of input.
    ///
    /// Plans go to `out`; errors and the prompt go to `err`. Bad commands
    /// and cyclic selections are reported and the session continues.
    ///
    /// # Errors
    ///
    /// Returns an error if reading `input` or writing output fails.
    pub fn run(
        &mut self,
        input: impl BufRead,
        out: &mut dyn Write,
        err: &mut dyn Write,
        prompt: bool,
    ) -> anyhow::Result<()> {
        if !self.selection.targets.is_empty() {
            self.show(out, err)?;
        }

        if prompt {
            write!(err, "> ")?;
            err.flush()?;
        }
        for line in input.lines() {
            let line = line?;
            match parse_command(&line, self.style) {
                Ok(None) => {}
                Ok(Some(ExploreCommand::Quit)) => break,
                Ok(Some(command)) => {
                    debug!(?command, "explore command");
                    let show = command.changes_selection() || command == ExploreCommand::Show;
                    self.apply(command, out)?;
                    if show {
                        self.show(out, err)?;
                    }
                }
                Err(message) => {
                    write_error(
                        self.mode,
                        &CliError::with_code(message, ErrorCode::InvalidCommand),
                        err,
                    )?;
                }
            }
            if prompt {
                write!(err, "> ")?;
                err.flush()?;
            }
        }
        Ok(())
    }

    fn apply(&mut self, command: ExploreCommand, out: &mut dyn Write) -> std::io::Result<()> {
        let selection = &mut self.selection;
        match command {
            ExploreCommand::Target(courses) => add_all(&mut selection.targets, courses),
            ExploreCommand::Untarget(courses) => {
                selection.targets.retain(|course| !courses.contains(course));
            }
            ExploreCommand::Exclude(courses) => add_all(&mut selection.excluded, courses),
            ExploreCommand::Include(courses) => {
                selection.excluded.retain(|course| !courses.contains(course));
            }
            ExploreCommand::Coreqs(on) => selection.include_coreqs = on,
            ExploreCommand::Policy(policy) => selection.policy = policy,
            ExploreCommand::Clear => {
                selection.targets.clear();
                selection.excluded.clear();
            }
            ExploreCommand::Help => out.write_all(HELP.as_bytes())?,
            ExploreCommand::Show | ExploreCommand::Quit => {}
        }
        Ok(())
    }

    fn show(&mut self, out: &mut dyn Write, err: &mut dyn Write) -> anyhow::Result<()> {
        let plan = match self.cache.get_or_compute(self.graph, &self.selection) {
            Ok(plan) => plan,
            Err(cycle) => {
                write_error(self.mode, &CliError::from(&cycle), err)?;
                return Ok(());
            }
        };

        let mut payload = PlanOutput::from_plan(plan, false);
        payload.unknown_targets = self
            .selection
            .targets
            .iter()
            .filter(|target| !self.graph.catalog().contains(target.as_str()))
            .map(ToString::to_string)
            .collect();

        if self.mode.is_json() {
            serde_json::to_writer(&mut *out, &payload)?;
            writeln!(out)?;
        } else if self.mode.is_pretty() {
            render_plan_pretty(&payload, out)?;
            writeln!(out)?;
        } else {
            render_plan_text(&payload, out)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Execute `cgraph explore`.
pub fn run_explore(args: &ExploreArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = ctx.open_graph()?;
    let selection = SelectionArgs {
        targets: args.targets.clone(),
        exclude: args.exclude.clone(),
        no_coreqs: args.no_coreqs,
        excluded_targets: args.excluded_targets,
    }
    .to_selection(&ctx.project.plan, ctx.code_style());

    let stdin = std::io::stdin();
    let prompt = stdin.is_terminal();
    let mut session = Session::new(&graph, ctx.code_style(), ctx.output, selection);

    let _guard = graph.span().enter();
    session.run(
        stdin.lock(),
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
        prompt,
    )?;

    let cache = session.cache();
    info!(
        hits = cache.hits(),
        misses = cache.misses(),
        plans = cache.len(),
        "explore session finished"
    );
    Ok(())
}
