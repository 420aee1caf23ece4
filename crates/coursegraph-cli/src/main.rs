#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use coursegraph_core::ErrorCode;
use coursegraph_core::config::resolve_config;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cgraph: course prerequisite planner",
    long_about = None
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format; overrides --json and the FORMAT variable.
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    format: Option<OutputMode>,

    /// Catalog file to load (repeatable; later files override earlier ones).
    #[arg(long = "catalog", short = 'c', global = true, value_name = "FILE")]
    catalogs: Vec<PathBuf>,

    /// Shorten codes to subject initial plus number ("MATH 332" becomes "M332").
    #[arg(long, global = true)]
    short_codes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List catalog courses",
        long_about = "List every course in the loaded catalogs, or only those with requirements.",
        after_help = "EXAMPLES:\n    # List all courses\n    cgraph courses --catalog math.json\n\n    # Only courses that have requirements\n    cgraph courses --with-prereqs\n\n    # Emit machine-readable output\n    cgraph courses --json"
    )]
    Courses(cmd::courses::CoursesArgs),

    #[command(
        next_help_heading = "Plan",
        about = "Order the courses needed for targets",
        long_about = "Collect every course the targets depend on, drop excluded courses and what only they led to, and group the rest into layers that can be taken in order.",
        after_help = "EXAMPLES:\n    # Plan for one target\n    cgraph plan \"MATH 332\"\n\n    # Skip courses already taken\n    cgraph plan \"MATH 332\" -x \"MATH 100\" -x \"MATH 220\"\n\n    # Ignore corequisites and show each course's requirements\n    cgraph plan \"MATH 332\" --no-coreqs --explain\n\n    # Emit machine-readable output\n    cgraph plan \"MATH 332\" --json"
    )]
    Plan(cmd::plan::PlanArgs),

    #[command(
        next_help_heading = "Plan",
        about = "Lay out a plan for drawing",
        long_about = "Compute node positions and colored edges for a plan, or emit a Graphviz document.",
        after_help = "EXAMPLES:\n    # Node positions and edges\n    cgraph graph \"MATH 332\"\n\n    # Render with Graphviz\n    cgraph graph \"MATH 332\" --dot | dot -Tsvg > plan.svg"
    )]
    Graph(cmd::graph::GraphArgs),

    #[command(
        next_help_heading = "Plan",
        about = "Edit a plan interactively",
        long_about = "Read commands from stdin and print the updated plan after each change. Type `help` in the session for the command list.",
        after_help = "EXAMPLES:\n    # Start with a target\n    cgraph explore \"MATH 332\"\n\n    # Script a session\n    printf 'target MATH 332\\nexclude MATH 220\\n' | cgraph explore"
    )]
    Explore(cmd::explore::ExploreArgs),

    #[command(
        next_help_heading = "Diagnostics",
        about = "Find requirement cycles",
        long_about = "List groups of courses that require each other, with one edge per group that would break it.",
        after_help = "EXAMPLES:\n    # Check the catalogs for loops\n    cgraph cycles\n\n    # Only consider prerequisites\n    cgraph cycles --no-coreqs"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "Diagnostics",
        about = "Summarize the catalogs",
        long_about = "Count courses, relations and cycles in the loaded catalogs.",
        after_help = "EXAMPLES:\n    # Catalog summary\n    cgraph stats\n\n    # Emit machine-readable output\n    cgraph stats --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    cgraph completions bash\n\n    # Generate zsh completions\n    cgraph completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("COURSEGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if quiet {
            "error"
        } else if verbose || env::var("DEBUG").is_ok() {
            "coursegraph=debug,cgraph=debug,info"
        } else {
            "coursegraph=info,cgraph=info,warn"
        })
    });

    let format = env::var("COURSEGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let config = match resolve_config(&project_root, cli.json) {
        Ok(config) => config,
        Err(err) => {
            let mode = cli
                .format
                .unwrap_or(if cli.json { OutputMode::Json } else { OutputMode::Text });
            render_error(
                mode,
                &CliError::with_code(format!("{err:#}"), ErrorCode::ConfigParseError),
            )?;
            return Err(err);
        }
    };
    let output = resolve_output_mode(cli.format, &config.resolved_output);
    debug!(?output, root = %project_root.display(), "resolved configuration");

    let ctx = cmd::Context {
        catalogs: cli
            .catalogs
            .iter()
            .map(|path| cmd::absolutize(path, &project_root))
            .collect(),
        project_root,
        project: config.project,
        short_codes: cli.short_codes,
        output,
    };

    let result = match &cli.command {
        Commands::Courses(args) => cmd::courses::run_courses(args, &ctx),
        Commands::Plan(args) => cmd::plan::run_plan(args, &ctx),
        Commands::Graph(args) => cmd::graph::run_graph(args, &ctx),
        Commands::Explore(args) => cmd::explore::run_explore(args, &ctx),
        Commands::Cycles(args) => cmd::cycles::run_cycles(args, &ctx),
        Commands::Stats(args) => cmd::stats::run_stats(args, &ctx),
        Commands::Completions(_) => Ok(()),
    };

    if result.is_ok() {
        info!("done");
    }
    result
}
