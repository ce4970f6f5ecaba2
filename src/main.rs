//! repostat: reports the state of every git repository below a set of roots

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use repostat::commands::{handle_status_command, ScanOutcome, StatusArgs, Verbosity};
use repostat::core::{ConfigOverrides, SortOrder, StatusFilter};
use repostat::error::ScanError;

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser, Debug)]
#[command(
    name = "repostat",
    version,
    about = "Report the state of every git repository below one or more directories"
)]
struct Cli {
    /// Directories to scan (defaults to the configured roots, then the current directory)
    #[arg(value_name = "ROOT")]
    roots: Vec<PathBuf>,

    /// Maximum directory depth below each root
    #[arg(short, long, value_name = "N")]
    depth: Option<usize>,

    /// Show upstream and change counts, list skipped directories (-vv for debug logs)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print the table only
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Configuration file to load instead of the default one
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Order of the reported repositories
    #[arg(long, value_enum)]
    sort: Option<SortOrder>,

    /// Only show repositories in this state
    #[arg(long, value_enum)]
    filter: Option<StatusFilter>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Repositories queried at once (0 = one per CPU)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Do not descend into hidden directories that are not repositories
    #[arg(long)]
    skip_hidden: bool,

    /// Do not descend into common build and dependency directories (node_modules, target, ...)
    #[arg(long)]
    skip_build_dirs: bool,

    /// Do not follow symbolic links to directories
    #[arg(long)]
    no_follow_links: bool,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose > 0 {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn into_args(self) -> StatusArgs {
        let verbosity = self.verbosity();
        StatusArgs {
            overrides: ConfigOverrides {
                config_path: self.config,
                roots: self.roots,
                max_depth: self.depth,
                skip_hidden: self.skip_hidden,
                skip_build_dirs: self.skip_build_dirs,
                no_follow_links: self.no_follow_links,
                sort: self.sort,
                filter: self.filter,
                jobs: self.jobs,
            },
            verbosity,
            json: self.json,
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("repostat={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match handle_status_command(cli.into_args()).await {
        Ok(ScanOutcome::Completed) => ExitCode::SUCCESS,
        // The discovery thread may still be walking; do not wait for it
        Ok(ScanOutcome::Interrupted) => std::process::exit(EXIT_INTERRUPTED),
        Err(e) => {
            eprintln!("❌ {e:#}");
            match e.downcast_ref::<ScanError>() {
                Some(err) if err.is_fatal() => ExitCode::from(EXIT_USAGE),
                _ => ExitCode::from(EXIT_FAILURE),
            }
        }
    }
}
