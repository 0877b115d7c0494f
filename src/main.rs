use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use rankrun::config::{RunConfig, WorkerIdentity, WorkerLayout, DEFAULT_SHELL};
use rankrun::group;
use rankrun::worker::ConsoleSink;

#[derive(Parser, Debug)]
#[command(name = "rankrun")]
#[command(version)]
#[command(about = "Run each command of a job list exactly once across a group of ranked workers")]
#[command(
    long_about = "Run each command of a job list exactly once across a group of ranked workers.\n\n\
    Every worker reads the same job list and runs the commands whose index modulo the group \
    size equals its rank. Start one process per rank with an MPI launcher or Slurm \
    (e.g. `mpirun -np 4 rankrun jobs.txt`), pass --rank/--size explicitly, or use --local \
    to run the whole group inside this process."
)]
struct Args {
    /// Text file with one shell command per line (blank lines and lines starting with '#' are skipped)
    job_file: PathBuf,

    /// Rank of this worker (0-based). Requires --size.
    #[arg(long, env = "RANKRUN_RANK")]
    rank: Option<usize>,

    /// Total number of workers in the group. Requires --rank.
    #[arg(long, env = "RANKRUN_SIZE")]
    size: Option<usize>,

    /// Run the whole group of N workers as concurrent tasks in this process
    #[arg(long, value_name = "N")]
    local: Option<usize>,

    /// Shell used to run each command as `<shell> -c <command>`
    #[arg(long, env = "RANKRUN_SHELL", default_value = DEFAULT_SHELL)]
    shell: String,

    /// Log every accepted job line and each job start (debug level)
    #[arg(long, short = 'v')]
    verbose: bool,
}

// =============================================================================
// Worker Layout Resolution
// =============================================================================

/// Decide which workers this process runs.
///
/// `--local` wins over an explicit identity, which wins over launcher
/// variables; with none of them this process is a group of one.
fn resolve_layout<F>(args: &Args, lookup: F) -> Result<WorkerLayout, LayoutError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(size) = args.local {
        WorkerIdentity::group(size)?;
        return Ok(WorkerLayout::Local(size));
    }

    match (args.rank, args.size) {
        (Some(rank), Some(size)) => {
            return Ok(WorkerLayout::Single(WorkerIdentity::new(rank, size)?));
        }
        (Some(_), None) => return Err(LayoutError::Incomplete("--rank requires --size")),
        (None, Some(_)) => return Err(LayoutError::Incomplete("--size requires --rank")),
        (None, None) => {}
    }

    let identity = WorkerIdentity::from_launcher(lookup)?.unwrap_or_else(WorkerIdentity::single);
    Ok(WorkerLayout::Single(identity))
}

#[derive(Debug)]
enum LayoutError {
    Incomplete(&'static str),
    Invalid(rankrun::RankrunError),
}

impl From<rankrun::RankrunError> for LayoutError {
    fn from(e: rankrun::RankrunError) -> Self {
        LayoutError::Invalid(e)
    }
}

// =============================================================================
// Entry Point
// =============================================================================

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                return ExitCode::FAILURE;
            }
        },
    };

    init_logging(args.verbose);

    let layout = match resolve_layout(&args, |k| std::env::var(k).ok()) {
        Ok(layout) => layout,
        Err(LayoutError::Incomplete(msg)) => {
            let _ = Args::command().error(ErrorKind::MissingRequiredArgument, msg).print();
            return ExitCode::FAILURE;
        }
        Err(LayoutError::Invalid(e)) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = RunConfig::new(args.job_file, layout).with_shell(args.shell);
    tracing::debug!(
        job_file = %config.job_file.display(),
        layout = ?config.layout,
        shell = %config.shell.program,
        "Resolved configuration"
    );

    match group::run(&config, Arc::new(ConsoleSink::new())).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, configuration = e.is_configuration(), "Run aborted");
            ExitCode::FAILURE
        }
    }
}
