use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{RunConfig, WorkerIdentity};
use crate::error::{RankrunError, Result};
use crate::jobs::JobList;
use crate::worker::{CommandRunner, DispatchSummary, Dispatcher, OutcomeSink, ShellRunner};

/// Load the job list and run the owned jobs for one worker.
///
/// Fatal errors are reported through `sink` with the worker's rank before
/// being returned.
pub async fn run_worker<R, S>(
    identity: WorkerIdentity,
    job_file: &Path,
    runner: R,
    sink: S,
) -> Result<DispatchSummary>
where
    R: CommandRunner,
    S: OutcomeSink,
{
    let result = match JobList::load(job_file, identity).await {
        Ok(jobs) => Dispatcher::new(identity, runner, &sink).run(&jobs).await,
        Err(e) => Err(e),
    };

    if let Err(ref e) = result {
        tracing::debug!(rank = identity.rank(), error = %e, "Worker aborted");
        sink.fatal(identity, e);
    }
    result
}

/// Run every worker this process is responsible for and wait for all of them.
///
/// With a single-worker layout this is just [`run_worker`]. With a local
/// layout each rank runs as its own task with its own copy of the job list;
/// the tasks share nothing but the sink. Returns the summaries in rank order,
/// or the lowest-rank error if any worker failed.
pub async fn run_group<R, S>(
    config: &RunConfig,
    runner: R,
    sink: Arc<S>,
) -> Result<Vec<DispatchSummary>>
where
    R: CommandRunner + Clone + Send + Sync + 'static,
    S: OutcomeSink + 'static,
{
    let identities = config.layout.identities()?;
    tracing::info!(
        job_file = %config.job_file.display(),
        size = config.layout.size(),
        workers = identities.len(),
        "Starting workers"
    );

    if let [identity] = identities.as_slice() {
        let summary = run_worker(*identity, &config.job_file, runner, sink).await?;
        return Ok(vec![summary]);
    }

    let handles: Vec<_> = identities
        .into_iter()
        .map(|identity| {
            let job_file: PathBuf = config.job_file.clone();
            let runner = runner.clone();
            let sink = sink.clone();
            let handle = tokio::spawn(async move {
                run_worker(identity, &job_file, runner, sink).await
            });
            (identity, handle)
        })
        .collect();

    let mut summaries = Vec::with_capacity(handles.len());
    let mut first_error = None;
    for (identity, handle) in handles {
        let result = handle.await.unwrap_or_else(|e| {
            tracing::error!(rank = identity.rank(), error = %e, "Worker task panicked");
            Err(RankrunError::WorkerPanicked {
                rank: identity.rank(),
                message: e.to_string(),
            })
        });
        match result {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(summaries),
    }
}

/// Run the configured group with the shell runner.
pub async fn run<S>(config: &RunConfig, sink: Arc<S>) -> Result<Vec<DispatchSummary>>
where
    S: OutcomeSink + 'static,
{
    let runner = ShellRunner::new(config.shell.clone());
    run_group(config, runner, sink).await
}
