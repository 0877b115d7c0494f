use crate::config::WorkerIdentity;
use crate::error::Result;
use crate::jobs::{ensure_coverable, owned_indices, JobList};
use crate::worker::executor::CommandRunner;
use crate::worker::outcome::{Outcome, OutcomeSink};

/// Tally of one worker's run. Local to that worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub executed: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub fn succeeded(&self) -> usize {
        self.executed - self.failed
    }
}

/// Runs the jobs owned by one worker, in ascending index order, one at a time.
#[derive(Debug, Clone)]
pub struct Dispatcher<R, S> {
    identity: WorkerIdentity,
    runner: R,
    sink: S,
}

impl<R, S> Dispatcher<R, S>
where
    R: CommandRunner,
    S: OutcomeSink,
{
    pub fn new(identity: WorkerIdentity, runner: R, sink: S) -> Self {
        Self {
            identity,
            runner,
            sink,
        }
    }

    /// Execute every owned job of `jobs` and report each outcome.
    ///
    /// Fails before running anything if the list is shorter than the group.
    /// Failed jobs are reported and skipped past; they never make this
    /// return an error.
    pub async fn run(&self, jobs: &JobList) -> Result<DispatchSummary> {
        ensure_coverable(jobs.len(), self.identity.size())?;

        let rank = self.identity.rank();
        let mut summary = DispatchSummary::default();

        for index in owned_indices(self.identity, jobs.len()) {
            let command = &jobs[index];
            tracing::debug!(rank, index, command, "Running job");

            let status = self.runner.run(command).await;
            let outcome = Outcome {
                index,
                command: command.to_string(),
                status,
            };

            summary.executed += 1;
            if outcome.is_success() {
                tracing::debug!(rank, index, "Job completed");
            } else {
                summary.failed += 1;
                tracing::debug!(rank, index, status = %outcome.status, "Job failed");
            }
            self.sink.report(self.identity, &outcome);
        }

        tracing::info!(
            rank,
            size = self.identity.size(),
            executed = summary.executed,
            failed = summary.failed,
            "Worker finished"
        );
        Ok(summary)
    }
}
