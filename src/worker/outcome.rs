use std::io::Write;
use std::sync::Arc;

use crate::config::WorkerIdentity;
use crate::error::RankrunError;
use crate::worker::executor::CommandStatus;

/// Result of one executed job. Reported once, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub index: usize,
    pub command: String,
    pub status: CommandStatus,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Destination for per-job outcomes and fatal worker errors.
///
/// Implementations must emit each report before returning; the dispatch loop
/// does not start the next job until `report` comes back.
pub trait OutcomeSink: Send + Sync {
    fn report(&self, identity: WorkerIdentity, outcome: &Outcome);

    fn fatal(&self, identity: WorkerIdentity, error: &RankrunError);
}

impl<T: OutcomeSink + ?Sized> OutcomeSink for Arc<T> {
    fn report(&self, identity: WorkerIdentity, outcome: &Outcome) {
        (**self).report(identity, outcome)
    }

    fn fatal(&self, identity: WorkerIdentity, error: &RankrunError) {
        (**self).fatal(identity, error)
    }
}

impl<T: OutcomeSink + ?Sized> OutcomeSink for &T {
    fn report(&self, identity: WorkerIdentity, outcome: &Outcome) {
        (**self).report(identity, outcome)
    }

    fn fatal(&self, identity: WorkerIdentity, error: &RankrunError) {
        (**self).fatal(identity, error)
    }
}

/// Rank-prefixed lines: successes on stdout, failures and fatal errors on
/// stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl OutcomeSink for ConsoleSink {
    fn report(&self, identity: WorkerIdentity, outcome: &Outcome) {
        let line = format_outcome(identity, outcome);
        // A closed stdout/stderr must not stop the worker from running its remaining jobs.
        let written = if outcome.is_success() {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{}", line).and_then(|_| out.flush())
        } else {
            let mut err = std::io::stderr().lock();
            writeln!(err, "{}", line).and_then(|_| err.flush())
        };
        if let Err(e) = written {
            tracing::warn!(rank = identity.rank(), error = %e, "Failed to write outcome");
        }
    }

    fn fatal(&self, identity: WorkerIdentity, error: &RankrunError) {
        let mut err = std::io::stderr().lock();
        let written =
            writeln!(err, "Rank {} | {}", identity.rank(), error).and_then(|_| err.flush());
        if let Err(e) = written {
            tracing::warn!(rank = identity.rank(), error = %e, "Failed to write fatal error");
        }
    }
}

/// The line written for one outcome.
pub fn format_outcome(identity: WorkerIdentity, outcome: &Outcome) -> String {
    if outcome.is_success() {
        format!(
            "Rank {} | Completed job {}: {}",
            identity.rank(),
            outcome.index,
            outcome.command
        )
    } else {
        format!(
            "Rank {} | Failed job {}: {} ({})",
            identity.rank(),
            outcome.index,
            outcome.command,
            outcome.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: usize, command: &str, status: CommandStatus) -> Outcome {
        Outcome {
            index,
            command: command.to_string(),
            status,
        }
    }

    #[test]
    fn success_line() {
        let id = WorkerIdentity::new(0, 2).unwrap();
        let line = format_outcome(id, &outcome(2, "echo B", CommandStatus::Exited(0)));
        assert_eq!(line, "Rank 0 | Completed job 2: echo B");
    }

    #[test]
    fn failure_line_carries_status() {
        let id = WorkerIdentity::new(1, 2).unwrap();
        let line = format_outcome(id, &outcome(1, "false", CommandStatus::Exited(1)));
        assert_eq!(line, "Rank 1 | Failed job 1: false (exit code 1)");
    }
}
