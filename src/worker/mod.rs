//! Per-worker job execution.
//!
//! - [`Dispatcher`]: walks the indices owned by one rank and runs them in order
//! - [`CommandRunner`] / [`ShellRunner`]: run one command to completion
//! - [`OutcomeSink`] / [`ConsoleSink`]: report each outcome as soon as it is known
//!
//! # Execution Flow
//!
//! 1. [`Dispatcher::run`] rejects job lists shorter than the group
//! 2. For each owned index, [`ShellRunner`] spawns `sh -c <command>` and waits
//! 3. The exit status is classified; only a zero exit code counts as success
//! 4. The [`Outcome`] goes to the sink before the next job starts

pub mod dispatch;
pub mod executor;
pub mod outcome;

pub use dispatch::{DispatchSummary, Dispatcher};
pub use executor::{CommandRunner, CommandStatus, ShellRunner};
pub use outcome::{ConsoleSink, Outcome, OutcomeSink};
