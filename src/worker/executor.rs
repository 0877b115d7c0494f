use std::fmt;
use std::future::Future;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::ShellConfig;

/// How a job's process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    /// The process exited on its own with this code.
    Exited(i32),
    /// The process was terminated without an exit code (e.g. by a signal).
    Terminated { signal: Option<i32> },
    /// The process could not be spawned or waited on.
    NotStarted(String),
}

impl CommandStatus {
    /// Normal termination with code 0.
    pub fn is_success(&self) -> bool {
        matches!(self, CommandStatus::Exited(0))
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandStatus::Exited(code) => Some(*code),
            _ => None,
        }
    }

    fn from_exit_status(status: std::process::ExitStatus) -> Self {
        match status.code() {
            Some(code) => CommandStatus::Exited(code),
            None => CommandStatus::Terminated {
                signal: terminating_signal(&status),
            },
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandStatus::Exited(code) => write!(f, "exit code {}", code),
            CommandStatus::Terminated { signal: Some(sig) } => {
                write!(f, "terminated by signal {}", sig)
            }
            CommandStatus::Terminated { signal: None } => write!(f, "terminated by signal"),
            CommandStatus::NotStarted(err) => write!(f, "could not be started: {}", err),
        }
    }
}

#[cfg(unix)]
fn terminating_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

/// Runs one job command to completion.
///
/// The returned future must not resolve until the child has been reaped, so
/// a worker never holds more than one process handle at a time.
pub trait CommandRunner {
    fn run(&self, command: &str) -> impl Future<Output = CommandStatus> + Send;
}

/// Runs commands through a shell as `<shell> -c <command>`, inheriting the
/// worker's stdin, stdout and stderr.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    config: ShellConfig,
}

impl ShellRunner {
    pub fn new(config: ShellConfig) -> Self {
        Self { config }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> impl Future<Output = CommandStatus> + Send {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        async move {
            match cmd.status().await {
                Ok(status) => CommandStatus::from_exit_status(status),
                Err(e) => CommandStatus::NotStarted(e.to_string()),
            }
        }
    }
}
