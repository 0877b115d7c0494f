use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankrunError {
    #[error("Invalid worker identity: rank {rank} with size {size}")]
    InvalidIdentity { rank: usize, size: usize },

    #[error("Invalid launcher environment: {var}={value:?} is not a non-negative integer")]
    InvalidLauncherEnv { var: String, value: String },

    #[error("Failed to read job list {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Job list {} contains no jobs", path.display())]
    SourceEmpty { path: PathBuf },

    #[error("Number of jobs must be >= the number of workers. jobs {jobs} workers {workers}")]
    TooFewJobs { jobs: usize, workers: usize },

    #[error("Worker {rank} panicked: {message}")]
    WorkerPanicked { rank: usize, message: String },
}

impl RankrunError {
    /// Errors caused by the invocation rather than by the run itself.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, RankrunError::WorkerPanicked { .. })
    }
}

pub type Result<T> = std::result::Result<T, RankrunError>;
