pub mod config;
pub mod error;
pub mod group;
pub mod jobs;
pub mod worker;

pub use config::{RunConfig, WorkerIdentity, WorkerLayout};
pub use error::{RankrunError, Result};
