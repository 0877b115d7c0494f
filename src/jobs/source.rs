use std::ops::Index;
use std::path::Path;

use crate::config::WorkerIdentity;
use crate::error::{RankrunError, Result};

/// Lines starting with this character are comments.
pub const COMMENT_MARKER: char = '#';

/// Ordered, immutable list of shell commands. The position of a command
/// decides which rank owns it, so order is never changed after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobList {
    commands: Vec<String>,
}

impl JobList {
    /// Build a list from already-filtered commands.
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }

    /// Parse job-list text: one command per line, skipping blank lines and
    /// lines whose first character is [`COMMENT_MARKER`]. Kept lines are
    /// taken verbatim.
    pub fn parse(text: &str) -> Self {
        let commands = text
            .lines()
            .filter(|line| is_job_line(line))
            .map(str::to_string)
            .collect();
        Self { commands }
    }

    /// Read and parse the job list at `path` on behalf of `identity`.
    ///
    /// Every worker calls this independently; nothing is shared between
    /// the resulting lists.
    pub async fn load(path: &Path, identity: WorkerIdentity) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|source| {
            RankrunError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let jobs = Self::parse(&text);
        for (index, command) in jobs.iter() {
            tracing::debug!(rank = identity.rank(), index, command, "Adding command");
        }

        if jobs.is_empty() {
            return Err(RankrunError::SourceEmpty {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(
            rank = identity.rank(),
            path = %path.display(),
            jobs = jobs.len(),
            "Job list loaded"
        );
        Ok(jobs)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.commands.get(index).map(String::as_str)
    }

    /// `(index, command)` pairs in list order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.commands.iter().map(String::as_str).enumerate()
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl Index<usize> for JobList {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.commands[index]
    }
}

fn is_job_line(line: &str) -> bool {
    !line.trim().is_empty() && !line.starts_with(COMMENT_MARKER)
}
