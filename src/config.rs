use std::fmt;
use std::path::PathBuf;

use crate::error::{RankrunError, Result};

/// Environment variable pairs set by common process-group launchers,
/// checked in order. Each entry is `(rank variable, size variable)`.
pub const LAUNCHER_ENV_VARS: &[(&str, &str)] = &[
    ("OMPI_COMM_WORLD_RANK", "OMPI_COMM_WORLD_SIZE"),
    ("PMI_RANK", "PMI_SIZE"),
    ("SLURM_PROCID", "SLURM_NTASKS"),
];

pub const DEFAULT_SHELL: &str = "sh";

/// Position of one worker within its group.
///
/// Only constructible with `size >= 1` and `rank < size`, so every holder
/// of a `WorkerIdentity` can partition without re-checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerIdentity {
    rank: usize,
    size: usize,
}

impl WorkerIdentity {
    pub fn new(rank: usize, size: usize) -> Result<Self> {
        if size == 0 || rank >= size {
            return Err(RankrunError::InvalidIdentity { rank, size });
        }
        Ok(Self { rank, size })
    }

    /// Rank 0 of a group of one.
    pub fn single() -> Self {
        Self { rank: 0, size: 1 }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Every identity of a group of `size` workers, in rank order.
    pub fn group(size: usize) -> Result<Vec<Self>> {
        if size == 0 {
            return Err(RankrunError::InvalidIdentity { rank: 0, size });
        }
        Ok((0..size).map(|rank| Self { rank, size }).collect())
    }

    /// Resolve the identity handed out by a process-group launcher.
    ///
    /// `lookup` abstracts the environment so callers can pass
    /// `|k| std::env::var(k).ok()` in production and a map in tests.
    /// Returns `Ok(None)` when no known launcher variables are present.
    pub fn from_launcher<F>(lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (rank_var, size_var) in LAUNCHER_ENV_VARS {
            let (Some(rank), Some(size)) = (lookup(rank_var), lookup(size_var)) else {
                continue;
            };
            let rank = parse_env_index(rank_var, &rank)?;
            let size = parse_env_index(size_var, &size)?;
            tracing::debug!(rank_var, size_var, rank, size, "Identity from launcher");
            return Self::new(rank, size).map(Some);
        }
        Ok(None)
    }
}

impl fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.rank, self.size)
    }
}

fn parse_env_index(var: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| RankrunError::InvalidLauncherEnv {
            var: var.to_string(),
            value: value.to_string(),
        })
}

/// How the workers of this process are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerLayout {
    /// One worker in this process; its peers are other processes.
    Single(WorkerIdentity),
    /// The whole group runs as concurrent tasks in this process.
    Local(usize),
}

impl WorkerLayout {
    pub fn size(&self) -> usize {
        match self {
            WorkerLayout::Single(identity) => identity.size(),
            WorkerLayout::Local(size) => *size,
        }
    }

    /// Identities of the workers this process is responsible for.
    pub fn identities(&self) -> Result<Vec<WorkerIdentity>> {
        match self {
            WorkerLayout::Single(identity) => Ok(vec![*identity]),
            WorkerLayout::Local(size) => WorkerIdentity::group(*size),
        }
    }
}

/// Shell invocation used for every job: `<program> -c <command>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub program: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_SHELL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub job_file: PathBuf,
    pub layout: WorkerLayout,
    pub shell: ShellConfig,
}

impl RunConfig {
    pub fn new(job_file: impl Into<PathBuf>, layout: WorkerLayout) -> Self {
        Self {
            job_file: job_file.into(),
            layout,
            shell: ShellConfig::default(),
        }
    }

    pub fn with_shell(mut self, program: impl Into<String>) -> Self {
        self.shell.program = program.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn identity_rejects_zero_size() {
        assert!(matches!(
            WorkerIdentity::new(0, 0),
            Err(RankrunError::InvalidIdentity { rank: 0, size: 0 })
        ));
    }

    #[test]
    fn identity_rejects_rank_out_of_range() {
        assert!(WorkerIdentity::new(3, 3).is_err());
        assert!(WorkerIdentity::new(2, 3).is_ok());
    }

    #[test]
    fn identity_display() {
        let id = WorkerIdentity::new(1, 4).unwrap();
        assert_eq!(id.to_string(), "1/4");
    }

    #[test]
    fn group_lists_every_rank() {
        let group = WorkerIdentity::group(3).unwrap();
        let ranks: Vec<usize> = group.iter().map(|id| id.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
        assert!(group.iter().all(|id| id.size() == 3));
        assert!(WorkerIdentity::group(0).is_err());
    }

    #[test]
    fn launcher_absent() {
        assert_eq!(WorkerIdentity::from_launcher(env(&[])).unwrap(), None);
    }

    #[test]
    fn launcher_open_mpi() {
        let id = WorkerIdentity::from_launcher(env(&[
            ("OMPI_COMM_WORLD_RANK", "2"),
            ("OMPI_COMM_WORLD_SIZE", "4"),
        ]))
        .unwrap();
        assert_eq!(id, Some(WorkerIdentity::new(2, 4).unwrap()));
    }

    #[test]
    fn launcher_prefers_open_mpi_over_slurm() {
        let id = WorkerIdentity::from_launcher(env(&[
            ("SLURM_PROCID", "0"),
            ("SLURM_NTASKS", "8"),
            ("OMPI_COMM_WORLD_RANK", "1"),
            ("OMPI_COMM_WORLD_SIZE", "2"),
        ]))
        .unwrap()
        .unwrap();
        assert_eq!((id.rank(), id.size()), (1, 2));
    }

    #[test]
    fn launcher_needs_both_variables() {
        let id = WorkerIdentity::from_launcher(env(&[("PMI_RANK", "1")])).unwrap();
        assert_eq!(id, None);
    }

    #[test]
    fn launcher_rejects_garbage() {
        let err = WorkerIdentity::from_launcher(env(&[("PMI_RANK", "x"), ("PMI_SIZE", "2")]))
            .unwrap_err();
        assert!(matches!(err, RankrunError::InvalidLauncherEnv { ref var, .. } if var == "PMI_RANK"));
    }

    #[test]
    fn launcher_rejects_rank_beyond_size() {
        let err = WorkerIdentity::from_launcher(env(&[
            ("SLURM_PROCID", "5"),
            ("SLURM_NTASKS", "2"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RankrunError::InvalidIdentity { rank: 5, size: 2 }));
    }

    #[test]
    fn layout_identities() {
        let single = WorkerLayout::Single(WorkerIdentity::new(1, 3).unwrap());
        assert_eq!(single.size(), 3);
        assert_eq!(single.identities().unwrap().len(), 1);

        let local = WorkerLayout::Local(4);
        assert_eq!(local.size(), 4);
        assert_eq!(local.identities().unwrap().len(), 4);
    }

    #[test]
    fn run_config_defaults_to_sh() {
        let cfg = RunConfig::new("jobs.txt", WorkerLayout::Single(WorkerIdentity::single()));
        assert_eq!(cfg.shell.program, "sh");
        let cfg = cfg.with_shell("bash");
        assert_eq!(cfg.shell.program, "bash");
    }
}
