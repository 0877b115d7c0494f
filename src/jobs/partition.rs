use crate::config::WorkerIdentity;
use crate::error::{RankrunError, Result};

/// Whether the worker at `rank` in a group of `size` owns job `index`.
///
/// `size` must be non-zero. For a fixed `size` the ranks split any index
/// range into disjoint classes whose sizes differ by at most one.
///
/// # Panics
///
/// Panics if `size` is zero. A [`WorkerIdentity`] never carries a zero size.
pub fn owns(rank: usize, size: usize, index: usize) -> bool {
    debug_assert!(size > 0, "group size must be non-zero");
    index % size == rank
}

/// Indices in `0..len` owned by `identity`, ascending.
pub fn owned_indices(identity: WorkerIdentity, len: usize) -> impl Iterator<Item = usize> {
    (0..len).filter(move |&index| owns(identity.rank(), identity.size(), index))
}

/// Reject runs with fewer jobs than workers.
///
/// The partition itself would tolerate idle workers; this guard treats such a
/// run as a misconfiguration instead.
pub fn ensure_coverable(jobs: usize, workers: usize) -> Result<()> {
    if jobs < workers {
        return Err(RankrunError::TooFewJobs { jobs, workers });
    }
    Ok(())
}
