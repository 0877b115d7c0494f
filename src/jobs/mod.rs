//! Job list loading and the static partition of job indices over ranks.
//!
//! - [`source`]: reads the job-list file into a [`JobList`]
//! - [`partition`]: the pure `index mod size == rank` ownership rule

pub mod partition;
pub mod source;

pub use partition::{ensure_coverable, owned_indices, owns};
pub use source::{JobList, COMMENT_MARKER};
