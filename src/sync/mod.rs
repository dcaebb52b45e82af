//! Chain state synchronization
//!
//! - `pipeline`: a single fetch, decode, enrich and reconcile pass over the program's accounts.
//! - `scheduler`: runs the pipeline on an interval with start, stop and manual trigger.
//! - `stats`: counters reported by each run.

/// Fetch, decode, enrich and reconcile pass
mod pipeline;
/// Interval driver for the pipeline
mod scheduler;
/// Per-run counters
mod stats;
#[cfg(test)]
pub mod testing;
/// Error and policy types
mod types;

pub use pipeline::SyncPipeline;
pub use scheduler::{SchedulerState, SyncScheduler};
pub use stats::RunReport;
pub use types::*;
