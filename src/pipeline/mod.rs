//! Reconciliation Pipeline
//!
//! Drives a cycle from a render request to host mutations.
//!
//! # Pipeline Architecture
//!
//! ```text
//! render() / setter → work loop (sliced) → commit → committed baseline
//! ```
//!
//! ## Data Flow
//!
//! 1. **work loop** - One fiber per unit: render components, create host
//!    nodes, reconcile children. Yields when the slice runs low
//! 2. **commit** - Deletions, then placements and updates, in one pass
//! 3. **baseline** - The finished generation becomes the alternate of the next
//!
//! ## Key Design Principles
//!
//! - **Host untouched mid-cycle**: only the commit attaches, patches or detaches
//! - **Resumable**: the pending-work pointer is the only state between slices
//! - **Last writer wins**: a state update restarts the cycle from the baseline

pub mod commit;
pub mod config;
pub mod deadline;
pub mod scheduler;

// Re-exports
pub use commit::CommitStats;
pub use config::{
    ReconcilerConfig, DEFAULT_RESTART_LIMIT, DEFAULT_SLICE_BUDGET, DEFAULT_YIELD_THRESHOLD,
};
pub use deadline::{Deadline, SliceDeadline, Unbounded};
pub use scheduler::{Reconciler, WorkStatus};
