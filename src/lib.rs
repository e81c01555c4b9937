//! # spark-fiber
//!
//! Incremental, interruptible UI reconciler for Rust.
//!
//! ## Architecture
//!
//! An element tree describes the desired UI. The reconciler turns it into a
//! tree of work nodes (fibers), matches those against the previously committed
//! tree, and applies the differences to a host tree in one commit.
//!
//! Work is split into one unit per fiber, so a cycle can be sliced across idle
//! periods and resumed where it stopped:
//! ```text
//! Element tree → work loop (render, create, reconcile) → commit → HostBackend
//! ```
//!
//! Components are plain functions of their props. They keep local state with
//! [`use_state`]; calling a setter queues the update and restarts the cycle
//! from the committed root.
//!
//! ## Modules
//!
//! - [`types`] - Elements, props, events and `create_element`
//! - [`engine`] - Fibers, generation arenas, child reconciliation
//! - [`state`] - State hook store
//! - [`pipeline`] - Time-sliced work loop and commit phase
//! - [`renderer`] - Host backend boundary, prop diffing, in-memory host
//! - [`error`] - Reconciliation errors

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use engine::{EffectTag, Fiber, FiberId, Tree};

pub use error::{HostCall, ReconcileError};

pub use pipeline::{
    CommitStats, Deadline, Reconciler, ReconcilerConfig, SliceDeadline, Unbounded, WorkStatus,
};

pub use renderer::{
    diff_props, diff_style, HostBackend, HostKind, HostOp, MemoryHost, MemoryHostError, NodeId,
    PropPatch, StylePatch,
};

pub use state::{in_component_render, use_state, HookRecord, RenderRequest, StateSetter};
