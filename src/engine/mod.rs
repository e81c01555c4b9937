//! Fiber Engine - Work nodes, generation arenas and child reconciliation.
//!
//! The engine manages the core data structures:
//! - Fiber: one unit of work, with its edit tag and hook records
//! - Tree: arena holding one generation of fibers
//! - Reconcile: position-based matching of new elements against old fibers
//!
//! # Architecture
//!
//! Two generations exist while a cycle is in flight:
//!
//! ```text
//! current (committed)            wip (in progress)
//! ┌──────────────────┐           ┌──────────────────┐
//! │ 0 root           │◀─alternate─│ 0 root           │
//! │ 1 div  node=#3   │◀─alternate─│ 1 div  node=#3   │ UPDATE
//! │ 2 span node=#4   │ DELETION   │ 2 p    node=None │ PLACEMENT
//! └──────────────────┘           └──────────────────┘
//! ```
//!
//! The wip generation only ever refers back into the current one. Once wip is
//! committed it becomes current and the old current is dropped.

mod fiber;
mod reconcile;
mod tree;

pub use fiber::*;
pub use reconcile::*;
pub use tree::*;
