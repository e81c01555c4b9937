//! Host renderer boundary.
//!
//! The reconciler never touches host nodes directly. Everything it does to the
//! host tree goes through [`HostBackend`]:
//!
//! - [`HostBackend::create_node`] - allocate a detached node (work phase)
//! - [`HostBackend::apply_patch`] - apply a [`PropPatch`] computed by [`diff_props`]
//! - [`HostBackend::append_child`] - attach a placed node (commit phase)
//! - [`HostBackend::remove_child`] - detach a deleted node (commit phase)
//!
//! [`MemoryHost`] is an in-memory implementation used by tests and demos.

mod diff;
mod memory;

pub use diff::*;
pub use memory::*;

use std::fmt;

/// What the reconciler asks the host to create.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKind<'a> {
    /// A primitive node with the given tag.
    Tag(&'a str),
    /// A text node. Its content arrives through the `value` attribute.
    Text,
}

/// Primitive operations a host tree must provide.
///
/// Handles are opaque to the reconciler. They are cloned into every fiber that
/// reuses the node, so they should be cheap to clone (an index or an `Rc`).
pub trait HostBackend {
    /// Opaque node handle.
    type Node: Clone + fmt::Debug;

    /// Host-defined failure. Propagated unchanged, never retried.
    type Error: std::error::Error + 'static;

    /// Create a detached node.
    fn create_node(&mut self, kind: HostKind<'_>) -> Result<Self::Node, Self::Error>;

    /// Apply a property patch to a node.
    fn apply_patch(&mut self, node: &Self::Node, patch: &PropPatch) -> Result<(), Self::Error>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    /// Remove `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;
}
