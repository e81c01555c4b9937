//! Fiber Tree - Arena holding one generation of fibers.
//!
//! Fibers are not objects pointing at each other. They are entries in a
//! per-generation arena and refer to each other by [`FiberId`]:
//!
//! ```text
//! Index 0: root (parent=None, child=1)
//! Index 1: div  (parent=0, child=2, sibling=3)
//! Index 2: text (parent=1)
//! Index 3: span (parent=0)
//! ```
//!
//! Index 0 is always the synthetic root. Ids are only valid for the arena that
//! allocated them; `alternate` ids are looked up in the previous generation's
//! arena.

use std::ops::{Index, IndexMut};

use super::fiber::{Fiber, FiberId};

/// One generation of fibers.
pub struct Tree<N> {
    fibers: Vec<Fiber<N>>,
}

impl<N> Tree<N> {
    /// Create a generation from its root fiber.
    pub fn new(root: Fiber<N>) -> Self {
        Self { fibers: vec![root] }
    }

    /// Allocate a fiber and return its id.
    pub fn push(&mut self, fiber: Fiber<N>) -> FiberId {
        let id = FiberId(self.fibers.len() as u32);
        self.fibers.push(fiber);
        id
    }

    /// The root fiber.
    #[inline]
    pub fn root(&self) -> &Fiber<N> {
        &self.fibers[0]
    }

    /// Get a fiber, if the id belongs to this arena.
    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id.index())
    }

    /// Number of fibers in this generation.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    /// Always false: every generation has a root.
    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Next fiber in depth-first pre-order: first child, else the nearest
    /// ancestor-or-self's next sibling, else `None`.
    pub fn next_in_preorder(&self, id: FiberId) -> Option<FiberId> {
        if let Some(child) = self[id].child {
            return Some(child);
        }
        let mut current = Some(id);
        while let Some(fiber) = current {
            if let Some(sibling) = self[fiber].sibling {
                return Some(sibling);
            }
            current = self[fiber].parent;
        }
        None
    }

    /// Nearest strict ancestor that owns a host node.
    ///
    /// Components own none, so this walks past them. The root always owns the
    /// container, so this only returns `None` for the root itself.
    pub fn host_parent(&self, id: FiberId) -> Option<&N> {
        let mut current = self[id].parent;
        while let Some(parent) = current {
            if let Some(node) = &self[parent].node {
                return Some(node);
            }
            current = self[parent].parent;
        }
        None
    }

    /// Take a fiber out of its parent's child chain.
    ///
    /// The fiber stays allocated and keeps its own links, so ids held
    /// elsewhere remain valid. Traversals from the root no longer reach it.
    pub fn unlink(&mut self, id: FiberId) {
        let Some(parent) = self[id].parent else { return };
        let sibling = self[id].sibling.take();

        if self[parent].child == Some(id) {
            self[parent].child = sibling;
            return;
        }
        let mut current = self[parent].child;
        while let Some(prev) = current {
            if self[prev].sibling == Some(id) {
                self[prev].sibling = sibling;
                return;
            }
            current = self[prev].sibling;
        }
    }

    /// Child ids of a fiber, in sibling order.
    pub fn children(&self, id: FiberId) -> Children<'_, N> {
        Children {
            tree: self,
            next: self[id].child,
        }
    }
}

impl<N> Index<FiberId> for Tree<N> {
    type Output = Fiber<N>;

    #[inline]
    fn index(&self, id: FiberId) -> &Fiber<N> {
        &self.fibers[id.index()]
    }
}

impl<N> IndexMut<FiberId> for Tree<N> {
    #[inline]
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        &mut self.fibers[id.index()]
    }
}

/// Iterator over a fiber's child chain.
pub struct Children<'a, N> {
    tree: &'a Tree<N>,
    next: Option<FiberId>,
}

impl<N> Iterator for Children<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let id = self.next?;
        self.next = self.tree[id].sibling;
        Some(id)
    }
}

// =============================================================================
// Tests
// =============================================================================
