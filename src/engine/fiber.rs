//! Fiber - One unit of reconciliation work.
//!
//! A fiber mirrors one element of the tree being built. Fibers are created
//! fresh every cycle and never mutated after their generation is committed,
//! apart from the deletion tag set by the next cycle's reconciler.
//!
//! Tree shape is encoded with three links instead of child arrays:
//!
//! ```text
//! root
//!  │ child
//!  ▼
//! div ──sibling──▶ p ──sibling──▶ span
//!  │ child         ▲
//!  ▼               │ parent (every fiber)
//! "text"
//! ```
//!
//! `alternate` points into the previously committed generation, never into the
//! generation the fiber lives in.

use std::rc::Rc;

use bitflags::bitflags;

use crate::state::HookRecord;
use crate::types::{ElementType, Props};

/// Generation-local fiber handle.
///
/// Only meaningful together with the [`Tree`](super::Tree) that allocated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(pub u32);

impl FiberId {
    /// The synthetic root of every generation.
    pub const ROOT: FiberId = FiberId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// Host mutation a fiber requires at commit. Empty means none.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EffectTag: u8 {
        /// New host node, appended under the nearest host ancestor.
        const PLACEMENT = 1 << 0;
        /// Reused host node, patched from the alternate's props.
        const UPDATE = 1 << 1;
        /// Old host node, removed before anything else is committed.
        const DELETION = 1 << 2;
    }
}

/// A work node.
pub struct Fiber<N> {
    /// Element type. `None` only for the synthetic root, which stands for the
    /// container and is never mutated in the host tree.
    pub ty: Option<ElementType>,
    pub props: Rc<Props>,
    /// Host node handle. Always `None` for components.
    pub node: Option<N>,
    /// Counterpart in the previous committed generation.
    pub alternate: Option<FiberId>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub effect: EffectTag,
    /// Hook records, in call order. Components only.
    pub hooks: Vec<HookRecord>,
}

impl<N> Fiber<N> {
    /// A root fiber owning the container's host node.
    pub fn root(container: N, props: Rc<Props>, alternate: Option<FiberId>) -> Self {
        Self {
            ty: None,
            props,
            node: Some(container),
            alternate,
            parent: None,
            child: None,
            sibling: None,
            effect: EffectTag::empty(),
            hooks: Vec::new(),
        }
    }

    /// A fiber for a new element: no host node, no alternate.
    pub fn placement(ty: ElementType, props: Rc<Props>, parent: FiberId) -> Self {
        Self {
            ty: Some(ty),
            props,
            node: None,
            alternate: None,
            parent: Some(parent),
            child: None,
            sibling: None,
            effect: EffectTag::PLACEMENT,
            hooks: Vec::new(),
        }
    }

    /// A fiber reusing an old fiber's host node with new props.
    pub fn update(
        ty: ElementType,
        props: Rc<Props>,
        node: Option<N>,
        alternate: FiberId,
        parent: FiberId,
    ) -> Self {
        Self {
            ty: Some(ty),
            props,
            node,
            alternate: Some(alternate),
            parent: Some(parent),
            child: None,
            sibling: None,
            effect: EffectTag::UPDATE,
            hooks: Vec::new(),
        }
    }

    /// Check if this fiber is the synthetic root.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.ty.is_none()
    }

    /// Check if this fiber is a function component.
    #[inline]
    pub fn is_component(&self) -> bool {
        self.ty.as_ref().is_some_and(ElementType::is_component)
    }
}

impl<N: std::fmt::Debug> std::fmt::Debug for Fiber<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fiber")
            .field("ty", &self.ty)
            .field("node", &self.node)
            .field("alternate", &self.alternate)
            .field("parent", &self.parent)
            .field("child", &self.child)
            .field("sibling", &self.sibling)
            .field("effect", &self.effect)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
