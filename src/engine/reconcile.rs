//! Child reconciliation.
//!
//! Compares the elements a fiber wants as children with the children its
//! alternate had last commit, position by position:
//!
//! ```text
//! position   old (current tree)   new (elements)   result
//! 0          div                  div              UPDATE   (host node reused)
//! 1          span                 p                PLACEMENT p + DELETION span
//! 2          text                 -                DELETION text
//! 3          -                    img              PLACEMENT img
//! ```
//!
//! Matching is by position and type only. There are no keys, so moving an
//! element shifts every following position into a replace.

use tracing::trace;

use super::fiber::{EffectTag, Fiber, FiberId};
use super::tree::Tree;
use crate::types::Element;

/// Produce the new children of `parent` in `wip`.
///
/// Old fibers come from `current`, starting at `current[parent.alternate].child`.
/// Old fibers that are not reused are tagged [`EffectTag::DELETION`] in
/// `current` and pushed onto `deletions`.
///
/// `current` may only be `None` when `parent` has no alternate.
pub fn reconcile_children<N: Clone>(
    wip: &mut Tree<N>,
    mut current: Option<&mut Tree<N>>,
    parent: FiberId,
    elements: &[Element],
    deletions: &mut Vec<FiberId>,
) {
    let mut old = match (wip[parent].alternate, current.as_deref()) {
        (Some(alternate), Some(tree)) => tree[alternate].child,
        _ => None,
    };
    let mut prev: Option<FiberId> = None;
    let mut index = 0;

    wip[parent].child = None;

    while index < elements.len() || old.is_some() {
        let element = elements.get(index);
        let mut new_fiber = None;

        let old_fiber = old.zip(current.as_deref()).map(|(id, tree)| &tree[id]);
        let same_type = match (old_fiber, element) {
            (Some(old_fiber), Some(element)) => old_fiber.ty.as_ref() == Some(&element.ty),
            _ => false,
        };

        if same_type {
            if let (Some(old_id), Some(old_fiber), Some(element)) = (old, old_fiber, element) {
                let fiber = Fiber::update(
                    element.ty.clone(),
                    element.props.clone(),
                    old_fiber.node.clone(),
                    old_id,
                    parent,
                );
                new_fiber = Some(wip.push(fiber));
            }
        } else if let Some(element) = element {
            let fiber = Fiber::placement(element.ty.clone(), element.props.clone(), parent);
            new_fiber = Some(wip.push(fiber));
        }

        if !same_type {
            if let (Some(old_id), Some(tree)) = (old, current.as_deref_mut()) {
                tree[old_id].effect = EffectTag::DELETION;
                deletions.push(old_id);
            }
        }

        old = old.zip(current.as_deref()).and_then(|(id, tree)| tree[id].sibling);

        if let Some(id) = new_fiber {
            match prev {
                Some(prev) => wip[prev].sibling = Some(id),
                None => wip[parent].child = Some(id),
            }
            prev = Some(id);
        }

        index += 1;
    }

    trace!(
        parent = parent.0,
        children = elements.len(),
        deletions = deletions.len(),
        "reconciled children"
    );
}

// =============================================================================
// Tests
// =============================================================================
