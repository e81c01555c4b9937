//! Commit phase - Apply a finished generation to the host tree.
//!
//! Runs once per cycle, after every fiber has been processed. It is the only
//! place host nodes are attached, patched or detached.
//!
//! # Order
//!
//! 1. Deletions: every queued old fiber's host node is removed from its
//!    nearest host ancestor (components are looked through to their first
//!    host descendants)
//! 2. Pre-order walk from the root's child: `PLACEMENT` appends, `UPDATE`
//!    patches from the alternate's props
//!
//! Removing first guarantees a new node is never appended next to a stale
//! node still occupying the same position.
//!
//! # Failure
//!
//! A host error stops the commit. Removals already done stay done, and their
//! fibers are unlinked from the committed tree so later cycles never try to
//! remove them again. Placements and patches already done are undone, best
//! effort, in reverse order.

use std::rc::Rc;

use tracing::{trace, warn};

use crate::engine::{EffectTag, FiberId, Tree};
use crate::error::{HostCall, ReconcileError};
use crate::renderer::{diff_props, HostBackend};
use crate::types::Props;

/// What a commit did to the host tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub removed: usize,
    pub placed: usize,
    pub patched: usize,
}

/// A host mutation that can be reverted if the commit fails later on.
enum Applied<N> {
    Placed { parent: N, node: N },
    Patched { node: N, prev: Rc<Props>, next: Rc<Props> },
}

/// Apply `wip` and the queued `deletions` (ids into `current`) to the host.
pub(crate) fn commit_root<H: HostBackend>(
    host: &mut H,
    wip: &Tree<H::Node>,
    mut current: Option<&mut Tree<H::Node>>,
    deletions: &[FiberId],
) -> Result<CommitStats, ReconcileError<H::Error>> {
    let mut stats = CommitStats::default();

    if let Some(current) = current.as_deref_mut() {
        for &id in deletions {
            if let Some(parent) = current.host_parent(id).cloned() {
                stats.removed += commit_deletion(host, current, id, &parent)?;
            }
        }
    }

    let mut applied = Vec::new();
    if let Err(err) = commit_work(host, wip, current.as_deref(), &mut stats, &mut applied) {
        revert(host, applied);
        return Err(err);
    }

    Ok(stats)
}

/// Pre-order walk applying placements and updates.
fn commit_work<H: HostBackend>(
    host: &mut H,
    wip: &Tree<H::Node>,
    current: Option<&Tree<H::Node>>,
    stats: &mut CommitStats,
    applied: &mut Vec<Applied<H::Node>>,
) -> Result<(), ReconcileError<H::Error>> {
    let mut next = wip.root().child;
    while let Some(id) = next {
        let fiber = &wip[id];

        if fiber.effect.contains(EffectTag::PLACEMENT) {
            if let (Some(node), Some(parent)) = (&fiber.node, wip.host_parent(id)) {
                host.append_child(parent, node)
                    .map_err(|e| ReconcileError::new(HostCall::AppendChild, e))?;
                applied.push(Applied::Placed {
                    parent: parent.clone(),
                    node: node.clone(),
                });
                stats.placed += 1;
            }
        } else if fiber.effect.contains(EffectTag::UPDATE) {
            if let Some(node) = &fiber.node {
                let prev = fiber
                    .alternate
                    .zip(current)
                    .and_then(|(alternate, tree)| tree.get(alternate))
                    .map(|old| old.props.clone())
                    .unwrap_or_default();
                let patch = diff_props(&prev, &fiber.props);
                if !patch.is_empty() {
                    host.apply_patch(node, &patch)
                        .map_err(|e| ReconcileError::new(HostCall::ApplyPatch, e))?;
                    applied.push(Applied::Patched {
                        node: node.clone(),
                        prev,
                        next: fiber.props.clone(),
                    });
                    stats.patched += 1;
                }
            }
        }

        next = wip.next_in_preorder(id);
    }
    Ok(())
}

/// Remove the host node(s) of a deleted fiber from `parent`, unlinking each
/// fiber from `tree` once its nodes are gone.
///
/// Returns the number of host nodes removed.
fn commit_deletion<H: HostBackend>(
    host: &mut H,
    tree: &mut Tree<H::Node>,
    id: FiberId,
    parent: &H::Node,
) -> Result<usize, ReconcileError<H::Error>> {
    let mut removed = 0;

    if let Some(node) = &tree[id].node {
        trace!(fiber = id.0, "removing host node");
        host.remove_child(parent, node)
            .map_err(|e| ReconcileError::new(HostCall::RemoveChild, e))?;
        removed = 1;
    } else {
        let children: Vec<_> = tree.children(id).collect();
        for child in children {
            removed += commit_deletion(host, tree, child, parent)?;
        }
    }

    tree.unlink(id);
    Ok(removed)
}

/// Undo placements and patches of a failed commit, newest first.
fn revert<H: HostBackend>(host: &mut H, applied: Vec<Applied<H::Node>>) {
    for change in applied.into_iter().rev() {
        let result = match &change {
            Applied::Placed { parent, node } => host.remove_child(parent, node),
            Applied::Patched { node, prev, next } => host.apply_patch(node, &diff_props(next, prev)),
        };
        if let Err(err) = result {
            warn!(error = %err, "could not revert host mutation of a failed commit");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Fiber;
    use crate::renderer::{HostKind, HostOp, MemoryHost};
    use crate::types::{Element, Props, RenderFn};
    use std::rc::Rc;

    fn panel(_: &Props) -> Element {
        Element::host("aside")
    }

    #[test]
    fn test_component_deletion_removes_host_descendants() {
        let mut host = MemoryHost::new();
        let container = host.create_container();
        let aside = host.create_node(HostKind::Tag("aside")).unwrap();
        host.append_child(&container, &aside).unwrap();
        host.take_ops();

        let props = Rc::new(Props::new());
        let mut current = Tree::new(Fiber::root(container, props.clone(), None));
        let comp = current.push(Fiber::placement((panel as RenderFn).into(), props.clone(), FiberId::ROOT));
        let leaf = current.push(Fiber::placement("aside".into(), props.clone(), comp));
        current[FiberId::ROOT].child = Some(comp);
        current[comp].child = Some(leaf);
        current[leaf].node = Some(aside);

        let wip = Tree::new(Fiber::root(container, props, Some(FiberId::ROOT)));
        let stats = commit_root(&mut host, &wip, Some(&mut current), &[comp]).unwrap();

        assert_eq!(stats.removed, 1);
        assert_eq!(host.ops(), &[HostOp::Remove { parent: container, child: aside }]);
        assert_eq!(current.root().child, None);
    }

    #[test]
    fn test_failed_removal_keeps_fiber_linked() {
        let mut host = MemoryHost::new();
        let container = host.create_container();
        let kept = host.create_node(HostKind::Tag("p")).unwrap();
        let stray = host.create_node(HostKind::Tag("p")).unwrap();
        host.append_child(&container, &kept).unwrap();

        let props = Rc::new(Props::new());
        let mut current = Tree::new(Fiber::root(container, props.clone(), None));
        let first = current.push(Fiber::placement("p".into(), props.clone(), FiberId::ROOT));
        let second = current.push(Fiber::placement("p".into(), props.clone(), FiberId::ROOT));
        current[FiberId::ROOT].child = Some(first);
        current[first].sibling = Some(second);
        current[first].node = Some(kept);
        current[second].node = Some(stray);

        let wip = Tree::new(Fiber::root(container, props, Some(FiberId::ROOT)));
        let err = commit_root(&mut host, &wip, Some(&mut current), &[first, second]).unwrap_err();

        assert_eq!(err.call, HostCall::RemoveChild);
        assert_eq!(current.children(FiberId::ROOT).collect::<Vec<_>>(), vec![second]);
    }
}
