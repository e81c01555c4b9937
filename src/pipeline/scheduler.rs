//! Work loop - Cooperative, time-sliced reconciliation.
//!
//! The [`Reconciler`] owns everything a cycle needs: the host backend, the
//! committed generation, the generation in progress, the pending-work pointer
//! and the deletions queue.
//!
//! # States
//!
//! ```text
//!            render() / setter
//!   Idle ─────────────────────────▶ Working
//!    ▲                                 │ run_slice(): process fibers until the
//!    │                                 │ deadline drops below the threshold
//!    │        commit (next_unit=None)  │
//!    └─────────────────────────────────┘
//! ```
//!
//! The pending-work pointer is the only resumption state: fibers carry their
//! own parent/child/sibling links, so the next call to `run_slice` continues
//! exactly where the previous one yielded.
//!
//! # Example
//!
//! ```ignore
//! use spark_fiber::{Element, MemoryHost, Reconciler, SliceDeadline};
//! use std::time::Duration;
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container();
//! let mut reconciler = Reconciler::new(host);
//!
//! reconciler.render(Element::host("div").child("hello"), container);
//!
//! // From an idle callback, frame timer, or a plain loop:
//! while reconciler.run_slice(&SliceDeadline::new(Duration::from_millis(16)))?.is_working() {}
//! ```

use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::commit::{commit_root, CommitStats};
use super::config::ReconcilerConfig;
use super::deadline::{Deadline, SliceDeadline};
use crate::engine::{reconcile_children, Fiber, FiberId, Tree};
use crate::error::{HostCall, ReconcileError};
use crate::renderer::{diff_props, HostBackend, HostKind};
use crate::state::{render_with_hooks, RenderRequest};
use crate::types::{Element, ElementType, Props};

/// Scheduler state after a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing pending, nothing to commit.
    Idle,
    /// A cycle is in flight (or requested) and needs more slices.
    Working,
}

impl WorkStatus {
    #[inline]
    pub fn is_working(self) -> bool {
        self == WorkStatus::Working
    }
}

/// Reconciliation scheduler bound to one host backend.
///
/// Created once and kept for the application's lifetime. All mutation of the
/// fiber generations goes through the work loop and the commit phase.
pub struct Reconciler<H: HostBackend> {
    host: H,
    config: ReconcilerConfig,
    /// Last committed generation (the baseline).
    current: Option<Tree<H::Node>>,
    /// Generation under construction.
    wip: Option<Tree<H::Node>>,
    /// Next fiber of `wip` to process.
    next_unit: Option<FiberId>,
    /// Fibers of `current` to remove at commit.
    deletions: Vec<FiberId>,
    /// Raised by state setters.
    request: RenderRequest,
    commits: u64,
    last_commit: CommitStats,
}

impl<H: HostBackend> Reconciler<H> {
    /// Create a reconciler with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, ReconcilerConfig::default())
    }

    /// Create a reconciler with an explicit configuration.
    pub fn with_config(host: H, config: ReconcilerConfig) -> Self {
        Self {
            host,
            config,
            current: None,
            wip: None,
            next_unit: None,
            deletions: Vec::new(),
            request: RenderRequest::new(),
            commits: 0,
            last_commit: CommitStats::default(),
        }
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Request a render of `element` into `container`.
    ///
    /// Installs a new root whose alternate is the committed root, clears the
    /// deletions queue and points the work loop at the new root. A cycle
    /// already in flight is abandoned, as is any pending state-update request.
    pub fn render(&mut self, element: Element, container: H::Node) {
        let mut props = Props::new();
        props.set_children(vec![element]);

        let alternate = self.current.as_ref().map(|_| FiberId::ROOT);
        self.install_root(Fiber::root(container, Rc::new(props), alternate));
        self.request.take();

        debug!(has_baseline = alternate.is_some(), "render requested");
    }

    /// Run one slice of work.
    ///
    /// Processes fibers while the deadline leaves more than the configured
    /// yield threshold. At least one fiber is processed per call so progress
    /// is guaranteed under a starved budget. When the last fiber is done the
    /// generation is committed in the same call.
    ///
    /// Each state update restarts the cycle. Past the configured restart limit
    /// the slice yields with work pending, so a component that sets state on
    /// every render cannot pin a single call, even with an [`Unbounded`]
    /// deadline. Such a component never settles; it only stops hogging slices.
    ///
    /// A host failure abandons the cycle in flight and is returned. The
    /// committed baseline keeps only what the host still holds: removals that
    /// went through are dropped from it, placements and patches are reverted.
    ///
    /// [`Unbounded`]: super::Unbounded
    pub fn run_slice<D: Deadline + ?Sized>(
        &mut self,
        deadline: &D,
    ) -> Result<WorkStatus, ReconcileError<H::Error>> {
        let mut restarts = usize::from(self.poll_request());

        let mut processed = 0usize;
        while let Some(unit) = self.next_unit {
            if processed > 0 && deadline.time_remaining() < self.config.yield_threshold {
                trace!(processed, "yielding");
                break;
            }
            if restarts > self.config.restart_limit {
                warn!(restarts, "state updated on every render, yielding");
                break;
            }

            match self.perform_unit_of_work(unit) {
                Ok(next) => self.next_unit = next,
                Err(err) => {
                    self.abandon();
                    return Err(err);
                }
            }
            processed += 1;

            restarts += usize::from(self.poll_request());
        }

        if self.next_unit.is_none() && self.wip.is_some() {
            if let Err(err) = self.commit() {
                self.abandon();
                return Err(err);
            }
            self.poll_request();
        }

        Ok(self.status())
    }

    /// Drive slices back to back until idle. Returns the number of slices run.
    ///
    /// Does not return while some component keeps updating its state on
    /// every render.
    pub fn run_until_idle(&mut self) -> Result<usize, ReconcileError<H::Error>> {
        let mut slices = 0;
        loop {
            let deadline = SliceDeadline::new(self.config.slice_budget);
            slices += 1;
            if self.run_slice(&deadline)? == WorkStatus::Idle {
                return Ok(slices);
            }
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Current scheduler state.
    pub fn status(&self) -> WorkStatus {
        let restart_pending = self.current.is_some() && self.request.is_raised();
        if self.next_unit.is_some() || self.wip.is_some() || restart_pending {
            WorkStatus::Working
        } else {
            WorkStatus::Idle
        }
    }

    /// The host backend.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host backend, mutably. Useful for dispatching host events.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The committed generation, if any commit happened.
    pub fn current(&self) -> Option<&Tree<H::Node>> {
        self.current.as_ref()
    }

    /// Container of the committed root.
    pub fn committed_root_node(&self) -> Option<&H::Node> {
        self.current.as_ref().and_then(|tree| tree.root().node.as_ref())
    }

    /// Number of commits so far.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// What the most recent commit did.
    pub fn last_commit(&self) -> CommitStats {
        self.last_commit
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn install_root(&mut self, root: Fiber<H::Node>) {
        self.wip = Some(Tree::new(root));
        self.deletions.clear();
        self.next_unit = Some(FiberId::ROOT);
    }

    /// Restart from the committed root if a setter asked for it.
    ///
    /// Before the first commit there is no root to restart from; the request
    /// stays raised until one exists.
    fn poll_request(&mut self) -> bool {
        let Some(current) = self.current.as_ref() else { return false };
        if !self.request.take() {
            return false;
        }
        let root = current.root();
        let Some(container) = root.node.clone() else { return false };
        let props = root.props.clone();

        self.install_root(Fiber::root(container, props, Some(FiberId::ROOT)));
        debug!("state update: restarting from committed root");
        true
    }

    fn abandon(&mut self) {
        self.wip = None;
        self.next_unit = None;
        self.deletions.clear();
    }

    /// Process one fiber and return the next one in pre-order.
    fn perform_unit_of_work(
        &mut self,
        unit: FiberId,
    ) -> Result<Option<FiberId>, ReconcileError<H::Error>> {
        let Self {
            host,
            current,
            wip,
            deletions,
            request,
            ..
        } = self;
        let Some(wip) = wip.as_mut() else { return Ok(None) };

        match wip[unit].ty.clone() {
            Some(ElementType::Component(component)) => {
                let props = wip[unit].props.clone();
                let previous = wip[unit]
                    .alternate
                    .zip(current.as_ref())
                    .and_then(|(alternate, tree)| tree.get(alternate))
                    .map(|old| old.hooks.clone())
                    .unwrap_or_default();

                let (element, hooks) =
                    render_with_hooks(previous, request.clone(), || component.render(&props));
                wip[unit].hooks = hooks;

                reconcile_children(wip, current.as_mut(), unit, std::slice::from_ref(&element), deletions);
            }
            ty => {
                let props = wip[unit].props.clone();
                if wip[unit].node.is_none() {
                    if let Some(ty) = ty {
                        wip[unit].node = Some(create_host_node(host, &ty, &props)?);
                    }
                }
                reconcile_children(wip, current.as_mut(), unit, props.children(), deletions);
            }
        }

        trace!(fiber = unit.0, "performed unit of work");
        Ok(wip.next_in_preorder(unit))
    }

    fn commit(&mut self) -> Result<(), ReconcileError<H::Error>> {
        let Some(wip) = self.wip.as_ref() else { return Ok(()) };

        let stats = commit_root(&mut self.host, wip, self.current.as_mut(), &self.deletions)?;

        self.current = self.wip.take();
        self.deletions.clear();
        self.commits += 1;
        self.last_commit = stats;

        debug!(
            commit = self.commits,
            removed = stats.removed,
            placed = stats.placed,
            patched = stats.patched,
            "committed"
        );
        Ok(())
    }
}

/// Create a detached host node for a primitive or text fiber and apply its
/// initial props.
fn create_host_node<H: HostBackend>(
    host: &mut H,
    ty: &ElementType,
    props: &Props,
) -> Result<H::Node, ReconcileError<H::Error>> {
    let kind = match ty {
        ElementType::Primitive(tag) => HostKind::Tag(&**tag),
        ElementType::Text => HostKind::Text,
        ElementType::Component(_) => unreachable!("components own no host node"),
    };

    let node = host
        .create_node(kind)
        .map_err(|e| ReconcileError::new(HostCall::CreateNode, e))?;

    let patch = diff_props(&Props::new(), props);
    if !patch.is_empty() {
        host.apply_patch(&node, &patch)
            .map_err(|e| ReconcileError::new(HostCall::ApplyPatch, e))?;
    }

    Ok(node)
}

// =============================================================================
// Tests
// =============================================================================
