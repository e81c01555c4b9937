//! State Hooks - Component-local state that survives re-renders.
//!
//! Each component fiber owns an ordered list of hook records. On the next
//! render the record at the same call index on the alternate is the starting
//! point: its state is taken and its queued updates are replayed in order.
//!
//! # API
//!
//! - `use_state(initial)` - Read state and get a setter (component render only)
//! - `StateSetter::set(value)` - Queue a replacement and request a render
//! - `StateSetter::update(f)` - Queue a function of the previous state
//!
//! # Example
//!
//! ```ignore
//! use spark_fiber::{use_state, Element, Props};
//!
//! fn counter(_: &Props) -> Element {
//!     let (count, set_count) = use_state(0i64);
//!     Element::host("button")
//!         .on("onClick", move |_| set_count.update(|c| c + 1))
//!         .child(format!("count: {count}"))
//! }
//! ```
//!
//! Hook call order must be the same on every render of a component. The
//! engine does not check it beyond failing on a type mismatch.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::mem;
use std::rc::Rc;

use tracing::trace;

// =============================================================================
// TYPES
// =============================================================================

type ApplyFn = Rc<dyn Fn(&dyn Any) -> Rc<dyn Any>>;

/// A queued state update.
#[derive(Clone)]
enum Update {
    /// Replace the state unconditionally.
    Replace(Rc<dyn Any>),
    /// Compute the next state from the previous one.
    Apply(ApplyFn),
}

impl Update {
    fn apply(&self, state: &Rc<dyn Any>) -> Rc<dyn Any> {
        match self {
            Update::Replace(value) => value.clone(),
            Update::Apply(f) => f(state.as_ref()),
        }
    }
}

type UpdateQueue = Rc<RefCell<Vec<Update>>>;

/// One `use_state` slot on a component fiber.
///
/// The queue is shared with the setters handed out by the render that created
/// the record, so updates land on the record that becomes the next render's
/// alternate.
#[derive(Clone)]
pub struct HookRecord {
    state: Rc<dyn Any>,
    queue: UpdateQueue,
}

impl HookRecord {
    fn new(state: Rc<dyn Any>) -> Self {
        Self {
            state,
            queue: Rc::default(),
        }
    }

    /// Current state, if it has type `T`.
    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }

    /// Number of queued updates not yet replayed.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// State after replaying every queued update, in FIFO order.
    fn resolve(&self) -> Rc<dyn Any> {
        self.queue
            .borrow()
            .iter()
            .fold(self.state.clone(), |state, update| update.apply(&state))
    }
}

/// Shared flag a setter raises to ask for a new cycle.
///
/// The scheduler consumes it between units of work.
#[derive(Clone, Default)]
pub struct RenderRequest(Rc<Cell<bool>>);

impl RenderRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a new cycle.
    pub fn raise(&self) {
        self.0.set(true);
    }

    /// Check if a cycle was requested.
    pub fn is_raised(&self) -> bool {
        self.0.get()
    }

    /// Consume the request.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

// =============================================================================
// SETTER
// =============================================================================

/// Setter returned by [`use_state`].
///
/// Every call queues the update and requests a new render, even when the
/// resulting state would be unchanged.
pub struct StateSetter<T> {
    queue: UpdateQueue,
    request: RenderRequest,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            request: self.request.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: 'static> StateSetter<T> {
    /// Queue a replacement value.
    pub fn set(&self, value: T) {
        self.push(Update::Replace(Rc::new(value)));
    }

    /// Queue a function from the previous state to the next.
    pub fn update(&self, f: impl Fn(&T) -> T + 'static) {
        let apply = move |state: &dyn Any| -> Rc<dyn Any> {
            let state = state
                .downcast_ref::<T>()
                .unwrap_or_else(|| panic!("state update applied to a hook of another type"));
            Rc::new(f(state))
        };
        self.push(Update::Apply(Rc::new(apply)));
    }

    fn push(&self, update: Update) {
        let pending = {
            let mut queue = self.queue.borrow_mut();
            queue.push(update);
            queue.len()
        };
        trace!(pending, "state update queued");
        self.request.raise();
    }
}

// =============================================================================
// HOOK CONTEXT
// =============================================================================

struct HookContext {
    /// Records of the alternate, looked up by call index.
    previous: Vec<HookRecord>,
    /// Records produced by this render.
    hooks: Vec<HookRecord>,
    index: usize,
    request: RenderRequest,
}

thread_local! {
    /// Stack of components currently rendering. Only the top is addressable.
    static HOOK_CONTEXT: RefCell<Vec<HookContext>> = const { RefCell::new(Vec::new()) };
}

/// Pops the installed context even if the render panics.
struct Installed;

impl Drop for Installed {
    fn drop(&mut self) {
        HOOK_CONTEXT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Run a component render with a hook context installed.
///
/// Returns the render output and the hook records it produced.
pub(crate) fn render_with_hooks<R>(
    previous: Vec<HookRecord>,
    request: RenderRequest,
    render: impl FnOnce() -> R,
) -> (R, Vec<HookRecord>) {
    HOOK_CONTEXT.with(|stack| {
        stack.borrow_mut().push(HookContext {
            previous,
            hooks: Vec::new(),
            index: 0,
            request,
        });
    });
    let guard = Installed;

    let output = render();

    let hooks = HOOK_CONTEXT.with(|stack| {
        stack
            .borrow_mut()
            .last_mut()
            .map(|cx| mem::take(&mut cx.hooks))
            .unwrap_or_default()
    });
    drop(guard);

    (output, hooks)
}

/// Check if a component render is in progress on this thread.
pub fn in_component_render() -> bool {
    HOOK_CONTEXT.with(|stack| !stack.borrow().is_empty())
}

/// Declare a piece of component state.
///
/// On first render the state is `initial`. Later renders start from the state
/// recorded at the same call index last commit and replay every update queued
/// on it since.
///
/// # Panics
///
/// If called outside a component render, or if the hook at this call index
/// held a different type last render.
pub fn use_state<T: Clone + 'static>(initial: T) -> (T, StateSetter<T>) {
    let (index, previous, request) = HOOK_CONTEXT.with(|stack| {
        let stack = stack.borrow();
        let cx = stack
            .last()
            .unwrap_or_else(|| panic!("use_state called outside of a component render"));
        (cx.index, cx.previous.get(cx.index).cloned(), cx.request.clone())
    });

    let state = match previous {
        Some(previous) => previous.resolve(),
        None => Rc::new(initial) as Rc<dyn Any>,
    };
    let value = state
        .downcast_ref::<T>()
        .cloned()
        .unwrap_or_else(|| panic!("hook {index} changed type between renders"));

    let record = HookRecord::new(state);
    let setter = StateSetter {
        queue: record.queue.clone(),
        request,
        _marker: PhantomData,
    };

    HOOK_CONTEXT.with(|stack| {
        if let Some(cx) = stack.borrow_mut().last_mut() {
            cx.hooks.push(record);
            cx.index += 1;
        }
    });

    (value, setter)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn two_hooks() -> ((i64, StateSetter<i64>), (String, StateSetter<String>)) {
        (use_state(0i64), use_state("a".to_string()))
    }

    #[test]
    fn test_initial_state() {
        let request = RenderRequest::new();
        let (((count, _), (label, _)), hooks) =
            render_with_hooks(Vec::new(), request.clone(), two_hooks);

        assert_eq!(count, 0);
        assert_eq!(label, "a");
        assert_eq!(hooks.len(), 2);
        assert!(!request.is_raised());
        assert!(!in_component_render());
    }

    #[test]
    fn test_function_and_literal_updates() {
        let request = RenderRequest::new();
        let (((_, set_count), (_, set_label)), hooks) =
            render_with_hooks(Vec::new(), request.clone(), two_hooks);

        set_count.update(|c| c + 1);
        set_label.set("a".to_string());
        assert!(request.take());
        assert_eq!(hooks[0].pending(), 1);

        let (((count, _), (label, _)), next) = render_with_hooks(hooks, request.clone(), two_hooks);
        assert_eq!(count, 1);
        assert_eq!(label, "a");
        assert_eq!(next[0].state::<i64>(), Some(&1));
        assert_eq!(next[0].pending(), 0);
    }

    #[test]
    fn test_updates_replay_in_order() {
        let request = RenderRequest::new();
        let ((_, set), hooks) = render_with_hooks(Vec::new(), request.clone(), || use_state(0i64));

        set.update(|x| x + 1);
        set.update(|x| x * 10);
        set.update(|x| x - 3);

        let ((value, _), _) = render_with_hooks(hooks, request, || use_state(0i64));
        assert_eq!(value, 7);
    }

    #[test]
    fn test_replay_does_not_consume_alternate() {
        let request = RenderRequest::new();
        let ((_, set), hooks) = render_with_hooks(Vec::new(), request.clone(), || use_state(1i64));
        set.update(|x| x + 1);

        // An abandoned render replays the same queue again from scratch
        let ((first, _), _) = render_with_hooks(hooks.clone(), request.clone(), || use_state(1i64));
        let ((second, _), _) = render_with_hooks(hooks, request, || use_state(1i64));
        assert_eq!(first, 2);
        assert_eq!(second, 2);
    }

    #[test]
    #[should_panic(expected = "outside of a component render")]
    fn test_use_state_outside_render_panics() {
        let _ = use_state(0);
    }

    #[test]
    #[should_panic(expected = "changed type")]
    fn test_hook_type_change_panics() {
        let request = RenderRequest::new();
        let (_, hooks) = render_with_hooks(Vec::new(), request.clone(), || use_state(0i64));
        let _ = render_with_hooks(hooks, request, || use_state("oops"));
    }
}
