//! End-to-end reconciliation against the in-memory host.
//!
//! Every test drives the public API only: build elements, `render`, run
//! slices, then inspect the host tree and its operation log.
//!
//! Run with: cargo test --test reconciler

use std::cell::{Cell, RefCell};
use std::time::Duration;

use pretty_assertions::assert_eq;
use spark_fiber::{
    diff_props, use_state, Element, HostOp, MemoryHost, NodeId, PropValue, Props, Reconciler,
    StateSetter, Unbounded, WorkStatus,
};

// =============================================================================
// HELPERS
// =============================================================================

fn setup() -> (Reconciler<MemoryHost>, NodeId) {
    let mut host = MemoryHost::new();
    let container = host.create_container();
    (Reconciler::new(host), container)
}

/// Render and run the cycle to completion, then drop the op log.
fn settle(reconciler: &mut Reconciler<MemoryHost>, element: Element, container: NodeId) {
    reconciler.render(element, container);
    assert_eq!(reconciler.run_slice(&Unbounded).unwrap(), WorkStatus::Idle);
    reconciler.host_mut().take_ops();
}

/// A deadline that reports `slices` generous slices, then runs dry.
struct Scripted {
    remaining: Cell<u32>,
}

impl Scripted {
    fn new(units: u32) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }
}

impl spark_fiber::Deadline for Scripted {
    fn time_remaining(&self) -> Duration {
        let left = self.remaining.get();
        self.remaining.set(left.saturating_sub(1));
        if left > 0 {
            Duration::from_millis(50)
        } else {
            Duration::ZERO
        }
    }
}

fn starved() -> Duration {
    Duration::ZERO
}

fn list(items: &[&str]) -> Element {
    Element::host("ul").children(items.iter().map(|id| Element::host("li").prop("id", *id)))
}

// =============================================================================
// RECONCILIATION
// =============================================================================

#[test]
fn test_unchanged_types_reuse_host_nodes() {
    let (mut reconciler, container) = setup();
    settle(
        &mut reconciler,
        Element::host("div").prop("id", "a").child(Element::host("span")),
        container,
    );
    let div = reconciler.host().children(container)[0];
    let span = reconciler.host().children(div)[0];

    reconciler.render(
        Element::host("div").prop("id", "b").child(Element::host("span")),
        container,
    );
    reconciler.run_slice(&Unbounded).unwrap();

    assert_eq!(reconciler.host().children(container), &[div]);
    assert_eq!(reconciler.host().children(div), &[span]);
    assert_eq!(reconciler.host().ops(), &[HostOp::Patch(div)]);
    assert_eq!(reconciler.host().markup(container), "<div id=\"b\"><span></span></div>");
}

#[test]
fn test_type_change_replaces_with_deletion_first() {
    let (mut reconciler, container) = setup();
    settle(
        &mut reconciler,
        Element::host("div").child(Element::host("span")).child(Element::host("em")),
        container,
    );
    let div = reconciler.host().children(container)[0];
    let em = reconciler.host().children(div)[1];

    reconciler.render(
        Element::host("div").child(Element::host("span")).child(Element::host("p")),
        container,
    );
    reconciler.run_slice(&Unbounded).unwrap();

    let p = reconciler.host().children(div)[1];
    assert_eq!(
        reconciler.host().ops(),
        &[
            HostOp::Create(p),
            HostOp::Remove { parent: div, child: em },
            HostOp::Append { parent: div, child: p },
        ]
    );
    assert_eq!(reconciler.host().tag(p), Some("p"));
}

#[test]
fn test_shorter_children_remove_tail() {
    let (mut reconciler, container) = setup();
    settle(&mut reconciler, list(&["1", "2", "3"]), container);

    reconciler.render(list(&["1"]), container);
    reconciler.run_slice(&Unbounded).unwrap();

    assert_eq!(reconciler.host().markup(container), "<ul><li id=\"1\"></li></ul>");
    assert_eq!(reconciler.last_commit().removed, 2);
}

#[test]
fn test_longer_children_append_tail() {
    let (mut reconciler, container) = setup();
    settle(&mut reconciler, list(&["1"]), container);

    reconciler.render(list(&["1", "2", "3"]), container);
    reconciler.run_slice(&Unbounded).unwrap();

    assert_eq!(
        reconciler.host().markup(container),
        "<ul><li id=\"1\"></li><li id=\"2\"></li><li id=\"3\"></li></ul>"
    );
    assert_eq!(reconciler.last_commit().placed, 2);
}

#[test]
fn test_style_and_attribute_diff() {
    let before = Element::host("div").prop("id", "a").style("color", "red");
    let after = Element::host("div")
        .prop("id", "b")
        .style("color", "blue")
        .style("fontSize", "12px");

    let patch = diff_props(&before.props, &after.props);
    assert!(patch.removed.is_empty());
    assert!(patch.added.is_empty());
    assert_eq!(patch.changed, vec![("id".to_string(), PropValue::from("b"))]);
    assert!(patch.style.removed.is_empty());
    assert_eq!(patch.style.changed, vec![("color".to_string(), "blue".to_string())]);
    assert_eq!(patch.style.added, vec![("fontSize".to_string(), "12px".to_string())]);

    let (mut reconciler, container) = setup();
    settle(&mut reconciler, before, container);
    reconciler.render(after, container);
    reconciler.run_slice(&Unbounded).unwrap();

    assert_eq!(
        reconciler.host().markup(container),
        "<div id=\"b\" style=\"color: blue; fontSize: 12px\"></div>"
    );
}

#[test]
fn test_removed_style_key_is_cleared() {
    let (mut reconciler, container) = setup();
    settle(
        &mut reconciler,
        Element::host("div").style("color", "red").style("margin", "1"),
        container,
    );

    reconciler.render(Element::host("div").style("margin", "1"), container);
    reconciler.run_slice(&Unbounded).unwrap();

    let div = reconciler.host().children(container)[0];
    assert_eq!(reconciler.host().style(div, "color"), None);
    assert_eq!(reconciler.host().style(div, "margin"), Some("1"));
}

#[test]
fn test_changed_listener_is_replaced() {
    let hits = std::rc::Rc::new(Cell::new((0, 0)));
    let (mut reconciler, container) = setup();

    let first = hits.clone();
    settle(
        &mut reconciler,
        Element::host("button").on("onClick", move |_| first.set((first.get().0 + 1, first.get().1))),
        container,
    );
    let second = hits.clone();
    reconciler.render(
        Element::host("button").on("onClick", move |_| second.set((second.get().0, second.get().1 + 1))),
        container,
    );
    reconciler.run_slice(&Unbounded).unwrap();

    let button = reconciler.host().children(container)[0];
    assert!(reconciler.host().dispatch(button, &spark_fiber::Event::new("click")));
    assert_eq!(hits.get(), (0, 1));
}

// =============================================================================
// COMPONENTS
// =============================================================================

fn greeting(props: &Props) -> Element {
    let name = props.get_str("name").unwrap_or("nobody").to_string();
    Element::host("h1").child(format!("hello {name}"))
}

fn farewell(_: &Props) -> Element {
    Element::host("h2").child("bye")
}

#[test]
fn test_component_props_and_replacement() {
    let (mut reconciler, container) = setup();
    settle(
        &mut reconciler,
        Element::host("main").child(Element::component(greeting).prop("name", "ada")),
        container,
    );
    assert_eq!(reconciler.host().markup(container), "<main><h1>hello ada</h1></main>");

    reconciler.render(
        Element::host("main").child(Element::component(farewell)),
        container,
    );
    reconciler.run_slice(&Unbounded).unwrap();

    assert_eq!(reconciler.host().markup(container), "<main><h2>bye</h2></main>");
    assert_eq!(reconciler.last_commit().removed, 1);
}

// =============================================================================
// STATE HOOKS
// =============================================================================

thread_local! {
    static PAIR: RefCell<Option<(StateSetter<i64>, StateSetter<String>)>> = const { RefCell::new(None) };
    static RENDERS: Cell<u32> = const { Cell::new(0) };
}

fn pair(_: &Props) -> Element {
    RENDERS.with(|r| r.set(r.get() + 1));
    let (count, set_count) = use_state(0i64);
    let (label, set_label) = use_state("a".to_string());
    PAIR.with(|p| *p.borrow_mut() = Some((set_count, set_label)));
    Element::host("p").child(format!("{count}:{label}"))
}

fn with_pair(f: impl FnOnce(&StateSetter<i64>, &StateSetter<String>)) {
    PAIR.with(|p| {
        let setters = p.borrow();
        let (count, label) = setters.as_ref().expect("pair rendered");
        f(count, label);
    });
}

#[test]
fn test_hook_state_persists_across_generations() {
    let (mut reconciler, container) = setup();
    settle(&mut reconciler, Element::component(pair), container);
    assert_eq!(reconciler.host().markup(container), "<p>0:a</p>");

    with_pair(|count, label| {
        count.update(|x| x + 1);
        label.set("a".to_string());
    });
    reconciler.run_until_idle().unwrap();

    assert_eq!(reconciler.host().markup(container), "<p>1:a</p>");

    let tree = reconciler.current().expect("committed");
    let component = tree.root().child.expect("component fiber");
    let hooks = &tree[component].hooks;
    assert_eq!(hooks[0].state::<i64>(), Some(&1));
    assert_eq!(hooks[1].state::<String>().map(String::as_str), Some("a"));
}

#[test]
fn test_queued_updates_replay_in_call_order() {
    let (mut reconciler, container) = setup();
    settle(&mut reconciler, Element::component(pair), container);

    with_pair(|count, _| {
        count.set(5);
        count.update(|x| x * 2);
        count.update(|x| x + 1);
    });
    reconciler.run_until_idle().unwrap();

    assert_eq!(reconciler.host().markup(container), "<p>11:a</p>");
    assert_eq!(reconciler.commit_count(), 2);
}

#[test]
fn test_update_mid_cycle_restarts_from_committed_root() {
    let (mut reconciler, container) = setup();
    settle(&mut reconciler, Element::component(pair), container);

    with_pair(|count, _| count.update(|x| x + 1));
    // root only
    assert_eq!(reconciler.run_slice(&starved).unwrap(), WorkStatus::Working);

    with_pair(|count, _| count.update(|x| x + 10));
    let renders_before = RENDERS.with(Cell::get);
    reconciler.run_until_idle().unwrap();

    assert_eq!(reconciler.host().markup(container), "<p>11:a</p>");
    assert_eq!(reconciler.commit_count(), 2);
    assert_eq!(RENDERS.with(Cell::get), renders_before + 1);
}

thread_local! {
    static EAGER: Cell<bool> = const { Cell::new(false) };
}

fn eager(_: &Props) -> Element {
    let (count, set_count) = use_state(0i64);
    if count == 0 && !EAGER.with(Cell::get) {
        EAGER.with(|e| e.set(true));
        set_count.set(7);
    }
    Element::host("b").child(count)
}

#[test]
fn test_update_before_first_commit_is_deferred() {
    let (mut reconciler, container) = setup();
    reconciler.render(Element::component(eager), container);

    assert_eq!(reconciler.run_slice(&Unbounded).unwrap(), WorkStatus::Working);
    assert_eq!(reconciler.commit_count(), 1);
    assert_eq!(reconciler.host().markup(container), "<b>0</b>");

    reconciler.run_until_idle().unwrap();
    assert_eq!(reconciler.host().markup(container), "<b>7</b>");
    assert_eq!(reconciler.commit_count(), 2);
}

#[test]
#[should_panic(expected = "use_state called outside of a component render")]
fn test_use_state_outside_render_panics() {
    let _ = use_state(0i64);
}

// =============================================================================
// SCHEDULING
// =============================================================================

#[test]
fn test_host_untouched_until_work_is_exhausted() {
    let (mut reconciler, container) = setup();
    settle(&mut reconciler, list(&["1", "2"]), container);
    let committed = reconciler.host().markup(container);

    reconciler.render(list(&["x", "2", "3", "4"]), container);

    let mut slices = 0;
    loop {
        slices += 1;
        let status = reconciler.run_slice(&Scripted::new(1)).unwrap();
        if status == WorkStatus::Idle {
            break;
        }
        assert_eq!(reconciler.host().markup(container), committed);
        let mutated = reconciler.host().ops().iter().any(|op| {
            matches!(op, HostOp::Append { .. } | HostOp::Remove { .. })
        });
        assert!(!mutated, "host tree mutated before commit");
    }

    assert!(slices > 1);
    assert_eq!(
        reconciler.host().markup(container),
        "<ul><li id=\"x\"></li><li id=\"2\"></li><li id=\"3\"></li><li id=\"4\"></li></ul>"
    );
}

#[test]
fn test_slice_resumes_where_it_yielded() {
    let (mut reconciler, container) = setup();
    // root, ul, 3 x li
    reconciler.render(list(&["1", "2", "3"]), container);

    assert_eq!(reconciler.run_slice(&Scripted::new(2)).unwrap(), WorkStatus::Working);
    assert_eq!(reconciler.run_slice(&Scripted::new(0)).unwrap(), WorkStatus::Working);
    assert_eq!(reconciler.run_slice(&Scripted::new(5)).unwrap(), WorkStatus::Idle);
    assert_eq!(reconciler.commit_count(), 1);
    assert_eq!(reconciler.host().children(reconciler.host().children(container)[0]).len(), 3);
}

#[test]
fn test_new_render_abandons_cycle_in_flight() {
    let (mut reconciler, container) = setup();
    reconciler.render(list(&["1", "2", "3"]), container);
    reconciler.run_slice(&starved).unwrap();

    reconciler.render(Element::host("p"), container);
    reconciler.run_until_idle().unwrap();

    assert_eq!(reconciler.host().markup(container), "<p></p>");
    assert_eq!(reconciler.commit_count(), 1);
}

#[test]
fn test_new_render_drops_queued_deletions() {
    let (mut reconciler, container) = setup();
    let tags = |tags: &[&str]| Element::host("ul").children(tags.iter().map(|tag| Element::host(tag)));
    settle(&mut reconciler, tags(&["a", "b"]), container);

    // root, then ul: reconciling ul queues `b` for removal
    reconciler.render(tags(&["a"]), container);
    reconciler.run_slice(&starved).unwrap();
    assert_eq!(reconciler.run_slice(&starved).unwrap(), WorkStatus::Working);

    reconciler.render(tags(&["a", "b"]), container);
    reconciler.run_until_idle().unwrap();

    assert_eq!(reconciler.host().markup(container), "<ul><a></a><b></b></ul>");
    let removed = reconciler
        .host()
        .ops()
        .iter()
        .any(|op| matches!(op, HostOp::Remove { .. }));
    assert!(!removed);
}
