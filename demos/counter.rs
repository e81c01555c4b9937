//! Counter Example - State updates driven from idle time
//!
//! This example demonstrates:
//! - A function component with `use_state`
//! - Listener dispatch through the in-memory host
//! - Time-sliced reconciliation between terminal polls
//!
//! Keys: `space` or `+` clicks the button, `r` resets, `q` or Ctrl+C quits.
//!
//! Run with: cargo run --example counter

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;

use spark_fiber::{
    use_state, Element, Event, MemoryHost, Props, Reconciler, SliceDeadline, WorkStatus,
};

fn counter(props: &Props) -> Element {
    let (count, set_count) = use_state(0i64);
    let step = props.get_int("step").unwrap_or(1);

    let (label, color) = if count % 2 == 0 { ("even", "green") } else { ("odd", "red") };
    let reset = set_count.clone();

    Element::host("section")
        .child(
            Element::host("button")
                .prop("id", "increment")
                .on("onClick", move |_| set_count.update(move |c| c + step))
                .child(format!("count: {count}")),
        )
        .child(
            Element::host("button")
                .prop("id", "reset")
                .on("onReset", move |_| reset.set(0))
                .child("reset"),
        )
        .child(Element::host("span").style("color", color).child(label))
}

fn app() -> Element {
    Element::host("main").child(Element::component(counter).prop("step", 1i64))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut host = MemoryHost::new();
    let container = host.create_container();
    let mut reconciler = Reconciler::new(host);
    reconciler.render(app(), container);

    terminal::enable_raw_mode()?;
    let result = run(&mut reconciler, container);
    terminal::disable_raw_mode()?;
    result
}

fn run(
    reconciler: &mut Reconciler<MemoryHost>,
    container: spark_fiber::NodeId,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout();
    let mut seen = 0;

    loop {
        // Idle: no input within the frame, so spend it on reconciliation.
        if !event::poll(Duration::from_millis(16))? {
            let slice = SliceDeadline::new(reconciler.config().slice_budget);
            if reconciler.run_slice(&slice)? == WorkStatus::Idle && reconciler.commit_count() != seen {
                seen = reconciler.commit_count();
                write!(stdout, "[{seen}] {}\r\n", reconciler.host().markup(container))?;
                stdout.flush()?;
            }
            continue;
        }

        let TermEvent::Key(KeyEvent { code, modifiers, .. }) = event::read()? else {
            continue;
        };
        let event = match code {
            KeyCode::Char('q') => break,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break,
            KeyCode::Char(' ') | KeyCode::Char('+') => Event::new("click"),
            KeyCode::Char('r') => Event::new("reset"),
            _ => continue,
        };

        let host = reconciler.host();
        if let Some(target) = host.find_listener(container, &event.name) {
            host.dispatch(target, &event);
        }
    }

    Ok(())
}
