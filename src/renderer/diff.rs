//! Property diffing between two fiber generations.
//!
//! The reconciler never pushes whole prop maps to the host. It compares the
//! previous props (from the alternate) with the next props and emits a
//! [`PropPatch`] holding only what changed.
//!
//! # Algorithm
//!
//! 1. Split both prop maps into attributes, the `style` sub-mapping and event
//!    listeners (`on*` names holding a [`Listener`])
//! 2. Attributes: names gone from next are removed, names new in next are
//!    added, names in both with unequal values are changed
//! 3. Style: the same three sets, key by key
//! 4. Listeners: a listener that is gone or changed is removed, a listener that
//!    is new or changed is added (so a changed listener is removed then re-added)

use crate::types::{event_name, is_event_prop, Listener, PropValue, Props, Style, STYLE};

/// Changes to the style sub-mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StylePatch {
    pub removed: Vec<String>,
    pub changed: Vec<(String, String)>,
    pub added: Vec<(String, String)>,
}

impl StylePatch {
    /// Check if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.changed.is_empty() && self.added.is_empty()
    }
}

/// Changes to apply to a single host node.
///
/// Listener entries carry the host event name (`click`), not the prop name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropPatch {
    pub removed: Vec<String>,
    pub changed: Vec<(String, PropValue)>,
    pub added: Vec<(String, PropValue)>,
    pub style: StylePatch,
    pub listeners_removed: Vec<(String, Listener)>,
    pub listeners_added: Vec<(String, Listener)>,
}

impl PropPatch {
    /// Check if the patch does nothing.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
            && self.changed.is_empty()
            && self.added.is_empty()
            && self.style.is_empty()
            && self.listeners_removed.is_empty()
            && self.listeners_added.is_empty()
    }
}

// =============================================================================
// Classification
// =============================================================================

enum PropKind<'a> {
    Attr(&'a PropValue),
    Style,
    Listener(&'a Listener),
}

#[inline]
fn classify<'a>(name: &str, value: &'a PropValue) -> PropKind<'a> {
    match value {
        PropValue::Style(_) if name == STYLE => PropKind::Style,
        PropValue::Listener(listener) if is_event_prop(name) => PropKind::Listener(listener),
        _ => PropKind::Attr(value),
    }
}

fn attr<'a>(props: &'a Props, name: &str) -> Option<&'a PropValue> {
    props.get(name).and_then(|value| match classify(name, value) {
        PropKind::Attr(value) => Some(value),
        _ => None,
    })
}

fn listener<'a>(props: &'a Props, name: &str) -> Option<&'a Listener> {
    props.get(name).and_then(|value| match classify(name, value) {
        PropKind::Listener(listener) => Some(listener),
        _ => None,
    })
}

// =============================================================================
// Diff
// =============================================================================

/// Compute the patch that turns `prev` into `next` on a host node.
///
/// Diffing against empty props yields the initial patch for a new node.
pub fn diff_props(prev: &Props, next: &Props) -> PropPatch {
    let mut patch = PropPatch::default();

    for (name, value) in prev.iter() {
        match classify(name, value) {
            PropKind::Attr(_) => {
                if attr(next, name).is_none() {
                    patch.removed.push(name.to_string());
                }
            }
            PropKind::Listener(old) => {
                if listener(next, name) != Some(old) {
                    patch.listeners_removed.push((event_name(name), old.clone()));
                }
            }
            PropKind::Style => {}
        }
    }

    for (name, value) in next.iter() {
        match classify(name, value) {
            PropKind::Attr(value) => match attr(prev, name) {
                None => patch.added.push((name.to_string(), value.clone())),
                Some(old) if old != value => patch.changed.push((name.to_string(), value.clone())),
                Some(_) => {}
            },
            PropKind::Listener(new) => {
                if listener(prev, name) != Some(new) {
                    patch.listeners_added.push((event_name(name), new.clone()));
                }
            }
            PropKind::Style => {}
        }
    }

    let empty = Style::new();
    patch.style = diff_style(prev.style().unwrap_or(&empty), next.style().unwrap_or(&empty));

    patch
}

/// Key-by-key diff of two style mappings.
pub fn diff_style(prev: &Style, next: &Style) -> StylePatch {
    let mut patch = StylePatch::default();

    for key in prev.keys() {
        if !next.contains_key(key) {
            patch.removed.push(key.clone());
        }
    }

    for (key, value) in next {
        match prev.get(key) {
            None => patch.added.push((key.clone(), value.clone())),
            Some(old) if old != value => patch.changed.push((key.clone(), value.clone())),
            Some(_) => {}
        }
    }

    patch
}

// =============================================================================
// Tests
// =============================================================================
