//! In-memory host tree.
//!
//! A small retained node tree implementing [`HostBackend`]. Every primitive
//! operation is recorded in an operation log so tests can assert exactly what
//! the reconciler did and in which order.
//!
//! ```text
//! container (NodeId 0)
//! ├── div#app          attrs / style / listeners
//! │   └── "count: 1"   text node (`value` attribute)
//! └── button
//! ```

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::{HostBackend, HostKind, PropPatch};
use crate::types::{Event, Listener, PropValue, Style, TEXT_VALUE};

/// Handle to a node in a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// One recorded host operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    Create(NodeId),
    Patch(NodeId),
    Append { parent: NodeId, child: NodeId },
    Remove { parent: NodeId, child: NodeId },
}

/// Failures of the in-memory host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryHostError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("node {child:?} already has parent {parent:?}")]
    AlreadyAttached { parent: NodeId, child: NodeId },
}

#[derive(Debug, Clone)]
enum NodeKind {
    Container,
    Tag(String),
    Text,
}

#[derive(Debug, Clone)]
struct HostNode {
    kind: NodeKind,
    attrs: BTreeMap<String, PropValue>,
    style: Style,
    listeners: BTreeMap<String, Listener>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl HostNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: BTreeMap::new(),
            style: Style::new(),
            listeners: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// In-memory [`HostBackend`].
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<HostNode>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container node to render into. Not recorded in the op log.
    pub fn create_container(&mut self) -> NodeId {
        self.nodes.push(HostNode::new(NodeKind::Container));
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> Result<&HostNode, MemoryHostError> {
        self.nodes.get(id.0).ok_or(MemoryHostError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut HostNode, MemoryHostError> {
        self.nodes.get_mut(id.0).ok_or(MemoryHostError::UnknownNode(id))
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Operations recorded so far.
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Take and clear the operation log.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of nodes ever created (containers included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Children of a node, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Tag of a primitive node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Attribute value.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&PropValue> {
        self.nodes.get(id.0)?.attrs.get(name)
    }

    /// Style value.
    pub fn style(&self, id: NodeId, key: &str) -> Option<&str> {
        self.nodes.get(id.0)?.style.get(key).map(String::as_str)
    }

    /// Content of a text node.
    pub fn text(&self, id: NodeId) -> Option<String> {
        let node = self.nodes.get(id.0)?;
        match node.kind {
            NodeKind::Text => Some(node.attrs.get(TEXT_VALUE).map(|v| v.to_string()).unwrap_or_default()),
            _ => None,
        }
    }

    /// Check if a listener is registered for an event.
    pub fn has_listener(&self, id: NodeId, event: &str) -> bool {
        self.nodes
            .get(id.0)
            .is_some_and(|n| n.listeners.contains_key(event))
    }

    /// Deliver an event to the listener registered on a node.
    ///
    /// Returns false if no listener is registered.
    pub fn dispatch(&self, id: NodeId, event: &Event) -> bool {
        let listener = self
            .nodes
            .get(id.0)
            .and_then(|n| n.listeners.get(&event.name))
            .cloned();
        match listener {
            Some(listener) => {
                listener.call(event);
                true
            }
            None => false,
        }
    }

    /// Depth-first search for the first node with a listener for `event`.
    pub fn find_listener(&self, root: NodeId, event: &str) -> Option<NodeId> {
        if self.has_listener(root, event) {
            return Some(root);
        }
        self.children(root)
            .iter()
            .find_map(|&child| self.find_listener(child, event))
    }

    /// Serialize the subtree below `id` (exclusive) as markup.
    ///
    /// Attributes are sorted, listeners are omitted, style is rendered as a
    /// `style` attribute. Text nodes render as their content.
    pub fn markup(&self, id: NodeId) -> String {
        Markup { host: self, id }.to_string()
    }
}

/// Display adapter writing the children of a node as markup.
struct Markup<'a> {
    host: &'a MemoryHost,
    id: NodeId,
}

impl Markup<'_> {
    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        let Some(node) = self.host.nodes.get(id.0) else { return Ok(()) };
        let tag = match &node.kind {
            NodeKind::Text => {
                return match node.attrs.get(TEXT_VALUE) {
                    Some(value) => write!(f, "{value}"),
                    None => Ok(()),
                };
            }
            NodeKind::Tag(tag) => tag.as_str(),
            NodeKind::Container => "root",
        };

        write!(f, "<{tag}")?;
        for (name, value) in &node.attrs {
            write!(f, " {name}=\"{value}\"")?;
        }
        if !node.style.is_empty() {
            write!(f, " style=\"{}\"", PropValue::Style(node.style.clone()))?;
        }
        f.write_str(">")?;
        for &child in &node.children {
            self.write_node(f, child)?;
        }
        write!(f, "</{tag}>")
    }
}

impl fmt::Display for Markup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &child in self.host.children(self.id) {
            self.write_node(f, child)?;
        }
        Ok(())
    }
}

impl HostBackend for MemoryHost {
    type Node = NodeId;
    type Error = MemoryHostError;

    fn create_node(&mut self, kind: HostKind<'_>) -> Result<NodeId, MemoryHostError> {
        let kind = match kind {
            HostKind::Tag(tag) => NodeKind::Tag(tag.to_string()),
            HostKind::Text => NodeKind::Text,
        };
        self.nodes.push(HostNode::new(kind));
        let id = NodeId(self.nodes.len() - 1);
        self.ops.push(HostOp::Create(id));
        Ok(id)
    }

    fn apply_patch(&mut self, node: &NodeId, patch: &PropPatch) -> Result<(), MemoryHostError> {
        let id = *node;
        let target = self.node_mut(id)?;

        for (event, _) in &patch.listeners_removed {
            target.listeners.remove(event);
        }
        for name in &patch.removed {
            target.attrs.remove(name);
        }
        for (name, value) in patch.changed.iter().chain(&patch.added) {
            target.attrs.insert(name.clone(), value.clone());
        }
        for key in &patch.style.removed {
            target.style.remove(key);
        }
        for (key, value) in patch.style.changed.iter().chain(&patch.style.added) {
            target.style.insert(key.clone(), value.clone());
        }
        for (event, listener) in &patch.listeners_added {
            target.listeners.insert(event.clone(), listener.clone());
        }

        self.ops.push(HostOp::Patch(id));
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), MemoryHostError> {
        let (parent, child) = (*parent, *child);
        self.node(parent)?;
        if let Some(existing) = self.node(child)?.parent {
            return Err(MemoryHostError::AlreadyAttached { parent: existing, child });
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.ops.push(HostOp::Append { parent, child });
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), MemoryHostError> {
        let (parent, child) = (*parent, *child);
        let siblings = &mut self.node_mut(parent)?.children;
        let Some(pos) = siblings.iter().position(|&c| c == child) else {
            return Err(MemoryHostError::NotAChild { parent, child });
        };
        siblings.remove(pos);
        self.node_mut(child)?.parent = None;
        self.ops.push(HostOp::Remove { parent, child });
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
