//! Core types for spark-fiber.
//!
//! These types describe the desired UI. They are immutable once built and are
//! only consumed by reconciliation:
//!
//! ```text
//! Element { ty: Primitive("div"), props: { id: "a", style: {..}, children: [..] } }
//! ```
//!
//! Text leaves are normalized to an element with [`ElementType::Text`] and a
//! single `value` property, so the reconciler never sees bare strings.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Name of the property that carries a text leaf's content.
pub const TEXT_VALUE: &str = "value";

/// Name of the reserved style sub-mapping.
pub const STYLE: &str = "style";

// =============================================================================
// Element Type
// =============================================================================

/// A component render function.
///
/// Components read their props, may call [`use_state`](crate::use_state), and
/// return exactly one element.
pub type RenderFn = fn(&Props) -> Element;

/// A component reference. Two components are the same type when they point
/// at the same render function.
#[derive(Clone, Copy)]
pub struct Component(pub RenderFn);

impl Component {
    /// Invoke the render function.
    #[inline]
    pub fn render(&self, props: &Props) -> Element {
        (self.0)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::fn_addr_eq(self.0, other.0)
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({:p})", self.0 as *const ())
    }
}

/// What kind of node an element describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementType {
    /// A host primitive identified by its tag (`"div"`, `"span"`, ...).
    Primitive(Rc<str>),
    /// A text leaf. Its content lives in the `value` property.
    Text,
    /// A function component.
    Component(Component),
}

impl ElementType {
    /// Check if this is a function component.
    #[inline]
    pub fn is_component(&self) -> bool {
        matches!(self, ElementType::Component(_))
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Primitive(Rc::from(tag))
    }
}

impl From<RenderFn> for ElementType {
    fn from(render: RenderFn) -> Self {
        ElementType::Component(Component(render))
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        ElementType::Component(component)
    }
}

// =============================================================================
// Events and Listeners
// =============================================================================

/// Event delivered by a host to a listener.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Event {
    /// Event name without the `on` prefix, lowercased (`"click"`).
    pub name: String,
    /// Optional payload (pressed key, input value, ...).
    pub detail: Option<String>,
}

impl Event {
    /// Create an event without payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }

    /// Create an event carrying a payload.
    pub fn with_detail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Event listener callback.
///
/// Listeners compare by identity: cloning keeps the same listener, wrapping
/// the same closure twice creates two different ones.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event)>);

impl Listener {
    /// Wrap a closure as a listener.
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the listener.
    #[inline]
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Check if a property name follows the event listener convention (`onClick`).
#[inline]
pub fn is_event_prop(name: &str) -> bool {
    name.starts_with("on")
}

/// Host event name for a listener property: `onClick` → `click`.
pub fn event_name(prop: &str) -> String {
    prop.strip_prefix("on").unwrap_or(prop).to_lowercase()
}

// =============================================================================
// Prop Value
// =============================================================================

/// Style sub-mapping (`color` → `red`).
pub type Style = BTreeMap<String, String>;

/// A single property value.
#[derive(Clone, Debug)]
pub enum PropValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Style(Style),
    Listener(Listener),
}

impl PropValue {
    /// Get the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer value, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the listener, if this is a listener.
    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            PropValue::Listener(l) => Some(l),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            // Bitwise so that NaN props do not patch on every commit
            (PropValue::Float(a), PropValue::Float(b)) => a.to_bits() == b.to_bits(),
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Style(a), PropValue::Style(b)) => a == b,
            (PropValue::Listener(a), PropValue::Listener(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.write_str(s),
            PropValue::Int(i) => write!(f, "{i}"),
            PropValue::Float(x) => write!(f, "{x}"),
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Style(style) => {
                let mut first = true;
                for (key, value) in style {
                    if !first {
                        f.write_str("; ")?;
                    }
                    write!(f, "{key}: {value}")?;
                    first = false;
                }
                Ok(())
            }
            PropValue::Listener(l) => write!(f, "{l:?}"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<Style> for PropValue {
    fn from(value: Style) -> Self {
        PropValue::Style(value)
    }
}

impl From<Listener> for PropValue {
    fn from(value: Listener) -> Self {
        PropValue::Listener(value)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Element properties.
///
/// Named values are unordered. `children` is reserved and kept apart from the
/// named values, so iterating [`Props::iter`] never yields it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    values: BTreeMap<String, PropValue>,
    children: Vec<Element>,
}

impl Props {
    /// Create empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a named property.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a named property.
    ///
    /// `children` is reserved; use [`Props::set_children`] for it.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        let name = name.into();
        debug_assert!(name != "children", "`children` is reserved");
        self.values.insert(name, value.into());
    }

    /// Replace the children sequence.
    pub fn set_children(&mut self, children: Vec<Element>) {
        self.children = children;
    }

    /// Get a named property.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    /// Get a string property.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }

    /// Get an integer property.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropValue::as_int)
    }

    /// Get the style sub-mapping, if any.
    pub fn style(&self) -> Option<&Style> {
        match self.values.get(STYLE) {
            Some(PropValue::Style(style)) => Some(style),
            _ => None,
        }
    }

    /// Iterate named properties (never includes `children`).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Ordered child elements.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Check if there are no named properties and no children.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.children.is_empty()
    }
}

// =============================================================================
// Element
// =============================================================================

/// Immutable description of desired UI content.
///
/// Props are reference counted so fibers can share them across generations
/// without copying.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub ty: ElementType,
    pub props: Rc<Props>,
}

impl Element {
    /// Create an element from a type and props.
    pub fn new(ty: impl Into<ElementType>, props: Props) -> Self {
        Self {
            ty: ty.into(),
            props: Rc::new(props),
        }
    }

    /// A host primitive element (`div`, `span`, ...).
    pub fn host(tag: &str) -> Self {
        Self::new(tag, Props::new())
    }

    /// A text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(
            ElementType::Text,
            Props::new().with(TEXT_VALUE, PropValue::Str(value.into())),
        )
    }

    /// A function component element.
    pub fn component(render: RenderFn) -> Self {
        Self::new(render, Props::new())
    }

    /// Builder: set a named property.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Rc::make_mut(&mut self.props).set(name, value);
        self
    }

    /// Builder: set one key of the style sub-mapping.
    pub fn style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let props = Rc::make_mut(&mut self.props);
        let mut style = props.style().cloned().unwrap_or_default();
        style.insert(key.into(), value.into());
        props.set(STYLE, style);
        self
    }

    /// Builder: attach an event listener under `on<Event>`.
    pub fn on(self, prop: impl Into<String>, f: impl Fn(&Event) + 'static) -> Self {
        let prop = prop.into();
        debug_assert!(is_event_prop(&prop), "listener props start with `on`");
        self.prop(prop, Listener::new(f))
    }

    /// Builder: append one child.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        let props = Rc::make_mut(&mut self.props);
        child.into().flatten_into(&mut props.children);
        self
    }

    /// Builder: append several children.
    pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        let props = Rc::make_mut(&mut self.props);
        for child in children {
            child.into().flatten_into(&mut props.children);
        }
        self
    }

    /// Text content, for text leaves.
    pub fn text_value(&self) -> Option<&str> {
        match self.ty {
            ElementType::Text => self.props.get_str(TEXT_VALUE),
            _ => None,
        }
    }
}

// =============================================================================
// Children
// =============================================================================

/// Anything that can appear in a children list.
///
/// Nested lists are flattened and bare text is normalized to text elements.
#[derive(Clone, Debug)]
pub enum Child {
    Element(Element),
    Text(String),
    List(Vec<Child>),
}

impl Child {
    fn flatten_into(self, out: &mut Vec<Element>) {
        match self {
            Child::Element(element) => out.push(element),
            Child::Text(text) => out.push(Element::text(text)),
            Child::List(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
        }
    }
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Child::Element(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Text(value.to_string())
    }
}

impl<C: Into<Child>> From<Vec<C>> for Child {
    fn from(value: Vec<C>) -> Self {
        Child::List(value.into_iter().map(Into::into).collect())
    }
}

/// Build an element from a type, props and children.
///
/// Children are flattened one level per nested list and bare text or numbers
/// become text leaves.
pub fn create_element<C: Into<Child>>(
    ty: impl Into<ElementType>,
    mut props: Props,
    children: impl IntoIterator<Item = C>,
) -> Element {
    let mut flat = Vec::new();
    for child in children {
        child.into().flatten_into(&mut flat);
    }
    props.set_children(flat);
    Element::new(ty, props)
}

// =============================================================================
// Tests
// =============================================================================
