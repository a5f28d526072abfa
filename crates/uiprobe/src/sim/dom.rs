//! In-memory document for the simulated backend.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Removing a node
//! detaches it from its parent; ids are never reused within one document.
//! `<iframe>` nodes own their frame document as children: traversals that
//! start outside a frame never descend into it.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;

use super::css::CssSelector;
use super::SimContext;
use crate::locator::normalize_text;

/// Arena index of a node
pub type NodeId = usize;

/// Behavior attached to a node or to the document load
pub type Handler = Arc<dyn Fn(&mut SimContext<'_>) + Send + Sync>;

/// Event kinds handlers can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimEventKind {
    /// Primary-button click
    Click,
    /// Second click of a double click
    DoubleClick,
    /// Secondary-button click
    ContextMenu,
    /// Pointer entered the element
    Hover,
    /// Value changed by typing, selection or file choice
    Input,
    /// Key pressed while focused
    Key,
    /// Something was dropped onto the element
    Drop,
    /// Button pressed over the element
    MouseDown,
    /// Pointer moved while captured by the element
    MouseMove,
    /// Button released
    MouseUp,
}

/// Event delivered to a handler
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Primary-button click
    Click,
    /// Double click
    DoubleClick,
    /// Secondary-button click
    ContextMenu,
    /// Pointer entered
    Hover,
    /// Value changed
    Input,
    /// Key press
    Key(String),
    /// Drop of `source`
    Drop {
        /// Dragged node
        source: NodeId,
    },
    /// Button down
    MouseDown,
    /// Pointer move to viewport coordinates
    MouseMove {
        /// X
        x: f64,
        /// Y
        y: f64,
    },
    /// Button up
    MouseUp,
    /// Document finished loading
    Load,
    /// Scheduled timer fired
    Timer,
}

impl SimEvent {
    /// Handler kind this event is delivered to
    #[must_use]
    pub const fn kind(&self) -> Option<SimEventKind> {
        Some(match self {
            Self::Click => SimEventKind::Click,
            Self::DoubleClick => SimEventKind::DoubleClick,
            Self::ContextMenu => SimEventKind::ContextMenu,
            Self::Hover => SimEventKind::Hover,
            Self::Input => SimEventKind::Input,
            Self::Key(_) => SimEventKind::Key,
            Self::Drop { .. } => SimEventKind::Drop,
            Self::MouseDown => SimEventKind::MouseDown,
            Self::MouseMove { .. } => SimEventKind::MouseMove,
            Self::MouseUp => SimEventKind::MouseUp,
            Self::Load | Self::Timer => return None,
        })
    }
}

// ============================================================================
// Elements
// ============================================================================

/// Element description; also the builder used by site routes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimElement {
    pub(crate) tag: String,
    pub(crate) text: String,
    pub(crate) attrs: BTreeMap<String, String>,
    pub(crate) value: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
    pub(crate) checked: bool,
}

impl SimElement {
    /// Element with a tag name
    #[must_use]
    pub fn new(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        let value = matches!(tag.as_str(), "textarea").then(String::new);
        Self {
            tag,
            value,
            ..Self::default()
        }
    }

    /// `<input type=kind>`
    #[must_use]
    pub fn input(kind: &str) -> Self {
        let value = match kind {
            "checkbox" | "radio" => "on",
            _ => "",
        };
        Self {
            tag: "input".to_string(),
            value: Some(value.to_string()),
            ..Self::default()
        }
        .attr("type", kind)
    }

    /// `<select>`; its value is derived from the selected `<option>`
    #[must_use]
    pub fn select() -> Self {
        Self::new("select")
    }

    /// `<option value=value>label</option>`
    #[must_use]
    pub fn option(value: &str, label: &str) -> Self {
        Self::new("option").attr("value", value).text(label)
    }

    /// `<iframe>`; append the frame document under it with
    /// [`SimDocument::frame_body`]
    #[must_use]
    pub fn iframe(id: &str) -> Self {
        Self::new("iframe").id(id)
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Append a class
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        let classes = self.attrs.entry("class".to_string()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Set the element's own text
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Set the control value
    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Explicit ARIA role
    #[must_use]
    pub fn role(self, role: &str) -> Self {
        self.attr("role", role)
    }

    /// `aria-label`
    #[must_use]
    pub fn aria_label(self, label: &str) -> Self {
        self.attr("aria-label", label)
    }

    /// `placeholder`
    #[must_use]
    pub fn placeholder(self, text: &str) -> Self {
        self.attr("placeholder", text)
    }

    /// `title`
    #[must_use]
    pub fn title(self, text: &str) -> Self {
        self.attr("title", text)
    }

    /// `<label for=control>`
    #[must_use]
    pub fn label_for(self, control: &str) -> Self {
        self.attr("for", control)
    }

    /// Not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Disabled control
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Read-only control
    #[must_use]
    pub const fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Checked checkbox / radio, or selected option
    #[must_use]
    pub const fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    /// Tag name
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether the class list contains `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|c| c.split_whitespace().any(|name| name == class))
    }

    pub(crate) fn input_type(&self) -> Option<&str> {
        (self.tag == "input").then(|| self.attribute("type").unwrap_or("text"))
    }

    pub(crate) fn is_toggle(&self) -> bool {
        matches!(self.input_type(), Some("checkbox" | "radio"))
    }

    pub(crate) fn is_text_control(&self) -> bool {
        self.tag == "textarea"
            || matches!(
                self.input_type(),
                Some("text" | "email" | "tel" | "number" | "password" | "search" | "url" | "range")
            )
    }

    pub(crate) fn is_focusable(&self) -> bool {
        matches!(
            self.tag.as_str(),
            "input" | "textarea" | "select" | "button" | "a"
        ) || self.attrs.contains_key("tabindex")
    }
}

// ============================================================================
// Document
// ============================================================================

#[derive(Debug, Clone)]
struct Node {
    element: SimElement,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Simulated document: element arena plus registered behaviors
#[derive(Clone)]
pub struct SimDocument {
    nodes: Vec<Node>,
    handlers: HashMap<(NodeId, SimEventKind), Vec<Handler>>,
    load_handlers: Vec<Handler>,
}

impl std::fmt::Debug for SimDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimDocument")
            .field("nodes", &self.nodes.len())
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

const ROOT: NodeId = 0;
const BODY: NodeId = 1;

impl Default for SimDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDocument {
    /// Empty `<html><body></body></html>`
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                element: SimElement::new("html"),
                parent: None,
                children: Vec::new(),
            }],
            handlers: HashMap::new(),
            load_handlers: Vec::new(),
        };
        doc.append(ROOT, SimElement::new("body"));
        doc
    }

    /// `<html>`
    #[must_use]
    pub const fn root(&self) -> NodeId {
        ROOT
    }

    /// `<body>`
    #[must_use]
    pub const fn body(&self) -> NodeId {
        BODY
    }

    /// Append `element` as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, element: SimElement) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            element,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(id);
        }
        id
    }

    /// Create the `<body>` of an iframe's document
    pub fn frame_body(&mut self, iframe: NodeId) -> NodeId {
        self.append(iframe, SimElement::new("body"))
    }

    /// Detach a node (and its subtree) from the document
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&child| child != node);
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = None;
        }
    }

    /// Detach every child of `node`
    pub fn clear(&mut self, node: NodeId) {
        for child in self.children(node) {
            self.remove(child);
        }
    }

    /// Move the child at `from` to position `to` within `parent`
    pub fn move_child(&mut self, parent: NodeId, from: usize, to: usize) {
        if let Some(node) = self.nodes.get_mut(parent) {
            if from < node.children.len() {
                let child = node.children.remove(from);
                let to = to.min(node.children.len());
                node.children.insert(to, child);
            }
        }
    }

    /// Element of a node
    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<&SimElement> {
        self.nodes.get(node).map(|n| &n.element)
    }

    /// Mutable element of a node
    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut SimElement> {
        self.nodes.get_mut(node).map(|n| &mut n.element)
    }

    /// Children in order
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Parent node
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    /// Parent within the same document; `None` at a frame boundary
    #[must_use]
    pub fn parent_in_document(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
            .filter(|&p| self.element(p).is_some_and(|e| e.tag != "iframe"))
    }

    /// Position of `node` among its siblings
    #[must_use]
    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.nodes.get(parent)?.children.iter().position(|&c| c == node)
    }

    /// Connected to the root
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == ROOT {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Attached and neither the node nor an ancestor is hidden
    #[must_use]
    pub fn is_visible(&self, node: NodeId) -> bool {
        if !self.is_attached(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if self.element(id).map_or(true, |e| e.hidden) {
                return false;
            }
            current = self.parent(id);
        }
        true
    }

    /// Descendants of `start` in document order.
    ///
    /// Frame contents are included only when `start` itself is the frame.
    #[must_use]
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(start).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            if self.element(node).is_some_and(|e| e.tag == "iframe") {
                continue;
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        out
    }

    /// First attached node with `id`, frames included
    #[must_use]
    pub fn find(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![ROOT];
        while let Some(node) = stack.pop() {
            if self.element(node).and_then(|e| e.attribute("id")) == Some(id) {
                return Some(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        None
    }

    /// Main-document nodes matching a CSS selector; invalid selectors match nothing
    #[must_use]
    pub fn select(&self, selector: &str) -> Vec<NodeId> {
        self.select_within(ROOT, selector)
    }

    /// Descendants of `scope` matching a CSS selector
    #[must_use]
    pub fn select_within(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Ok(parsed) = CssSelector::parse(selector) else {
            return Vec::new();
        };
        self.descendants(scope)
            .into_iter()
            .filter(|&n| parsed.matches(self, n))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------------

    /// The node's own text
    #[must_use]
    pub fn own_text(&self, node: NodeId) -> String {
        self.element(node).map(|e| e.text.clone()).unwrap_or_default()
    }

    /// Text of the node and its same-document descendants, normalized
    #[must_use]
    pub fn full_text(&self, node: NodeId) -> String {
        let mut parts = vec![self.own_text(node)];
        parts.extend(self.descendants(node).into_iter().map(|n| self.own_text(n)));
        normalize_text(&parts.join(" "))
    }

    // ------------------------------------------------------------------------
    // Accessors used by behaviors
    // ------------------------------------------------------------------------

    /// Attribute value
    #[must_use]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)
            .and_then(|e| e.attribute(name))
            .map(str::to_string)
    }

    /// Set the own text
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(e) = self.element_mut(node) {
            e.text = text.to_string();
        }
    }

    /// Set an attribute
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(e) = self.element_mut(node) {
            e.attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// Remove an attribute
    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(e) = self.element_mut(node) {
            e.attrs.remove(name);
        }
    }

    /// Whether the node's class list contains `class`
    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|e| e.has_class(class))
    }

    /// Add a class if missing
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            if let Some(e) = self.element_mut(node) {
                *e = std::mem::take(e).class(class);
            }
        }
    }

    /// Remove a class
    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.element_mut(node) {
            if let Some(classes) = e.attrs.get_mut("class") {
                *classes = classes
                    .split_whitespace()
                    .filter(|c| *c != class)
                    .collect::<Vec<_>>()
                    .join(" ");
            }
        }
    }

    /// Toggle a class; returns whether it is now present
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    /// Show or hide
    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        if let Some(e) = self.element_mut(node) {
            e.hidden = hidden;
        }
    }

    /// Whether the node itself is hidden
    #[must_use]
    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| e.hidden)
    }

    /// Enable or disable
    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        if let Some(e) = self.element_mut(node) {
            e.disabled = disabled;
        }
    }

    /// Whether the node is disabled
    #[must_use]
    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| e.disabled)
    }

    /// Set checked / selected
    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(e) = self.element_mut(node) {
            e.checked = checked;
        }
    }

    /// Checked / selected state
    #[must_use]
    pub fn is_checked(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| e.checked)
    }

    /// Control value; a `<select>` reports its first selected option
    #[must_use]
    pub fn value(&self, node: NodeId) -> String {
        match self.element(node) {
            Some(e) if e.tag == "select" => self
                .children(node)
                .into_iter()
                .find(|&o| self.is_checked(o))
                .and_then(|o| self.attr(o, "value"))
                .unwrap_or_default(),
            Some(e) => e.value.clone().unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Set the control value
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(e) = self.element_mut(node) {
            e.value = Some(value.to_string());
        }
    }

    // ------------------------------------------------------------------------
    // Accessibility
    // ------------------------------------------------------------------------

    /// Explicit or implicit ARIA role
    #[must_use]
    pub fn role(&self, node: NodeId) -> Option<String> {
        let element = self.element(node)?;
        if let Some(role) = element.attribute("role") {
            return Some(role.to_string());
        }
        let implicit = match (element.tag.as_str(), element.input_type()) {
            ("button", _) | (_, Some("button" | "submit" | "reset")) => "button",
            ("a", _) => "link",
            (_, Some("checkbox")) => "checkbox",
            (_, Some("radio")) => "radio",
            (_, Some("range")) => "slider",
            ("select", _) => "combobox",
            ("textarea", _) => "textbox",
            ("input", _) if element.is_text_control() => "textbox",
            ("tr", _) => "row",
            ("table", _) => "table",
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", _) => "heading",
            ("dialog", _) => "dialog",
            ("option", _) => "option",
            _ => return None,
        };
        Some(implicit.to_string())
    }

    /// Labels pointing at `control` through `for`, plus a wrapping label
    #[must_use]
    pub fn labels_of(&self, control: NodeId) -> Vec<NodeId> {
        let mut labels = Vec::new();
        if let Some(id) = self.attr(control, "id") {
            labels.extend(self.descendants(ROOT).into_iter().filter(|&n| {
                self.element(n)
                    .is_some_and(|e| e.tag == "label" && e.attribute("for") == Some(id.as_str()))
            }));
        }
        let mut current = self.parent(control);
        while let Some(node) = current {
            if self.element(node).is_some_and(|e| e.tag == "label") {
                labels.push(node);
                break;
            }
            current = self.parent_in_document(node);
        }
        labels
    }

    /// Control a `<label>` activates
    #[must_use]
    pub fn labelled_control(&self, label: NodeId) -> Option<NodeId> {
        let element = self.element(label)?;
        if element.tag != "label" {
            return None;
        }
        match element.attribute("for") {
            Some(id) => self.find(id),
            None => self.descendants(label).into_iter().find(|&n| {
                self.element(n)
                    .is_some_and(|e| matches!(e.tag.as_str(), "input" | "select" | "textarea"))
            }),
        }
    }

    /// Accessible name: `aria-label`, then label text, then content
    #[must_use]
    pub fn accessible_name(&self, node: NodeId) -> String {
        let Some(element) = self.element(node) else {
            return String::new();
        };
        if let Some(label) = element.attribute("aria-label") {
            return normalize_text(label);
        }
        if matches!(element.input_type(), Some("button" | "submit" | "reset")) {
            return normalize_text(element.value.as_deref().unwrap_or_default());
        }
        if matches!(element.tag.as_str(), "input" | "select" | "textarea") {
            let labels: Vec<String> = self
                .labels_of(node)
                .into_iter()
                .map(|l| self.full_text(l))
                .collect();
            return normalize_text(&labels.join(" "));
        }
        self.full_text(node)
    }

    // ------------------------------------------------------------------------
    // Behaviors
    // ------------------------------------------------------------------------

    /// Register a behavior for events of `kind` reaching `node`
    pub fn on<F>(&mut self, node: NodeId, kind: SimEventKind, handler: F)
    where
        F: Fn(&mut SimContext<'_>) + Send + Sync + 'static,
    {
        self.handlers
            .entry((node, kind))
            .or_default()
            .push(Arc::new(handler));
    }

    /// Register a click behavior
    pub fn on_click<F>(&mut self, node: NodeId, handler: F)
    where
        F: Fn(&mut SimContext<'_>) + Send + Sync + 'static,
    {
        self.on(node, SimEventKind::Click, handler);
    }

    /// Register an input behavior
    pub fn on_input<F>(&mut self, node: NodeId, handler: F)
    where
        F: Fn(&mut SimContext<'_>) + Send + Sync + 'static,
    {
        self.on(node, SimEventKind::Input, handler);
    }

    /// Run a behavior once the document has loaded
    pub fn on_load<F>(&mut self, handler: F)
    where
        F: Fn(&mut SimContext<'_>) + Send + Sync + 'static,
    {
        self.load_handlers.push(Arc::new(handler));
    }

    pub(crate) fn handlers(&self, node: NodeId, kind: SimEventKind) -> Vec<Handler> {
        self.handlers.get(&(node, kind)).cloned().unwrap_or_default()
    }

    pub(crate) fn load_handlers(&self) -> Vec<Handler> {
        self.load_handlers.clone()
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Render the attached tree as HTML
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(ROOT, &mut out);
        out
    }

    fn render_node(&self, node: NodeId, out: &mut String) {
        let Some(element) = self.element(node) else {
            return;
        };
        let _ = write!(out, "<{}", element.tag);
        for (name, value) in &element.attrs {
            let _ = write!(out, " {name}=\"{}\"", value.replace('"', "&quot;"));
        }
        for (flag, set) in [
            ("hidden", element.hidden),
            ("disabled", element.disabled),
            ("readonly", element.readonly),
            ("checked", element.checked),
        ] {
            if set {
                let _ = write!(out, " {flag}");
            }
        }
        out.push('>');
        out.push_str(&element.text);
        for child in self.children(node) {
            self.render_node(child, out);
        }
        let _ = write!(out, "</{}>", element.tag);
    }
}
