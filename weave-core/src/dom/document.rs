//! Document arena.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::MarkupError;

use super::event::{Event, Listener};
use super::parse::{parse_markup, Markup};
use super::serialize;

/// Index of a node in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Get the raw index.
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node-type discrimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Fragment,
}

pub(super) struct ElementData {
    pub(super) tag: String,
    pub(super) attributes: IndexMap<String, String>,
    /// Control value property, separate from the `value` attribute.
    pub(super) value: Option<String>,
}

pub(super) enum NodeData {
    Element(ElementData),
    Text(String),
    Comment(String),
    Fragment,
}

pub(super) struct Node {
    pub(super) data: NodeData,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    listeners: Vec<(String, Listener)>,
    /// Pinned nodes are never recycled.
    pinned: bool,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
            pinned: false,
        }
    }

    fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::Fragment => NodeKind::Fragment,
        }
    }
}

pub(super) struct Arena {
    nodes: Vec<Node>,
    /// Released slots, reused by `alloc`.
    free: Vec<NodeId>,
}

impl Arena {
    pub(super) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        match self.free.pop().and_then(|id| self.nodes.get_mut(id.0).map(|slot| (id, slot))) {
            Some((id, slot)) => {
                *slot = Node::new(data);
                id
            }
            None => {
                let id = NodeId(self.nodes.len());
                self.nodes.push(Node::new(data));
                id
            }
        }
    }

    /// Return a detached subtree to the free list. Pinned nodes and nodes
    /// with listeners stay allocated, together with their descendants.
    fn release(&mut self, id: NodeId) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        if node.pinned || !node.listeners.is_empty() {
            return;
        }
        let children = std::mem::take(&mut node.children);
        node.parent = None;
        for child in children {
            if let Some(child_node) = self.get_mut(child) {
                child_node.parent = None;
            }
            self.release(child);
        }
        self.free.push(id);
    }

    /// The only child of `id`, if it is an unpinned text node.
    fn sole_text_child(&self, id: NodeId) -> Option<NodeId> {
        let [child] = self.get(id)?.children.as_slice() else {
            return None;
        };
        let node = self.get(*child)?;
        (matches!(node.data, NodeData::Text(_)) && !node.pinned).then_some(*child)
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.get_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.get_mut(child).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.retain(|c| *c != child);
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn append(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.get(parent).is_none() || self.get(child).is_none() || self.is_ancestor(child, parent) {
            return false;
        }
        self.detach(child);
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        true
    }

    fn clear_children(&mut self, parent: NodeId) {
        let children = self
            .get_mut(parent)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for child in children {
            if let Some(node) = self.get_mut(child) {
                node.parent = None;
            }
            self.release(child);
        }
    }

    fn insert_markup(&mut self, parent: NodeId, markup: &Markup) {
        let id = match markup {
            Markup::Text(text) => self.alloc(NodeData::Text(text.clone())),
            Markup::Comment(text) => self.alloc(NodeData::Comment(text.clone())),
            Markup::Element { tag, attributes, children } => {
                let id = self.alloc(NodeData::Element(ElementData {
                    tag: tag.clone(),
                    attributes: attributes.clone(),
                    value: None,
                }));
                for child in children {
                    self.insert_markup(id, child);
                }
                id
            }
        };
        self.append(parent, id);
    }

    fn text_content(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(_) => {}
            NodeData::Element(_) | NodeData::Fragment => {
                for child in &node.children {
                    self.text_content(*child, out);
                }
            }
        }
    }

    fn find(&self, id: NodeId, matches: &dyn Fn(&ElementData) -> bool) -> Option<NodeId> {
        let node = self.get(id)?;
        if let NodeData::Element(element) = &node.data {
            if matches(element) {
                return Some(id);
            }
        }
        node.children.iter().find_map(|child| self.find(*child, matches))
    }
}

/// An in-memory markup tree. Cloning shares the document.
#[derive(Clone)]
pub struct Document {
    inner: Arc<RwLock<Arena>>,
    body: NodeId,
}

impl Document {
    /// A document holding an empty `body` element.
    pub fn new() -> Self {
        let mut arena = Arena {
            nodes: Vec::new(),
            free: Vec::new(),
        };
        let body = arena.alloc(NodeData::Element(ElementData {
            tag: "body".to_owned(),
            attributes: IndexMap::new(),
            value: None,
        }));
        Self {
            inner: Arc::new(RwLock::new(arena)),
            body,
        }
    }

    /// A document whose body contains `markup`.
    pub fn from_markup(markup: &str) -> Result<Self, MarkupError> {
        let document = Self::new();
        document.set_inner_html(document.body, markup)?;
        Ok(document)
    }

    /// The default mount point.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Nodes currently allocated, attached or not. Recycled slots are not counted.
    pub fn len(&self) -> usize {
        let arena = self.inner.read();
        arena.nodes.len() - arena.free.len()
    }

    /// Keep `id` allocated after it is detached.
    ///
    /// Content replaced by [`set_text_content`](Self::set_text_content) or
    /// [`set_inner_html`](Self::set_inner_html) is recycled; a node that
    /// something still renders into must be pinned so its id stays valid.
    pub fn pin(&self, id: NodeId) {
        if let Some(node) = self.inner.write().get_mut(id) {
            node.pinned = true;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ------------------------------------------------------------------
    // Node creation and structure
    // ------------------------------------------------------------------

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner.write().alloc(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
            value: None,
        }))
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.inner.write().alloc(NodeData::Text(text.to_owned()))
    }

    /// An off-tree container; appending it moves nothing, its children are
    /// moved with [`move_children`](Self::move_children).
    pub fn create_fragment(&self) -> NodeId {
        self.inner.write().alloc(NodeData::Fragment)
    }

    /// Append `child` to `parent`, detaching it from its previous parent.
    ///
    /// Returns `false` if either node is unknown or `child` is an ancestor of
    /// `parent`.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.inner.write().append(parent, child)
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    pub fn move_children(&self, from: NodeId, to: NodeId) {
        let mut arena = self.inner.write();
        let children = arena.get(from).map(|node| node.children.clone()).unwrap_or_default();
        for child in children {
            arena.append(to, child);
        }
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.inner.read().get(id).map(Node::kind)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Element)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Text)
    }

    /// Lowercase tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<String> {
        match self.inner.read().get(id).map(|node| &node.data) {
            Some(NodeData::Element(element)) => Some(element.tag.clone()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.inner.read().get(id).and_then(|node| node.parent)
    }

    /// Snapshot of the children of `id`.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.inner
            .read()
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.inner.read().get(id).and_then(|node| node.children.first().copied())
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.inner.read().get(id).is_some_and(|node| !node.children.is_empty())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Attributes of an element in document order. Empty for other nodes.
    pub fn attributes(&self, id: NodeId) -> Vec<(String, String)> {
        match self.inner.read().get(id).map(|node| &node.data) {
            Some(NodeData::Element(element)) => element
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        match self.inner.read().get(id).map(|node| &node.data) {
            Some(NodeData::Element(element)) => element.attributes.get(name).cloned(),
            _ => None,
        }
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.inner.write().element_mut(id) {
            element.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    /// Remove an attribute, keeping the order of the others.
    pub fn remove_attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.inner
            .write()
            .element_mut(id)
            .and_then(|element| element.attributes.shift_remove(name))
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.inner.read().text_content(id, &mut out);
        out
    }

    /// Replace the node's content with literal text; no markup is interpreted.
    pub fn set_text_content(&self, id: NodeId, text: &str) {
        let mut arena = self.inner.write();
        match arena.get_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Text(data) | NodeData::Comment(data)) => {
                data.clear();
                data.push_str(text);
                return;
            }
            Some(NodeData::Element(_) | NodeData::Fragment) => {}
            None => return,
        }

        if let Some(child) = arena.sole_text_child(id).filter(|_| !text.is_empty()) {
            if let Some(NodeData::Text(data)) = arena.get_mut(child).map(|node| &mut node.data) {
                data.clear();
                data.push_str(text);
                return;
            }
        }

        arena.clear_children(id);
        if !text.is_empty() {
            let child = arena.alloc(NodeData::Text(text.to_owned()));
            arena.append(id, child);
        }
    }

    /// Replace the children of `id` with parsed `markup`.
    pub fn set_inner_html(&self, id: NodeId, markup: &str) -> Result<(), MarkupError> {
        let forest = parse_markup(markup)?;

        let mut arena = self.inner.write();
        if arena.get(id).is_none() {
            return Ok(());
        }
        arena.clear_children(id);
        for node in &forest {
            arena.insert_markup(id, node);
        }
        Ok(())
    }

    /// Markup of the node's children.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize::write_children(&self.inner.read(), id, &mut out);
        out
    }

    /// Markup of the node itself.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize::write_node(&self.inner.read(), id, &mut out);
        out
    }

    /// Current control value: the value property if set, otherwise the
    /// `value` attribute.
    pub fn value(&self, id: NodeId) -> Option<String> {
        match self.inner.read().get(id).map(|node| &node.data) {
            Some(NodeData::Element(element)) => element
                .value
                .clone()
                .or_else(|| element.attributes.get("value").cloned()),
            _ => None,
        }
    }

    pub fn set_value(&self, id: NodeId, value: &str) {
        if let Some(element) = self.inner.write().element_mut(id) {
            element.value = Some(value.to_owned());
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// First element under (and including) `body` matching `selector`:
    /// `#id`, `.class` or a tag name.
    pub fn query(&self, selector: &str) -> Option<NodeId> {
        let selector = selector.trim();
        let arena = self.inner.read();

        if let Some(id) = selector.strip_prefix('#') {
            arena.find(self.body, &|e: &ElementData| e.attributes.get("id").is_some_and(|v| v == id))
        } else if let Some(class) = selector.strip_prefix('.') {
            arena.find(self.body, &|e: &ElementData| {
                e.attributes
                    .get("class")
                    .is_some_and(|v| v.split_whitespace().any(|c| c == class))
            })
        } else if selector.is_empty() {
            None
        } else {
            let tag = selector.to_ascii_lowercase();
            arena.find(self.body, &|e: &ElementData| e.tag == tag)
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn add_event_listener<F>(&self, id: NodeId, kind: &str, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        if let Some(node) = self.inner.write().get_mut(id) {
            node.listeners.push((kind.to_owned(), Arc::new(listener)));
        }
    }

    pub fn listener_count(&self, id: NodeId, kind: &str) -> usize {
        self.inner
            .read()
            .get(id)
            .map_or(0, |node| node.listeners.iter().filter(|(k, _)| k == kind).count())
    }

    /// Deliver an event of type `kind` to the listeners on `id`, in
    /// attachment order. Returns how many listeners ran.
    pub fn dispatch(&self, id: NodeId, kind: &str) -> usize {
        let listeners: Vec<Listener> = {
            let arena = self.inner.read();
            let Some(node) = arena.get(id) else {
                return 0;
            };
            node.listeners
                .iter()
                .filter(|(k, _)| k == kind)
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };

        let event = Event::new(kind, id, self.value(id));
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    /// Simulate user input: set the control value, then fire `input`.
    pub fn input(&self, id: NodeId, value: &str) -> usize {
        self.set_value(id, value);
        self.dispatch(id, "input")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.len())
            .field("body", &self.outer_html(self.body))
            .finish()
    }
}
