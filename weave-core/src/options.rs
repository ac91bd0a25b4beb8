//! View Options
//!
//! Recognized options: `el` (mount point), `data` (the reactive data graph)
//! and `methods` (event handlers by name). Options are built in code with
//! the builder methods, or loaded from JSON with [`Options::from_json`]
//! (which covers `el` and `data`; handlers are always registered in code).

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::compiler::DirectiveTable;
use crate::dom::{Event, NodeId};
use crate::error::Result;
use crate::reactive::{ReactiveObject, ReactiveRoot};

/// Where the view is mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MountPoint {
    /// The document body.
    #[default]
    Body,
    Node(NodeId),
    /// A tree query: `#id`, `.class` or a tag name.
    Selector(String),
}

impl From<NodeId> for MountPoint {
    fn from(id: NodeId) -> Self {
        MountPoint::Node(id)
    }
}

impl From<&str> for MountPoint {
    fn from(selector: &str) -> Self {
        MountPoint::Selector(selector.to_owned())
    }
}

impl From<String> for MountPoint {
    fn from(selector: String) -> Self {
        MountPoint::Selector(selector)
    }
}

/// An event handler. Receives the bound view's accessors and the event.
pub type Handler = Arc<dyn Fn(&ReactiveRoot, &Event) + Send + Sync>;

/// Handlers looked up by `@event="name"` attributes.
#[derive(Clone, Default)]
pub struct Methods {
    handlers: IndexMap<String, Handler>,
}

impl Methods {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&ReactiveRoot, &Event) + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}

/// The data a view binds to.
#[derive(Debug, Clone)]
pub enum Data {
    /// Plain data, instrumented at mount time.
    Json(serde_json::Value),
    /// Already-instrumented data; the caller's handle aliases the view's state.
    Object(ReactiveObject),
}

impl Default for Data {
    fn default() -> Self {
        Data::Json(serde_json::Value::Object(serde_json::Map::new()))
    }
}

/// Construction options for a [`View`](crate::View).
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub el: MountPoint,
    pub data: Data,
    pub methods: Methods,
    pub directives: DirectiveTable,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    #[serde(default)]
    el: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `el` and `data` from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawOptions = serde_json::from_str(json)?;
        let mut options = Self::new();
        if let Some(el) = raw.el {
            options.el = MountPoint::Selector(el);
        }
        if let Some(data) = raw.data {
            options.data = Data::Json(data);
        }
        Ok(options)
    }

    pub fn el(mut self, el: impl Into<MountPoint>) -> Self {
        self.el = el.into();
        self
    }

    pub fn data(mut self, data: impl Into<serde_json::Value>) -> Self {
        self.data = Data::Json(data.into());
        self
    }

    /// Bind to an already-instrumented object, keeping the caller's handle live.
    pub fn data_object(mut self, data: ReactiveObject) -> Self {
        self.data = Data::Object(data);
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ReactiveRoot, &Event) + Send + Sync + 'static,
    {
        self.methods.insert(name, handler);
        self
    }

    pub fn methods(mut self, methods: Methods) -> Self {
        self.methods = methods;
        self
    }

    pub fn directives(mut self, directives: DirectiveTable) -> Self {
        self.directives = directives;
        self
    }
}
