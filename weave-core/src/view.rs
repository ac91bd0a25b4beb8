//! Bound View
//!
//! A [`View`] ties a data graph to a subtree of a [`Document`]: it
//! instruments the data, resolves the mount point, compiles the subtree and
//! owns every subscription the compile produced. Dropping the view frees
//! the subscriptions together; cells only hold weak references to them, so
//! later writes stop re-rendering.

use std::fmt;

use tracing::debug;

use crate::compiler::Compiler;
use crate::dom::{Document, NodeId};
use crate::error::{Diagnostics, Error, Result};
use crate::graph::DependencyGraph;
use crate::options::{Data, MountPoint, Options};
use crate::reactive::{CellId, ReactiveCell, ReactiveObject, ReactiveRoot, SubscriberId, Subscription, Value};

pub struct View {
    root: ReactiveRoot,
    document: Document,
    mount: Option<NodeId>,
    subscriptions: Vec<Subscription>,
    graph: DependencyGraph,
    diagnostics: Diagnostics,
}

impl View {
    /// Instrument `options.data`, then compile the mount point's subtree.
    ///
    /// A mount point that cannot be found is not an error: the view is
    /// created with its data bound and nothing rendered.
    pub fn mount(document: &Document, options: Options) -> Result<Self> {
        let Options {
            el,
            data,
            methods,
            directives,
        } = options;

        let data = match data {
            Data::Object(object) => object,
            Data::Json(serde_json::Value::Object(map)) => ReactiveObject::observe(map),
            Data::Json(serde_json::Value::Null) => ReactiveObject::new(),
            Data::Json(other) => return Err(Error::InvalidData(Value::from(other).type_name())),
        };

        let root = ReactiveRoot::new(data);
        let diagnostics = Diagnostics::new();
        let mount = resolve_mount(document, &el);

        let (subscriptions, graph) = match mount {
            Some(mount) => {
                let mut compiler = Compiler::new(&root, document, &methods, &directives, &diagnostics);
                compiler.compile_mount(mount);
                compiler.finish()
            }
            None => {
                debug!(el = ?el, "mount point not found, nothing compiled");
                (Vec::new(), DependencyGraph::new())
            }
        };

        Ok(Self {
            root,
            document: document.clone(),
            mount,
            subscriptions,
            graph,
            diagnostics,
        })
    }

    /// Read `expression` through the view's accessors.
    pub fn get(&self, expression: &str) -> Result<Value> {
        self.root.read(expression)
    }

    /// Write `expression`, synchronously re-rendering its dependents.
    /// Returns whether the value changed.
    pub fn set(&self, expression: &str, value: impl Into<Value>) -> Result<bool> {
        self.root.write(expression, value)
    }

    pub fn cell(&self, expression: &str) -> Result<ReactiveCell> {
        self.root.cell(&expression.parse()?)
    }

    pub fn root(&self) -> &ReactiveRoot {
        &self.root
    }

    /// The raw data object, aliasing the view's state.
    pub fn data(&self) -> ReactiveObject {
        self.root.data()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The resolved mount element, if one was found.
    pub fn mount_point(&self) -> Option<NodeId> {
        self.mount
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Binding failures from the compile and from later updates.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn dependencies_of(&self, subscription: SubscriberId) -> Vec<CellId> {
        self.graph.dependencies_of(subscription)
    }

    pub fn dependents_of(&self, cell: CellId) -> Vec<SubscriberId> {
        self.graph.dependents_of(cell)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("mount", &self.mount)
            .field("subscriptions", &self.subscriptions.len())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

fn resolve_mount(document: &Document, el: &MountPoint) -> Option<NodeId> {
    match el {
        MountPoint::Body => Some(document.body()),
        MountPoint::Node(id) => document.is_element(*id).then_some(*id),
        MountPoint::Selector(selector) => document.query(selector),
    }
}
