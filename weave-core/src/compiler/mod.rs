//! Tree Compiler
//!
//! Walks a mounted subtree once, turning directive attributes, event
//! attributes and `{{ }}` text into live bindings.
//!
//! # Binding surface
//!
//! - `v-<kind>="path"`: a binding of `kind`, rendered by the directive
//!   registered under that name. Unknown kinds are dropped without a binding.
//! - `@<event>="method"`: attaches the named handler for `event`.
//! - A text node containing `{{ path }}` is a `text` binding on that node.
//!
//! Consumed attributes are removed from the tree, known or not.
//!
//! # Bind protocol
//!
//! Each binding renders once with the current value, runs the directive's
//! one-time `attach`, then records a [`Subscription`] whose callback
//! re-resolves the path and renders again. A binding that fails at any step
//! is reported as a [`BindingError`] and skipped; the walk continues.

mod directive;
mod interpolation;

pub use directive::{BindContext, Binding, Directive, DirectiveTable, Html, Model, Text};
pub use interpolation::capture as capture_interpolation;

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::dom::{Document, NodeId, NodeKind};
use crate::error::{BindingError, Diagnostics, Result};
use crate::graph::DependencyGraph;
use crate::options::Methods;
use crate::reactive::{ExpressionPath, ReactiveRoot, Subscription};

/// Attribute prefix of a data binding.
pub const DIRECTIVE_PREFIX: &str = "v-";

/// Attribute prefix of an event binding.
pub const EVENT_PREFIX: &str = "@";

/// Label used for bindings that come from `{{ }}` text.
const INTERPOLATION_LABEL: &str = "{{ }}";

/// Compiles one subtree against one bound root.
///
/// The compiler collects every subscription it creates; the caller keeps
/// them alive for as long as the bindings should stay live.
pub struct Compiler<'a> {
    root: &'a ReactiveRoot,
    document: &'a Document,
    methods: &'a Methods,
    directives: &'a DirectiveTable,
    diagnostics: &'a Diagnostics,
    subscriptions: Vec<Subscription>,
    graph: DependencyGraph,
}

impl<'a> Compiler<'a> {
    pub fn new(
        root: &'a ReactiveRoot,
        document: &'a Document,
        methods: &'a Methods,
        directives: &'a DirectiveTable,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        Self {
            root,
            document,
            methods,
            directives,
            diagnostics,
            subscriptions: Vec::new(),
            graph: DependencyGraph::new(),
        }
    }

    /// Compile every descendant of `mount`.
    ///
    /// The children are moved into an off-tree fragment for the walk and
    /// moved back, in order, afterwards.
    pub fn compile_mount(&mut self, mount: NodeId) {
        let fragment = self.document.create_fragment();
        self.document.move_children(mount, fragment);
        self.compile(fragment);
        self.document.move_children(fragment, mount);

        debug!(
            mount = %mount,
            bindings = self.subscriptions.len(),
            diagnostics = self.diagnostics.len(),
            "compiled mount point"
        );
    }

    /// Visit every child of `node`, recursively.
    pub fn compile(&mut self, node: NodeId) {
        for child in self.document.children(node) {
            match self.document.kind(child) {
                Some(NodeKind::Element) => self.compile_attributes(child),
                Some(NodeKind::Text) => {
                    let text = self.document.text_content(child);
                    if let Some(expression) = interpolation::capture(&text) {
                        self.bind(child, "text", INTERPOLATION_LABEL, expression);
                    }
                }
                _ => {}
            }

            // Checked after binding, so content inserted by an initial render
            // is compiled too.
            if self.document.has_children(child) {
                self.compile(child);
            }
        }
    }

    /// Subscriptions created so far, in bind order.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Hand over the subscription arena and the dependency index.
    pub fn finish(self) -> (Vec<Subscription>, DependencyGraph) {
        (self.subscriptions, self.graph)
    }

    fn compile_attributes(&mut self, element: NodeId) {
        for (name, value) in self.document.attributes(element) {
            if let Some(kind) = name.strip_prefix(DIRECTIVE_PREFIX) {
                self.document.remove_attribute(element, &name);
                self.bind(element, kind, &name, &value);
            } else if let Some(event) = name.strip_prefix(EVENT_PREFIX) {
                self.document.remove_attribute(element, &name);
                self.bind_event(element, event, &value);
            }
        }
    }

    fn bind(&mut self, node: NodeId, kind: &str, label: &str, expression: &str) {
        let Some(directive) = self.directives.get(kind) else {
            debug!(node = %node, kind, "ignoring unknown directive");
            return;
        };

        if let Err(source) = self.try_bind(directive, node, kind, label, expression) {
            let error = BindingError::new(label, expression, node, source);
            warn!(%error, "skipping binding");
            self.diagnostics.report(error);
        }
    }

    fn try_bind(
        &mut self,
        directive: Arc<dyn Directive>,
        node: NodeId,
        kind: &str,
        label: &str,
        expression: &str,
    ) -> Result<()> {
        let path: ExpressionPath = expression.parse()?;
        let binding = Binding {
            node,
            kind: kind.to_owned(),
            path: path.clone(),
        };

        let value = self.root.get(&path)?;
        directive.render(self.document, node, &value)?;

        let ctx = BindContext {
            root: self.root,
            document: self.document,
            diagnostics: self.diagnostics,
        };
        directive.attach(&ctx, &binding)?;

        let callback = {
            let root = self.root.clone();
            let document = self.document.clone();
            let label = label.to_owned();
            let path = path.clone();
            move || {
                root.get(&path)
                    .and_then(|value| directive.render(&document, node, &value))
                    .map_err(|source| BindingError::new(label.as_str(), path.as_str(), node, source))
            }
        };

        let subscription = Subscription::record(self.root, path, self.diagnostics.clone(), callback)?;
        trace!(
            node = %node,
            kind,
            subscriber = ?subscription.id(),
            cells = subscription.dependencies().len(),
            "bound"
        );

        self.document.pin(node);
        self.graph.record(subscription.id(), subscription.dependencies());
        self.subscriptions.push(subscription);
        Ok(())
    }

    fn bind_event(&mut self, node: NodeId, event: &str, method: &str) {
        let Some(handler) = self.methods.get(method) else {
            debug!(node = %node, event, method, "ignoring unknown handler");
            return;
        };

        let root = self.root.clone();
        self.document
            .add_event_listener(node, event, move |event| handler(&root, event));
    }
}
