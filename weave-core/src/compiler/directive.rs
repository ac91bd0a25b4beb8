//! Directive Dispatch
//!
//! A directive is the render function behind a binding kind. The table maps
//! the suffix of a `v-` attribute (`text`, `html`, `model`, ...) to its
//! directive; kinds missing from the table produce no binding.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::dom::{Document, NodeId};
use crate::error::{BindingError, Diagnostics, Result};
use crate::reactive::{ExpressionPath, ReactiveRoot, Value};

/// One binding extracted by the compiler.
#[derive(Debug, Clone)]
pub struct Binding {
    pub node: NodeId,
    /// Binding kind, without the directive prefix.
    pub kind: String,
    pub path: ExpressionPath,
}

/// What a directive may touch while attaching.
pub struct BindContext<'a> {
    pub root: &'a ReactiveRoot,
    pub document: &'a Document,
    pub diagnostics: &'a Diagnostics,
}

/// A render function for one binding kind.
pub trait Directive: Send + Sync {
    /// Bring `node` in line with `value`. Runs for the initial render and
    /// on every change of the binding's dependencies.
    fn render(&self, document: &Document, node: NodeId, value: &Value) -> Result<()>;

    /// One-time setup, run right after the initial render and never on
    /// re-renders.
    fn attach(&self, _ctx: &BindContext<'_>, _binding: &Binding) -> Result<()> {
        Ok(())
    }
}

impl<F> Directive for F
where
    F: Fn(&Document, NodeId, &Value) -> Result<()> + Send + Sync,
{
    fn render(&self, document: &Document, node: NodeId, value: &Value) -> Result<()> {
        self(document, node, value)
    }
}

/// `v-text`: escaped text content.
pub struct Text;

impl Directive for Text {
    fn render(&self, document: &Document, node: NodeId, value: &Value) -> Result<()> {
        document.set_text_content(node, &value.to_display());
        Ok(())
    }
}

/// `v-html`: content parsed as markup.
pub struct Html;

impl Directive for Html {
    fn render(&self, document: &Document, node: NodeId, value: &Value) -> Result<()> {
        document.set_inner_html(node, &value.to_display())?;
        Ok(())
    }
}

/// `v-model`: two-way binding on a control's value.
pub struct Model;

impl Directive for Model {
    fn render(&self, document: &Document, node: NodeId, value: &Value) -> Result<()> {
        document.set_value(node, &value.to_display());
        Ok(())
    }

    /// Write every `input` event's control value back through the path.
    fn attach(&self, ctx: &BindContext<'_>, binding: &Binding) -> Result<()> {
        let root = ctx.root.clone();
        let diagnostics = ctx.diagnostics.clone();
        let path = binding.path.clone();

        ctx.document.add_event_listener(binding.node, "input", move |event| {
            let Some(input) = event.value() else {
                return;
            };
            if let Err(source) = root.set(&path, input) {
                let error = BindingError::new("v-model", path.as_str(), event.target(), source);
                tracing::warn!(%error, "two-way write failed");
                diagnostics.report(error);
            }
        });
        Ok(())
    }
}

/// Binding kind name to directive.
#[derive(Clone)]
pub struct DirectiveTable {
    directives: IndexMap<String, Arc<dyn Directive>>,
}

impl DirectiveTable {
    /// A table without any directives.
    pub fn empty() -> Self {
        Self {
            directives: IndexMap::new(),
        }
    }

    /// The built-in `text`, `html` and `model` directives.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        table.register("text", Text);
        table.register("html", Html);
        table.register("model", Model);
        table
    }

    /// Add or replace the directive for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, directive: impl Directive + 'static) -> &mut Self {
        self.directives.insert(kind.into(), Arc::new(directive));
        self
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn Directive>> {
        self.directives.get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.directives.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.directives.keys().map(String::as_str)
    }
}

impl Default for DirectiveTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for DirectiveTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_table_has_three_kinds() {
        let table = DirectiveTable::builtin();
        assert_eq!(table.kinds().collect::<Vec<_>>(), vec!["text", "html", "model"]);
        assert!(table.get("show").is_none());
    }

    #[test]
    fn text_escapes_and_html_parses() {
        let doc = Document::from_markup("<p></p><div></div>").unwrap();
        let p = doc.query("p").unwrap();
        let div = doc.query("div").unwrap();
        let markup = Value::from("<b>x</b>");

        Text.render(&doc, p, &markup).unwrap();
        Html.render(&doc, div, &markup).unwrap();

        assert_eq!(doc.inner_html(p), "&lt;b&gt;x&lt;/b&gt;");
        assert_eq!(doc.inner_html(div), "<b>x</b>");
    }

    #[test]
    fn model_attach_writes_back_through_the_path() {
        let doc = Document::from_markup("<input>").unwrap();
        let input = doc.query("input").unwrap();
        let Value::Object(data) = Value::from(json!({ "form": { "name": "" } })) else {
            unreachable!()
        };
        let root = ReactiveRoot::new(data);
        let diagnostics = Diagnostics::new();
        let binding = Binding {
            node: input,
            kind: "model".into(),
            path: "form.name".parse().unwrap(),
        };

        let ctx = BindContext { root: &root, document: &doc, diagnostics: &diagnostics };
        Model.attach(&ctx, &binding).unwrap();
        doc.input(input, "typed");

        assert_eq!(root.read("form.name").unwrap(), Value::from("typed"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn closures_are_directives() {
        let mut table = DirectiveTable::empty();
        table.register("upper", |doc: &Document, node: NodeId, value: &Value| -> Result<()> {
            doc.set_text_content(node, &value.to_display().to_uppercase());
            Ok(())
        });

        let doc = Document::from_markup("<p></p>").unwrap();
        let p = doc.query("p").unwrap();
        table.get("upper").unwrap().render(&doc, p, &Value::from("hi")).unwrap();
        assert_eq!(doc.text_content(p), "HI");
    }
}
