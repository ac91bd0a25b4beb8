//! Error Types
//!
//! Every fallible operation in the crate returns [`Result`]. Failures that
//! belong to one binding are wrapped in a [`BindingError`] so the compiler
//! and the notification path can report them and keep going.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::dom::NodeId;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the reactive core, the tree and the view.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid expression `{0}`")]
    InvalidExpression(String),

    #[error("`{path}`: no property `{segment}`")]
    UnresolvedPath { path: String, segment: String },

    #[error("`{path}`: `{segment}` is not a mapping")]
    NotAMapping { path: String, segment: String },

    #[error("a dependency recording is already in progress on this thread")]
    RecordingInProgress,

    #[error("view data must be a mapping, got {0}")]
    InvalidData(&'static str),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error("invalid options")]
    Options(#[from] serde_json::Error),
}

/// Errors produced while parsing markup.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("bad escape sequence")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("markup is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
}

/// A failure tied to one binding: which directive, which expression, which node.
#[derive(Debug, Error)]
#[error("binding `{kind}=\"{expression}\"` on node {node}: {source}")]
pub struct BindingError {
    pub kind: String,
    pub expression: String,
    pub node: NodeId,
    #[source]
    pub source: Error,
}

impl BindingError {
    pub fn new(kind: impl Into<String>, expression: impl Into<String>, node: NodeId, source: Error) -> Self {
        Self {
            kind: kind.into(),
            expression: expression.into(),
            node,
            source,
        }
    }
}

/// Collector for binding failures that must not abort the caller.
///
/// Cloning shares the underlying list.
#[derive(Clone, Default)]
pub struct Diagnostics {
    entries: Arc<Mutex<Vec<BindingError>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, error: BindingError) {
        self.entries.lock().push(error);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Rendered messages, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(ToString::to_string).collect()
    }

    /// Remove and return everything reported so far.
    pub fn drain(&self) -> Vec<BindingError> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_error_names_the_binding() {
        let err = BindingError::new(
            "v-text",
            "user.age",
            NodeId::from(3),
            Error::UnresolvedPath {
                path: "user.age".into(),
                segment: "age".into(),
            },
        );
        let message = err.to_string();
        assert!(message.contains("v-text=\"user.age\""));
        assert!(message.contains("no property `age`"));
    }

    #[test]
    fn diagnostics_are_shared_between_clones() {
        let diagnostics = Diagnostics::new();
        let other = diagnostics.clone();

        other.report(BindingError::new("v-html", "x", NodeId::from(0), Error::RecordingInProgress));
        assert_eq!(diagnostics.len(), 1);

        let drained = diagnostics.drain();
        assert_eq!(drained.len(), 1);
        assert!(other.is_empty());
    }
}
