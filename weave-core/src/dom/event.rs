//! Events delivered to listeners attached with
//! [`Document::add_event_listener`](super::Document::add_event_listener).

use std::sync::Arc;

use super::NodeId;

/// A listener callback. Listeners run after the document lock is released,
/// so they may freely read and mutate the tree.
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// A dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: String,
    target: NodeId,
    value: Option<String>,
}

impl Event {
    pub fn new(kind: impl Into<String>, target: NodeId, value: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            target,
            value,
        }
    }

    /// Event type, e.g. `input` or `click`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The target's current control value at dispatch time.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}
