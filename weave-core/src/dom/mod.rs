//! Host Tree
//!
//! The binding engine consumes a small tree API: node-type discrimination,
//! attribute enumeration and removal, child traversal, fragment move-in and
//! move-out, and event-listener attachment. [`Document`] is an in-memory
//! arena implementation of that API, shared by handle so render callbacks
//! and event listeners can hold it.
//!
//! Nodes are never freed individually; detached nodes stay in the arena
//! until the document is dropped.

mod document;
mod event;
mod parse;
mod serialize;

pub use document::{Document, NodeId, NodeKind};
pub use event::{Event, Listener};
pub use parse::{is_void_element, parse_markup, Markup};
