//! Weave Core
//!
//! A small reactive view-binding engine. It instruments a nested data
//! mapping so every key is a reactive cell, compiles a markup subtree's
//! directives into bindings, and re-renders each binding synchronously when
//! a cell it read changes.
//!
//! # Architecture
//!
//! - `reactive`: cells, dependency sets, subscriptions and the active-recorder slot
//! - `graph`: the explicit cell/subscription index built at bind time
//! - `dom`: the in-memory host tree the bindings render into
//! - `compiler`: the tree walk and the directive table (`v-text`, `v-html`, `v-model`)
//! - `view`: mounting, and ownership of every live binding
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use weave_core::{Document, Options, Value, View};
//!
//! let doc = Document::from_markup(r#"<p>{{ msg }}</p><input v-model="msg">"#)?;
//! let view = View::mount(&doc, Options::new().data(json!({ "msg": "hi" })))?;
//! assert_eq!(doc.inner_html(doc.body()), r#"<p>hi</p><input>"#);
//!
//! view.set("msg", "bye")?;
//! assert_eq!(doc.text_content(doc.body()), "bye");
//!
//! let input = doc.query("input").unwrap();
//! doc.input(input, "yo");
//! assert_eq!(view.get("msg")?, Value::from("yo"));
//! # Ok::<(), weave_core::Error>(())
//! ```

pub mod compiler;
pub mod dom;
pub mod error;
pub mod graph;
pub mod options;
pub mod reactive;
pub mod view;

pub use compiler::{Directive, DirectiveTable};
pub use dom::{Document, Event, NodeId};
pub use error::{BindingError, Diagnostics, Error, MarkupError, Result};
pub use options::{Methods, MountPoint, Options};
pub use reactive::{ReactiveObject, ReactiveRoot, Value};
pub use view::View;
