//! Reactive Primitives
//!
//! This module implements the dependency-tracking engine: cells, dependency
//! sets and subscriptions, plus the instrumented data graph they live in.
//!
//! # Concepts
//!
//! ## Cells
//!
//! A [`ReactiveCell`] wraps one property slot. Reading it while a
//! subscription is recording registers that subscription; writing a
//! different value notifies every registered subscription.
//!
//! ## Subscriptions
//!
//! A [`Subscription`] is an update callback plus the set of cells it read
//! during one recording. It is created by performing a single read of an
//! expression path with the subscription installed in the active-recorder
//! slot ([`ReactiveContext`]).
//!
//! ## The data graph
//!
//! [`ReactiveObject`] instruments a nested mapping so every key at every
//! level is a cell. [`ReactiveRoot`] is the view's accessor surface over
//! it: expression paths like `user.name` resolve through proxied top-level
//! keys and descend cell by cell, so every cell on the path is recorded.
//!
//! # Implementation Notes
//!
//! Dependencies are discovered once, at bind time, and never re-recorded.
//! Updates are synchronous: a write re-renders every dependent before the
//! write returns.

mod cell;
mod context;
mod dependency;
mod object;
mod path;
mod root;
mod subscriber;
mod value;

pub use cell::{CellId, ReactiveCell};
pub use context::ReactiveContext;
pub use dependency::DependencySet;
pub use object::ReactiveObject;
pub use path::ExpressionPath;
pub use root::ReactiveRoot;
pub use subscriber::{SubscriberId, Subscription};
pub use value::Value;
