//! Reactive Cells
//!
//! A cell wraps one property slot of an instrumented mapping. It is the
//! fundamental reactive primitive of the data graph.
//!
//! # How Cells Work
//!
//! 1. When a cell is read while a subscription is recording, the cell
//!    registers that subscription in its dependency set. Recording is a
//!    side effect of the read, not of the value.
//!
//! 2. When a cell is written with a value different from the current one,
//!    the value is replaced and every registered subscription is notified.
//!
//! 3. Writing an equal value is a no-op. Equality is primitive equality for
//!    scalars and identity for mappings and lists (see [`Value`]).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::dependency::DependencySet;
use super::value::Value;

/// Unique identifier for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

impl CellId {
    /// Generate a new unique cell ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

struct Inner {
    id: CellId,
    key: String,
    value: RwLock<Value>,
    dependents: DependencySet,
}

/// One intercepted property slot.
///
/// Cloning shares the cell.
#[derive(Clone)]
pub struct ReactiveCell {
    inner: Arc<Inner>,
}

impl ReactiveCell {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: CellId::new(),
                key: key.into(),
                value: RwLock::new(value),
                dependents: DependencySet::new(),
            }),
        }
    }

    pub fn id(&self) -> CellId {
        self.inner.id
    }

    /// The property name this cell intercepts.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Get the current value, registering the active recorder if any.
    pub fn get(&self) -> Value {
        if let Some(subscription) = ReactiveContext::current_subscription() {
            if self.inner.dependents.register(&subscription) {
                tracing::trace!(cell = ?self.inner.id, key = %self.inner.key, subscriber = ?subscription.id(), "registered dependent");
            }
            ReactiveContext::track(self.inner.id);
        }

        self.inner.value.read().clone()
    }

    /// Get the current value without recording a dependency.
    pub fn get_untracked(&self) -> Value {
        self.inner.value.read().clone()
    }

    /// Write a new value and notify dependents.
    ///
    /// Returns `false` without notifying when `value` equals the current value.
    pub fn set(&self, value: Value) -> bool {
        {
            let mut guard = self.inner.value.write();
            if *guard == value {
                return false;
            }
            *guard = value;
        }

        let notified = self.inner.dependents.notify();
        tracing::trace!(cell = ?self.inner.id, key = %self.inner.key, notified, "cell changed");
        true
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.dependents.len()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ReactiveCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveCell")
            .field("id", &self.inner.id)
            .field("key", &self.inner.key)
            .field("value", &self.get_untracked())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
