//! Subscriptions
//!
//! A Subscription is "this update callback depends on whatever cells get
//! read while it is being recorded". It is created by performing exactly one
//! read of an expression path with the subscription installed as the active
//! recorder. Every cell touched by that read registers the subscription.
//!
//! The dependency set is fixed at construction: `update()` only re-runs the
//! callback, it never records again.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::error::{BindingError, Diagnostics, Result};

use super::cell::CellId;
use super::context::ReactiveContext;
use super::path::ExpressionPath;
use super::root::ReactiveRoot;

/// Unique identifier for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

type Callback = Box<dyn Fn() -> std::result::Result<(), BindingError> + Send + Sync>;

struct Inner {
    id: SubscriberId,
    path: ExpressionPath,
    callback: Callback,
    /// Cells read during the recording.
    dependencies: RwLock<SmallVec<[CellId; 4]>>,
    diagnostics: Diagnostics,
}

/// A recorded dependent of one or more reactive cells.
///
/// Cloning is cheap and shares the subscription. Cells only hold weak
/// references; the owning view keeps the strong ones.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

impl Subscription {
    /// Record a new subscription on `path`.
    ///
    /// The active-recorder slot is held for the single read of `path` and
    /// released on every exit path. A failed read leaves no live
    /// subscription behind: the cells it touched only keep a weak reference.
    pub fn record<F>(
        root: &ReactiveRoot,
        path: ExpressionPath,
        diagnostics: Diagnostics,
        callback: F,
    ) -> Result<Self>
    where
        F: Fn() -> std::result::Result<(), BindingError> + Send + Sync + 'static,
    {
        let subscription = Self {
            inner: Arc::new(Inner {
                id: SubscriberId::new(),
                path,
                callback: Box::new(callback),
                dependencies: RwLock::new(SmallVec::new()),
                diagnostics,
            }),
        };

        let recorded = {
            let ctx = ReactiveContext::enter(&subscription)?;
            root.get(&subscription.inner.path)?;
            ctx.finish()
        };

        tracing::trace!(
            subscriber = ?subscription.id(),
            path = %subscription.inner.path,
            cells = recorded.len(),
            "recorded subscription"
        );
        *subscription.inner.dependencies.write() = recorded;

        Ok(subscription)
    }

    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    pub fn path(&self) -> &ExpressionPath {
        &self.inner.path
    }

    /// Cells this subscription registered with while recording.
    pub fn dependencies(&self) -> SmallVec<[CellId; 4]> {
        self.inner.dependencies.read().clone()
    }

    /// Re-run the callback. Failures are reported, never propagated.
    pub fn update(&self) {
        if let Err(error) = (self.inner.callback)() {
            tracing::warn!(subscriber = ?self.inner.id, %error, "binding update failed");
            self.inner.diagnostics.report(error);
        }
    }

    pub(crate) fn downgrade(&self) -> WeakSubscription {
        WeakSubscription {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.id)
            .field("path", &self.inner.path)
            .field("dependency_count", &self.inner.dependencies.read().len())
            .finish()
    }
}

/// Non-owning handle stored in dependency sets.
#[derive(Clone)]
pub(crate) struct WeakSubscription {
    id: SubscriberId,
    inner: Weak<Inner>,
}

impl WeakSubscription {
    pub(crate) fn id(&self) -> SubscriberId {
        self.id
    }

    pub(crate) fn upgrade(&self) -> Option<Subscription> {
        self.inner.upgrade().map(|inner| Subscription { inner })
    }
}
