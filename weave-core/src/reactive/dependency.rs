//! Dependency Sets
//!
//! Each reactive cell owns one dependency set: the subscriptions that read
//! the cell while recording. Writing the cell notifies them, synchronously
//! and in registration order.

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::context::propagation_lock;
use super::subscriber::{SubscriberId, Subscription, WeakSubscription};

/// Subscribers of one cell.
///
/// Entries are weak: subscriptions are owned by the view that created them,
/// and entries whose subscription is gone are pruned on the next notify.
#[derive(Default)]
pub struct DependencySet {
    subscribers: Mutex<SmallVec<[WeakSubscription; 2]>>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber.
    ///
    /// Returns `false` if it was already registered; repeated reads of the
    /// same cell during one recording register it once.
    pub fn register(&self, subscription: &Subscription) -> bool {
        let mut subscribers = self.subscribers.lock();
        if subscribers.iter().any(|s| s.id() == subscription.id()) {
            return false;
        }
        subscribers.push(subscription.downgrade());
        true
    }

    /// Run `update()` on every live subscriber. Returns how many ran.
    ///
    /// The set is snapshotted before any callback runs, so callbacks may
    /// read and write cells (including this one) freely.
    pub fn notify(&self) -> usize {
        let _serial = propagation_lock();

        let live: SmallVec<[Subscription; 2]> = {
            let mut subscribers = self.subscribers.lock();
            subscribers.retain(|s| s.upgrade().is_some());
            subscribers.iter().filter_map(WeakSubscription::upgrade).collect()
        };

        for subscription in &live {
            subscription.update();
        }
        live.len()
    }

    /// Number of registered subscribers, including ones not yet pruned.
    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.lock().iter().any(|s| s.id() == id)
    }
}

impl std::fmt::Debug for DependencySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencySet")
            .field("len", &self.len())
            .finish()
    }
}
