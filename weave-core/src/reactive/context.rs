//! Reactive Context
//!
//! The reactive context holds the single "active recorder" slot: the
//! subscription currently performing its dependency-recording read. When a
//! cell is read while the slot is occupied, the cell registers that
//! subscription as a dependent.
//!
//! # Implementation
//!
//! The slot is thread-local and holds at most one recording. Recordings do
//! not nest: entering while the slot is occupied is an error rather than a
//! silent overwrite. The slot is released by the guard's `Drop`, so a read
//! that fails (or panics) still clears it.
//!
//! Recordings and notifications are additionally serialized process-wide by
//! a reentrant propagation lock, so a recording on one thread never observes
//! a notification running on another.

use std::cell::RefCell;
use std::sync::LazyLock;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use smallvec::SmallVec;

use crate::error::{Error, Result};

use super::cell::CellId;
use super::subscriber::{SubscriberId, Subscription};

thread_local! {
    static ACTIVE_RECORDER: RefCell<Option<Recording>> = const { RefCell::new(None) };
}

static PROPAGATION: LazyLock<ReentrantMutex<()>> = LazyLock::new(|| ReentrantMutex::new(()));

/// Enter the propagation critical section. Reentrant on the same thread.
pub(crate) fn propagation_lock() -> ReentrantMutexGuard<'static, ()> {
    PROPAGATION.lock()
}

/// The occupant of the active-recorder slot.
struct Recording {
    subscription: Subscription,
    /// Cells read during this recording, in first-read order.
    cells: SmallVec<[CellId; 4]>,
}

/// Guard that clears the active-recorder slot when dropped.
pub struct ReactiveContext {
    subscriber_id: SubscriberId,
    _serial: ReentrantMutexGuard<'static, ()>,
}

impl ReactiveContext {
    /// Install `subscription` as the active recorder.
    ///
    /// Fails with [`Error::RecordingInProgress`] if another recording already
    /// holds the slot on this thread.
    pub fn enter(subscription: &Subscription) -> Result<Self> {
        let serial = propagation_lock();

        ACTIVE_RECORDER.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_some() {
                return Err(Error::RecordingInProgress);
            }
            *slot = Some(Recording {
                subscription: subscription.clone(),
                cells: SmallVec::new(),
            });
            Ok(())
        })?;

        Ok(Self {
            subscriber_id: subscription.id(),
            _serial: serial,
        })
    }

    /// Check if a recording is in progress on this thread.
    pub fn is_active() -> bool {
        ACTIVE_RECORDER.with(|slot| slot.borrow().is_some())
    }

    /// The subscription currently recording, if any.
    pub fn current_subscription() -> Option<Subscription> {
        ACTIVE_RECORDER.with(|slot| {
            slot.borrow()
                .as_ref()
                .map(|recording| recording.subscription.clone())
        })
    }

    /// Note that `cell` was read by the current recording.
    pub fn track(cell: CellId) {
        ACTIVE_RECORDER.with(|slot| {
            if let Some(recording) = slot.borrow_mut().as_mut() {
                if !recording.cells.contains(&cell) {
                    recording.cells.push(cell);
                }
            }
        });
    }

    /// Leave the context, returning the cells read while it was active.
    pub fn finish(self) -> SmallVec<[CellId; 4]> {
        ACTIVE_RECORDER.with(|slot| {
            slot.borrow_mut()
                .as_mut()
                .map(|recording| std::mem::take(&mut recording.cells))
                .unwrap_or_default()
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        ACTIVE_RECORDER.with(|slot| {
            let cleared = slot.borrow_mut().take();

            if let Some(recording) = cleared {
                debug_assert_eq!(
                    recording.subscription.id(),
                    self.subscriber_id,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.subscriber_id,
                    recording.subscription.id()
                );
            }
        });
    }
}
