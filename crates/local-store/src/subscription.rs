//! Observer lists and subscription handles
//!
//! The action channel and the state cell both fan values out to a list of
//! plain callbacks. A [`Subscription`] removes its callback again when it is
//! released or dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback registered on an observer list
pub(crate) type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Lock a mutex, recovering the guard if a previous holder panicked.
///
/// Every value guarded in this crate is replaced as a whole, so a poisoned
/// lock never exposes a half-written value.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered list of observers
pub(crate) struct ObserverList<T> {
    observers: Vec<(u64, Callback<T>)>,
}

impl<T> ObserverList<T> {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, callback: Callback<T>) -> u64 {
        let id = NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed);
        self.observers.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.observers.retain(|(observer_id, _)| *observer_id != id);
    }

    /// Copy of the current observers, so callbacks run without holding any lock
    pub(crate) fn snapshot(&self) -> Vec<Callback<T>> {
        self.observers
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.observers.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

/// Handle to a registered observer
///
/// Dropping the handle releases the observer. Use [`Subscription::detach`]
/// to keep it registered until the store is destroyed.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Subscription that removes observer `id` from the list owned by `owner`.
    ///
    /// Holds the owner weakly, so an outstanding handle never keeps a
    /// destroyed store alive.
    pub(crate) fn remove_from<M, T>(
        owner: &Arc<Mutex<M>>,
        id: u64,
        list: fn(&mut M) -> &mut ObserverList<T>,
    ) -> Self
    where
        M: Send + 'static,
        T: 'static,
    {
        let owner: Weak<Mutex<M>> = Arc::downgrade(owner);
        Self::new(move || {
            if let Some(owner) = owner.upgrade() {
                list(&mut lock(&owner)).remove(id);
            }
        })
    }

    /// Release the observer now
    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Keep the observer registered for the remaining lifetime of the store
    pub fn detach(mut self) {
        self.release = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
