//! State cell - the single shared value of a store
//!
//! Holds the latest state and re-publishes every value the scheduler hands
//! it. No equality check happens here; filtering redundant values is the job
//! of selectors.

use crate::subscription::{lock, Callback, ObserverList, Subscription};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A published state value together with its position in the sequence
struct Published<S> {
    version: u64,
    value: Arc<S>,
}

impl<S> Clone for Published<S> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            value: Arc::clone(&self.value),
        }
    }
}

struct CellInner<S> {
    current: Published<S>,
    observers: ObserverList<Published<S>>,
}

fn observers<S>(inner: &mut CellInner<S>) -> &mut ObserverList<Published<S>> {
    &mut inner.observers
}

/// A committed value on its way to the observers
#[must_use = "a committed value reaches no observer until delivered"]
pub(crate) struct Delivery<S> {
    published: Published<S>,
    observers: Vec<Callback<Published<S>>>,
}

impl<S> Delivery<S> {
    pub(crate) fn deliver(self) {
        for observer in self.observers {
            observer(&self.published);
        }
    }
}

pub(crate) struct StateCell<S> {
    inner: Arc<Mutex<CellInner<S>>>,
}

impl<S: Send + Sync + 'static> StateCell<S> {
    /// Cell seeded with the value the first reducer call starts from
    pub(crate) fn new(seed: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CellInner {
                current: Published {
                    version: 1,
                    value: Arc::new(seed),
                },
                observers: ObserverList::new(),
            })),
        }
    }

    pub(crate) fn get(&self) -> Arc<S> {
        Arc::clone(&lock(&self.inner).current.value)
    }

    /// Replace the current value and hand it to every observer
    #[cfg(test)]
    pub(crate) fn publish(&self, value: S) {
        self.commit(value).deliver();
    }

    /// Replace the current value without notifying anyone yet
    ///
    /// The returned delivery notifies the observers registered at commit
    /// time. It must run once no lock is held, since observers may dispatch.
    pub(crate) fn commit(&self, value: S) -> Delivery<S> {
        let mut inner = lock(&self.inner);
        inner.current = Published {
            version: inner.current.version + 1,
            value: Arc::new(value),
        };
        Delivery {
            published: inner.current.clone(),
            observers: inner.observers.snapshot(),
        }
    }

    /// Observe the current value immediately, then every later one.
    ///
    /// Observers never go backwards: a value older than one already
    /// delivered is skipped, even when a subscription races a publication
    /// running on another thread.
    pub(crate) fn subscribe(&self, callback: Callback<Arc<S>>) -> Subscription {
        let seen = AtomicU64::new(0);
        let observer: Callback<Published<S>> = Arc::new(move |published: &Published<S>| {
            if seen.fetch_max(published.version, Ordering::AcqRel) < published.version {
                callback(&published.value);
            }
        });

        let (id, current) = {
            let mut inner = lock(&self.inner);
            let id = inner.observers.insert(Arc::clone(&observer));
            (id, inner.current.clone())
        };
        let subscription = Subscription::remove_from(&self.inner, id, observers);

        observer(&current);
        subscription
    }

    pub(crate) fn clear(&self) -> usize {
        let mut inner = lock(&self.inner);
        let released = inner.observers.len();
        inner.observers.clear();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(seen: &Arc<Mutex<Vec<u32>>>) -> Callback<Arc<u32>> {
        let seen = Arc::clone(seen);
        Arc::new(move |value: &Arc<u32>| lock(&seen).push(**value))
    }

    #[test]
    fn test_subscribe_yields_current_then_updates() {
        let cell = StateCell::new(0u32);
        cell.publish(1);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _subscription = cell.subscribe(recorder(&seen));
        cell.publish(2);
        cell.publish(3);

        assert_eq!(*lock(&seen), vec![1, 2, 3]);
        assert_eq!(*cell.get(), 3);
    }

    #[test]
    fn test_identical_values_are_republished() {
        let cell = StateCell::new(5u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _subscription = cell.subscribe(recorder(&seen));

        cell.publish(5);
        cell.publish(5);

        assert_eq!(*lock(&seen), vec![5, 5, 5]);
    }

    #[test]
    fn test_observer_may_subscribe_from_callback() {
        let cell = Arc::new(StateCell::new(0u32));
        let nested = Arc::new(Mutex::new(Vec::new()));
        let held = Arc::new(Mutex::new(Vec::new()));

        let callback: Callback<Arc<u32>> = {
            let cell = Arc::clone(&cell);
            let nested = Arc::clone(&nested);
            let held = Arc::clone(&held);
            Arc::new(move |value: &Arc<u32>| {
                if **value == 1 {
                    lock(&held).push(cell.subscribe(recorder(&nested)));
                }
            })
        };
        let _outer = cell.subscribe(callback);

        cell.publish(1);
        cell.publish(2);

        assert_eq!(*lock(&nested), vec![1, 2]);
        lock(&held).clear();
    }

    #[test]
    fn test_clear_releases_observers() {
        let cell = StateCell::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _subscription = cell.subscribe(recorder(&seen));

        assert_eq!(cell.clear(), 1);
        cell.publish(1);

        assert_eq!(*lock(&seen), vec![0]);
        assert_eq!(*cell.get(), 1);
    }
}
