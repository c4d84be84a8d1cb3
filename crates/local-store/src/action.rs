//! Actions and the action channel
//!
//! Actions are typed per feature (usually one enum per store). The channel is
//! the multicast side of dispatch: every action the scheduler applies is
//! handed to all current observers, which is how effects react to actions.

use crate::subscription::{lock, Callback, ObserverList, Subscription};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// Kind of the synthetic action every store dispatches on construction
pub const INIT_KIND: &str = "init-store";

/// An immutable event describing an intended state transition
pub trait Action: Clone + Debug + Send + Sync + 'static {
    /// The synthetic initialization action
    fn init() -> Self;

    /// Discriminant of this action, e.g. `"[Slideshow] play"`
    fn kind(&self) -> &'static str;
}

struct ChannelObservers<A> {
    observers: ObserverList<A>,
}

fn observers<A>(channel: &mut ChannelObservers<A>) -> &mut ObserverList<A> {
    &mut channel.observers
}

/// Multicast channel of applied actions
pub(crate) struct ActionChannel<A> {
    inner: Arc<Mutex<ChannelObservers<A>>>,
}

impl<A: Action> ActionChannel<A> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChannelObservers {
                observers: ObserverList::new(),
            })),
        }
    }

    /// Observe every action published from now on
    pub(crate) fn subscribe(&self, callback: Callback<A>) -> Subscription {
        let id = lock(&self.inner).observers.insert(callback);
        Subscription::remove_from(&self.inner, id, observers)
    }

    pub(crate) fn publish(&self, action: &A) {
        let observers = lock(&self.inner).observers.snapshot();
        for observer in observers {
            observer(action);
        }
    }

    pub(crate) fn clear(&self) -> usize {
        let mut inner = lock(&self.inner);
        let released = inner.observers.len();
        inner.observers.clear();
        released
    }
}
