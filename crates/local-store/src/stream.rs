//! `futures::Stream` views over store observers
//!
//! Each stream owns the subscription that feeds it. Values are buffered in an
//! unbounded channel, so a slow consumer never blocks the scheduler and never
//! loses a value. The stream ends when it is released, when its source
//! terminates it, or when the store is destroyed.

use crate::subscription::{lock, Subscription};
use futures::Stream;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Stream of values observed on a store
#[must_use = "streams do nothing unless polled"]
pub struct StoreStream<T> {
    rx: UnboundedReceiver<T>,
    _subscription: Subscription,
}

/// All actions applied by a store, from subscription time on
pub type ActionStream<A> = StoreStream<A>;

/// Current state followed by every later state
pub type StateStream<S> = StoreStream<std::sync::Arc<S>>;

/// Current and later distinct values of a projection
pub type Selection<R> = StoreStream<R>;

impl<T> StoreStream<T> {
    pub(crate) fn new(rx: UnboundedReceiver<T>, subscription: Subscription) -> Self {
        Self {
            rx,
            _subscription: subscription,
        }
    }

    /// Release the subscription; buffered values are dropped
    pub fn unsubscribe(self) {}
}

impl<T> Stream for StoreStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<T> std::fmt::Debug for StoreStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreStream").finish_non_exhaustive()
    }
}

/// Sending half of a store stream that its source can close early
pub(crate) struct Outlet<T> {
    tx: Mutex<Option<UnboundedSender<T>>>,
}

impl<T> Outlet<T> {
    pub(crate) fn channel() -> (Self, UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    pub(crate) fn send(&self, value: T) {
        if let Some(tx) = lock(&self.tx).as_ref() {
            // A closed receiver means the stream was dropped and its
            // subscription is being released right now.
            let _ = tx.send(value);
        }
    }

    /// End the stream after the values already sent
    pub(crate) fn close(&self) {
        lock(&self.tx).take();
    }
}
