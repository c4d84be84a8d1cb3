//! Selector layer - distinct, derived views over the state cell
//!
//! A projector applies a projection to every published state and reports a
//! value only when it differs from the last value it reported. Each selector
//! owns its projector, so selectors over the same store never share a cache.
//!
//! A projection that returns an error or panics terminates that one
//! selector; the store and its other selectors are not affected.

use crate::error::panic_message;
use crate::subscription::lock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Outcome of projecting one state value
#[derive(Debug, PartialEq)]
pub(crate) enum Projected<R, E> {
    Changed(R),
    Unchanged,
    Failed(E),
    Panicked(String),
}

pub(crate) struct Projector<F, R> {
    projection: F,
    last: Mutex<Option<R>>,
    terminated: AtomicBool,
}

impl<F, R> Projector<F, R> {
    pub(crate) fn new(projection: F) -> Self {
        Self {
            projection,
            last: Mutex::new(None),
            terminated: AtomicBool::new(false),
        }
    }

    pub(crate) fn project<S, E>(&self, state: &S) -> Projected<R, E>
    where
        F: Fn(&S) -> Result<R, E>,
        R: Clone + PartialEq,
    {
        if self.terminated.load(Ordering::Acquire) {
            return Projected::Unchanged;
        }

        match panic::catch_unwind(AssertUnwindSafe(|| (self.projection)(state))) {
            Ok(Ok(value)) => {
                let mut last = lock(&self.last);
                if last.as_ref() == Some(&value) {
                    Projected::Unchanged
                } else {
                    *last = Some(value.clone());
                    Projected::Changed(value)
                }
            }
            Ok(Err(error)) => {
                self.terminated.store(true, Ordering::Release);
                Projected::Failed(error)
            }
            Err(payload) => {
                self.terminated.store(true, Ordering::Release);
                Projected::Panicked(panic_message(payload.as_ref()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Debug, Clone)]
    struct Pair {
        a: u32,
        b: u32,
    }

    fn select_a(state: &Pair) -> Result<u32, Infallible> {
        Ok(state.a)
    }

    #[test]
    fn test_equal_projections_are_reported_once() {
        let projector = Projector::new(select_a);

        assert_eq!(projector.project(&Pair { a: 1, b: 0 }), Projected::Changed(1));
        assert_eq!(projector.project(&Pair { a: 1, b: 7 }), Projected::Unchanged);
        assert_eq!(projector.project(&Pair { a: 2, b: 7 }), Projected::Changed(2));
    }

    #[test]
    fn test_projectors_keep_separate_caches() {
        let first = Projector::new(select_a);
        let second = Projector::new(|state: &Pair| Ok::<_, Infallible>(state.b));

        let state = Pair { a: 1, b: 1 };
        assert_eq!(first.project(&state), Projected::Changed(1));
        assert_eq!(second.project(&state), Projected::Changed(1));
        assert_eq!(first.project(&state), Projected::Unchanged);
    }

    #[test]
    fn test_error_terminates_projector() {
        let projector = Projector::new(|state: &Pair| {
            if state.b > 0 {
                Err("b must stay zero")
            } else {
                Ok(state.a)
            }
        });

        assert_eq!(projector.project(&Pair { a: 1, b: 0 }), Projected::Changed(1));
        assert_eq!(
            projector.project(&Pair { a: 1, b: 1 }),
            Projected::Failed("b must stay zero")
        );
        assert_eq!(projector.project(&Pair { a: 5, b: 0 }), Projected::Unchanged);
    }

    #[test]
    fn test_panic_terminates_projector() {
        let projector = Projector::new(|state: &Pair| -> Result<u32, Infallible> {
            assert!(state.a < 10, "a out of range");
            Ok(state.a)
        });

        assert_eq!(
            projector.project(&Pair { a: 10, b: 0 }),
            Projected::Panicked("a out of range".to_string())
        );
        assert_eq!(projector.project(&Pair { a: 1, b: 0 }), Projected::Unchanged);
    }
}
