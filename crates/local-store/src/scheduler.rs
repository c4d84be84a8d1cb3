//! Dispatch scheduler - the single authority that applies the reducer
//!
//! Dispatched actions are appended to a FIFO queue that is separate from the
//! call stack that dispatched them. The first caller that finds the queue
//! idle becomes the drainer and applies queued actions one by one until the
//! queue is empty. Every other caller only enqueues and returns:
//!
//! - re-entrant dispatch from a state or action observer running inside the
//!   drain loop is queued behind the current action instead of recursing,
//!   so arbitrarily long dispatch chains run with a bounded stack
//! - dispatch from an effect task on another thread is picked up by whoever
//!   is draining at the time
//!
//! ```text
//! dispatch(action) → queue → reducer(state, action) → state cell → action channel
//! ```

use crate::action::{Action, ActionChannel};
use crate::config::{ReducerFaultPolicy, StoreConfig};
use crate::error::{panic_message, StoreError};
use crate::state_cell::StateCell;
use crate::subscription::lock;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

/// Pure function producing the next state from the current state and an action
///
/// The state is handed over by value (a clone of the published state), so a
/// reducer is free to update it in place and return it.
pub trait Reducer<S, A>: Send + Sync + 'static {
    fn reduce(&self, state: S, action: &A) -> S;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(S, &A) -> S + Send + Sync + 'static,
{
    fn reduce(&self, state: S, action: &A) -> S {
        self(state, action)
    }
}

/// Lifecycle of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// No action has been applied yet
    Uninitialized,
    /// At least one action has been applied; accepting actions
    Ready,
    /// The reducer failed and the store stopped processing actions
    Halted,
    /// Torn down via `destroy`
    Destroyed,
}

impl StoreStatus {
    fn accepts_actions(self) -> bool {
        matches!(self, StoreStatus::Uninitialized | StoreStatus::Ready)
    }
}

struct QueueState<A> {
    pending: VecDeque<A>,
    draining: bool,
    status: StoreStatus,
}

/// FIFO of pending actions plus the "someone is draining" flag
struct DispatchQueue<A> {
    state: Mutex<QueueState<A>>,
}

impl<A: Action> DispatchQueue<A> {
    fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                draining: false,
                status: StoreStatus::Uninitialized,
            }),
        }
    }

    /// Append an action. Returns a drain handle if the caller has to drain.
    fn enqueue(&self, action: A, store: &str) -> Option<Drain<'_, A>> {
        let mut state = lock(&self.state);
        match state.status {
            StoreStatus::Halted => {
                log::warn!(
                    "[{}] Store halted after a reducer fault, dropping action: {:?}",
                    store,
                    action
                );
                return None;
            }
            StoreStatus::Destroyed => {
                log::debug!("[{}] Store destroyed, dropping action: {:?}", store, action);
                return None;
            }
            StoreStatus::Uninitialized | StoreStatus::Ready => {}
        }

        state.pending.push_back(action);
        if state.draining {
            return None;
        }
        state.draining = true;
        Some(Drain {
            queue: self,
            active: true,
        })
    }

    fn status(&self) -> StoreStatus {
        lock(&self.state).status
    }

    /// Run `commit` while the store still accepts actions
    ///
    /// Holds the queue lock throughout, so `terminate` either happens before
    /// (and `commit` never runs) or after the commit is complete.
    fn commit<T>(&self, commit: impl FnOnce() -> T) -> Option<T> {
        let mut state = lock(&self.state);
        if !state.status.accepts_actions() {
            return None;
        }
        state.status = StoreStatus::Ready;
        Some(commit())
    }

    /// Move to a terminal status and discard pending actions.
    ///
    /// A store can halt only while it accepts actions, and can be destroyed
    /// once. Returns false when the transition does not apply.
    fn terminate(&self, status: StoreStatus) -> bool {
        let mut state = lock(&self.state);
        let applies = match status {
            StoreStatus::Destroyed => state.status != StoreStatus::Destroyed,
            _ => state.status.accepts_actions(),
        };
        if !applies {
            return false;
        }
        state.status = status;
        let discarded = state.pending.len();
        state.pending.clear();
        if discarded > 0 {
            log::debug!("Discarded {} pending actions", discarded);
        }
        true
    }
}

/// Held by the caller that drains the queue
struct Drain<'a, A> {
    queue: &'a DispatchQueue<A>,
    active: bool,
}

impl<A> Drain<'_, A> {
    /// Next action to apply, or `None` once the queue is empty or the store stopped
    fn next(&mut self) -> Option<A> {
        let mut state = lock(&self.queue.state);
        let next = if state.status.accepts_actions() {
            state.pending.pop_front()
        } else {
            None
        };
        if next.is_none() {
            state.draining = false;
            self.active = false;
        }
        next
    }
}

impl<A> Drop for Drain<'_, A> {
    fn drop(&mut self) {
        // An observer panicked mid-drain; let the next dispatch drain again.
        // Actions queued before the panic stay pending until that dispatch.
        if self.active {
            lock(&self.queue.state).draining = false;
        }
    }
}

/// Owns the reducer, the state cell and the action channel of one store
pub(crate) struct Scheduler<S, A> {
    reducer: Box<dyn Reducer<S, A>>,
    queue: DispatchQueue<A>,
    cell: StateCell<S>,
    actions: ActionChannel<A>,
    config: Arc<StoreConfig>,
}

impl<S, A> Scheduler<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    pub(crate) fn new(
        reducer: Box<dyn Reducer<S, A>>,
        seed: S,
        config: Arc<StoreConfig>,
    ) -> Self {
        Self {
            reducer,
            queue: DispatchQueue::new(),
            cell: StateCell::new(seed),
            actions: ActionChannel::new(),
            config,
        }
    }

    pub(crate) fn cell(&self) -> &StateCell<S> {
        &self.cell
    }

    pub(crate) fn actions(&self) -> &ActionChannel<A> {
        &self.actions
    }

    pub(crate) fn status(&self) -> StoreStatus {
        self.queue.status()
    }

    /// Queue an action; drains the queue if nobody else is draining it
    pub(crate) fn dispatch(&self, action: A) {
        let Some(mut drain) = self.queue.enqueue(action, &self.config.name) else {
            return;
        };
        while let Some(action) = drain.next() {
            self.apply(action);
        }
    }

    fn apply(&self, action: A) {
        let current = self.cell.get();
        let reduced = panic::catch_unwind(AssertUnwindSafe(|| {
            self.reducer.reduce(S::clone(&current), &action)
        }));

        match reduced {
            Ok(next) => {
                // The store may have been destroyed while the reducer ran.
                let Some(delivery) = self.queue.commit(|| self.cell.commit(next)) else {
                    log::debug!(
                        "[{}] Store stopped, discarding: {:?}",
                        self.config.name,
                        action
                    );
                    return;
                };
                log::debug!("[{}] Action: {:?}", self.config.name, action);
                delivery.deliver();
                self.actions.publish(&action);
            }
            Err(payload) => {
                let error = StoreError::ReducerFault {
                    store: self.config.name.clone(),
                    action: action.kind(),
                    message: panic_message(payload.as_ref()),
                };
                self.config.reporter.report(&error);
                if self.config.reducer_fault_policy == ReducerFaultPolicy::Halt
                    && self.queue.terminate(StoreStatus::Halted)
                {
                    self.release_observers();
                }
            }
        }
    }

    /// Stop accepting actions and release every observer. Idempotent.
    pub(crate) fn close(&self) -> bool {
        if !self.queue.terminate(StoreStatus::Destroyed) {
            return false;
        }
        self.release_observers();
        true
    }

    /// Drop every state and action observer; their streams end
    fn release_observers(&self) {
        let released = self.cell.clear() + self.actions.clear();
        log::debug!("[{}] Released {} observers", self.config.name, released);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::INIT_KIND;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Init,
        Push(u32),
        Fail,
    }

    impl Action for Op {
        fn init() -> Self {
            Op::Init
        }

        fn kind(&self) -> &'static str {
            match self {
                Op::Init => INIT_KIND,
                Op::Push(_) => "push",
                Op::Fail => "fail",
            }
        }
    }

    fn reduce(mut state: Vec<u32>, action: &Op) -> Vec<u32> {
        match action {
            Op::Init => {}
            Op::Push(value) => state.push(*value),
            Op::Fail => panic!("reducer rejected action"),
        }
        state
    }

    fn scheduler(policy: ReducerFaultPolicy) -> Scheduler<Vec<u32>, Op> {
        let config = StoreConfig {
            name: "test".to_string(),
            reducer_fault_policy: policy,
            ..StoreConfig::default()
        };
        Scheduler::new(Box::new(reduce), Vec::new(), Arc::new(config))
    }

    #[test]
    fn test_first_action_makes_store_ready() {
        let scheduler = scheduler(ReducerFaultPolicy::Halt);
        assert_eq!(scheduler.status(), StoreStatus::Uninitialized);

        scheduler.dispatch(Op::Init);
        assert_eq!(scheduler.status(), StoreStatus::Ready);
    }

    #[test]
    fn test_actions_apply_in_dispatch_order() {
        let scheduler = scheduler(ReducerFaultPolicy::Halt);
        for value in 1..=5 {
            scheduler.dispatch(Op::Push(value));
        }
        assert_eq!(*scheduler.cell().get(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_halt_policy_drops_later_actions() {
        let scheduler = scheduler(ReducerFaultPolicy::Halt);
        scheduler.dispatch(Op::Push(1));
        scheduler.dispatch(Op::Fail);
        scheduler.dispatch(Op::Push(2));

        assert_eq!(scheduler.status(), StoreStatus::Halted);
        assert_eq!(*scheduler.cell().get(), vec![1]);
    }

    #[test]
    fn test_halt_releases_observers() {
        let scheduler = scheduler(ReducerFaultPolicy::Halt);
        let _state = scheduler.cell().subscribe(Arc::new(|_: &Arc<Vec<u32>>| {}));
        let _actions = scheduler.actions().subscribe(Arc::new(|_: &Op| {}));

        scheduler.dispatch(Op::Fail);

        assert_eq!(scheduler.status(), StoreStatus::Halted);
        assert_eq!(scheduler.cell().clear() + scheduler.actions().clear(), 0);
    }

    #[test]
    fn test_skip_policy_keeps_processing() {
        let scheduler = scheduler(ReducerFaultPolicy::SkipAction);
        scheduler.dispatch(Op::Push(1));
        scheduler.dispatch(Op::Fail);
        scheduler.dispatch(Op::Push(2));

        assert_eq!(scheduler.status(), StoreStatus::Ready);
        assert_eq!(*scheduler.cell().get(), vec![1, 2]);
    }

    #[test]
    fn test_panicking_observer_does_not_wedge_queue() {
        let scheduler = scheduler(ReducerFaultPolicy::Halt);
        let subscription = scheduler.actions().subscribe(Arc::new(|action: &Op| {
            if *action == Op::Push(1) {
                panic!("observer blew up");
            }
        }));

        let result = panic::catch_unwind(AssertUnwindSafe(|| scheduler.dispatch(Op::Push(1))));
        assert!(result.is_err());
        subscription.unsubscribe();

        scheduler.dispatch(Op::Push(2));
        assert_eq!(*scheduler.cell().get(), vec![1, 2]);
    }

    #[test]
    fn test_close_is_idempotent_and_final() {
        let scheduler = scheduler(ReducerFaultPolicy::Halt);
        scheduler.dispatch(Op::Push(1));

        assert!(scheduler.close());
        assert!(!scheduler.close());
        scheduler.dispatch(Op::Push(2));

        assert_eq!(scheduler.status(), StoreStatus::Destroyed);
        assert_eq!(*scheduler.cell().get(), vec![1]);
    }

    #[test]
    fn test_close_after_halt_still_tears_down() {
        let scheduler = scheduler(ReducerFaultPolicy::Halt);
        scheduler.dispatch(Op::Fail);
        assert_eq!(scheduler.status(), StoreStatus::Halted);

        assert!(scheduler.close());
        assert!(!scheduler.close());
        assert_eq!(scheduler.status(), StoreStatus::Destroyed);
    }
}
