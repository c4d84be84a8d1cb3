use crate::action::Action;
use crate::config::{ReducerFaultPolicy, StoreConfig};
use crate::effect::{self, EffectRegistry};
use crate::error::{EffectId, ErrorReporter, StoreError};
use crate::scheduler::{Reducer, Scheduler, StoreStatus};
use crate::selector::{Projected, Projector};
use crate::stream::{ActionStream, Outlet, Selection, StateStream, StoreStream};
use crate::subscription::Subscription;
use futures::Stream;
use std::convert::Infallible;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;

/// Store - holds one state value and manages the redux loop around it
///
/// The store follows the redux pattern:
/// - state changes only through dispatched actions
/// - one pure reducer computes every transition
/// - selectors derive distinct read-only views
/// - effects observe actions and state and dispatch further actions
///
/// `Store` is a cheap handle; clones share the same store. The owner calls
/// [`Store::destroy`] when it no longer needs the store.
///
/// ```rust
/// use local_store::{Action, Store, INIT_KIND};
///
/// #[derive(Debug, Clone)]
/// enum CounterAction {
///     Init,
///     Inc,
/// }
///
/// impl Action for CounterAction {
///     fn init() -> Self {
///         CounterAction::Init
///     }
///
///     fn kind(&self) -> &'static str {
///         match self {
///             CounterAction::Init => INIT_KIND,
///             CounterAction::Inc => "inc",
///         }
///     }
/// }
///
/// let store = Store::new(
///     |count: u32, action: &CounterAction| match action {
///         CounterAction::Inc => count + 1,
///         CounterAction::Init => count,
///     },
///     0,
/// );
/// store.dispatch(CounterAction::Inc);
/// assert_eq!(*store.state(), 1);
/// store.destroy();
/// ```
pub struct Store<S, A> {
    inner: Arc<Inner<S, A>>,
}

struct Inner<S, A> {
    scheduler: Scheduler<S, A>,
    effects: EffectRegistry,
    config: Arc<StoreConfig>,
}

impl<S, A> Inner<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    fn dispatch(&self, action: A) {
        self.scheduler.dispatch(action);
        // A halted store processes nothing more, so its effects have no
        // reason to keep running.
        if self.scheduler.status() == StoreStatus::Halted {
            let aborted = self.effects.close();
            if aborted > 0 {
                log::warn!("[{}] Store halted, {} effects aborted", self.config.name, aborted);
            }
        }
    }
}

impl<S, A> Drop for Inner<S, A> {
    fn drop(&mut self) {
        // Effect tasks only hold the store weakly; stop them with the last handle.
        self.effects.close();
    }
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Builder for a [`Store`] with non-default configuration
pub struct StoreBuilder<S, A> {
    reducer: Box<dyn Reducer<S, A>>,
    initial_state: S,
    config: StoreConfig,
}

impl<S, A> StoreBuilder<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    /// Name used in log lines and error reports
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn reducer_fault_policy(mut self, policy: ReducerFaultPolicy) -> Self {
        self.config.reducer_fault_policy = policy;
        self
    }

    /// Reporter receiving reducer, effect and selector faults
    pub fn error_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.config.reporter = Arc::new(reporter);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Store<S, A> {
        Store::from_parts(self.reducer, self.initial_state, self.config)
    }
}

impl<S, A> Store<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    /// Create a store and apply the init action to `initial_state`
    pub fn new(reducer: impl Reducer<S, A>, initial_state: S) -> Self {
        Self::from_parts(Box::new(reducer), initial_state, StoreConfig::default())
    }

    /// Create a store starting from `S::default()`
    pub fn with_default(reducer: impl Reducer<S, A>) -> Self
    where
        S: Default,
    {
        Self::new(reducer, S::default())
    }

    pub fn builder(reducer: impl Reducer<S, A>, initial_state: S) -> StoreBuilder<S, A> {
        StoreBuilder {
            reducer: Box::new(reducer),
            initial_state,
            config: StoreConfig::default(),
        }
    }

    fn from_parts(
        reducer: Box<dyn Reducer<S, A>>,
        initial_state: S,
        config: StoreConfig,
    ) -> Self {
        let config = Arc::new(config);
        let store = Self {
            inner: Arc::new(Inner {
                scheduler: Scheduler::new(reducer, initial_state, Arc::clone(&config)),
                effects: EffectRegistry::new(),
                config,
            }),
        };

        log::info!("[{}] Store created", store.name());
        store.dispatch(A::init());
        store
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn status(&self) -> StoreStatus {
        self.inner.scheduler.status()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> Arc<S> {
        self.inner.scheduler.cell().get()
    }

    /// Queue an action for the reducer
    ///
    /// Never recurses into the reducer: when called while the store is already
    /// applying an action (from an observer, or from an effect on another
    /// thread) the action is queued behind it. Actions are applied in call
    /// order. Dropped with a log line once the store halted or was destroyed.
    pub fn dispatch(&self, action: A) {
        self.inner.dispatch(action);
    }

    /// Observe the current state now and every later state, synchronously
    pub fn subscribe(
        &self,
        callback: impl Fn(&Arc<S>) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.scheduler.cell().subscribe(Arc::new(callback))
    }

    /// Observe every action applied from now on, synchronously
    pub fn subscribe_actions(
        &self,
        callback: impl Fn(&A) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.scheduler.actions().subscribe(Arc::new(callback))
    }

    /// Stream of every action applied from now on
    ///
    /// Actions show up after the reducer applied them, so the state read
    /// while handling an action already reflects it.
    pub fn actions(&self) -> ActionStream<A> {
        let (outlet, rx) = Outlet::channel();
        let subscription = self.subscribe_actions(move |action| outlet.send(action.clone()));
        StoreStream::new(rx, subscription)
    }

    /// Stream of applied actions, each paired with the state it produced
    ///
    /// Combining [`Store::actions`] with a selection only gives the latest
    /// state the consumer happened to see. Here the state is the reducer
    /// output for that very action, even when further actions were applied
    /// before the consumer got to it.
    pub fn actions_with_state(&self) -> StoreStream<(A, Arc<S>)> {
        let (outlet, rx) = Outlet::channel();
        let store: Weak<Inner<S, A>> = Arc::downgrade(&self.inner);
        let subscription = self.subscribe_actions(move |action| {
            if let Some(inner) = store.upgrade() {
                outlet.send((action.clone(), inner.scheduler.cell().get()));
            }
        });
        StoreStream::new(rx, subscription)
    }

    /// Stream of the current state followed by every later state
    pub fn state_stream(&self) -> StateStream<S> {
        let (outlet, rx) = Outlet::channel();
        let subscription = self.subscribe(move |state| outlet.send(Arc::clone(state)));
        StoreStream::new(rx, subscription)
    }

    /// Current and later distinct values of `projection`
    ///
    /// A panicking projection is reported and ends this selection only.
    pub fn select<R, F>(&self, projection: F) -> Selection<R>
    where
        F: Fn(&S) -> R + Send + Sync + 'static,
        R: Clone + PartialEq + Send + 'static,
    {
        let (outlet, rx) = Outlet::channel();
        let config = Arc::clone(&self.inner.config);
        let projector = Projector::new(move |state: &S| Ok::<R, Infallible>(projection(state)));

        let subscription = self.subscribe(move |state| match projector.project(&**state) {
            Projected::Changed(value) => outlet.send(value),
            Projected::Unchanged => {}
            Projected::Failed(never) => match never {},
            Projected::Panicked(message) => {
                report_selector_fault(&config, message);
                outlet.close();
            }
        });
        StoreStream::new(rx, subscription)
    }

    /// Synchronous variant of [`Store::select`]
    pub fn select_with<R, F>(
        &self,
        projection: F,
        callback: impl Fn(&R) + Send + Sync + 'static,
    ) -> Subscription
    where
        F: Fn(&S) -> R + Send + Sync + 'static,
        R: Clone + PartialEq + Send + 'static,
    {
        let config = Arc::clone(&self.inner.config);
        let projector = Projector::new(move |state: &S| Ok::<R, Infallible>(projection(state)));

        self.subscribe(move |state| match projector.project(&**state) {
            Projected::Changed(value) => callback(&value),
            Projected::Unchanged => {}
            Projected::Failed(never) => match never {},
            Projected::Panicked(message) => report_selector_fault(&config, message),
        })
    }

    /// Selection over a fallible projection
    ///
    /// The first `Err` is delivered to this selection's consumer and ends it.
    /// The store and other selections keep running.
    pub fn try_select<R, E, F>(&self, projection: F) -> Selection<Result<R, E>>
    where
        F: Fn(&S) -> Result<R, E> + Send + Sync + 'static,
        R: Clone + PartialEq + Send + 'static,
        E: Send + 'static,
    {
        let (outlet, rx) = Outlet::channel();
        let config = Arc::clone(&self.inner.config);
        let projector = Projector::new(projection);

        let subscription = self.subscribe(move |state| match projector.project(&**state) {
            Projected::Changed(value) => outlet.send(Ok(value)),
            Projected::Unchanged => {}
            Projected::Failed(error) => {
                outlet.send(Err(error));
                outlet.close();
            }
            Projected::Panicked(message) => {
                report_selector_fault(&config, message);
                outlet.close();
            }
        });
        StoreStream::new(rx, subscription)
    }

    /// Register an action-producing stream
    ///
    /// Every `Ok` item is dispatched. The first `Err`, or a panic while
    /// polling the stream, is reported and ends this effect only. Needs a
    /// running tokio runtime. A halted store refuses new effects.
    pub fn effect<St, E>(&self, stream: St) -> Result<EffectId, StoreError>
    where
        St: Stream<Item = Result<A, E>> + Send + 'static,
        E: Into<anyhow::Error> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        if self.status() == StoreStatus::Halted {
            return Err(StoreError::Halted(self.name().to_string()));
        }
        let config = Arc::clone(&self.inner.config);
        let store: Weak<Inner<S, A>> = Arc::downgrade(&self.inner);

        self.inner
            .effects
            .register(&runtime, &self.inner.config.name, move |id| {
                effect::isolate(id, stream, config, move |action| match store.upgrade() {
                    Some(inner) => {
                        inner.dispatch(action);
                        true
                    }
                    None => false,
                })
            })
    }

    /// Number of registered effects that are still running
    pub fn active_effects(&self) -> usize {
        self.inner.effects.active()
    }

    /// Tear the store down
    ///
    /// Stops processing actions, aborts every effect and releases every
    /// subscription and stream (streams end). Idempotent.
    pub fn destroy(&self) {
        if !self.inner.scheduler.close() {
            return;
        }
        let aborted = self.inner.effects.close();
        log::info!("[{}] Store destroyed ({} effects aborted)", self.name(), aborted);
    }
}

fn report_selector_fault(config: &StoreConfig, message: String) {
    config.reporter.report(&StoreError::SelectorFault {
        store: config.name.clone(),
        message,
    });
}
