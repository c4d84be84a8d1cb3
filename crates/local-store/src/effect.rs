//! Effect registry - action-producing streams fed back into dispatch
//!
//! Every registered effect runs as its own tokio task wrapped in an
//! isolation boundary:
//!
//! - `Ok(action)` items are dispatched to the store
//! - the first `Err` is reported and ends that effect only
//! - a panic while polling the stream is caught, reported and ends that
//!   effect only
//!
//! Sibling effects, selectors and the scheduler keep running.

use crate::config::StoreConfig;
use crate::error::{panic_message, EffectId, StoreError};
use crate::subscription::lock;
use futures::{FutureExt, Stream, StreamExt};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

struct Registrations {
    next_id: u64,
    tasks: Vec<(EffectId, JoinHandle<()>)>,
    closed: bool,
}

/// Running effect tasks of one store
pub(crate) struct EffectRegistry {
    registrations: Mutex<Registrations>,
}

impl EffectRegistry {
    pub(crate) fn new() -> Self {
        Self {
            registrations: Mutex::new(Registrations {
                next_id: 1,
                tasks: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Spawn an effect task on `runtime` under a fresh id
    pub(crate) fn register<Fut>(
        &self,
        runtime: &Handle,
        store: &str,
        effect: impl FnOnce(EffectId) -> Fut,
    ) -> Result<EffectId, StoreError>
    where
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut registrations = lock(&self.registrations);
        if registrations.closed {
            return Err(StoreError::Destroyed(store.to_string()));
        }

        registrations.tasks.retain(|(_, task)| !task.is_finished());
        let id = EffectId(registrations.next_id);
        registrations.next_id += 1;
        let task = runtime.spawn(effect(id));
        registrations.tasks.push((id, task));

        log::debug!("[{}] Registered effect {}", store, id);
        Ok(id)
    }

    /// Number of effects that have not finished yet
    pub(crate) fn active(&self) -> usize {
        lock(&self.registrations)
            .tasks
            .iter()
            .filter(|(_, task)| !task.is_finished())
            .count()
    }

    /// Abort every effect task and refuse new registrations
    pub(crate) fn close(&self) -> usize {
        let mut registrations = lock(&self.registrations);
        registrations.closed = true;
        let tasks = std::mem::take(&mut registrations.tasks);
        let aborted = tasks.len();
        for (_, task) in tasks {
            task.abort();
        }
        aborted
    }
}

/// Drive one effect stream, forwarding its actions to `dispatch`.
///
/// `dispatch` returns false once the store is gone, which ends the effect.
pub(crate) async fn isolate<St, A, E>(
    id: EffectId,
    stream: St,
    config: Arc<StoreConfig>,
    dispatch: impl Fn(A) -> bool + Send + Sync,
) where
    St: Stream<Item = Result<A, E>> + Send,
    E: Into<anyhow::Error>,
{
    let store = config.name.clone();
    let forward = async {
        let mut stream = Box::pin(stream);
        while let Some(item) = stream.next().await {
            match item {
                Ok(action) => {
                    if !dispatch(action) {
                        log::debug!("[{}] Store gone, ending effect {}", store, id);
                        return;
                    }
                }
                Err(error) => {
                    config.reporter.report(&StoreError::EffectFault {
                        store: store.clone(),
                        effect: id,
                        source: error.into(),
                    });
                    return;
                }
            }
        }
        log::debug!("[{}] Effect {} completed", store, id);
    };

    if let Err(payload) = AssertUnwindSafe(forward).catch_unwind().await {
        config.reporter.report(&StoreError::EffectPanicked {
            store: store.clone(),
            effect: id,
            message: panic_message(payload.as_ref()),
        });
    }
}
