//! Auto-advance effect
//!
//! `Play` or `UpdateSpeed` (re)starts a timer at the current speed. Every
//! period the timer emits `UpdateCurrentPhoto`. The timer stops on `Pause`,
//! `Prev` or `Next`, and as soon as the slideshow reaches a stop edge (first
//! or last photo with looping off). A trigger while already on a stop edge
//! starts nothing.

use crate::actions::SlideshowAction;
use crate::selectors;
use crate::state::SlideshowState;
use futures::{Stream, StreamExt};
use local_store::{Action, Store, StoreStream};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

struct AutoAdvance {
    events: StoreStream<(SlideshowAction, Arc<SlideshowState>)>,
    timer: Option<Interval>,
}

impl AutoAdvance {
    fn observe(&mut self, action: &SlideshowAction, state: &SlideshowState) {
        match action {
            SlideshowAction::Play | SlideshowAction::UpdateSpeed(_) => {
                if selectors::at_stop_edge(state) {
                    self.stop("at edge");
                } else {
                    self.start(state.speed_ms);
                }
            }
            SlideshowAction::Pause | SlideshowAction::Prev | SlideshowAction::Next => {
                self.stop(action.kind());
            }
            _ if selectors::at_stop_edge(state) => self.stop("reached edge"),
            _ => {}
        }
    }

    fn start(&mut self, speed_ms: u64) {
        // tokio rejects a zero period
        let period = Duration::from_millis(speed_ms.max(1));
        let mut timer = time::interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
        log::debug!("Auto-advance every {}ms", period.as_millis());
    }

    fn stop(&mut self, reason: &str) {
        if self.timer.take().is_some() {
            log::debug!("Auto-advance stopped: {}", reason);
        }
    }
}

async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Build the auto-advance effect for `store`
///
/// The returned stream subscribes right away, so actions dispatched before
/// the effect task first runs are not missed. It ends when the store is
/// destroyed.
pub fn auto_advance(
    store: &Store<SlideshowState, SlideshowAction>,
) -> impl Stream<Item = Result<SlideshowAction, Infallible>> + Send + 'static {
    let state = AutoAdvance {
        events: store.actions_with_state(),
        timer: None,
    };

    futures::stream::unfold(state, |mut this| async move {
        loop {
            tokio::select! {
                // Pending actions win over a due tick, so a stop is never
                // overtaken by one more step.
                biased;
                event = this.events.next() => match event {
                    Some((action, state)) => this.observe(&action, &state),
                    None => return None,
                },
                _ = tick(&mut this.timer) => {
                    return Some((Ok(SlideshowAction::UpdateCurrentPhoto), this));
                }
            }
        }
    })
}
