//! Slideshow store - the local store plus its auto-advance effect
//!
//! Owned by whatever shows the slideshow. Dropping or destroying it stops the
//! timer and releases every subscription.

use crate::actions::SlideshowAction;
use crate::config::{SlideshowConfig, MIN_SPEED_MS};
use crate::effects;
use crate::reducer::reduce;
use crate::selectors::{self, SlideshowViewModel};
use crate::state::SlideshowState;
use local_store::{Selection, Store, StoreStatus};

pub struct SlideshowStore {
    store: Store<SlideshowState, SlideshowAction>,
    autoplay: bool,
}

impl SlideshowStore {
    /// Create the store and start its auto-advance effect
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: &SlideshowConfig) -> anyhow::Result<Self> {
        let store = Store::builder(reduce, config.initial_state())
            .name("slideshow")
            .build();
        store.effect(effects::auto_advance(&store))?;

        Ok(Self {
            store,
            autoplay: config.autoplay,
        })
    }

    /// Replace the photos, then start playing unless autoplay is off
    pub fn set_photos(&self, photos: Vec<String>) {
        self.store.dispatch(SlideshowAction::UpdatePhotos(photos));
        if self.autoplay {
            self.store.dispatch(SlideshowAction::Play);
        }
    }

    pub fn play(&self) {
        self.store.dispatch(SlideshowAction::Play);
    }

    pub fn pause(&self) {
        self.store.dispatch(SlideshowAction::Pause);
    }

    /// Step back one photo; stops auto-advance
    pub fn prev(&self) {
        self.store.dispatch(SlideshowAction::Prev);
        self.store.dispatch(SlideshowAction::UpdateCurrentPhoto);
    }

    /// Step forward one photo; stops auto-advance
    pub fn next(&self) {
        self.store.dispatch(SlideshowAction::Next);
        self.store.dispatch(SlideshowAction::UpdateCurrentPhoto);
    }

    pub fn toggle_loop(&self) {
        self.store.dispatch(SlideshowAction::ToggleLoop);
    }

    pub fn toggle_direction(&self) {
        self.store.dispatch(SlideshowAction::ToggleDirection);
    }

    /// Change the auto-advance period by `delta_ms`, never below the minimum
    pub fn change_speed(&self, delta_ms: i64) {
        let current = self.store.state().speed_ms;
        let speed_ms = current.saturating_add_signed(delta_ms).max(MIN_SPEED_MS);
        if speed_ms != current {
            self.store.dispatch(SlideshowAction::UpdateSpeed(speed_ms));
        }
    }

    pub fn view_model(&self) -> Selection<SlideshowViewModel> {
        self.store.select(selectors::view_model)
    }

    pub fn status(&self) -> StoreStatus {
        self.store.status()
    }

    pub fn destroy(&self) {
        self.store.destroy();
    }
}
