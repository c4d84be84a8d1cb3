//! App shell around the slideshow
//!
//! Owns the slideshow store while the slideshow is visible. Hiding it
//! destroys the store; showing it again builds a fresh one.

use crate::config::SlideshowConfig;
use crate::keyboard::Command;
use crate::selectors::SlideshowViewModel;
use crate::store::SlideshowStore;
use futures::{FutureExt, StreamExt};
use local_store::Selection;

struct Visible {
    store: SlideshowStore,
    view_model: Selection<SlideshowViewModel>,
    latest: Option<SlideshowViewModel>,
}

pub struct App {
    config: SlideshowConfig,
    slideshow: Option<Visible>,
    pub running: bool,
}

impl App {
    pub fn new(config: SlideshowConfig) -> Self {
        Self {
            config,
            slideshow: None,
            running: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.slideshow.is_some()
    }

    /// Build the slideshow store and hand it the configured photos
    pub fn show(&mut self) -> anyhow::Result<()> {
        if self.slideshow.is_some() {
            return Ok(());
        }

        let store = SlideshowStore::new(&self.config)?;
        let view_model = store.view_model();
        store.set_photos(self.config.photos.clone());
        log::info!("Slideshow shown ({} photos)", self.config.photos.len());

        self.slideshow = Some(Visible {
            store,
            view_model,
            latest: None,
        });
        Ok(())
    }

    pub fn hide(&mut self) {
        if let Some(visible) = self.slideshow.take() {
            visible.store.destroy();
            log::info!("Slideshow hidden (store {:?})", visible.store.status());
        }
    }

    pub fn handle(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Quit => {
                self.running = false;
                return Ok(());
            }
            Command::ToggleVisibility if self.is_visible() => {
                self.hide();
                return Ok(());
            }
            Command::ToggleVisibility => return self.show(),
            _ => {}
        }

        let Some(visible) = &self.slideshow else {
            return Ok(());
        };
        let store = &visible.store;
        match command {
            Command::Play => store.play(),
            Command::Pause => store.pause(),
            Command::Prev => store.prev(),
            Command::Next => store.next(),
            Command::ToggleLoop => store.toggle_loop(),
            Command::ToggleDirection => store.toggle_direction(),
            Command::ChangeSpeed(delta_ms) => store.change_speed(delta_ms),
            Command::ToggleVisibility | Command::Quit => {}
        }
        Ok(())
    }

    /// Latest view model, after taking in everything published since the
    /// last frame
    pub fn view_model(&mut self) -> Option<&SlideshowViewModel> {
        let visible = self.slideshow.as_mut()?;
        while let Some(Some(vm)) = visible.view_model.next().now_or_never() {
            visible.latest = Some(vm);
        }
        visible.latest.as_ref()
    }

    /// Tear down whatever is still running
    pub fn shutdown(&mut self) {
        self.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Direction;

    fn app() -> App {
        App::new(SlideshowConfig {
            photos: vec!["a".into(), "b".into()],
            autoplay: false,
            ..SlideshowConfig::default()
        })
    }

    #[tokio::test]
    async fn test_show_renders_first_photo() {
        let mut app = app();
        assert!(app.view_model().is_none());

        app.handle(Command::ToggleVisibility).unwrap();
        let vm = app.view_model().unwrap();
        assert_eq!(vm.current_photo.as_deref(), Some("a"));
        assert_eq!(vm.position, (1, 2));
        app.shutdown();
    }

    #[tokio::test]
    async fn test_commands_reach_store() {
        let mut app = app();
        app.show().unwrap();

        app.handle(Command::Next).unwrap();
        app.handle(Command::ToggleDirection).unwrap();
        let vm = app.view_model().unwrap();
        assert_eq!(vm.current_photo.as_deref(), Some("b"));
        assert_eq!(vm.direction, Direction::Backward);
        app.shutdown();
    }

    #[tokio::test]
    async fn test_hide_destroys_store_and_show_starts_fresh() {
        let mut app = app();
        app.show().unwrap();
        app.handle(Command::Next).unwrap();

        app.handle(Command::ToggleVisibility).unwrap();
        assert!(!app.is_visible());
        app.handle(Command::Next).unwrap();

        app.handle(Command::ToggleVisibility).unwrap();
        assert_eq!(
            app.view_model().and_then(|vm| vm.current_photo.clone()),
            Some("a".to_string())
        );
        app.shutdown();
    }

    #[test]
    fn test_quit_stops_running() {
        let mut app = app();
        app.handle(Command::Quit).unwrap();
        assert!(!app.running);
    }
}
