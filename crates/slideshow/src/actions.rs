use local_store::{Action, INIT_KIND};

/// Slideshow actions
///
/// `kind()` names each action the way it shows up in the log file.
#[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
pub enum SlideshowAction {
    #[strum(serialize = "init-store")]
    Init,
    #[strum(serialize = "[Slideshow] play")]
    Play,
    #[strum(serialize = "[Slideshow] pause")]
    Pause,
    #[strum(serialize = "[Slideshow] prev")]
    Prev,
    #[strum(serialize = "[Slideshow] next")]
    Next,
    #[strum(serialize = "[Slideshow] toggleLoop")]
    ToggleLoop,
    #[strum(serialize = "[Slideshow] toggleDirection")]
    ToggleDirection,
    /// Replace the photo list
    #[strum(serialize = "[Slideshow] updatePhotos")]
    UpdatePhotos(Vec<String>),
    /// Step one photo in the current direction
    #[strum(serialize = "[Slideshow] updateCurrentPhoto")]
    UpdateCurrentPhoto,
    /// Set the auto-advance period in milliseconds
    #[strum(serialize = "[Slideshow] updateSpeed")]
    UpdateSpeed(u64),
}

impl Action for SlideshowAction {
    fn init() -> Self {
        SlideshowAction::Init
    }

    fn kind(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(SlideshowAction::init().kind(), INIT_KIND);
        assert_eq!(SlideshowAction::Play.kind(), "[Slideshow] play");
        assert_eq!(
            SlideshowAction::UpdateSpeed(500).kind(),
            "[Slideshow] updateSpeed"
        );
        assert_eq!(
            SlideshowAction::UpdatePhotos(vec![]).kind(),
            "[Slideshow] updatePhotos"
        );
    }
}
