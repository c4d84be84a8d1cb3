use crate::actions::SlideshowAction;
use crate::state::{Direction, SlideshowState};

/// Slideshow reducer
pub fn reduce(mut state: SlideshowState, action: &SlideshowAction) -> SlideshowState {
    match action {
        SlideshowAction::UpdatePhotos(photos) => {
            state.photos = photos.clone();
            state.index = state.index.min(state.photos.len().saturating_sub(1));
        }
        SlideshowAction::UpdateSpeed(speed_ms) => state.speed_ms = *speed_ms,
        SlideshowAction::ToggleLoop => state.loop_enabled = !state.loop_enabled,
        SlideshowAction::ToggleDirection => state.direction = state.direction.reversed(),
        SlideshowAction::Next => state.direction = Direction::Forward,
        SlideshowAction::Prev => state.direction = Direction::Backward,
        SlideshowAction::UpdateCurrentPhoto => state.index = step(&state),
        SlideshowAction::Init | SlideshowAction::Play | SlideshowAction::Pause => {}
    }
    state
}

/// Index one step away in the current direction
///
/// Wraps around when looping, otherwise stays on the edge photo.
fn step(state: &SlideshowState) -> usize {
    let last = match state.photos.len() {
        0 => return state.index,
        len => len - 1,
    };

    match state.direction {
        Direction::Forward if state.index < last => state.index + 1,
        Direction::Forward if state.loop_enabled => 0,
        Direction::Backward if state.index > 0 => state.index - 1,
        Direction::Backward if state.loop_enabled => last,
        _ => state.index,
    }
}
