//! Projections of the slideshow state
//!
//! Plain functions, so they work with `Store::select` as well as directly on
//! a state snapshot.

use crate::state::{Direction, SlideshowState};

pub fn current_photo(state: &SlideshowState) -> Option<String> {
    state.photos.get(state.index).cloned()
}

pub fn speed(state: &SlideshowState) -> u64 {
    state.speed_ms
}

pub fn direction(state: &SlideshowState) -> Direction {
    state.direction
}

pub fn loop_enabled(state: &SlideshowState) -> bool {
    state.loop_enabled
}

/// Stepping backward without looping, already on the first photo
pub fn is_first_photo(state: &SlideshowState) -> bool {
    !state.loop_enabled && state.direction == Direction::Backward && state.index == 0
}

/// Stepping forward without looping, already on the last photo
pub fn is_last_photo(state: &SlideshowState) -> bool {
    !state.loop_enabled
        && state.direction == Direction::Forward
        && state.index + 1 == state.photos.len()
}

/// True when auto-advance has nowhere left to go
pub fn at_stop_edge(state: &SlideshowState) -> bool {
    is_first_photo(state) || is_last_photo(state)
}

/// Everything the slideshow view renders
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowViewModel {
    pub current_photo: Option<String>,
    /// 1-based position and total count
    pub position: (usize, usize),
    pub loop_enabled: bool,
    pub direction: Direction,
    pub speed_ms: u64,
}

pub fn view_model(state: &SlideshowState) -> SlideshowViewModel {
    SlideshowViewModel {
        current_photo: current_photo(state),
        position: (
            (state.index + 1).min(state.photos.len()),
            state.photos.len(),
        ),
        loop_enabled: loop_enabled(state),
        direction: direction(state),
        speed_ms: speed(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(index: usize, loop_enabled: bool, direction: Direction) -> SlideshowState {
        SlideshowState {
            photos: vec!["a".into(), "b".into(), "c".into()],
            index,
            loop_enabled,
            direction,
            ..SlideshowState::default()
        }
    }

    #[test]
    fn test_edges_only_without_loop() {
        assert!(is_last_photo(&state(2, false, Direction::Forward)));
        assert!(!is_last_photo(&state(2, true, Direction::Forward)));
        assert!(!is_last_photo(&state(2, false, Direction::Backward)));

        assert!(is_first_photo(&state(0, false, Direction::Backward)));
        assert!(!is_first_photo(&state(0, false, Direction::Forward)));
        assert!(!at_stop_edge(&state(1, false, Direction::Forward)));
    }

    #[test]
    fn test_empty_slideshow() {
        let empty = SlideshowState::default();
        assert_eq!(current_photo(&empty), None);
        assert_eq!(view_model(&empty).position, (0, 0));
        assert!(!is_last_photo(&SlideshowState {
            loop_enabled: false,
            ..SlideshowState::default()
        }));
    }

    #[test]
    fn test_view_model() {
        let vm = view_model(&state(1, true, Direction::Backward));
        assert_eq!(vm.current_photo.as_deref(), Some("b"));
        assert_eq!(vm.position, (2, 3));
        assert!(vm.loop_enabled);
        assert_eq!(vm.direction, Direction::Backward);
        assert_eq!(vm.speed_ms, 1000);
    }
}
