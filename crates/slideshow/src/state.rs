use serde::{Deserialize, Serialize};

/// Direction the slideshow steps in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

/// Slideshow state
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowState {
    pub photos: Vec<String>,
    pub index: usize,
    /// Auto-advance period in milliseconds
    pub speed_ms: u64,
    pub loop_enabled: bool,
    pub direction: Direction,
}

impl Default for SlideshowState {
    fn default() -> Self {
        Self {
            photos: Vec::new(),
            index: 0,
            speed_ms: 1000,
            loop_enabled: true,
            direction: Direction::Forward,
        }
    }
}
