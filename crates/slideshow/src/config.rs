//! Slideshow configuration
//!
//! Loaded from `.slideshow.toml` in the current directory, then the home
//! directory. Missing fields fall back to defaults.

use crate::state::{Direction, SlideshowState};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

const CONFIG_FILE: &str = ".slideshow.toml";

/// Shortest auto-advance period
pub const MIN_SPEED_MS: u64 = 250;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SlideshowConfig {
    /// Photos shown in order
    #[serde(default = "default_photos")]
    pub photos: Vec<String>,

    /// Auto-advance period in milliseconds
    #[serde(default = "default_speed_ms")]
    pub speed_ms: u64,

    /// Wrap around at the ends
    #[serde(default = "default_true", rename = "loop")]
    pub loop_enabled: bool,

    #[serde(default)]
    pub direction: Direction,

    /// Start playing as soon as photos are set
    #[serde(default = "default_true")]
    pub autoplay: bool,
}

fn default_photos() -> Vec<String> {
    [
        "lighthouse.jpg",
        "harbour-at-dawn.jpg",
        "pine-forest.jpg",
        "glacier-lake.jpg",
        "old-town.jpg",
        "desert-road.jpg",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_speed_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            photos: default_photos(),
            speed_ms: default_speed_ms(),
            loop_enabled: default_true(),
            direction: Direction::default(),
            autoplay: default_true(),
        }
    }
}

impl SlideshowConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = load_config_file() {
            match Self::parse(&content) {
                Ok(config) => {
                    log::info!("Loaded slideshow config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default slideshow config");
        Self::default()
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(content)?;
        if config.speed_ms < MIN_SPEED_MS {
            log::warn!(
                "speed_ms = {} is below {}ms, using {}ms",
                config.speed_ms,
                MIN_SPEED_MS,
                MIN_SPEED_MS
            );
            config.speed_ms = MIN_SPEED_MS;
        }
        Ok(config)
    }

    /// Store state before any photos are set
    pub fn initial_state(&self) -> SlideshowState {
        SlideshowState {
            speed_ms: self.speed_ms,
            loop_enabled: self.loop_enabled,
            direction: self.direction,
            ..SlideshowState::default()
        }
    }
}

fn load_config_file() -> Option<String> {
    if let Ok(content) = std::fs::read_to_string(CONFIG_FILE) {
        log::debug!("Loaded config from {}", CONFIG_FILE);
        return Some(content);
    }

    let home_config = env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))?;
    match std::fs::read_to_string(&home_config) {
        Ok(content) => {
            log::debug!("Loaded config from {}", home_config.display());
            Some(content)
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SlideshowConfig::default();
        assert!(!config.photos.is_empty());
        assert_eq!(config.speed_ms, 1000);
        assert!(config.loop_enabled);
        assert_eq!(config.direction, Direction::Forward);
        assert!(config.autoplay);
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            photos = ["a.png", "b.png"]
            speed_ms = 400
            loop = false
            direction = "backward"
        "#;
        let config = SlideshowConfig::parse(toml).unwrap();
        assert_eq!(config.photos, vec!["a.png", "b.png"]);
        assert_eq!(config.speed_ms, 400);
        assert!(!config.loop_enabled);
        assert_eq!(config.direction, Direction::Backward);
        // autoplay should use default
        assert!(config.autoplay);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config = SlideshowConfig::parse("autoplay = false").unwrap();
        assert!(!config.autoplay);
        assert_eq!(config.photos, default_photos());
        assert_eq!(config.speed_ms, 1000);
    }

    #[test]
    fn test_speed_below_minimum_is_raised() {
        let config = SlideshowConfig::parse("speed_ms = 0").unwrap();
        assert_eq!(config.speed_ms, MIN_SPEED_MS);
    }

    #[test]
    fn test_invalid_direction_is_rejected() {
        assert!(SlideshowConfig::parse(r#"direction = "sideways""#).is_err());
    }

    #[test]
    fn test_initial_state_has_no_photos() {
        let config = SlideshowConfig {
            speed_ms: 300,
            loop_enabled: false,
            ..SlideshowConfig::default()
        };
        let state = config.initial_state();
        assert!(state.photos.is_empty());
        assert_eq!(state.speed_ms, 300);
        assert!(!state.loop_enabled);
    }
}
