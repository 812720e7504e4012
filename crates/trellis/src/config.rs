//! Window configuration, loaded from RON

use crate::color::Color;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for a [`UiWindow`](crate::UiWindow).
///
/// Every field is optional in the file; missing fields take their defaults.
///
/// ```ron
/// (
///     title: "Demo",
///     width: 1024,
///     height: 768,
///     frames_per_second: 30,
///     palette: Some("colors.ron"),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Target rate of the frame clock
    pub frames_per_second: u32,
    pub clear_color: Color,
    /// Color palette file, relative to the asset root
    pub palette: Option<PathBuf>,
    /// Font texture, relative to the asset root
    pub font_texture: Option<PathBuf>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "trellis".to_string(),
            width: 800,
            height: 600,
            frames_per_second: 60,
            clear_color: Color::BLACK,
            palette: Some(PathBuf::from("colors.ron")),
            font_texture: None,
        }
    }
}

impl WindowConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Time between two frame ticks
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.frames_per_second.max(1)))
    }
}
