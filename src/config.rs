use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading the editor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the editor. Missing fields fall back to their defaults so
/// older config files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Size of the blank canvas created at startup
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// How many preceding frames onion skinning shows
    pub onion_skin_frames: usize,
    pub onion_skin_opacity: f32,
    /// Composite every buffer twice. Only for backends that drop single draws.
    pub redundant_draws: bool,
    /// Delay between the end of a gesture and the autosave it triggers
    pub autosave_debounce_secs: f64,
    /// Oldest history entries are dropped past this many
    pub history_limit: usize,
    /// Key the document is stored under
    pub storage_key: String,
    pub playback_fps: f32,
    /// Square canvas presets offered by the new-canvas dialog
    pub new_canvas_sizes: Vec<u32>,
    /// Scales offered for export
    pub export_scales: Vec<u32>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: crate::document::DEFAULT_WIDTH,
            canvas_height: crate::document::DEFAULT_HEIGHT,
            onion_skin_frames: 3,
            onion_skin_opacity: 0.5,
            redundant_draws: false,
            autosave_debounce_secs: 0.05,
            history_limit: 256,
            storage_key: "pixel-art-app".to_owned(),
            playback_fps: 8.0,
            new_canvas_sizes: vec![32, 50, 64, 100, 128],
            export_scales: vec![2, 4, 8, 16, 32, 64],
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loads the config at `path`, logging and falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EditorConfig::from_json_str(r#"{ "onion_skin_frames": 5 }"#).unwrap();
        assert_eq!(config.onion_skin_frames, 5);
        assert_eq!(config.canvas_width, 64);
        assert_eq!(config.storage_key, "pixel-art-app");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = EditorConfig::load_or_default("/nonexistent/sprite_paint.json");
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(matches!(
            EditorConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
