//! Game settings and tuning
//!
//! Persisted as JSON next to the save file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_GRAVITY;
use crate::persistence::PersistError;

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Physics ===
    /// Per-frame gravity applied after `init`
    pub gravity: f32,
    /// Bodies scattered by `init` (non-zero for stress runs)
    pub initial_fruits: usize,

    // === Drop cursor ===
    /// Cursor acceleration per nudge
    pub cursor_accel: f32,
    /// Cursor velocity retained per frame
    pub cursor_damping: f32,
    /// Autoplay frames between drop attempts
    pub drop_interval: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Half the reference gravity, as the native game runs it
            gravity: DEFAULT_GRAVITY * 0.5,
            initial_fruits: 0,

            cursor_accel: 0.01,
            cursor_damping: 0.95,
            drop_interval: 60,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Invalid settings in {}: {err}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Cannot read {}: {err}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
