//! Tray settings and persistence
//!
//! Settle detection and session behavior are tunable; settings round-trip
//! through a RON file and fall back to defaults when the file is missing or
//! unreadable.

use std::path::Path;

use bevy::log::{info, warn};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraySettings {
    /// Stillness divisor: combined speed must drop below `1.0 / motion_threshold`.
    /// Higher means stricter stillness is required before settling.
    pub motion_threshold: f32,

    /// Allowed deviation of the best face from perfect alignment with the
    /// detection vector. Confidence below `1.0 - face_tolerance` means the
    /// die is caught. Higher accepts more orientations as valid.
    pub face_tolerance: f32,

    /// How long a die must stay below the motion threshold before its face
    /// is resolved, in seconds.
    pub stabilize_seconds: f32,

    /// Hard ceiling on a multi-die session, in seconds.
    pub session_timeout: f32,

    /// Hard ceiling on a manual single-die throw, in seconds.
    pub single_timeout: f32,

    /// A die higher than this off the floor is still airborne, regardless of
    /// its momentary speed.
    pub rest_height: f32,

    /// Half the side length of the square tray floor.
    pub tray_half_extent: f32,

    pub wall_height: f32,
}

impl Default for TraySettings {
    fn default() -> Self {
        Self {
            motion_threshold: 10.0,
            face_tolerance: 0.25,
            stabilize_seconds: 2.0,
            session_timeout: 15.0,
            single_timeout: 8.0,
            rest_height: 0.8,
            tray_half_extent: 2.0,
            wall_height: 1.5,
        }
    }
}

impl TraySettings {
    /// Combined-speed ceiling below which a die counts as quiet.
    pub fn speed_limit(&self) -> f32 {
        1.0 / self.motion_threshold
    }

    /// Deadline for a session of `count` dice: multi-die rolls get the full
    /// session timeout, a lone manual throw the shorter single-die ceiling.
    pub fn timeout_for(&self, count: usize) -> f32 {
        if count <= 1 {
            self.single_timeout
        } else {
            self.session_timeout
        }
    }

    /// Load settings from a RON file, falling back to defaults if the file
    /// is absent or malformed.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match ron::from_str::<TraySettings>(&text) {
                Ok(settings) => {
                    info!("Loaded tray settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| format!("Failed to serialize settings: {e}"))?;
        std::fs::write(path, text)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))
    }
}
