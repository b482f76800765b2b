//! Game settings and configuration points
//!
//! Loaded from JSON by the host; every field falls back to its default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// How pointer gestures map to aiming and firing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GestureModel {
    /// Pointer-down fires immediately toward the pointer
    ImmediateFire,
    /// Pointer-down starts aiming, move retargets, pointer-up fires
    #[default]
    DragFire,
}

impl GestureModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureModel::ImmediateFire => "immediate",
            GestureModel::DragFire => "drag",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "immediate" | "immediate_fire" | "tap" => Some(GestureModel::ImmediateFire),
            "drag" | "drag_fire" => Some(GestureModel::DragFire),
            _ => None,
        }
    }
}

/// What a projectile hitting the NO target does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoHitPolicy {
    /// NO is final right away
    Immediate,
    /// NO sends the player to the evasion challenge; outcome decided there
    #[default]
    Deferred,
}

/// Settings failed to load
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("viewport must be positive, got {width}x{height}")]
    Viewport { width: f32, height: f32 },
    #[error("fire multiplier must be positive, got {0}")]
    FireMultiplier(f32),
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Gameplay ===
    /// Gesture model, selected once at scene setup
    pub gesture: GestureModel,
    /// NO-target behavior
    pub no_hit: NoHitPolicy,
    /// NO target runs away from a nearby pointer
    pub evasive_no_target: bool,
    /// RNG seed (None = host picks one)
    pub seed: Option<u64>,

    // === Tuning ===
    pub gravity: f32,
    pub fire_multiplier: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gesture: GestureModel::default(),
            no_hit: NoHitPolicy::default(),
            evasive_no_target: false,
            seed: None,

            gravity: GRAVITY,
            fire_multiplier: FIRE_MULTIPLIER,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: MUSIC_VOLUME,
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate the tuning values
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!(
            "Loaded settings (gesture: {}, no_hit: {:?}, evasive: {})",
            settings.gesture.as_str(),
            settings.no_hit,
            settings.evasive_no_target
        );
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(SettingsError::Viewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        if !(self.fire_multiplier > 0.0) {
            return Err(SettingsError::FireMultiplier(self.fire_multiplier));
        }
        Ok(())
    }

    /// Effective music volume after the master control
    pub fn effective_music_volume(&self) -> f32 {
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Effective sound effect volume after the master control
    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }
}
