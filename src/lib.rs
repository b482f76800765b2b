//! Shoot Your Shot - aim an arrow at YES or NO
//!
//! Core modules:
//! - `sim`: Deterministic simulation (trajectory, aiming, collisions, evasion loop)
//! - `scene`: Scene graph and director (Preload, MainChallenge, EvasionChallenge)
//! - `input`: Pointer event queue fed by the host
//! - `effects`: Outbound render/audio requests drained by the host
//! - `settings`: Data-driven configuration points and tuning

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod effects;
pub mod input;
pub mod scene;
pub mod settings;
pub mod sim;

pub use effects::{Effect, SoundEffect};
pub use input::{InputQueue, PointerEvent};
pub use scene::{SceneDirector, SceneError, SceneId, ScenePayload};
pub use settings::{GestureModel, NoHitPolicy, Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted from the host (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default canvas size; all fractional anchors are relative to this
    pub const VIEWPORT_WIDTH: f32 = 360.0;
    pub const VIEWPORT_HEIGHT: f32 = 640.0;

    /// World gravity (units/s², +y is down)
    pub const GRAVITY: f32 = 600.0;
    /// Launch velocity = drag displacement * this (never normalized)
    pub const FIRE_MULTIPLIER: f32 = 2.0;
    /// Projectile may travel this far outside the viewport before reset
    pub const OFF_BOUNDS_MARGIN: f32 = 50.0;

    /// Arrow launch anchor as viewport fractions (180, 560 on the default canvas)
    pub const LAUNCH_ANCHOR: (f32, f32) = (0.5, 0.875);
    /// Arrow collision box (narrow body along the shaft)
    pub const ARROW_BODY: (f32, f32) = (8.0, 32.0);

    /// Target anchors and boxes (80x40 base rectangles, YES scaled 1.5, NO scaled 0.5)
    pub const YES_ANCHOR: (f32, f32) = (0.25, 0.34375);
    pub const NO_ANCHOR: (f32, f32) = (0.75, 0.34375);
    pub const YES_SIZE: (f32, f32) = (120.0, 60.0);
    pub const NO_SIZE: (f32, f32) = (40.0, 20.0);

    /// Evasive NO target: pointer proximity that triggers a relocation
    pub const EVASIVE_RADIUS: f32 = 100.0;
    /// Inset of the evasive NO target's safe area from the viewport edges
    pub const EVASIVE_INSET: f32 = 40.0;

    /// Evasion challenge
    pub const EVASION_DURATION_SECS: i32 = 25;
    pub const EVASION_HITS_TO_WIN: u32 = 15;
    pub const EVASION_ESCALATE_AT: i32 = 15;
    pub const SPAWN_INTERVAL_MS: u32 = 400;
    pub const SPAWN_INTERVAL_ESCALATED_MS: u32 = 200;
    pub const COUNTDOWN_INTERVAL_MS: u32 = 1000;
    pub const HEART_FALL_SPEED: f32 = 200.0;
    pub const HEART_SPAWN_Y: f32 = -20.0;
    pub const HEART_SPAWN_INSET: f32 = 20.0;
    pub const HEART_SIZE: f32 = 24.0;
    pub const PLAYER_SIZE: f32 = 48.0;
    /// Player sits this far above the bottom edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 80.0;

    /// Success presentation: hold, then camera fade, then return to the main scene
    pub const SUCCESS_HOLD_MS: u32 = 3500;
    pub const SUCCESS_FADE_MS: u32 = 1500;

    /// Preload fade before entering the main scene
    pub const PRELOAD_FADE_MS: u32 = 500;
    pub const MUSIC_VOLUME: f32 = 0.5;

    /// YES celebration fireworks
    pub const FIREWORK_INITIAL_BURSTS: u32 = 8;
    pub const FIREWORK_INITIAL_SPACING_MS: u32 = 200;
    pub const FIREWORK_LOOP_MS: u32 = 300;

    /// Flavor message after surviving the evasion challenge (fade in, hold, fade out)
    pub const FLAVOR_MESSAGE_MS: u32 = 1000 + 3500 + 1000;
}

/// Facing angle for a sprite whose "up" axis should point along `dir`.
///
/// Sprites are authored pointing up, so a quarter turn is added to the
/// screen-space heading.
#[inline]
pub fn facing_angle(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x) + std::f32::consts::FRAC_PI_2
}
