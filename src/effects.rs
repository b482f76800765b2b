//! Outbound presentation requests
//!
//! The simulation never draws or plays anything itself. It pushes
//! [`Effect`]s which the host drains once per frame and turns into sprites,
//! particles, text and audio. Nothing is ever read back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{FaceTier, TargetId};

/// Text slots the host can show/hide independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextSlot {
    Title,
    Prompt,
    Loading,
    Question,
    /// Returning-from-evasion flavor line
    Flavor,
    /// YES / NO result panel
    Result,
    ResultSubtitle,
    Hits,
    Timer,
    Taunt,
}

/// Sound cues (procedural on web)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Arrow released
    Launch,
    /// Arrow left the screen
    Miss,
    /// YES hit
    Bullseye,
    /// NO hit, off to the evasion challenge
    Rejected,
    /// Heart caught
    HeartHit,
    /// Difficulty escalation
    Escalate,
    /// Evasion challenge won by the rejecter
    Lovestruck,
    /// Time ran out
    TimeUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    // === Text ===
    ShowText {
        slot: TextSlot,
        text: String,
        /// Auto-hide after this long (None = until hidden)
        duration_ms: Option<u32>,
    },
    HideText(TextSlot),

    // === Aiming ===
    ShowAimLine { from: Vec2, to: Vec2 },
    HideAimLine,

    // === Targets ===
    MoveTarget { id: TargetId, pos: Vec2 },
    /// Infinite scale pulse
    PulseTarget(TargetId),

    // === Particles ===
    HeartBurst { pos: Vec2 },

    // === Evasion ===
    SetFace(FaceTier),
    SpawnHeart { id: u32, pos: Vec2 },
    DespawnHeart { id: u32 },
    ClearHearts,
    /// Tween the player sprite to `pos` at `scale`
    PresentPlayer { pos: Vec2, scale: f32, duration_ms: u32 },

    // === Camera ===
    FadeIn { duration_ms: u32 },
    FadeOut { duration_ms: u32 },
    /// Translucent flash over the whole screen
    Flash { repeats: u32 },

    // === Loading ===
    LoadProgress(f32),

    // === Audio ===
    /// Browsers need a user gesture before audio can start
    ResumeAudio,
    PlayMusic { key: String, volume: f32, looped: bool },
    Sound(SoundEffect),
}

/// Effects produced during one frame, in the order they were requested
#[derive(Debug, Default)]
pub struct EffectQueue {
    effects: Vec<Effect>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self {
            effects: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn text(&mut self, slot: TextSlot, text: impl Into<String>) {
        self.push(Effect::ShowText {
            slot,
            text: text.into(),
            duration_ms: None,
        });
    }

    pub fn sound(&mut self, sound: SoundEffect) {
        self.push(Effect::Sound(sound));
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }
}
