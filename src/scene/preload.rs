//! Preload scene: wait for assets, then a tap to start
//!
//! Loading itself is the host's job. It reads [`AssetManifest`], fetches
//! everything and reports back through [`AssetEvent`]s. The first tap after
//! completion unlocks audio, starts the music and fades into the main
//! challenge.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Scene, SceneCommand, SceneId};
use crate::consts::PRELOAD_FADE_MS;
use crate::effects::{Effect, EffectQueue, TextSlot};
use crate::input::PointerEvent;
use crate::settings::Settings;
use crate::sim::{FaceTier, Scheduler, Viewport};

pub const TITLE: &str = "💘 Shoot Your Shot 💘";
pub const TAP_TO_START: &str = "Tap to Start";
pub const MUSIC_KEY: &str = "bgm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Audio,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub key: String,
    pub kind: AssetKind,
    pub path: String,
}

/// Everything the game needs before it can start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub assets: Vec<AssetEntry>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        let image = |key: &str| AssetEntry {
            key: key.to_string(),
            kind: AssetKind::Image,
            path: format!("assets/{key}.png"),
        };
        let mut assets = vec![image("arrow"), image("heart")];
        assets.extend(
            [FaceTier::Unamused, FaceTier::Poker, FaceTier::Amused, FaceTier::Love]
                .iter()
                .map(|face| image(face.texture())),
        );
        assets.push(AssetEntry {
            key: MUSIC_KEY.to_string(),
            kind: AssetKind::Audio,
            path: format!("assets/{MUSIC_KEY}.mp3"),
        });
        Self { assets }
    }
}

impl AssetManifest {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|a| a.key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys().any(|k| k == key)
    }
}

/// Signals from the external asset loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssetEvent {
    /// Fraction loaded, 0..=1
    Progress(f32),
    Complete,
    Failed { key: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("failed to load asset `{key}`: {reason}")]
    Asset { key: String, reason: String },
    #[error("asset loading already failed")]
    AlreadyFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadPhase {
    Loading,
    /// Assets in, waiting for a tap
    Ready,
    /// Fading out towards the main challenge
    Starting,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreloadTimer {
    FadeDone,
}

#[derive(Debug)]
pub struct PreloadScene {
    phase: PreloadPhase,
    progress: f32,
    music_volume: f32,
    timers: Scheduler<PreloadTimer>,
}

impl PreloadScene {
    pub fn enter(viewport: Viewport, settings: &Settings, fx: &mut EffectQueue) -> Self {
        log::debug!("Preload at {}x{}", viewport.width, viewport.height);
        fx.push(Effect::LoadProgress(0.0));
        fx.text(TextSlot::Loading, "Loading... 0%");
        Self {
            phase: PreloadPhase::Loading,
            progress: 0.0,
            music_volume: settings.effective_music_volume(),
            timers: Scheduler::new(),
        }
    }

    pub fn phase(&self) -> PreloadPhase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn on_asset(&mut self, event: AssetEvent, fx: &mut EffectQueue) -> Result<(), LoadError> {
        if self.phase == PreloadPhase::Failed {
            return Err(LoadError::AlreadyFailed);
        }
        match event {
            AssetEvent::Progress(p) => {
                if self.phase == PreloadPhase::Loading {
                    // Progress never goes backwards
                    self.progress = p.clamp(0.0, 1.0).max(self.progress);
                    fx.push(Effect::LoadProgress(self.progress));
                    fx.text(
                        TextSlot::Loading,
                        format!("Loading... {}%", (self.progress * 100.0).round() as u32),
                    );
                }
            }
            AssetEvent::Complete => {
                if self.phase == PreloadPhase::Loading {
                    self.progress = 1.0;
                    self.phase = PreloadPhase::Ready;
                    log::info!("Assets loaded");
                    fx.push(Effect::LoadProgress(1.0));
                    fx.push(Effect::HideText(TextSlot::Loading));
                    fx.push(Effect::FadeIn {
                        duration_ms: PRELOAD_FADE_MS,
                    });
                    fx.text(TextSlot::Title, TITLE);
                    fx.text(TextSlot::Prompt, TAP_TO_START);
                }
            }
            AssetEvent::Failed { key, reason } => {
                log::error!("Asset `{}` failed: {}", key, reason);
                self.phase = PreloadPhase::Failed;
                fx.text(TextSlot::Loading, format!("Could not load {key}"));
                return Err(LoadError::Asset { key, reason });
            }
        }
        Ok(())
    }

    fn start(&mut self, fx: &mut EffectQueue) {
        self.phase = PreloadPhase::Starting;
        fx.push(Effect::ResumeAudio);
        fx.push(Effect::PlayMusic {
            key: MUSIC_KEY.to_string(),
            volume: self.music_volume,
            looped: true,
        });
        fx.push(Effect::FadeOut {
            duration_ms: PRELOAD_FADE_MS,
        });
        self.timers.add_once(PreloadTimer::FadeDone, PRELOAD_FADE_MS);
    }
}

impl Scene for PreloadScene {
    fn id(&self) -> SceneId {
        SceneId::Preload
    }

    fn update(&mut self, input: &[PointerEvent], dt: f32, fx: &mut EffectQueue) -> SceneCommand {
        let tapped = input.iter().any(|e| matches!(e, PointerEvent::Down { .. }));
        if tapped && self.phase == PreloadPhase::Ready {
            self.start(fx);
        }

        self.timers.advance(dt as f64 * 1000.0);
        while let Some(timer) = self.timers.poll() {
            match timer {
                PreloadTimer::FadeDone => {
                    return SceneCommand::switch(SceneId::MainChallenge, None);
                }
            }
        }
        SceneCommand::None
    }

    fn exit(&mut self, fx: &mut EffectQueue) {
        self.timers.cancel_all();
        fx.push(Effect::HideText(TextSlot::Title));
        fx.push(Effect::HideText(TextSlot::Prompt));
        fx.push(Effect::HideText(TextSlot::Loading));
    }

    fn resize(&mut self, _viewport: Viewport) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn scene() -> (PreloadScene, EffectQueue) {
        let mut fx = EffectQueue::new();
        let s = PreloadScene::enter(Viewport::default(), &Settings::default(), &mut fx);
        fx.drain();
        (s, fx)
    }

    #[test]
    fn manifest_lists_every_texture_and_music() {
        let m = AssetManifest::default();
        for key in ["arrow", "heart", "bgm", "unamused", "poker", "amused", "love"] {
            assert!(m.contains(key), "missing {key}");
        }
        assert_eq!(m.assets.len(), 7);
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let (mut s, mut fx) = scene();
        s.on_asset(AssetEvent::Progress(0.6), &mut fx).unwrap();
        s.on_asset(AssetEvent::Progress(0.3), &mut fx).unwrap();
        assert_eq!(s.progress(), 0.6);
        s.on_asset(AssetEvent::Progress(7.0), &mut fx).unwrap();
        assert_eq!(s.progress(), 1.0);
        assert_eq!(s.phase(), PreloadPhase::Loading);
    }

    #[test]
    fn tap_starts_music_then_switches() {
        let (mut s, mut fx) = scene();
        s.on_asset(AssetEvent::Complete, &mut fx).unwrap();
        assert!(fx.iter().any(|e| matches!(
            e,
            Effect::ShowText { slot: TextSlot::Prompt, text, .. } if text == TAP_TO_START
        )));
        fx.drain();

        let tap = [PointerEvent::Down { x: 5.0, y: 5.0 }];
        assert_eq!(s.update(&tap, SIM_DT, &mut fx), SceneCommand::None);
        assert_eq!(s.phase(), PreloadPhase::Starting);
        let effects = fx.drain();
        assert_eq!(effects[0], Effect::ResumeAudio);
        assert_eq!(
            effects[1],
            Effect::PlayMusic {
                key: "bgm".into(),
                volume: Settings::default().effective_music_volume(),
                looped: true
            }
        );

        // A second tap during the fade does not restart anything
        s.update(&tap, SIM_DT, &mut fx);
        assert!(fx.drain().is_empty());

        let mut command = SceneCommand::None;
        for _ in 0..40 {
            command = s.update(&[], SIM_DT, &mut fx);
            if command != SceneCommand::None {
                break;
            }
        }
        assert_eq!(command, SceneCommand::switch(SceneId::MainChallenge, None));
    }

    #[test]
    fn failure_sticks() {
        let (mut s, mut fx) = scene();
        let failed = AssetEvent::Failed {
            key: "bgm".into(),
            reason: "decode error".into(),
        };
        assert!(matches!(s.on_asset(failed, &mut fx), Err(LoadError::Asset { .. })));
        assert!(matches!(
            s.on_asset(AssetEvent::Complete, &mut fx),
            Err(LoadError::AlreadyFailed)
        ));
        s.update(&[PointerEvent::Down { x: 0.0, y: 0.0 }], SIM_DT, &mut fx);
        assert_eq!(s.phase(), PreloadPhase::Failed);
    }
}
