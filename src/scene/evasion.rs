//! Evasion challenge scene
//!
//! Hearts rain down for 25 seconds while the player slides along the bottom.
//! Catching 15 melts the NO and sends the round back to the main challenge
//! for another try; running out the clock confirms the NO.

use glam::Vec2;

use super::{Scene, SceneCommand, SceneId, ScenePayload};
use crate::consts::*;
use crate::effects::{Effect, EffectQueue, SoundEffect, TextSlot};
use crate::input::PointerEvent;
use crate::settings::Settings;
use crate::sim::{EvasionEnd, EvasionSession, EvasionState, FaceTier, Hit, Scheduler, TimerId, Viewport};

pub const TAUNT: &str = "I knew it 😏";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvasionTimer {
    Spawn,
    Countdown,
    /// Love presentation held long enough, start fading
    SuccessHold,
    SuccessFaded,
}

#[derive(Debug)]
pub struct EvasionScene {
    world: EvasionState,
    timers: Scheduler<EvasionTimer>,
    spawn_timer: Option<TimerId>,
}

impl EvasionScene {
    pub fn enter(seed: u64, settings: &Settings, viewport: Viewport, fx: &mut EffectQueue) -> Self {
        let world = EvasionState::new(seed, viewport, settings.gravity);
        let mut timers = Scheduler::new();
        let spawn_timer = timers.add_loop(EvasionTimer::Spawn, world.session.spawn_interval_ms());
        timers.add_loop(EvasionTimer::Countdown, COUNTDOWN_INTERVAL_MS);

        let scene = Self {
            world,
            timers,
            spawn_timer: Some(spawn_timer),
        };
        fx.push(Effect::SetFace(scene.session().face()));
        scene.show_hits(fx);
        scene.show_timer(fx);
        log::info!("Evasion challenge entered (seed {})", seed);
        scene
    }

    pub fn session(&self) -> &EvasionSession {
        &self.world.session
    }

    pub fn world(&self) -> &EvasionState {
        &self.world
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut EvasionState {
        &mut self.world
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    fn show_hits(&self, fx: &mut EffectQueue) {
        fx.text(
            TextSlot::Hits,
            format!("Hits: {} / {}", self.session().hits(), EVASION_HITS_TO_WIN),
        );
    }

    fn show_timer(&self, fx: &mut EffectQueue) {
        fx.text(TextSlot::Timer, format!("{}s", self.session().time_left()));
    }

    /// Spawn loop restarts at the new rate
    fn escalate(&mut self, fx: &mut EffectQueue) {
        if let Some(old) = self.spawn_timer.take() {
            self.timers.cancel(old);
        }
        let interval = self.session().spawn_interval_ms();
        self.spawn_timer = Some(self.timers.add_loop(EvasionTimer::Spawn, interval));
        fx.sound(SoundEffect::Escalate);
    }

    fn caught(&mut self, id: u32, hit: Hit, fx: &mut EffectQueue) {
        fx.push(Effect::DespawnHeart { id });
        fx.sound(SoundEffect::HeartHit);
        self.show_hits(fx);
        if let Some(face) = hit.face {
            fx.push(Effect::SetFace(face));
        }
    }

    /// Stop the game and put the lovestruck player on show
    fn begin_success(&mut self, fx: &mut EffectQueue) {
        self.timers.cancel_all();
        self.spawn_timer = None;
        self.world.clear_hearts();

        let vp = self.world.viewport;
        fx.push(Effect::ClearHearts);
        fx.push(Effect::SetFace(FaceTier::Love));
        fx.push(Effect::PresentPlayer {
            pos: Vec2::new(vp.width / 2.0, vp.height / 2.0 - 40.0),
            scale: 3.0,
            duration_ms: 2000,
        });
        fx.text(TextSlot::Taunt, TAUNT);
        fx.sound(SoundEffect::Lovestruck);
        self.timers.add_once(EvasionTimer::SuccessHold, SUCCESS_HOLD_MS);
    }

    fn run_timers(&mut self, dt: f32, fx: &mut EffectQueue) -> SceneCommand {
        self.timers.advance(dt as f64 * 1000.0);
        while let Some(timer) = self.timers.poll() {
            match timer {
                EvasionTimer::Spawn => {
                    if self.session().is_over() {
                        continue;
                    }
                    let heart = self.world.spawn_heart();
                    fx.push(Effect::SpawnHeart {
                        id: heart.id,
                        pos: heart.pos,
                    });
                }
                EvasionTimer::Countdown => {
                    let Some(report) = self.world.session.countdown() else {
                        continue;
                    };
                    self.show_timer(fx);
                    if report.escalated {
                        self.escalate(fx);
                    }
                    if report.ended == Some(EvasionEnd::TimeUp) {
                        self.timers.cancel_all();
                        fx.sound(SoundEffect::TimeUp);
                        return SceneCommand::switch(
                            SceneId::MainChallenge,
                            Some(ScenePayload::NoConfirmed),
                        );
                    }
                }
                EvasionTimer::SuccessHold => {
                    fx.push(Effect::FadeOut {
                        duration_ms: SUCCESS_FADE_MS,
                    });
                    self.timers.add_once(EvasionTimer::SuccessFaded, SUCCESS_FADE_MS);
                }
                EvasionTimer::SuccessFaded => {
                    return SceneCommand::switch(
                        SceneId::MainChallenge,
                        Some(ScenePayload::FromEvasionChallenge),
                    );
                }
            }
        }
        SceneCommand::None
    }
}

impl Scene for EvasionScene {
    fn id(&self) -> SceneId {
        SceneId::EvasionChallenge
    }

    fn update(&mut self, input: &[PointerEvent], dt: f32, fx: &mut EffectQueue) -> SceneCommand {
        // Input is dead once the session is decided
        if !self.session().is_over() {
            for event in input {
                if let PointerEvent::Down { x, .. } | PointerEvent::Move { x, .. } = *event {
                    self.world.move_player(x);
                }
            }
        }

        let command = self.run_timers(dt, fx);
        if command != SceneCommand::None {
            return command;
        }
        if self.session().is_over() {
            return SceneCommand::None;
        }

        let (caught, culled) = self.world.step(dt);
        for id in culled {
            fx.push(Effect::DespawnHeart { id });
        }
        for (id, hit) in caught {
            self.caught(id, hit, fx);
            if hit.ended == Some(EvasionEnd::Lovestruck) {
                self.begin_success(fx);
            }
        }
        SceneCommand::None
    }

    fn exit(&mut self, fx: &mut EffectQueue) {
        self.timers.cancel_all();
        self.spawn_timer = None;
        self.world.clear_hearts();
        fx.push(Effect::ClearHearts);
        for slot in [TextSlot::Hits, TextSlot::Timer, TextSlot::Taunt] {
            fx.push(Effect::HideText(slot));
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.world.resize(viewport);
    }
}
