//! Main challenge scene: the YES / NO shot
//!
//! Wraps [`ChallengeState`] and turns its tick events into effects. A
//! deferred NO hands over to the evasion challenge; everything else ends
//! here.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::{Scene, SceneCommand, SceneId, ScenePayload};
use crate::consts::*;
use crate::effects::{Effect, EffectQueue, SoundEffect, TextSlot};
use crate::input::PointerEvent;
use crate::settings::Settings;
use crate::sim::{
    ChallengeEvent, ChallengeState, Resolution, RoundResult, Scheduler, TargetId, TickInput,
    Viewport, apply_input, step_round,
};

pub const QUESTION: &str = "Will you be my Valentine?";
pub const NO_CONFIRMED_TEXT: &str = "NO 💔 (Confirmed)";
pub const YES_SUBTITLE: &str = "Finally got the right one! 😏";

pub const YES_MESSAGES: &[&str] = &[
    "BULLSEYE! 🎯💘\nKnew you had it in you!",
    "HA! You actually did it! 😎\nCupid would be proud!",
    "YESSS! 🎉💖\nBest. Shot. Ever.",
    "YOU DID IT! 💘✨\nWorth all those misses, huh?",
    "BOOM! Direct hit! 💥❤️\nYou're officially smooth!",
    "NAILED IT! 🏹💕\nGuess love wins after all!",
    "SCORE! 🎊💖\nThat's my Valentine!",
    "PERFECT AIM! 🎯❤️\nCupid's got nothing on you!",
];

/// Shown when coming back from a won evasion challenge
pub const FLAVOR_MESSAGES: &[&str] = &[
    "Whoa! Hearts everywhere! 😵 Did Cupid just attack you?",
    "Ouch! Love overload! 💘 Back to the question!",
    "Missed your chance! 😅 The hearts had other plans!",
    "Hearts got you! ❤️‍🔥 Don't worry… love bites sometimes!",
    "Oof… crushed by hearts! 💔😂 Love is ruthless!",
    "Ooh that Hearts… Cupid laughs at your aim! 💘",
    "Cupid's trolling you! 😎💘 Aim better next time!",
    "Dodging hearts is harder than dodging love! ❤️💨",
    "Oops! Someone got heartbroken 😏… But love waits!",
    "Yikes! Hearts everywhere! ❤️🤯 Even arrows can't save you!",
    "So close… yet so covered in love! 💖😂",
    "Careful! Love comes at you fast! 💘💨",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainTimer {
    Firework,
    FlavorExpired,
}

#[derive(Debug)]
pub struct MainChallengeScene {
    state: ChallengeState,
    payload: Option<ScenePayload>,
    timers: Scheduler<MainTimer>,
    celebrating: bool,
}

impl MainChallengeScene {
    pub fn enter(
        seed: u64,
        settings: &Settings,
        viewport: Viewport,
        payload: Option<ScenePayload>,
        fx: &mut EffectQueue,
    ) -> Self {
        let mut state = ChallengeState::new(seed, settings);
        if state.viewport != viewport {
            state.resize(viewport);
        }

        let mut scene = Self {
            state,
            payload,
            timers: Scheduler::new(),
            celebrating: false,
        };
        scene.show_board(fx);

        match payload {
            None => {}
            Some(ScenePayload::FromEvasionChallenge) => scene.show_flavor(fx),
            Some(ScenePayload::NoConfirmed) => {
                // The NO stands: the round is over before it starts
                scene.state.result.settle(RoundResult::NoConfirmed);
                scene.show_rejection(fx);
            }
        }
        log::info!("Main challenge entered (seed {}, payload {:?})", seed, payload);
        scene
    }

    pub fn state(&self) -> &ChallengeState {
        &self.state
    }

    pub fn payload(&self) -> Option<ScenePayload> {
        self.payload
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    fn show_board(&self, fx: &mut EffectQueue) {
        fx.text(TextSlot::Question, QUESTION);
        for target in &self.state.targets {
            fx.push(Effect::MoveTarget {
                id: target.id,
                pos: target.pos,
            });
        }
    }

    fn show_flavor(&mut self, fx: &mut EffectQueue) {
        let text = FLAVOR_MESSAGES
            .choose(&mut self.state.rng)
            .copied()
            .unwrap_or(FLAVOR_MESSAGES[0]);
        fx.push(Effect::ShowText {
            slot: TextSlot::Flavor,
            text: text.to_string(),
            duration_ms: Some(FLAVOR_MESSAGE_MS),
        });
        self.timers.add_once(MainTimer::FlavorExpired, FLAVOR_MESSAGE_MS);
    }

    fn show_rejection(&self, fx: &mut EffectQueue) {
        fx.push(Effect::HideAimLine);
        fx.text(TextSlot::Result, NO_CONFIRMED_TEXT);
    }

    fn celebrate(&mut self, at: Vec2, fx: &mut EffectQueue) {
        self.celebrating = true;
        fx.push(Effect::HideAimLine);
        fx.push(Effect::HeartBurst { pos: at });
        fx.sound(SoundEffect::Bullseye);
        fx.push(Effect::Flash { repeats: 3 });

        let text = YES_MESSAGES
            .choose(&mut self.state.rng)
            .copied()
            .unwrap_or(YES_MESSAGES[0]);
        fx.text(TextSlot::Result, text);
        fx.text(TextSlot::ResultSubtitle, YES_SUBTITLE);
        fx.push(Effect::PulseTarget(TargetId::Yes));

        for i in 0..FIREWORK_INITIAL_BURSTS {
            self.timers
                .add_once(MainTimer::Firework, i * FIREWORK_INITIAL_SPACING_MS);
        }
        self.timers.add_loop(MainTimer::Firework, FIREWORK_LOOP_MS);
    }

    fn firework_spot(&mut self) -> Vec2 {
        let vp = self.state.viewport;
        let pick = |rng: &mut rand_pcg::Pcg32, lo: f32, hi: f32| {
            if hi > lo { rng.random_range(lo..hi) } else { lo }
        };
        let x = pick(&mut self.state.rng, 50.0, vp.width - 50.0);
        let y = pick(&mut self.state.rng, 100.0, vp.height - 100.0);
        Vec2::new(x, y)
    }

    fn run_timers(&mut self, dt: f32, fx: &mut EffectQueue) {
        self.timers.advance(dt as f64 * 1000.0);
        while let Some(timer) = self.timers.poll() {
            match timer {
                MainTimer::Firework => {
                    let pos = self.firework_spot();
                    fx.push(Effect::HeartBurst { pos });
                }
                MainTimer::FlavorExpired => fx.push(Effect::HideText(TextSlot::Flavor)),
            }
        }
    }
    fn present_all(&mut self, events: Vec<ChallengeEvent>, fx: &mut EffectQueue) -> SceneCommand {
        for event in events {
            if let Some(next) = self.present(event, fx) {
                return next;
            }
        }
        SceneCommand::None
    }

    fn present(&mut self, event: ChallengeEvent, fx: &mut EffectQueue) -> Option<SceneCommand> {
        match event {
            ChallengeEvent::Aimed(line) => fx.push(Effect::ShowAimLine {
                from: line.from,
                to: line.to,
            }),
            ChallengeEvent::Fired { .. } => {
                fx.push(Effect::HideAimLine);
                fx.sound(SoundEffect::Launch);
            }
            ChallengeEvent::Reset => {
                let launch = self.state.aim.launch();
                fx.push(Effect::ShowAimLine {
                    from: launch,
                    to: launch,
                });
                fx.sound(SoundEffect::Miss);
            }
            ChallengeEvent::TargetMoved { id, pos } => fx.push(Effect::MoveTarget { id, pos }),
            ChallengeEvent::Resolved(Resolution::Yes { at }) => self.celebrate(at, fx),
            ChallengeEvent::Resolved(Resolution::NoConfirmed { .. }) => {
                fx.sound(SoundEffect::Rejected);
                self.show_rejection(fx);
            }
            ChallengeEvent::Resolved(Resolution::NoDeferred { .. }) => {
                fx.sound(SoundEffect::Rejected);
                return Some(SceneCommand::switch(SceneId::EvasionChallenge, None));
            }
        }
        None
    }
}

impl Scene for MainChallengeScene {
    fn id(&self) -> SceneId {
        SceneId::MainChallenge
    }

    /// Input first, then timers, then physics and collision
    fn update(&mut self, input: &[PointerEvent], dt: f32, fx: &mut EffectQueue) -> SceneCommand {
        let input_events = apply_input(&mut self.state, &TickInput::with(input.iter().copied()));
        self.present_all(input_events, fx);

        self.run_timers(dt, fx);

        let round_events = step_round(&mut self.state, dt);
        self.present_all(round_events, fx)
    }

    fn exit(&mut self, fx: &mut EffectQueue) {
        self.timers.cancel_all();
        fx.push(Effect::HideAimLine);
        for slot in [
            TextSlot::Question,
            TextSlot::Flavor,
            TextSlot::Result,
            TextSlot::ResultSubtitle,
        ] {
            fx.push(Effect::HideText(slot));
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.state.resize(viewport);
    }
}
