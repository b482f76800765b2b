//! Scene graph and director
//!
//! Three scenes form a closed automaton:
//!
//! ```text
//! Preload ──> MainChallenge <──> EvasionChallenge
//! ```
//!
//! Scenes never switch themselves. They return a [`SceneCommand`] and the
//! [`SceneDirector`] validates the edge, exits the old scene (cancelling its
//! timers) and only then builds the new one.

pub mod evasion;
pub mod main_challenge;
pub mod preload;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::effects::{Effect, EffectQueue};
use crate::input::{InputQueue, PointerEvent};
use crate::settings::Settings;
use crate::sim::Viewport;

pub use evasion::EvasionScene;
pub use main_challenge::MainChallengeScene;
pub use preload::{AssetEvent, AssetKind, AssetManifest, LoadError, PreloadScene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneId {
    Preload,
    MainChallenge,
    EvasionChallenge,
}

impl SceneId {
    /// Host-facing scene key
    pub fn key(&self) -> &'static str {
        match self {
            SceneId::Preload => "preload",
            SceneId::MainChallenge => "game",
            SceneId::EvasionChallenge => "no-challenge",
        }
    }

    /// The only edges of the scene graph
    pub fn can_transition_to(&self, to: SceneId, payload: Option<ScenePayload>) -> bool {
        matches!(
            (self, to, payload),
            (SceneId::Preload, SceneId::MainChallenge, None)
                | (SceneId::MainChallenge, SceneId::EvasionChallenge, None)
                | (SceneId::EvasionChallenge, SceneId::MainChallenge, Some(_))
        )
    }
}

/// Data carried into the main challenge. `None` means a fresh start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PayloadFlags", try_from = "PayloadFlags")]
pub enum ScenePayload {
    /// The evasion challenge ran out the clock: NO stands
    NoConfirmed,
    /// The evasion challenge was won: play again, with a flavor message
    FromEvasionChallenge,
}

/// Wire shape of [`ScenePayload`]: `{ "noConfirmed": true }` or
/// `{ "fromEvasionChallenge": true }`
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    no_confirmed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from_evasion_challenge: Option<bool>,
}

impl From<ScenePayload> for PayloadFlags {
    fn from(payload: ScenePayload) -> Self {
        match payload {
            ScenePayload::NoConfirmed => PayloadFlags {
                no_confirmed: Some(true),
                ..Default::default()
            },
            ScenePayload::FromEvasionChallenge => PayloadFlags {
                from_evasion_challenge: Some(true),
                ..Default::default()
            },
        }
    }
}

impl TryFrom<PayloadFlags> for ScenePayload {
    type Error = SceneError;

    fn try_from(flags: PayloadFlags) -> Result<Self, Self::Error> {
        match (flags.no_confirmed, flags.from_evasion_challenge) {
            (Some(true), None | Some(false)) => Ok(ScenePayload::NoConfirmed),
            (None | Some(false), Some(true)) => Ok(ScenePayload::FromEvasionChallenge),
            _ => Err(SceneError::InvalidPayload),
        }
    }
}

/// A requested scene switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTransition {
    pub to: SceneId,
    pub payload: Option<ScenePayload>,
}

/// What a scene wants after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneTransition),
}

impl SceneCommand {
    pub fn switch(to: SceneId, payload: Option<ScenePayload>) -> Self {
        SceneCommand::SwitchTo(SceneTransition { to, payload })
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no transition from {from:?} to {to:?} with payload {payload:?}")]
    InvalidTransition {
        from: SceneId,
        to: SceneId,
        payload: Option<ScenePayload>,
    },
    #[error("payload must set exactly one of noConfirmed / fromEvasionChallenge")]
    InvalidPayload,
    #[error(transparent)]
    Assets(#[from] LoadError),
}

/// Contract every scene fulfils
pub trait Scene {
    fn id(&self) -> SceneId;

    /// One fixed timestep. `input` holds the pointer events for this step.
    fn update(&mut self, input: &[PointerEvent], dt: f32, fx: &mut EffectQueue) -> SceneCommand;

    /// Tear down: cancel every timer and hide what this scene showed
    fn exit(&mut self, fx: &mut EffectQueue);

    fn resize(&mut self, viewport: Viewport);
}

/// The scene currently running
#[derive(Debug)]
pub enum ActiveScene {
    Preload(PreloadScene),
    MainChallenge(MainChallengeScene),
    EvasionChallenge(EvasionScene),
}

impl ActiveScene {
    fn as_scene(&mut self) -> &mut dyn Scene {
        match self {
            ActiveScene::Preload(s) => s,
            ActiveScene::MainChallenge(s) => s,
            ActiveScene::EvasionChallenge(s) => s,
        }
    }

    pub fn id(&self) -> SceneId {
        match self {
            ActiveScene::Preload(_) => SceneId::Preload,
            ActiveScene::MainChallenge(_) => SceneId::MainChallenge,
            ActiveScene::EvasionChallenge(_) => SceneId::EvasionChallenge,
        }
    }
}

/// Owns the active scene and drives it from the host's frame clock
#[derive(Debug)]
pub struct SceneDirector {
    settings: Settings,
    viewport: Viewport,
    active: ActiveScene,
    input: InputQueue,
    effects: EffectQueue,
    accumulator: f32,
    /// Seeds each new scene
    rng: Pcg32,
    transitions: u32,
}

impl SceneDirector {
    /// Start in Preload
    pub fn new(settings: Settings, seed: u64) -> Self {
        let viewport = Viewport::new(settings.viewport_width, settings.viewport_height);
        let mut effects = EffectQueue::new();
        let preload = PreloadScene::enter(viewport, &settings, &mut effects);
        log::info!("Director started (seed {}, {}x{})", seed, viewport.width, viewport.height);
        Self {
            settings,
            viewport,
            active: ActiveScene::Preload(preload),
            input: InputQueue::new(),
            effects,
            accumulator: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            transitions: 0,
        }
    }

    pub fn active_id(&self) -> SceneId {
        self.active.id()
    }

    pub fn active(&self) -> &ActiveScene {
        &self.active
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Number of scene switches so far
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    pub fn preload(&self) -> Option<&PreloadScene> {
        match &self.active {
            ActiveScene::Preload(s) => Some(s),
            _ => None,
        }
    }

    pub fn main_challenge(&self) -> Option<&MainChallengeScene> {
        match &self.active {
            ActiveScene::MainChallenge(s) => Some(s),
            _ => None,
        }
    }

    pub fn evasion(&self) -> Option<&EvasionScene> {
        match &self.active {
            ActiveScene::EvasionChallenge(s) => Some(s),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn evasion_mut(&mut self) -> Option<&mut EvasionScene> {
        match &mut self.active {
            ActiveScene::EvasionChallenge(s) => Some(s),
            _ => None,
        }
    }

    /// Queue a pointer event for the next frame
    pub fn push_input(&mut self, event: PointerEvent) {
        self.input.push(event);
    }

    /// Forward the external asset loader's signals to Preload.
    ///
    /// A failure is fatal: Preload stays put and refuses to start.
    pub fn notify_assets(&mut self, event: AssetEvent) -> Result<(), SceneError> {
        match &mut self.active {
            ActiveScene::Preload(preload) => {
                preload.on_asset(event, &mut self.effects)?;
                Ok(())
            }
            other => {
                log::debug!("Ignoring asset event {:?} in {:?}", event, other.id());
                Ok(())
            }
        }
    }

    /// Run simulation ticks for one host frame
    pub fn frame(&mut self, dt: f32) -> Result<(), SceneError> {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            // Input is handled once, on the first substep
            let events = if substeps == 0 { self.input.drain() } else { Vec::new() };
            let command = self.active.as_scene().update(&events, SIM_DT, &mut self.effects);
            self.accumulator -= SIM_DT;
            substeps += 1;

            if let SceneCommand::SwitchTo(t) = command {
                self.transition_to(t.to, t.payload)?;
            }
        }
        Ok(())
    }

    /// Switch scenes along a graph edge.
    ///
    /// The old scene is exited (timers cancelled) before the new one is
    /// built. Invalid edges leave the active scene untouched.
    pub fn transition_to(&mut self, to: SceneId, payload: Option<ScenePayload>) -> Result<(), SceneError> {
        let from = self.active.id();
        if !from.can_transition_to(to, payload) {
            log::warn!("Rejected transition {:?} -> {:?} ({:?})", from, to, payload);
            return Err(SceneError::InvalidTransition { from, to, payload });
        }

        self.active.as_scene().exit(&mut self.effects);

        let seed: u64 = self.rng.random();
        self.active = match to {
            SceneId::Preload => ActiveScene::Preload(PreloadScene::enter(
                self.viewport,
                &self.settings,
                &mut self.effects,
            )),
            SceneId::MainChallenge => ActiveScene::MainChallenge(MainChallengeScene::enter(
                seed,
                &self.settings,
                self.viewport,
                payload,
                &mut self.effects,
            )),
            SceneId::EvasionChallenge => ActiveScene::EvasionChallenge(EvasionScene::enter(
                seed,
                &self.settings,
                self.viewport,
                &mut self.effects,
            )),
        };
        self.transitions += 1;
        log::info!("Scene {} -> {} (payload {:?})", from.key(), to.key(), payload);
        Ok(())
    }

    /// Canvas resized: re-anchor the active scene
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.viewport = Viewport::new(width, height);
        self.active.as_scene().resize(self.viewport);
    }

    /// Effects requested since the last drain, in order
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.effects.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::TextSlot;
    use crate::sim::{AimState, EvasionEnd, Heart, RoundResult, TargetId};
    use glam::Vec2;

    const FRAME: f32 = 1.0 / 60.0;

    fn run_frames(d: &mut SceneDirector, frames: u32) {
        for _ in 0..frames {
            d.frame(FRAME).unwrap();
        }
    }

    /// Director sitting in a fresh main challenge
    fn main_director(settings: Settings) -> SceneDirector {
        let mut d = SceneDirector::new(settings, 1234);
        d.notify_assets(AssetEvent::Complete).unwrap();
        d.push_input(PointerEvent::Down { x: 10.0, y: 10.0 });
        run_frames(&mut d, 60);
        assert_eq!(d.active_id(), SceneId::MainChallenge);
        d.drain_effects();
        d
    }

    /// Drag-shot pointer that lands on `target` after about `t` seconds
    fn aim_point(d: &SceneDirector, target: Vec2, t: f32) -> Vec2 {
        let state = d.main_challenge().unwrap().state();
        let from = state.aim.launch();
        let disp = target - from;
        let vel = Vec2::new(disp.x / t, (disp.y - 0.5 * state.gravity * t * t) / t);
        from + vel / d.settings().fire_multiplier
    }

    fn drag_shot(d: &mut SceneDirector, pointer: Vec2) {
        d.push_input(PointerEvent::Down { x: pointer.x, y: pointer.y });
        d.push_input(PointerEvent::Move { x: pointer.x, y: pointer.y });
        d.push_input(PointerEvent::Up { x: pointer.x, y: pointer.y });
    }

    /// Director sitting in a fresh evasion challenge
    fn evasion_director() -> SceneDirector {
        let mut d = main_director(Settings::default());
        d.transition_to(SceneId::EvasionChallenge, None).unwrap();
        d.drain_effects();
        d
    }

    #[test]
    fn graph_edges() {
        use SceneId::*;
        use ScenePayload::*;
        assert!(Preload.can_transition_to(MainChallenge, None));
        assert!(MainChallenge.can_transition_to(EvasionChallenge, None));
        assert!(EvasionChallenge.can_transition_to(MainChallenge, Some(NoConfirmed)));
        assert!(EvasionChallenge.can_transition_to(MainChallenge, Some(FromEvasionChallenge)));

        assert!(!Preload.can_transition_to(EvasionChallenge, None));
        assert!(!Preload.can_transition_to(MainChallenge, Some(NoConfirmed)));
        assert!(!MainChallenge.can_transition_to(Preload, None));
        assert!(!MainChallenge.can_transition_to(EvasionChallenge, Some(NoConfirmed)));
        assert!(!EvasionChallenge.can_transition_to(MainChallenge, None));
        assert!(!EvasionChallenge.can_transition_to(Preload, None));
        assert!(!MainChallenge.can_transition_to(MainChallenge, None));
    }

    #[test]
    fn payload_wire_format() {
        let json = serde_json::to_string(&ScenePayload::NoConfirmed).unwrap();
        assert_eq!(json, r#"{"noConfirmed":true}"#);
        let json = serde_json::to_string(&ScenePayload::FromEvasionChallenge).unwrap();
        assert_eq!(json, r#"{"fromEvasionChallenge":true}"#);

        let p: ScenePayload = serde_json::from_str(r#"{"fromEvasionChallenge":true}"#).unwrap();
        assert_eq!(p, ScenePayload::FromEvasionChallenge);
        assert!(serde_json::from_str::<ScenePayload>(r#"{"noConfirmed":true,"fromEvasionChallenge":true}"#).is_err());
        assert!(serde_json::from_str::<ScenePayload>("{}").is_err());
    }

    #[test]
    fn invalid_transition_leaves_scene_alone() {
        let mut d = SceneDirector::new(Settings::default(), 1);
        let err = d.transition_to(SceneId::EvasionChallenge, None).unwrap_err();
        assert!(matches!(err, SceneError::InvalidTransition { .. }));
        assert_eq!(d.active_id(), SceneId::Preload);
        assert_eq!(d.transitions(), 0);
    }

    #[test]
    fn preload_waits_for_assets_then_tap() {
        let mut d = SceneDirector::new(Settings::default(), 1);

        // Taps before loading finishes do nothing
        d.push_input(PointerEvent::Down { x: 1.0, y: 1.0 });
        run_frames(&mut d, 60);
        assert_eq!(d.active_id(), SceneId::Preload);

        d.notify_assets(AssetEvent::Progress(0.5)).unwrap();
        d.notify_assets(AssetEvent::Complete).unwrap();
        run_frames(&mut d, 10);
        assert_eq!(d.active_id(), SceneId::Preload);

        d.push_input(PointerEvent::Down { x: 1.0, y: 1.0 });
        run_frames(&mut d, 1);
        let effects = d.drain_effects();
        assert!(effects.contains(&Effect::ResumeAudio));
        assert!(effects.iter().any(|e| matches!(e, Effect::PlayMusic { looped: true, .. })));

        // Fade, then the main challenge
        run_frames(&mut d, 40);
        assert_eq!(d.active_id(), SceneId::MainChallenge);
        let main = d.main_challenge().unwrap();
        assert_eq!(main.state().result, RoundResult::Pending);
        assert!(main.payload().is_none());
    }

    #[test]
    fn asset_failure_is_fatal() {
        let mut d = SceneDirector::new(Settings::default(), 1);
        let err = d
            .notify_assets(AssetEvent::Failed {
                key: "heart".into(),
                reason: "404".into(),
            })
            .unwrap_err();
        assert!(matches!(err, SceneError::Assets(LoadError::Asset { .. })));

        // A late completion cannot revive it
        assert!(d.notify_assets(AssetEvent::Complete).is_err());
        d.push_input(PointerEvent::Down { x: 1.0, y: 1.0 });
        run_frames(&mut d, 120);
        assert_eq!(d.active_id(), SceneId::Preload);
    }

    /// Scenario 1: straight at YES
    #[test]
    fn shot_at_yes_celebrates_without_evasion() {
        let mut d = main_director(Settings::default());
        let yes = d.main_challenge().unwrap().state().target(TargetId::Yes).pos;
        let pointer = aim_point(&d, yes, 0.5);
        drag_shot(&mut d, pointer);
        run_frames(&mut d, 90);

        assert_eq!(d.active_id(), SceneId::MainChallenge);
        assert_eq!(d.transitions(), 1);
        assert_eq!(d.main_challenge().unwrap().state().result, RoundResult::Yes);

        let effects = d.drain_effects();
        assert!(effects.contains(&Effect::PulseTarget(TargetId::Yes)));
        assert!(effects.contains(&Effect::HeartBurst { pos: yes }));
        assert!(effects.iter().any(|e| matches!(e, Effect::ShowText { slot: TextSlot::Result, .. })));

        // Fireworks keep going; input is dead
        run_frames(&mut d, 120);
        let bursts = d
            .drain_effects()
            .iter()
            .filter(|e| matches!(e, Effect::HeartBurst { .. }))
            .count();
        assert!(bursts >= 6);
        drag_shot(&mut d, Vec2::new(270.0, 145.0));
        run_frames(&mut d, 90);
        assert_eq!(d.active_id(), SceneId::MainChallenge);
        assert_eq!(d.main_challenge().unwrap().state().result, RoundResult::Yes);
    }

    /// Scenario 2: NO defers to the evasion challenge
    #[test]
    fn shot_at_no_enters_evasion() {
        let mut d = main_director(Settings::default());
        let no = d.main_challenge().unwrap().state().target(TargetId::No).pos;
        let pointer = aim_point(&d, no, 0.5);
        drag_shot(&mut d, pointer);

        for _ in 0..90 {
            d.frame(FRAME).unwrap();
            if d.active_id() == SceneId::EvasionChallenge {
                break;
            }
        }
        let evasion = d.evasion().expect("should be in the evasion challenge");
        assert_eq!(evasion.session().hits(), 0);
        assert_eq!(evasion.session().time_left(), 25);
        assert_eq!(evasion.session().spawn_interval_ms(), 400);
        assert_eq!(d.transitions(), 2);
    }

    #[test]
    fn immediate_no_policy_ends_in_place() {
        let settings = Settings {
            no_hit: crate::settings::NoHitPolicy::Immediate,
            ..Settings::default()
        };
        let mut d = main_director(settings);
        let no = d.main_challenge().unwrap().state().target(TargetId::No).pos;
        let pointer = aim_point(&d, no, 0.5);
        drag_shot(&mut d, pointer);
        run_frames(&mut d, 90);
        assert_eq!(d.active_id(), SceneId::MainChallenge);
        assert_eq!(d.main_challenge().unwrap().state().result, RoundResult::NoConfirmed);
    }

    /// Scenario 3: 15 hits with 9 seconds left
    #[test]
    fn fifteen_hits_returns_with_flavor() {
        let mut d = evasion_director();
        {
            let scene = d.evasion_mut().unwrap();
            let world = scene.world_mut();
            for _ in 0..16 {
                world.session.countdown();
            }
            for _ in 0..14 {
                world.session.register_hit();
            }
            assert_eq!(world.session.time_left(), 9);
            // Last heart just above the player
            let player = world.player;
            world.hearts.push(Heart {
                id: 999,
                pos: player - Vec2::new(0.0, 30.0),
                vel: Vec2::new(0.0, 200.0),
            });
        }
        run_frames(&mut d, 2);

        let scene = d.evasion().unwrap();
        assert_eq!(scene.session().hits(), 15);
        assert_eq!(scene.session().ended(), Some(EvasionEnd::Lovestruck));
        assert!(scene.world().hearts.is_empty());
        // Only the presentation hold is left
        assert_eq!(scene.active_timers(), 1);
        let effects = d.drain_effects();
        assert!(effects.contains(&Effect::ClearHearts));
        assert!(effects.contains(&Effect::SetFace(crate::sim::FaceTier::Love)));

        // Presentation runs for 5 s, then back to the main challenge
        run_frames(&mut d, 60 * 4);
        assert_eq!(d.active_id(), SceneId::EvasionChallenge);
        run_frames(&mut d, 60 * 2);
        assert_eq!(d.active_id(), SceneId::MainChallenge);

        let main = d.main_challenge().unwrap();
        assert_eq!(main.payload(), Some(ScenePayload::FromEvasionChallenge));
        assert_eq!(main.state().result, RoundResult::Pending);
        assert_eq!(main.state().aim.state(), AimState::Idle);
        let effects = d.drain_effects();
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::ShowText { slot: TextSlot::Flavor, duration_ms: Some(_), .. }
        )));
    }

    /// Scenario 4: clock runs out with 4 hits
    #[test]
    fn time_up_confirms_no() {
        let mut d = evasion_director();
        {
            let world = d.evasion_mut().unwrap().world_mut();
            for _ in 0..4 {
                world.session.register_hit();
            }
        }

        let mut saw_escalation = false;
        for _ in 0..(60 * 26) {
            // Dodge everything
            if let Some(scene) = d.evasion_mut() {
                scene.world_mut().hearts.clear();
                if scene.session().spawn_interval_ms() == 200 {
                    saw_escalation = true;
                }
            }
            d.frame(FRAME).unwrap();
            if d.active_id() == SceneId::MainChallenge {
                break;
            }
        }
        assert!(saw_escalation);
        assert_eq!(d.active_id(), SceneId::MainChallenge);

        let main = d.main_challenge().unwrap();
        assert_eq!(main.payload(), Some(ScenePayload::NoConfirmed));
        assert_eq!(main.state().result, RoundResult::NoConfirmed);
        let effects = d.drain_effects();
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::ShowText { slot: TextSlot::Result, text, .. } if text.contains("Confirmed")
        )));

        // No more aiming
        drag_shot(&mut d, Vec2::new(90.0, 145.0));
        run_frames(&mut d, 60);
        let main = d.main_challenge().unwrap();
        assert_eq!(main.state().aim.state(), AimState::Idle);
        assert!(!main.state().aim.projectile().is_fired());
        assert_eq!(main.state().result, RoundResult::NoConfirmed);
    }

    #[test]
    fn leaving_evasion_cancels_its_timers() {
        let mut d = evasion_director();
        run_frames(&mut d, 30);
        assert!(d.evasion().unwrap().active_timers() >= 2);
        d.transition_to(SceneId::MainChallenge, Some(ScenePayload::NoConfirmed))
            .unwrap();
        let effects = d.drain_effects();
        assert!(effects.contains(&Effect::ClearHearts));

        // Nothing from the old scene leaks into later frames
        run_frames(&mut d, 120);
        assert!(
            !d.drain_effects()
                .iter()
                .any(|e| matches!(e, Effect::SpawnHeart { .. }))
        );
    }

    #[test]
    fn resize_reanchors_active_scene() {
        let mut d = main_director(Settings::default());
        d.resize(720.0, 1280.0);
        let state = d.main_challenge().unwrap().state();
        assert_eq!(state.aim.projectile().pos, Vec2::new(360.0, 1120.0));
        d.resize(0.0, 100.0);
        assert_eq!(d.viewport(), Viewport::new(720.0, 1280.0));
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut d = SceneDirector::new(Settings::default(), 1);
        d.notify_assets(AssetEvent::Complete).unwrap();
        d.push_input(PointerEvent::Down { x: 1.0, y: 1.0 });
        // One huge frame only covers MAX_FRAME_DT worth of ticks
        d.frame(10.0).unwrap();
        assert_eq!(d.active_id(), SceneId::Preload);
    }
}
