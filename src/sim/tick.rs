//! Fixed timestep main challenge tick
//!
//! Order within a tick: pointer input, trajectory integration, collision
//! resolution. [`tick`] runs both halves; a scene with timers of its own
//! calls [`apply_input`] and [`step_round`] around them. The caller turns the
//! returned events into effects and, for a deferred NO, a scene transition.

use glam::Vec2;

use super::aim::{AimFeedback, AimLine, AimState};
use super::collision::{self, Resolution};
use super::state::ChallengeState;
use super::target::TargetId;
use super::trajectory::Flight;
use crate::input::PointerEvent;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer events since the previous tick, in arrival order
    pub pointer: Vec<PointerEvent>,
}

impl TickInput {
    pub fn with(events: impl IntoIterator<Item = PointerEvent>) -> Self {
        Self {
            pointer: events.into_iter().collect(),
        }
    }
}

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum ChallengeEvent {
    Aimed(AimLine),
    Fired { velocity: Vec2 },
    /// Projectile left the screen and is back at the launch anchor
    Reset,
    /// Evasive target jumped away from the pointer
    TargetMoved { id: TargetId, pos: Vec2 },
    Resolved(Resolution),
}

/// Advance the main challenge by one fixed timestep
pub fn tick(state: &mut ChallengeState, input: &TickInput, dt: f32) -> Vec<ChallengeEvent> {
    let mut events = apply_input(state, input);
    events.extend(step_round(state, dt));
    events
}

/// Route this tick's pointer events through the aim controller
pub fn apply_input(state: &mut ChallengeState, input: &TickInput) -> Vec<ChallengeEvent> {
    let mut events = Vec::new();

    // A decided round takes no more input and no more physics
    if !state.accepts_input() {
        return events;
    }

    for &event in &input.pointer {
        if !matches!(event, PointerEvent::Up { .. }) {
            dodge_pointer(state, event.pos(), &mut events);
        }
        match state.aim.handle(event) {
            AimFeedback::Ignored => {}
            AimFeedback::Retargeted(line) => events.push(ChallengeEvent::Aimed(line)),
            AimFeedback::Fired { velocity } => events.push(ChallengeEvent::Fired { velocity }),
        }
    }
    events
}

/// Integrate the projectile and resolve collisions
pub fn step_round(state: &mut ChallengeState, dt: f32) -> Vec<ChallengeEvent> {
    let mut events = Vec::new();
    if !state.accepts_input() {
        return events;
    }

    state.time_ticks += 1;

    if state.aim.step(state.gravity, dt, &state.viewport) == Flight::Exited {
        events.push(ChallengeEvent::Reset);
    }

    if let Some(resolution) = collision::resolve(
        &mut state.aim,
        &state.targets,
        &mut state.result,
        state.no_hit,
    ) {
        events.push(ChallengeEvent::Resolved(resolution));
    }

    events
}

/// Evasive NO target: jump away while the player is lining up a shot
fn dodge_pointer(state: &mut ChallengeState, pointer: Vec2, events: &mut Vec<ChallengeEvent>) {
    if state.aim.state() == AimState::Fired {
        return;
    }
    let [yes, no] = &mut state.targets;
    if !state.evasive.triggered(no, pointer) {
        return;
    }
    let spot = state
        .evasive
        .pick_spot(no, &yes.bounds(), &state.viewport, &mut state.rng);
    no.relocate(spot, &state.viewport);
    log::debug!("NO target dodged to {:?}", spot);
    events.push(ChallengeEvent::TargetMoved {
        id: TargetId::No,
        pos: spot,
    });
}
