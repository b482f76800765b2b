//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod aim;
pub mod collision;
pub mod evasion;
pub mod geometry;
pub mod state;
pub mod target;
pub mod tick;
pub mod timer;
pub mod trajectory;

pub use aim::{AimController, AimFeedback, AimLine, AimState};
pub use collision::{Resolution, RoundResult, first_hit, resolve};
pub use evasion::{Countdown, EvasionEnd, EvasionSession, EvasionState, FaceTier, Heart, Hit};
pub use geometry::{Rect, Viewport};
pub use state::ChallengeState;
pub use target::{EvasivePolicy, Target, TargetId};
pub use tick::{ChallengeEvent, TickInput, apply_input, step_round, tick};
pub use timer::{Scheduler, TimerId};
pub use trajectory::{Flight, Projectile, advance, integrate};
