//! Aim controller: pointer gestures to launch velocity
//!
//! Owns the projectile so that `Projectile::fired` and [`AimState`] can only
//! change together.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Viewport;
use super::trajectory::{self, Flight, Projectile};
use crate::facing_angle;
use crate::input::PointerEvent;
use crate::settings::GestureModel;

/// Aiming state for the single projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AimState {
    /// Resting at the launch anchor, ready to aim
    Idle,
    /// Gesture in progress, anchor recorded
    Aiming,
    /// In flight (or frozen on a target)
    Fired,
}

/// Dashed guide from the aim anchor to the pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimLine {
    pub from: Vec2,
    pub to: Vec2,
}

/// What a pointer event did to the aim state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimFeedback {
    /// Event not allowed in the current state
    Ignored,
    /// Aim guide moved
    Retargeted(AimLine),
    /// Projectile launched
    Fired { velocity: Vec2 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AimController {
    state: AimState,
    projectile: Projectile,
    /// Rest position of the projectile
    launch: Vec2,
    /// Projectile position when the current aim began
    anchor: Vec2,
    gesture: GestureModel,
    fire_multiplier: f32,
    /// Velocity zeroed on a target hit; gravity no longer applies
    frozen: bool,
}

impl AimController {
    pub fn new(launch: Vec2, gesture: GestureModel, fire_multiplier: f32) -> Self {
        Self {
            state: AimState::Idle,
            projectile: Projectile::new(launch),
            launch,
            anchor: launch,
            gesture,
            fire_multiplier,
            frozen: false,
        }
    }

    #[inline]
    pub fn state(&self) -> AimState {
        self.state
    }

    #[inline]
    pub fn projectile(&self) -> &Projectile {
        &self.projectile
    }

    #[inline]
    pub fn launch(&self) -> Vec2 {
        self.launch
    }

    #[inline]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    #[inline]
    pub fn gesture(&self) -> GestureModel {
        self.gesture
    }

    /// Start aiming. No-op unless idle.
    pub fn begin_aim(&mut self, pointer: Vec2) -> bool {
        if self.state != AimState::Idle {
            return false;
        }
        self.anchor = self.projectile.pos;
        self.state = AimState::Aiming;
        log::debug!("Aim started at {:?} (pointer {:?})", self.anchor, pointer);
        true
    }

    /// Retarget while aiming. Returns the guide line to draw.
    pub fn update_aim(&mut self, pointer: Vec2) -> Option<AimLine> {
        if self.state != AimState::Aiming {
            return None;
        }
        let dir = pointer - self.anchor;
        if dir != Vec2::ZERO {
            self.projectile.facing = facing_angle(dir);
        }
        Some(AimLine {
            from: self.anchor,
            to: pointer,
        })
    }

    /// Fire toward the pointer. Speed scales with drag distance.
    pub fn release_aim(&mut self, pointer: Vec2) -> Option<Vec2> {
        if self.state != AimState::Aiming {
            return None;
        }
        let velocity = (pointer - self.anchor) * self.fire_multiplier;
        self.projectile.vel = velocity;
        self.projectile.set_fired(true);
        self.frozen = false;
        self.state = AimState::Fired;
        log::debug!("Fired with velocity {:?}", velocity);
        self.check();
        Some(velocity)
    }

    /// Route one pointer event through the configured gesture model
    pub fn handle(&mut self, event: PointerEvent) -> AimFeedback {
        let pointer = event.pos();
        match (self.gesture, event) {
            (GestureModel::DragFire, PointerEvent::Down { .. }) => {
                if self.begin_aim(pointer) {
                    self.retarget(pointer)
                } else {
                    AimFeedback::Ignored
                }
            }
            (GestureModel::DragFire, PointerEvent::Move { .. }) => self.retarget(pointer),
            (GestureModel::DragFire, PointerEvent::Up { .. }) => self.fire(pointer),

            // Immediate model: hovering arms the guide, a press fires
            (GestureModel::ImmediateFire, PointerEvent::Move { .. }) => {
                self.begin_aim(pointer);
                self.retarget(pointer)
            }
            (GestureModel::ImmediateFire, PointerEvent::Down { .. }) => {
                self.begin_aim(pointer);
                self.fire(pointer)
            }
            (GestureModel::ImmediateFire, PointerEvent::Up { .. }) => AimFeedback::Ignored,
        }
    }

    fn retarget(&mut self, pointer: Vec2) -> AimFeedback {
        self.update_aim(pointer)
            .map_or(AimFeedback::Ignored, AimFeedback::Retargeted)
    }

    fn fire(&mut self, pointer: Vec2) -> AimFeedback {
        self.release_aim(pointer)
            .map_or(AimFeedback::Ignored, |velocity| AimFeedback::Fired { velocity })
    }

    /// Integrate the projectile. An exit resets it to the launch anchor in the same step.
    pub fn step(&mut self, gravity: f32, dt: f32, viewport: &Viewport) -> Flight {
        if self.frozen {
            return Flight::InFlight;
        }
        let flight = trajectory::advance(&mut self.projectile, gravity, dt, viewport);
        if flight == Flight::Exited {
            log::debug!("Projectile left the viewport at {:?}, resetting", self.projectile.pos);
            self.reset();
        }
        flight
    }

    /// Back to the launch anchor, at rest, ready to aim
    pub fn reset(&mut self) {
        self.projectile.park(self.launch);
        self.anchor = self.launch;
        self.frozen = false;
        self.state = AimState::Idle;
        self.check();
    }

    /// Stop dead on a target
    pub fn freeze(&mut self) {
        self.projectile.vel = Vec2::ZERO;
        self.frozen = true;
    }

    /// Move the launch anchor (viewport resize). A projectile that has not
    /// been fired follows it, keeping its facing mid-drag.
    pub fn set_launch(&mut self, launch: Vec2) {
        self.launch = launch;
        match self.state {
            AimState::Idle => {
                self.projectile.park(launch);
                self.anchor = launch;
            }
            AimState::Aiming => {
                let facing = self.projectile.facing;
                self.projectile.park(launch);
                self.projectile.facing = facing;
                self.anchor = launch;
            }
            AimState::Fired => {}
        }
        self.check();
    }

    #[cfg(test)]
    pub(crate) fn projectile_mut(&mut self) -> &mut Projectile {
        &mut self.projectile
    }

    #[inline]
    fn check(&self) {
        debug_assert_eq!(
            self.projectile.is_fired(),
            self.state == AimState::Fired,
            "fired flag out of sync with aim state"
        );
    }
}
