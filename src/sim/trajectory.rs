//! Projectile flight under constant downward acceleration

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Viewport};
use crate::consts::{ARROW_BODY, OFF_BOUNDS_MARGIN};
use crate::facing_angle;

/// The arrow
///
/// `fired` is only written by [`super::aim::AimController`] so that it
/// always agrees with the aim state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Sprite rotation (radians, 0 = pointing up)
    pub facing: f32,
    /// Collision body size (axis-aligned, does not rotate with the sprite)
    pub body: Vec2,
    fired: bool,
}

impl Projectile {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            facing: 0.0,
            body: Vec2::new(ARROW_BODY.0, ARROW_BODY.1),
            fired: false,
        }
    }

    #[inline]
    pub fn is_fired(&self) -> bool {
        self.fired
    }

    pub(crate) fn set_fired(&mut self, fired: bool) {
        self.fired = fired;
    }

    pub fn collision_box(&self) -> Rect {
        Rect::from_center(self.pos, self.body)
    }

    /// Park the projectile at `anchor`, at rest, pointing up
    pub(crate) fn park(&mut self, anchor: Vec2) {
        self.pos = anchor;
        self.vel = Vec2::ZERO;
        self.facing = 0.0;
        self.fired = false;
    }
}

/// Result of one integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    /// Still inside the (margin-expanded) viewport
    InFlight,
    /// Left the viewport; the owner must reset it
    Exited,
}

/// Advance `(pos, vel)` by `dt` with downward acceleration `gravity`.
///
/// Semi-implicit Euler: velocity first, then position with the new velocity.
#[inline]
pub fn integrate(pos: Vec2, vel: Vec2, gravity: f32, dt: f32) -> (Vec2, Vec2) {
    let vel = Vec2::new(vel.x, vel.y + gravity * dt);
    (pos + vel * dt, vel)
}

/// Move a fired projectile one step and report whether it left the screen.
///
/// Unfired projectiles are not affected by gravity and never move.
pub fn advance(projectile: &mut Projectile, gravity: f32, dt: f32, viewport: &Viewport) -> Flight {
    if !projectile.is_fired() {
        return Flight::InFlight;
    }

    let (pos, vel) = integrate(projectile.pos, projectile.vel, gravity, dt);
    projectile.pos = pos;
    projectile.vel = vel;
    if vel != Vec2::ZERO {
        projectile.facing = facing_angle(vel);
    }

    if viewport.is_outside(projectile.pos, OFF_BOUNDS_MARGIN) {
        Flight::Exited
    } else {
        Flight::InFlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{GRAVITY, SIM_DT};

    #[test]
    fn integrate_applies_gravity_to_vy_only() {
        let (pos, vel) = integrate(Vec2::new(10.0, 10.0), Vec2::new(60.0, -120.0), 600.0, 0.5);
        assert_eq!(vel, Vec2::new(60.0, 180.0));
        assert_eq!(pos, Vec2::new(40.0, 100.0));
    }

    #[test]
    fn unfired_projectile_stays_put() {
        let vp = Viewport::default();
        let mut p = Projectile::new(Vec2::new(180.0, 560.0));
        p.vel = Vec2::new(100.0, 100.0);
        assert_eq!(advance(&mut p, GRAVITY, SIM_DT, &vp), Flight::InFlight);
        assert_eq!(p.pos, Vec2::new(180.0, 560.0));
    }

    #[test]
    fn fired_projectile_exits_left() {
        let vp = Viewport::default();
        let mut p = Projectile::new(Vec2::new(-51.0, 300.0));
        p.set_fired(true);
        assert_eq!(advance(&mut p, GRAVITY, SIM_DT, &vp), Flight::Exited);
    }

    #[test]
    fn facing_follows_velocity() {
        let vp = Viewport::default();
        let mut p = Projectile::new(Vec2::new(180.0, 300.0));
        p.vel = Vec2::new(300.0, 0.0);
        p.set_fired(true);
        advance(&mut p, 0.0, SIM_DT, &vp);
        assert!((p.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn collision_box_centered_on_projectile() {
        let p = Projectile::new(Vec2::new(100.0, 200.0));
        let b = p.collision_box();
        assert_eq!(b.center, Vec2::new(100.0, 200.0));
        assert_eq!(b.size(), Vec2::new(ARROW_BODY.0, ARROW_BODY.1));
    }
}
