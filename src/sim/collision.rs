//! Projectile vs. target collisions and round outcome resolution
//!
//! Collisions are the only way a round gets an outcome. Every
//! outcome-producing path goes through [`RoundResult::settle`], which
//! refuses anything once the round has left `Pending`. A lost evasion
//! challenge confirms the NO on a fresh round (`Pending -> NoConfirmed`),
//! so `NoProvisional` never advances.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aim::AimController;
use super::target::{Target, TargetId};
use crate::settings::NoHitPolicy;

/// Outcome of the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundResult {
    /// No outcome yet
    #[default]
    Pending,
    /// Hit YES (terminal)
    Yes,
    /// Hit NO; the evasion challenge decides
    NoProvisional,
    /// NO stands (terminal)
    NoConfirmed,
}

impl RoundResult {
    /// Yes and NoConfirmed end the lineage; nothing may mutate the round after them
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoundResult::Yes | RoundResult::NoConfirmed)
    }

    /// Collisions only count while pending
    pub fn accepts_hits(&self) -> bool {
        *self == RoundResult::Pending
    }

    /// The outcome gate. Applies `next` if the transition is legal and
    /// reports whether it did; illegal transitions leave `self` untouched.
    pub fn settle(&mut self, next: RoundResult) -> bool {
        use RoundResult::*;
        let legal = matches!(
            (*self, next),
            (Pending, Yes) | (Pending, NoProvisional) | (Pending, NoConfirmed)
        );
        if legal {
            log::info!("Round result {:?} -> {:?}", self, next);
            *self = next;
        }
        legal
    }
}

/// What a resolved collision asks the scene to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// YES hit: celebrate at the target
    Yes { at: Vec2 },
    /// NO hit, final
    NoConfirmed { at: Vec2 },
    /// NO hit, hand over to the evasion challenge
    NoDeferred { at: Vec2 },
}

/// First target the projectile overlaps, in slice order. Callers keep YES
/// first so it wins a double overlap.
pub fn first_hit<'a>(aim: &AimController, targets: &'a [Target]) -> Option<&'a Target> {
    let body = aim.projectile().collision_box();
    targets.iter().find(|t| t.bounds().overlaps(&body))
}

/// Test the fired projectile against every target and settle the round on
/// the first hit. Returns `None` when nothing changed.
pub fn resolve(
    aim: &mut AimController,
    targets: &[Target],
    result: &mut RoundResult,
    policy: NoHitPolicy,
) -> Option<Resolution> {
    if !aim.projectile().is_fired() || !result.accepts_hits() {
        return None;
    }

    let target = first_hit(aim, targets)?;
    let at = target.pos;
    let resolution = match (target.id, policy) {
        (TargetId::Yes, _) => result.settle(RoundResult::Yes).then_some(Resolution::Yes { at }),
        (TargetId::No, NoHitPolicy::Immediate) => result
            .settle(RoundResult::NoConfirmed)
            .then_some(Resolution::NoConfirmed { at }),
        (TargetId::No, NoHitPolicy::Deferred) => result
            .settle(RoundResult::NoProvisional)
            .then_some(Resolution::NoDeferred { at }),
    }?;

    aim.freeze();
    Some(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FIRE_MULTIPLIER;
    use crate::settings::GestureModel;
    use crate::sim::geometry::Viewport;

    fn setup() -> (AimController, Vec<Target>) {
        let vp = Viewport::default();
        let aim = AimController::new(vp.anchor((0.5, 0.875)), GestureModel::DragFire, FIRE_MULTIPLIER);
        (aim, vec![Target::yes(&vp), Target::no(&vp, false)])
    }

    fn fire_at(aim: &mut AimController, pos: Vec2) {
        aim.begin_aim(aim.launch());
        aim.release_aim(aim.launch() + Vec2::new(0.0, -10.0));
        aim.projectile_mut().pos = pos;
    }

    #[test]
    fn settle_gate_transitions() {
        let mut r = RoundResult::Pending;
        assert!(r.settle(RoundResult::NoProvisional));
        assert!(!r.settle(RoundResult::Yes));
        assert!(!r.settle(RoundResult::NoConfirmed));
        assert!(!r.settle(RoundResult::Pending));
        assert_eq!(r, RoundResult::NoProvisional);

        let mut r = RoundResult::Pending;
        assert!(r.settle(RoundResult::NoConfirmed));
        assert!(r.is_terminal());
        assert!(!r.settle(RoundResult::Yes));
        assert!(!r.settle(RoundResult::Pending));
        assert_eq!(r, RoundResult::NoConfirmed);
    }

    #[test]
    fn yes_hit_is_idempotent() {
        let (mut aim, targets) = setup();
        let mut result = RoundResult::Pending;
        fire_at(&mut aim, Vec2::new(90.0, 220.0));

        let first = resolve(&mut aim, &targets, &mut result, NoHitPolicy::Deferred);
        assert_eq!(first, Some(Resolution::Yes { at: Vec2::new(90.0, 220.0) }));
        assert_eq!(result, RoundResult::Yes);
        assert_eq!(aim.projectile().vel, Vec2::ZERO);

        let snapshot = (aim.projectile().pos, aim.state());
        let second = resolve(&mut aim, &targets, &mut result, NoHitPolicy::Deferred);
        assert_eq!(second, None);
        assert_eq!(result, RoundResult::Yes);
        assert_eq!((aim.projectile().pos, aim.state()), snapshot);
    }

    #[test]
    fn no_hit_follows_policy() {
        let (mut aim, targets) = setup();
        let mut result = RoundResult::Pending;
        fire_at(&mut aim, Vec2::new(270.0, 220.0));
        assert_eq!(
            resolve(&mut aim, &targets, &mut result, NoHitPolicy::Deferred),
            Some(Resolution::NoDeferred { at: Vec2::new(270.0, 220.0) })
        );
        assert_eq!(result, RoundResult::NoProvisional);

        let (mut aim, targets) = setup();
        let mut result = RoundResult::Pending;
        fire_at(&mut aim, Vec2::new(270.0, 220.0));
        assert!(matches!(
            resolve(&mut aim, &targets, &mut result, NoHitPolicy::Immediate),
            Some(Resolution::NoConfirmed { .. })
        ));
        assert_eq!(result, RoundResult::NoConfirmed);
    }

    #[test]
    fn yes_wins_a_double_overlap() {
        let (mut aim, mut targets) = setup();
        targets[1].pos = targets[0].pos;
        let mut result = RoundResult::Pending;
        fire_at(&mut aim, targets[0].pos);
        assert_eq!(first_hit(&aim, &targets).map(|t| t.id), Some(TargetId::Yes));
        assert!(matches!(
            resolve(&mut aim, &targets, &mut result, NoHitPolicy::Immediate),
            Some(Resolution::Yes { .. })
        ));
    }

    #[test]
    fn terminal_round_ignores_collisions() {
        let (mut aim, targets) = setup();
        let mut result = RoundResult::NoConfirmed;
        fire_at(&mut aim, Vec2::new(90.0, 220.0));
        assert_eq!(resolve(&mut aim, &targets, &mut result, NoHitPolicy::Deferred), None);
        assert_eq!(result, RoundResult::NoConfirmed);
    }

    #[test]
    fn unfired_projectile_never_collides() {
        let (mut aim, targets) = setup();
        let mut result = RoundResult::Pending;
        aim.projectile_mut().pos = Vec2::new(90.0, 220.0);
        assert_eq!(resolve(&mut aim, &targets, &mut result, NoHitPolicy::Deferred), None);
        assert_eq!(result, RoundResult::Pending);
    }

    #[test]
    fn miss_changes_nothing() {
        let (mut aim, targets) = setup();
        let mut result = RoundResult::Pending;
        fire_at(&mut aim, Vec2::new(180.0, 400.0));
        assert_eq!(resolve(&mut aim, &targets, &mut result, NoHitPolicy::Deferred), None);
        assert_eq!(result, RoundResult::Pending);
        assert!(aim.projectile().is_fired());
    }
}
