//! YES/NO targets and the evasive NO relocation policy

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Viewport};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetId {
    Yes,
    No,
}

impl TargetId {
    pub fn label(&self) -> &'static str {
        match self {
            TargetId::Yes => "YES",
            TargetId::No => "NO",
        }
    }
}

/// A static target box
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub pos: Vec2,
    pub size: Vec2,
    /// Runs away from a nearby pointer (NO only)
    pub evasive: bool,
    /// Layout anchor as viewport fractions; re-resolved on resize
    anchor: (f32, f32),
}

impl Target {
    pub fn yes(viewport: &Viewport) -> Self {
        Self::at_anchor(TargetId::Yes, YES_ANCHOR, YES_SIZE, viewport)
    }

    pub fn no(viewport: &Viewport, evasive: bool) -> Self {
        let mut target = Self::at_anchor(TargetId::No, NO_ANCHOR, NO_SIZE, viewport);
        target.evasive = evasive;
        target
    }

    fn at_anchor(id: TargetId, anchor: (f32, f32), size: (f32, f32), viewport: &Viewport) -> Self {
        Self {
            id,
            pos: viewport.anchor(anchor),
            size: Vec2::new(size.0, size.1),
            evasive: false,
            anchor,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, self.size)
    }

    /// Re-resolve the position after a viewport change
    pub fn relayout(&mut self, viewport: &Viewport) {
        self.pos = viewport.anchor(self.anchor);
    }

    /// Move somewhere else; the new spot becomes the layout anchor
    pub fn relocate(&mut self, pos: Vec2, viewport: &Viewport) {
        self.pos = pos;
        self.anchor = (pos.x / viewport.width, pos.y / viewport.height);
    }
}

/// Where an evasive target may jump to, and when
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvasivePolicy {
    /// Pointer distance that triggers a jump
    pub radius: f32,
    /// Inset of the safe area from the viewport edges
    pub inset: f32,
    /// Attempts at finding a spot clear of the other target
    pub attempts: u32,
}

impl Default for EvasivePolicy {
    fn default() -> Self {
        Self {
            radius: EVASIVE_RADIUS,
            inset: EVASIVE_INSET,
            attempts: 8,
        }
    }
}

impl EvasivePolicy {
    /// Safe area: upper half of the viewport, inset from the edges
    pub fn safe_area(&self, viewport: &Viewport) -> Rect {
        Rect::from_corners(
            Vec2::new(self.inset, self.inset),
            Vec2::new(viewport.width - self.inset, viewport.height * 0.5),
        )
    }

    pub fn triggered(&self, target: &Target, pointer: Vec2) -> bool {
        target.evasive && target.pos.distance(pointer) < self.radius
    }

    /// Pick a new position for `target` inside the safe area.
    ///
    /// Avoids overlapping `avoid` when possible; after `attempts` misses the
    /// last candidate is used anyway.
    pub fn pick_spot<R: Rng>(&self, target: &Target, avoid: &Rect, viewport: &Viewport, rng: &mut R) -> Vec2 {
        let area = self.safe_area(viewport);
        let half = target.size * 0.5;
        let min = area.min() + half;
        let max = (area.max() - half).max(min);

        let mut candidate = target.pos;
        for _ in 0..self.attempts.max(1) {
            candidate = Vec2::new(
                sample(rng, min.x, max.x),
                sample(rng, min.y, max.y),
            );
            if !Rect::from_center(candidate, target.size).overlaps(avoid) {
                break;
            }
        }
        candidate
    }
}

fn sample<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn default_layout_matches_canvas() {
        let vp = Viewport::default();
        let yes = Target::yes(&vp);
        let no = Target::no(&vp, false);
        assert_eq!(yes.pos, Vec2::new(90.0, 220.0));
        assert_eq!(no.pos, Vec2::new(270.0, 220.0));
        assert_eq!(yes.bounds().size(), Vec2::new(120.0, 60.0));
        assert_eq!(no.bounds().size(), Vec2::new(40.0, 20.0));
    }

    #[test]
    fn relayout_follows_resize() {
        let mut yes = Target::yes(&Viewport::default());
        yes.relayout(&Viewport::new(720.0, 1280.0));
        assert_eq!(yes.pos, Vec2::new(180.0, 440.0));
    }

    #[test]
    fn only_evasive_targets_trigger() {
        let vp = Viewport::default();
        let policy = EvasivePolicy::default();
        let calm = Target::no(&vp, false);
        let shy = Target::no(&vp, true);
        let near = Vec2::new(250.0, 240.0);
        assert!(!policy.triggered(&calm, near));
        assert!(policy.triggered(&shy, near));
        assert!(!policy.triggered(&shy, Vec2::new(100.0, 600.0)));
    }

    #[test]
    fn relocation_stays_in_safe_area_and_clear_of_yes() {
        let vp = Viewport::default();
        let policy = EvasivePolicy::default();
        let yes = Target::yes(&vp);
        let no = Target::no(&vp, true);
        let area = policy.safe_area(&vp);
        let mut rng = Pcg32::seed_from_u64(7);

        for _ in 0..200 {
            let spot = policy.pick_spot(&no, &yes.bounds(), &vp, &mut rng);
            let b = Rect::from_center(spot, no.size);
            assert!(b.min().x >= area.min().x - 1e-3 && b.max().x <= area.max().x + 1e-3);
            assert!(b.min().y >= area.min().y - 1e-3 && b.max().y <= area.max().y + 1e-3);
            assert!(!b.overlaps(&yes.bounds()), "{spot:?} overlaps YES");
        }
    }

    #[test]
    fn relocation_falls_back_when_nothing_is_clear() {
        let vp = Viewport::default();
        let policy = EvasivePolicy {
            attempts: 1,
            ..EvasivePolicy::default()
        };
        let no = Target::no(&vp, true);
        let area = policy.safe_area(&vp);
        // Blocker covering the whole safe area
        let blocker = Rect::from_center(area.center, area.size() + Vec2::splat(10.0));
        let mut rng = Pcg32::seed_from_u64(3);

        let spot = policy.pick_spot(&no, &blocker, &vp, &mut rng);
        assert_ne!(spot, no.pos);
        assert!(area.contains(spot));
        assert!(Rect::from_center(spot, no.size).overlaps(&blocker));
    }

    #[test]
    fn relocate_updates_anchor() {
        let vp = Viewport::default();
        let mut no = Target::no(&vp, true);
        no.relocate(Vec2::new(180.0, 160.0), &vp);
        no.relayout(&Viewport::new(720.0, 1280.0));
        assert_eq!(no.pos, Vec2::new(360.0, 320.0));
    }
}
