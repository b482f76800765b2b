//! Main challenge state
//!
//! Everything a single YES/NO round mutates lives in [`ChallengeState`],
//! owned by the main challenge scene and passed by reference to `tick`.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::aim::AimController;
use super::collision::RoundResult;
use super::geometry::Viewport;
use super::target::{EvasivePolicy, Target, TargetId};
use crate::consts::LAUNCH_ANCHOR;
use crate::settings::{NoHitPolicy, Settings};

#[derive(Debug, Clone)]
pub struct ChallengeState {
    /// Round seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub viewport: Viewport,
    pub aim: AimController,
    /// YES first, then NO
    pub targets: [Target; 2],
    pub result: RoundResult,
    pub gravity: f32,
    pub no_hit: NoHitPolicy,
    pub evasive: EvasivePolicy,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl ChallengeState {
    /// Fresh round: projectile at the launch anchor, result pending
    pub fn new(seed: u64, settings: &Settings) -> Self {
        let viewport = Viewport::new(settings.viewport_width, settings.viewport_height);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            viewport,
            aim: AimController::new(
                viewport.anchor(LAUNCH_ANCHOR),
                settings.gesture,
                settings.fire_multiplier,
            ),
            targets: [
                Target::yes(&viewport),
                Target::no(&viewport, settings.evasive_no_target),
            ],
            result: RoundResult::Pending,
            gravity: settings.gravity,
            no_hit: settings.no_hit,
            evasive: EvasivePolicy::default(),
            time_ticks: 0,
        }
    }

    pub fn target(&self, id: TargetId) -> &Target {
        match id {
            TargetId::Yes => &self.targets[0],
            TargetId::No => &self.targets[1],
        }
    }

    /// Accept aim input only while the round is undecided
    pub fn accepts_input(&self) -> bool {
        self.result.accepts_hits()
    }

    /// Re-anchor the layout for a new viewport size
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        for target in &mut self.targets {
            target.relayout(&viewport);
        }
        self.aim.set_launch(viewport.anchor(LAUNCH_ANCHOR));
    }
}
