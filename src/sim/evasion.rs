//! Evasion challenge: dodge (or catch) falling hearts against the clock
//!
//! [`EvasionSession`] holds the rules (hits, countdown, escalation, the
//! one-shot end). [`EvasionState`] adds the falling hearts and the player.
//! Timers live in the scene; they call `spawn_heart` and `countdown`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Viewport};
use crate::consts::*;

/// Player face, one tier per hit band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaceTier {
    /// 0-2 hits
    Unamused,
    /// 3-5 hits
    Poker,
    /// 6-11 hits
    Amused,
    /// 12+ hits
    Love,
}

impl FaceTier {
    pub fn for_hits(hits: u32) -> Self {
        match hits {
            0..=2 => FaceTier::Unamused,
            3..=5 => FaceTier::Poker,
            6..=11 => FaceTier::Amused,
            _ => FaceTier::Love,
        }
    }

    /// Texture key the host loads for this face
    pub fn texture(&self) -> &'static str {
        match self {
            FaceTier::Unamused => "unamused",
            FaceTier::Poker => "poker",
            FaceTier::Amused => "amused",
            FaceTier::Love => "love",
        }
    }
}

/// How the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvasionEnd {
    /// Enough hearts landed: the NO melts
    Lovestruck,
    /// Clock ran out first: the NO stands
    TimeUp,
}

/// Result of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    /// Spawn rate just doubled
    pub escalated: bool,
    pub ended: Option<EvasionEnd>,
}

/// Result of one heart landing on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub hits: u32,
    /// New face when the tier changed
    pub face: Option<FaceTier>,
    pub ended: Option<EvasionEnd>,
}

/// Rules of one evasion challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvasionSession {
    hits: u32,
    time_left: i32,
    spawn_interval_ms: u32,
    ended: Option<EvasionEnd>,
}

impl Default for EvasionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EvasionSession {
    pub fn new() -> Self {
        Self {
            hits: 0,
            time_left: EVASION_DURATION_SECS,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            ended: None,
        }
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn time_left(&self) -> i32 {
        self.time_left
    }

    pub fn spawn_interval_ms(&self) -> u32 {
        self.spawn_interval_ms
    }

    pub fn ended(&self) -> Option<EvasionEnd> {
        self.ended
    }

    pub fn is_over(&self) -> bool {
        self.ended.is_some()
    }

    pub fn face(&self) -> FaceTier {
        FaceTier::for_hits(self.hits)
    }

    /// One heart landed. Ignored once the session is over.
    pub fn register_hit(&mut self) -> Option<Hit> {
        if self.is_over() {
            return None;
        }
        let before = self.face();
        self.hits += 1;
        let after = self.face();

        let ended = (self.hits >= EVASION_HITS_TO_WIN).then_some(EvasionEnd::Lovestruck);
        if let Some(end) = ended {
            self.end(end);
        }
        Some(Hit {
            hits: self.hits,
            face: (after != before).then_some(after),
            ended,
        })
    }

    /// One second passed. Ignored once the session is over.
    pub fn countdown(&mut self) -> Option<Countdown> {
        if self.is_over() {
            return None;
        }
        self.time_left -= 1;

        let mut report = Countdown::default();
        if self.time_left == EVASION_ESCALATE_AT {
            self.spawn_interval_ms = SPAWN_INTERVAL_ESCALATED_MS;
            report.escalated = true;
            log::info!("Evasion escalated: spawning every {} ms", self.spawn_interval_ms);
        }
        if self.time_left <= 0 {
            self.end(EvasionEnd::TimeUp);
            report.ended = Some(EvasionEnd::TimeUp);
        }
        Some(report)
    }

    fn end(&mut self, end: EvasionEnd) {
        debug_assert!(self.ended.is_none());
        log::info!(
            "Evasion over: {:?} ({} hits, {}s left)",
            end,
            self.hits,
            self.time_left
        );
        self.ended = Some(end);
    }
}

/// A falling heart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heart {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Heart {
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(HEART_SIZE))
    }
}

/// Evasion world: session rules plus hearts and the player
#[derive(Debug, Clone)]
pub struct EvasionState {
    pub session: EvasionSession,
    pub viewport: Viewport,
    pub rng: Pcg32,
    /// Player center
    pub player: Vec2,
    /// Active hearts (sorted by id)
    pub hearts: Vec<Heart>,
    pub gravity: f32,
    next_id: u32,
}

impl EvasionState {
    pub fn new(seed: u64, viewport: Viewport, gravity: f32) -> Self {
        Self {
            session: EvasionSession::new(),
            viewport,
            rng: Pcg32::seed_from_u64(seed),
            player: Self::player_home(&viewport),
            hearts: Vec::new(),
            gravity,
            next_id: 1,
        }
    }

    fn player_home(viewport: &Viewport) -> Vec2 {
        Vec2::new(viewport.width / 2.0, viewport.height - PLAYER_BOTTOM_OFFSET)
    }

    pub fn player_bounds(&self) -> Rect {
        Rect::from_center(self.player, Vec2::splat(PLAYER_SIZE))
    }

    /// Player follows the pointer horizontally; no physics
    pub fn move_player(&mut self, x: f32) {
        self.player.x = self.viewport.clamp_x(x, PLAYER_SIZE / 2.0);
    }

    /// Drop a new heart at a random x along the top edge
    pub fn spawn_heart(&mut self) -> &Heart {
        let lo = HEART_SPAWN_INSET;
        let hi = (self.viewport.width - HEART_SPAWN_INSET).max(lo);
        let x = if hi > lo { self.rng.random_range(lo..=hi) } else { lo };

        let id = self.next_id;
        self.next_id += 1;
        self.hearts.push(Heart {
            id,
            pos: Vec2::new(x, HEART_SPAWN_Y),
            vel: Vec2::new(0.0, HEART_FALL_SPEED),
        });
        &self.hearts[self.hearts.len() - 1]
    }

    /// Advance hearts, drop the ones that fell off screen, and collect hits.
    ///
    /// Returns `(caught, culled)` heart ids. Collisions stop counting as soon
    /// as the session ends.
    pub fn step(&mut self, dt: f32) -> (Vec<(u32, Hit)>, Vec<u32>) {
        for heart in &mut self.hearts {
            heart.vel.y += self.gravity * dt;
            heart.pos += heart.vel * dt;
        }

        let floor = self.viewport.height + OFF_BOUNDS_MARGIN;
        let mut culled = Vec::new();
        self.hearts.retain(|h| {
            let keep = h.pos.y <= floor;
            if !keep {
                culled.push(h.id);
            }
            keep
        });

        let mut caught = Vec::new();
        let player = self.player_bounds();
        let mut i = 0;
        while i < self.hearts.len() && !self.session.is_over() {
            if self.hearts[i].bounds().overlaps(&player) {
                let heart = self.hearts.remove(i);
                if let Some(hit) = self.session.register_hit() {
                    caught.push((heart.id, hit));
                }
            } else {
                i += 1;
            }
        }
        (caught, culled)
    }

    pub fn clear_hearts(&mut self) {
        self.hearts.clear();
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.player.y = Self::player_home(&viewport).y;
        self.player.x = viewport.clamp_x(self.player.x, PLAYER_SIZE / 2.0);
    }
}
