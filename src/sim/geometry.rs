//! Viewport and axis-aligned box geometry
//!
//! Screen space: origin top-left, +x right, +y down. Layout positions are
//! stored as fractions of the viewport so a resize re-anchors everything.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// The visible canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Resolve a fractional anchor to a point on this viewport
    #[inline]
    pub fn anchor(&self, (fx, fy): (f32, f32)) -> Vec2 {
        Vec2::new(self.width * fx, self.height * fy)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.anchor((0.5, 0.5))
    }

    /// Whether `pos` lies outside the viewport expanded by `margin` on every side
    pub fn is_outside(&self, pos: Vec2, margin: f32) -> bool {
        pos.x < -margin
            || pos.x > self.width + margin
            || pos.y < -margin
            || pos.y > self.height + margin
    }

    /// Clamp an x coordinate so a body of `half_width` stays on screen
    pub fn clamp_x(&self, x: f32, half_width: f32) -> f32 {
        let max = (self.width - half_width).max(half_width);
        x.clamp(half_width, max)
    }
}

/// Axis-aligned rectangle stored as center + half extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub half: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    /// Rectangle spanning two corners (any order)
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            center: (min + max) * 0.5,
            half: (max - min) * 0.5,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }

    /// Strict overlap; boxes that only touch along an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half + other.half;
        d.x < reach.x && d.y < reach.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let d = (p - self.center).abs();
        d.x <= self.half.x && d.y <= self.half.y
    }
}
