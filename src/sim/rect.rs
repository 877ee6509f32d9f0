//! Axis-aligned rectangle geometry
//!
//! Screen space: x grows to the right, y grows downward, `(x, y)` is the
//! top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of size `w` x `h` whose bottom edge rests on `bottom`
    pub fn standing_on(x: f32, bottom: f32, w: f32, h: f32) -> Self {
        Self::new(x, bottom - h, w, h)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap test (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Trim `margin` pixels from every side, never below zero size
    pub fn shrink(&self, margin: f32) -> Rect {
        let mx = margin.min(self.w / 2.0);
        let my = margin.min(self.h / 2.0);
        Rect::new(self.x + mx, self.y + my, self.w - 2.0 * mx, self.h - 2.0 * my)
    }

    /// Sub-region given as fractions of this rectangle's extent
    pub fn fraction(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
        Rect::new(
            self.x + self.w * x0,
            self.y + self.h * y0,
            self.w * (x1 - x0),
            self.h * (y1 - y0),
        )
    }

    /// Entirely left of the screen (right edge < 0)
    #[inline]
    pub fn is_past_left_edge(&self) -> bool {
        self.right() < 0.0
    }

    /// Entirely outside a `width` x `height` screen on any side
    pub fn is_outside(&self, width: f32, height: f32) -> bool {
        self.right() < 0.0 || self.x > width || self.bottom() < 0.0 || self.y > height
    }
}
