//! Segment intersection and coordinate-space conversion.
//!
//! Positions travel over the wire normalized to `[0, 1] x [0, 1]`; each viewer
//! denormalizes them into its own screen space before testing crossings. Mixing
//! the two spaces in one call is a caller error and is not detected here.

use glam::Vec2;

/// Screen-space extent used to map normalized positions to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn denormalize(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.width, p.y * self.height)
    }

    /// Inverse of [`Viewport::denormalize`]. A zero-sized axis maps to 0.
    #[inline]
    pub fn normalize(&self, p: Vec2) -> Vec2 {
        let x = if self.width > 0.0 { p.x / self.width } else { 0.0 };
        let y = if self.height > 0.0 { p.y / self.height } else { 0.0 };
        Vec2::new(x, y)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Returns true when segment `p1-p2` intersects segment `p3-p4`.
///
/// Solves `p1 + uA*(p2-p1) = p3 + uB*(p4-p3)` and accepts when both
/// parameters lie in `[0, 1]`. Parallel and collinear segments divide by
/// zero; the resulting infinities/NaNs fail the range test, so they report
/// no intersection even when collinear segments overlap. The solve runs in
/// `f64` so endpoint contact is not lost to `f32` rounding.
#[inline]
pub fn segments_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    let (p1, p2, p3, p4) = (p1.as_dvec2(), p2.as_dvec2(), p3.as_dvec2(), p4.as_dvec2());
    let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    let u_a = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
    let u_b = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denom;
    (0.0..=1.0).contains(&u_a) && (0.0..=1.0).contains(&u_b)
}
