//! Axis-aligned bounding box.

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Initial extent of a cleared box; any real point shrinks it.
const CLEARED_EXTENT: f64 = 1e6;

/// Axis-aligned box with an explicit "empty" state.
///
/// Invariant: `min <= max` componentwise unless [`Boundingbox::is_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundingbox {
    min: DVec3,
    max: DVec3,
    cleared: bool,
}

impl Default for Boundingbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Boundingbox {
    pub fn new() -> Self {
        Self {
            min: DVec3::splat(CLEARED_EXTENT),
            max: DVec3::splat(-CLEARED_EXTENT),
            cleared: true,
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec3>) -> Self {
        let mut bb = Self::new();
        bb.update_from_points(points);
        bb
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Grow the box to contain `v`.
    pub fn update(&mut self, v: DVec3) {
        self.cleared = false;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    pub fn update_from_points<'a>(&mut self, points: impl IntoIterator<Item = &'a DVec3>) {
        for p in points {
            self.update(*p);
        }
    }

    /// Clamp `p` into the box.
    pub fn clamp(&self, p: DVec3) -> DVec3 {
        p.clamp(self.min, self.max)
    }

    pub fn is_empty(&self) -> bool { self.cleared }
    pub fn min(&self) -> DVec3 { self.min }
    pub fn max(&self) -> DVec3 { self.max }

    pub fn center(&self) -> DVec3 {
        if self.cleared { DVec3::ZERO } else { (self.max + self.min) * 0.5 }
    }

    pub fn size(&self) -> DVec3 {
        if self.cleared { DVec3::ZERO } else { self.max - self.min }
    }

    pub fn radius(&self) -> f64 {
        if self.cleared { 0.0 } else { (self.size() * 0.5).length() }
    }

    /// Inclusive containment test.
    pub fn is_inside(&self, p: DVec3) -> bool {
        p.cmple(self.max).all() && p.cmpge(self.min).all()
    }

    pub fn move_by(&mut self, t: DVec3) {
        self.min += t;
        self.max += t;
    }

    /// Re-center the box. A cleared box collapses onto `c`.
    pub fn set_center(&mut self, c: DVec3) {
        if self.cleared {
            self.update(c);
        } else {
            self.move_by(c - self.center());
        }
    }

    /// Scale the box around its center.
    pub fn scale(&mut self, s: f64) {
        let size = self.size();
        let grow = (size * s - size) * 0.5;
        self.min -= grow;
        self.max += grow;
    }

    /// Uniformly distributed point inside the box.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec3 {
        let f = DVec3::new(rng.r#gen(), rng.r#gen(), rng.r#gen());
        self.min + f * self.size()
    }

    /// Slab test of a ray against the box. Boxes entirely behind the origin
    /// are not hit.
    pub fn intersected_by(&self, origin: DVec3, dir: DVec3) -> bool {
        let inv = dir.recip();
        let t1 = (self.min - origin) * inv;
        let t2 = (self.max - origin) * inv;

        let tmin = t1.min(t2).max_element();
        let tmax = t1.max(t2).min_element();

        if tmax < 0.0 { return false; }
        tmin <= tmax
    }
}
