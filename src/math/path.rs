//! Parametric guide paths.
//!
//! A [`Path`] is a chain of cubic Bezier segments through posed points. Each
//! point carries a position and a direction; the inner control points sit one
//! third of the chord length along those directions. The global parameter
//! `t` runs over `[0, 1]`, split evenly between segments.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Coarse samples per segment used to seed the closest-point search.
const CLOSEST_SAMPLES: usize = 32;
/// Golden-section refinement steps after the coarse search.
const CLOSEST_REFINE_STEPS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub pos: DVec3,
    pub dir: DVec3,
}

impl PathPoint {
    pub fn new(pos: DVec3, dir: DVec3) -> Self {
        Self { pos, dir }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<PathPoint>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Straight path between two points.
    pub fn line(a: DVec3, b: DVec3) -> Self {
        let d = (b - a).normalize_or_zero();
        Self::from_points([PathPoint::new(a, d), PathPoint::new(b, d)])
    }

    /// Path through positions with directions along the local chords.
    pub fn through(positions: &[DVec3]) -> Self {
        let n = positions.len();
        let mut path = Self::new();
        for (i, &p) in positions.iter().enumerate() {
            let prev = positions[i.saturating_sub(1)];
            let next = positions[(i + 1).min(n - 1)];
            path.add_point(p, next - prev);
        }
        path
    }

    pub fn from_points(points: impl IntoIterator<Item = PathPoint>) -> Self {
        Self { points: points.into_iter().collect() }
    }

    pub fn add_point(&mut self, pos: DVec3, dir: DVec3) -> &mut Self {
        self.points.push(PathPoint::new(pos, dir.normalize_or_zero()));
        self
    }

    pub fn points(&self) -> &[PathPoint] { &self.points }
    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Split global `t` into segment index and local parameter.
    fn locate(&self, t: f64) -> (usize, f64) {
        let n = self.segment_count();
        let s = t.clamp(0.0, 1.0) * n as f64;
        let i = (s.floor() as usize).min(n - 1);
        (i, s - i as f64)
    }

    fn controls(&self, i: usize) -> [DVec3; 4] {
        let a = self.points[i];
        let b = self.points[i + 1];
        let chord = b.pos - a.pos;
        let l = chord.length() / 3.0;
        let fallback = chord.normalize_or_zero();
        let da = if a.dir == DVec3::ZERO { fallback } else { a.dir };
        let db = if b.dir == DVec3::ZERO { fallback } else { b.dir };
        [a.pos, a.pos + da * l, b.pos - db * l, b.pos]
    }

    /// Position at global parameter `t`.
    pub fn position(&self, t: f64) -> DVec3 {
        match self.points.len() {
            0 => DVec3::ZERO,
            1 => self.points[0].pos,
            _ => {
                let (i, u) = self.locate(t);
                let [c0, c1, c2, c3] = self.controls(i);
                let v = 1.0 - u;
                c0 * (v * v * v) + c1 * (3.0 * v * v * u) + c2 * (3.0 * v * u * u) + c3 * (u * u * u)
            }
        }
    }

    /// Unit tangent at global parameter `t`.
    pub fn direction(&self, t: f64) -> DVec3 {
        match self.points.len() {
            0 => DVec3::ZERO,
            1 => self.points[0].dir,
            _ => {
                let (i, u) = self.locate(t);
                let [c0, c1, c2, c3] = self.controls(i);
                let v = 1.0 - u;
                let d = (c1 - c0) * (3.0 * v * v) + (c2 - c1) * (6.0 * v * u) + (c3 - c2) * (3.0 * u * u);
                let d = d.normalize_or_zero();
                if d == DVec3::ZERO { (c3 - c0).normalize_or_zero() } else { d }
            }
        }
    }

    /// `n + 1` evenly spaced positions.
    pub fn sample(&self, n: usize) -> Vec<DVec3> {
        let n = n.max(1);
        (0..=n).map(|i| self.position(i as f64 / n as f64)).collect()
    }

    /// Polyline length approximation.
    pub fn length(&self) -> f64 {
        let pts = self.sample(self.segment_count().max(1) * CLOSEST_SAMPLES);
        pts.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Parameter of the path point closest to `p`.
    pub fn closest_point(&self, p: DVec3) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }

        let n = self.segment_count() * CLOSEST_SAMPLES;
        let step = 1.0 / n as f64;
        let dist = |t: f64| self.position(t).distance_squared(p);

        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for k in 0..=n {
            let d = dist(k as f64 * step);
            if d < best_d {
                best_d = d;
                best = k;
            }
        }

        let mut lo = (best as f64 - 1.0).max(0.0) * step;
        let mut hi = (best as f64 + 1.0).min(n as f64) * step;
        let ratio = (5f64.sqrt() - 1.0) * 0.5;
        for _ in 0..CLOSEST_REFINE_STEPS {
            let a = hi - (hi - lo) * ratio;
            let b = lo + (hi - lo) * ratio;
            if dist(a) < dist(b) { hi = b; } else { lo = a; }
        }
        (lo + hi) * 0.5
    }

    /// Same curve traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().map(|p| PathPoint::new(p.pos, -p.dir)).collect(),
        }
    }

    /// Copy shifted sideways by `offset` (positive to the right of the
    /// direction of travel, with `up` as reference) and vertically by `lift`.
    pub fn offset(&self, offset: f64, lift: f64, up: DVec3) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| {
                    let right = p.dir.cross(up).normalize_or_zero();
                    PathPoint::new(p.pos + right * offset + up * lift, p.dir)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: DVec3, b: DVec3) -> bool {
        a.distance(b) < 1e-6
    }

    #[test]
    fn test_line_endpoints_and_midpoint() {
        let p = Path::line(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0));
        assert!(approx(p.position(0.0), DVec3::ZERO));
        assert!(approx(p.position(1.0), DVec3::new(10.0, 0.0, 0.0)));
        assert!(approx(p.position(0.5), DVec3::new(5.0, 0.0, 0.0)));
        assert!(approx(p.direction(0.3), DVec3::X));
        assert!((p.length() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_closest_point_on_line() {
        let p = Path::line(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0));
        let t = p.closest_point(DVec3::new(2.5, 3.0, 0.0));
        assert!((t - 0.25).abs() < 1e-4, "t = {t}");
        assert!(p.closest_point(DVec3::new(-4.0, 0.0, 0.0)) < 1e-4);
        assert!(p.closest_point(DVec3::new(40.0, 0.0, 0.0)) > 1.0 - 1e-4);
    }

    #[test]
    fn test_multi_segment_path_passes_through_points() {
        let pts = [DVec3::ZERO, DVec3::new(5.0, 0.0, 5.0), DVec3::new(10.0, 0.0, 0.0)];
        let p = Path::through(&pts);
        assert!(approx(p.position(0.0), pts[0]));
        assert!(approx(p.position(0.5), pts[1]));
        assert!(approx(p.position(1.0), pts[2]));
    }

    #[test]
    fn test_reversed_and_offset() {
        let p = Path::line(DVec3::ZERO, DVec3::new(0.0, 0.0, 4.0));
        let r = p.reversed();
        assert!(approx(r.position(0.0), DVec3::new(0.0, 0.0, 4.0)));

        // Travelling along +z with +y up, the right-hand side is -x.
        let o = p.offset(2.0, 0.5, DVec3::Y);
        assert!(approx(o.position(0.0), DVec3::new(-2.0, 0.5, 0.0)));
    }

    #[test]
    fn test_degenerate_paths() {
        let empty = Path::new();
        assert_eq!(empty.position(0.5), DVec3::ZERO);
        assert_eq!(empty.closest_point(DVec3::ONE), 0.0);

        let mut single = Path::new();
        single.add_point(DVec3::ONE, DVec3::X);
        assert_eq!(single.position(0.7), DVec3::ONE);
    }
}
