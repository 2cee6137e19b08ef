//! Planar polygons.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Closed 2D polygon; the last point connects back to the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<DVec2>,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: impl IntoIterator<Item = DVec2>) -> Self {
        Self { points: points.into_iter().collect() }
    }

    pub fn add_point(&mut self, p: DVec2) {
        self.points.push(p);
    }

    pub fn points(&self) -> &[DVec2] { &self.points }
    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    /// Even-odd crossing test. Polygons with fewer than three points contain
    /// nothing.
    pub fn is_inside(&self, p: DVec2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Signed area (positive for counter-clockwise winding).
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut a = 0.0;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            a += p.perp_dot(q);
        }
        a * 0.5
    }

    pub fn translate(&mut self, d: DVec2) {
        for p in &mut self.points {
            *p += d;
        }
    }

    pub fn scale(&mut self, s: DVec2) {
        for p in &mut self.points {
            *p *= s;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::from_points([
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(4.0, 4.0),
            DVec2::new(0.0, 4.0),
        ])
    }

    #[test]
    fn test_point_in_square() {
        let sq = square();
        assert!(sq.is_inside(DVec2::new(2.0, 2.0)));
        assert!(!sq.is_inside(DVec2::new(5.0, 2.0)));
        assert!(!sq.is_inside(DVec2::new(-1.0, -1.0)));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape: the notch between the arms is outside.
        let u = Polygon::from_points([
            DVec2::new(0.0, 0.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(3.0, 3.0),
            DVec2::new(2.0, 3.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 3.0),
            DVec2::new(0.0, 3.0),
        ]);
        assert!(u.is_inside(DVec2::new(0.5, 2.0)));
        assert!(!u.is_inside(DVec2::new(1.5, 2.0)));
        assert!(u.is_inside(DVec2::new(1.5, 0.5)));
    }

    #[test]
    fn test_area_and_degenerate() {
        assert_eq!(square().area(), 16.0);
        let line = Polygon::from_points([DVec2::ZERO, DVec2::ONE]);
        assert!(!line.is_inside(DVec2::splat(0.5)));
        assert_eq!(line.area(), 0.0);
    }
}
