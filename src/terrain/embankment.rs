//! Embankments: raised strips blended into the terrain between guide paths.

use std::sync::Arc;

use glam::{DVec2, DVec3, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::GeoData;
use crate::material::Material;
use crate::math::{Path, Polygon};

/// Fixed-point iterations of the height estimator.
pub const EMBANKMENT_ITERATIONS: usize = 3;

/// Parameter step of the generated mesh.
const GEOMETRY_RESOLUTION: f64 = 0.025;

/// Embankment height sample together with the guide-path points it used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmbankmentSample {
    pub point: DVec3,
    pub left: DVec3,
    pub right: DVec3,
}

/// Strip bounded by two top guide paths and optional foot paths.
///
/// `p1` and `p2` run in opposite directions so that their points, taken in
/// order, describe the closed footprint polygon.
#[derive(Debug, Clone)]
pub struct Embankment {
    id: String,
    p1: Path,
    p2: Path,
    sides: Option<(Path, Path)>,
    area: Polygon,
    geometry: GeoData,
    material: Option<Arc<Material>>,
}

impl Embankment {
    pub fn new(id: impl Into<String>, p1: Path, p2: Path, sides: Option<(Path, Path)>) -> Self {
        let area = Polygon::from_points(
            p1.points().iter().chain(p2.points()).map(|p| DVec2::new(p.pos.x, p.pos.z)),
        );
        Self {
            id: id.into(),
            p1,
            p2,
            sides,
            area,
            geometry: GeoData::new(),
            material: None,
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn area(&self) -> &Polygon { &self.area }
    pub fn geometry(&self) -> &GeoData { &self.geometry }
    pub fn guides(&self) -> (&Path, &Path) { (&self.p1, &self.p2) }
    pub fn sides(&self) -> Option<(&Path, &Path)> { self.sides.as_ref().map(|(a, b)| (a, b)) }
    pub fn material(&self) -> Option<&Arc<Material>> { self.material.as_ref() }

    pub fn set_material(&mut self, material: Arc<Material>) {
        self.material = Some(material);
    }

    /// Footprint test in the xz plane.
    pub fn is_inside(&self, p: DVec2) -> bool {
        self.area.is_inside(p)
    }

    pub fn height(&self, p: DVec2) -> f64 {
        self.probe(p).point.y
    }

    /// Run the estimator and report the blended point plus the closest points
    /// on both guide paths.
    ///
    /// Each iteration projects `(x, h, z)` onto both paths and blends their
    /// heights by inverse distance. An iteration that produces a non-finite
    /// height keeps the previous estimate.
    pub fn probe(&self, p: DVec2) -> EmbankmentSample {
        let mut sample = EmbankmentSample {
            point: DVec3::new(p.x, 0.0, p.y),
            left: DVec3::ZERO,
            right: DVec3::ZERO,
        };
        let mut h = 0.0;
        for _ in 0..EMBANKMENT_ITERATIONS {
            let q = DVec3::new(p.x, h, p.y);
            let p1 = self.p1.position(self.p1.closest_point(q));
            let p2 = self.p2.position(self.p2.closest_point(q));
            let d1 = p1.distance(q);
            let d2 = p2.distance(q);
            let t = if d1 + d2 > f64::EPSILON { d2 / (d1 + d2) } else { 0.5 };
            let next = p1.y * t + p2.y * (1.0 - t);
            if !next.is_finite() {
                break;
            }
            h = next;
            sample = EmbankmentSample { point: DVec3::new(p.x, h, p.y), left: p1, right: p2 };
        }
        sample
    }

    /// Build the embankment mesh: a top strip between the guide paths and,
    /// when foot paths are present, one side strip per guide.
    pub fn create_geometry(&mut self) {
        let n = (1.0 / GEOMETRY_RESOLUTION).round() as u32;
        let up = Vec3::Y;
        let mut data = GeoData::new();
        let vert = |data: &mut GeoData, p: DVec3| {
            let p = p.as_vec3();
            data.push_vert_tc(p, up, Vec2::new(p.x, p.z));
        };

        for i in 0..=n {
            let t = (i as f64 * GEOMETRY_RESOLUTION).min(1.0);
            vert(&mut data, self.p1.position(t));
            vert(&mut data, self.p2.position(1.0 - t));
            match &self.sides {
                Some((p3, p4)) => {
                    vert(&mut data, p3.position(t));
                    vert(&mut data, p4.position(1.0 - t));
                    if i < n {
                        let (a, b) = (i * 4, (i + 1) * 4);
                        data.push_quad(a, a + 1, b + 1, b);
                        data.push_quad(a, b, b + 2, a + 2);
                        data.push_quad(a + 1, a + 3, b + 3, b + 1);
                    }
                }
                None => {
                    if i < n {
                        let (a, b) = (i * 2, (i + 1) * 2);
                        data.push_quad(a, a + 1, b + 1, b);
                    }
                }
            }
        }

        data.update_normals();
        self.geometry = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat bed at height 2 between x=-1 and x=1, running along z.
    fn bed() -> Embankment {
        let p1 = Path::line(DVec3::new(-1.0, 2.0, -5.0), DVec3::new(-1.0, 2.0, 5.0));
        let p2 = Path::line(DVec3::new(1.0, 2.0, 5.0), DVec3::new(1.0, 2.0, -5.0));
        Embankment::new("bed", p1, p2, None)
    }

    #[test]
    fn test_inside_near_midline_outside_far_away() {
        let e = bed();
        assert!(e.is_inside(DVec2::new(0.0, 0.0)));
        assert!(e.is_inside(DVec2::new(0.2, 4.0)));
        assert!(!e.is_inside(DVec2::new(30.0, 0.0)));
        assert!(!e.is_inside(DVec2::new(0.0, -30.0)));
    }

    #[test]
    fn test_flat_bed_height() {
        let e = bed();
        assert!((e.height(DVec2::new(0.3, 1.0)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_sloped_bed_blends_between_guides() {
        let p1 = Path::line(DVec3::new(-1.0, 0.0, -5.0), DVec3::new(-1.0, 0.0, 5.0));
        let p2 = Path::line(DVec3::new(1.0, 4.0, 5.0), DVec3::new(1.0, 4.0, -5.0));
        let e = Embankment::new("slope", p1, p2, None);
        let mid = e.height(DVec2::new(0.0, 0.0));
        assert!(mid > 0.0 && mid < 4.0);
        let s = e.probe(DVec2::new(0.0, 0.0));
        assert!((s.left.x + 1.0).abs() < 1e-3);
        assert!((s.right.x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_guides_do_not_produce_nan() {
        let p = Path::line(DVec3::new(0.0, 1.0, 0.0), DVec3::new(0.0, 1.0, 0.0));
        let e = Embankment::new("dot", p.clone(), p, None);
        assert!(e.height(DVec2::ZERO).is_finite());
    }

    #[test]
    fn test_top_strip_only_without_sides() {
        let mut e = bed();
        e.create_geometry();
        assert_eq!(e.geometry().len(), 41 * 2);
        assert_eq!(e.geometry().count_quads(), 40);
    }

    #[test]
    fn test_sides_add_two_strips() {
        let p1 = Path::line(DVec3::new(-1.0, 2.0, -5.0), DVec3::new(-1.0, 2.0, 5.0));
        let p2 = Path::line(DVec3::new(1.0, 2.0, 5.0), DVec3::new(1.0, 2.0, -5.0));
        let p3 = Path::line(DVec3::new(-2.0, 0.0, -5.0), DVec3::new(-2.0, 0.0, 5.0));
        let p4 = Path::line(DVec3::new(2.0, 0.0, 5.0), DVec3::new(2.0, 0.0, -5.0));
        let mut e = Embankment::new("bed", p1, p2, Some((p3, p4)));
        e.create_geometry();
        assert_eq!(e.geometry().len(), 41 * 4);
        assert_eq!(e.geometry().count_quads(), 120);
    }
}
