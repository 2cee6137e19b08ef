//! Incremental 3D convex hull.

use glam::Vec3;
use hashbrown::{HashMap, HashSet};

/// Triangulated hull. Triangles wind counter-clockwise seen from outside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hull {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

fn normal(p: &[Vec3], f: [usize; 3]) -> Vec3 {
    (p[f[1]] - p[f[0]]).cross(p[f[2]] - p[f[0]])
}

fn farthest_by(range: impl Iterator<Item = usize>, key: impl Fn(usize) -> f32) -> Option<(usize, f32)> {
    range
        .map(|i| (i, key(i)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

/// Compute the convex hull of `points`.
///
/// Returns `None` for fewer than four points or when all points are
/// (nearly) coplanar.
pub fn convex_hull(points: &[Vec3]) -> Option<Hull> {
    if points.len() < 4 {
        return None;
    }

    let (lo, hi) = points.iter().fold((points[0], points[0]), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
    let eps = (hi - lo).max_element().max(f32::MIN_POSITIVE) * 1e-5;

    // Initial tetrahedron from extreme points.
    let a = 0;
    let (b, db) = farthest_by(0..points.len(), |i| points[i].distance_squared(points[a]))?;
    if db.sqrt() <= eps {
        return None;
    }
    let ab = points[b] - points[a];
    let (c, dc) = farthest_by(0..points.len(), |i| ab.cross(points[i] - points[a]).length())?;
    if dc <= eps * ab.length() {
        return None;
    }
    let n = ab.cross(points[c] - points[a]);
    let (d, dd) = farthest_by(0..points.len(), |i| n.dot(points[i] - points[a]).abs())?;
    if dd <= eps * n.length() {
        return None;
    }

    let mut faces: Vec<[usize; 3]> = Vec::new();
    let interior = (points[a] + points[b] + points[c] + points[d]) * 0.25;
    for f in [[a, b, c], [a, c, d], [a, d, b], [b, d, c]] {
        if normal(points, f).dot(points[f[0]] - interior) < 0.0 {
            faces.push([f[0], f[2], f[1]]);
        } else {
            faces.push(f);
        }
    }

    let seed: HashSet<usize> = [a, b, c, d].into_iter().collect();
    for (i, p) in points.iter().enumerate() {
        if seed.contains(&i) {
            continue;
        }

        let visible: Vec<bool> = faces
            .iter()
            .map(|&f| {
                let nrm = normal(points, f);
                let len = nrm.length();
                len > 0.0 && nrm.dot(*p - points[f[0]]) / len > eps
            })
            .collect();
        if !visible.iter().any(|v| *v) {
            continue;
        }

        let mut owner: HashMap<(usize, usize), bool> = HashMap::new();
        for (f, vis) in faces.iter().zip(&visible) {
            for k in 0..3 {
                owner.insert((f[k], f[(k + 1) % 3]), *vis);
            }
        }

        let mut next = Vec::with_capacity(faces.len());
        let mut horizon = Vec::new();
        for (f, vis) in faces.iter().zip(&visible) {
            if !vis {
                next.push(*f);
                continue;
            }
            for k in 0..3 {
                let e = (f[k], f[(k + 1) % 3]);
                if !owner.get(&(e.1, e.0)).copied().unwrap_or(false) {
                    horizon.push(e);
                }
            }
        }
        for (u, v) in horizon {
            next.push([u, v, i]);
        }
        faces = next;
    }

    // Compact to referenced vertices.
    let mut remap: HashMap<usize, u32> = HashMap::new();
    let mut hull = Hull::default();
    for f in &faces {
        let mut tri = [0u32; 3];
        for (k, &vi) in f.iter().enumerate() {
            tri[k] = *remap.entry(vi).or_insert_with(|| {
                hull.vertices.push(points[vi]);
                (hull.vertices.len() - 1) as u32
            });
        }
        hull.triangles.push(tri);
    }
    Some(hull)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_with_interior() -> Vec<Vec3> {
        let mut pts = Vec::new();
        for x in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for z in [0.0, 1.0] {
                    pts.push(Vec3::new(x, y, z));
                }
            }
        }
        pts.push(Vec3::splat(0.5));
        pts.push(Vec3::new(0.2, 0.7, 0.4));
        pts
    }

    #[test]
    fn test_cube_hull_drops_interior_points() {
        let hull = convex_hull(&cube_with_interior()).unwrap();
        assert_eq!(hull.vertices.len(), 8);
        // Euler: a closed triangulated surface with V vertices has 2V - 4 faces.
        assert_eq!(hull.triangles.len(), 12);
    }

    #[test]
    fn test_faces_point_outward() {
        let hull = convex_hull(&cube_with_interior()).unwrap();
        let center = Vec3::splat(0.5);
        for t in &hull.triangles {
            let [a, b, c] = t.map(|i| hull.vertices[i as usize]);
            let n = (b - a).cross(c - a);
            assert!(n.dot(a - center) > 0.0);
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(convex_hull(&[Vec3::ZERO, Vec3::X, Vec3::Y]).is_none());
        let flat = [Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.5, 0.0, 0.5)];
        assert!(convex_hull(&flat).is_none());
    }
}
