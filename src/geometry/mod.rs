//! # Geometry buffers
//!
//! [`GeoData`] is the CPU-side representation of renderable output: vertex
//! attributes plus an index list of primitives. The crate never uploads it
//! anywhere; consumers hand it to their renderer.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Indexed primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Primitive {
    Point(u32),
    Line(u32, u32),
    Triangle(u32, u32, u32),
    Quad(u32, u32, u32, u32),
}

/// Vertex buffers with optional per-vertex attributes.
///
/// `tex_coords` and `colors` are either empty or as long as `positions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub colors: Vec<Vec3>,
    pub primitives: Vec<Primitive>,
}

impl GeoData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize { self.positions.len() }
    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    pub fn push_vert(&mut self, pos: Vec3, normal: Vec3) -> u32 {
        self.positions.push(pos);
        self.normals.push(normal);
        (self.positions.len() - 1) as u32
    }

    pub fn push_vert_tc(&mut self, pos: Vec3, normal: Vec3, tc: Vec2) -> u32 {
        self.tex_coords.push(tc);
        self.push_vert(pos, normal)
    }

    pub fn push_vert_color(&mut self, pos: Vec3, normal: Vec3, color: Vec3) -> u32 {
        self.colors.push(color);
        self.push_vert(pos, normal)
    }

    pub fn push_color(&mut self, color: Vec3) {
        self.colors.push(color);
    }

    /// Point primitive on the last vertex.
    pub fn push_point(&mut self) {
        if let Some(i) = self.last_index() {
            self.primitives.push(Primitive::Point(i));
        }
    }

    /// Line primitive on the last two vertices.
    pub fn push_line(&mut self) {
        if self.len() >= 2 {
            let i = self.len() as u32;
            self.primitives.push(Primitive::Line(i - 2, i - 1));
        }
    }

    /// Quad primitive on the last four vertices.
    pub fn push_last_quad(&mut self) {
        if self.len() >= 4 {
            let i = self.len() as u32;
            self.primitives.push(Primitive::Quad(i - 4, i - 3, i - 2, i - 1));
        }
    }

    pub fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.primitives.push(Primitive::Quad(a, b, c, d));
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.primitives.push(Primitive::Triangle(a, b, c));
    }

    pub fn position(&self, i: usize) -> Option<Vec3> { self.positions.get(i).copied() }
    pub fn normal(&self, i: usize) -> Option<Vec3> { self.normals.get(i).copied() }
    pub fn color(&self, i: usize) -> Option<Vec3> { self.colors.get(i).copied() }

    fn last_index(&self) -> Option<u32> {
        self.len().checked_sub(1).map(|i| i as u32)
    }

    /// Append `other`, shifting its indices past our vertices.
    pub fn append(&mut self, other: &GeoData) {
        let o = self.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.tex_coords.extend_from_slice(&other.tex_coords);
        self.colors.extend_from_slice(&other.colors);
        self.primitives.extend(other.primitives.iter().map(|p| match *p {
            Primitive::Point(a) => Primitive::Point(a + o),
            Primitive::Line(a, b) => Primitive::Line(a + o, b + o),
            Primitive::Triangle(a, b, c) => Primitive::Triangle(a + o, b + o, c + o),
            Primitive::Quad(a, b, c, d) => Primitive::Quad(a + o, b + o, c + o, d + o),
        }));
    }

    pub fn count_lines(&self) -> usize {
        self.primitives.iter().filter(|p| matches!(p, Primitive::Line(..))).count()
    }

    pub fn count_points(&self) -> usize {
        self.primitives.iter().filter(|p| matches!(p, Primitive::Point(..))).count()
    }

    pub fn count_quads(&self) -> usize {
        self.primitives.iter().filter(|p| matches!(p, Primitive::Quad(..))).count()
    }

    /// Recompute smooth vertex normals from triangle and quad faces.
    pub fn update_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.len()];
        let mut face = |idx: &[u32]| {
            let p: Vec<Vec3> = idx.iter().map(|&i| self.positions[i as usize]).collect();
            let n = (p[1] - p[0]).cross(p[p.len() - 1] - p[0]);
            for &i in idx {
                acc[i as usize] += n;
            }
        };
        for prim in &self.primitives {
            match *prim {
                Primitive::Triangle(a, b, c) => face(&[a, b, c]),
                Primitive::Quad(a, b, c, d) => face(&[a, b, c, d]),
                _ => {}
            }
        }
        for (n, a) in self.normals.iter_mut().zip(acc) {
            if a != Vec3::ZERO {
                *n = a.normalize();
            }
        }
    }
}
