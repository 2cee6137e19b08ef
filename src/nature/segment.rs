//! Branch segments, stored in an arena owned by the tree.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Index of a segment in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub usize);

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p1: Vec3,
    pub p2: Vec3,
    pub n1: Vec3,
    pub n2: Vec3,
    /// Shape parameters at `p1` and `p2`; `x` is the relative radius.
    pub params: [Vec2; 2],
    /// Generation, 0 for the trunk.
    pub level: u32,
    pub parent: Option<SegmentId>,
    pub children: SmallVec<[SegmentId; 8]>,
}

impl Segment {
    /// Unit trunk standing on the origin.
    pub fn trunk() -> Self {
        Self::branch(0, None, Vec3::ZERO)
    }

    /// Segment starting at `p1` with trunk defaults for everything else.
    pub fn branch(level: u32, parent: Option<SegmentId>, p1: Vec3) -> Self {
        Self {
            p1,
            p2: Vec3::Y,
            n1: Vec3::Y,
            n2: Vec3::Y,
            params: [Vec2::new(1.0, 0.0); 2],
            level,
            parent,
            children: SmallVec::new(),
        }
    }

    pub fn axis(&self) -> Vec3 {
        self.p2 - self.p1
    }

    pub fn midpoint(&self) -> Vec3 {
        (self.p1 + self.p2) * 0.5
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
