//! Collision shapes derived from a terrain.
//!
//! The crate does not simulate anything; it hands a physics engine either a
//! dense height buffer or a marker telling it to query the terrain sampler.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::HeightMap;

/// Lift applied to collision heights so that road surfaces sit on top.
pub const ROAD_TERRAIN_OFFSET: f32 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhysicsMode {
    /// Precomputed height buffer.
    Heightfield,
    /// Shape that samples [`Terrain::height`](super::Terrain::height) on demand.
    #[default]
    Analytic,
}

/// Height buffer in the layout heightfield colliders expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heightfield {
    pub width: usize,
    pub depth: usize,
    /// Row-major, `k = j * width + i`, already lifted by [`ROAD_TERRAIN_OFFSET`].
    pub heights: Vec<f32>,
    pub min_height: f32,
    pub max_height: f32,
    /// Texel size along x and z, unit scale along y.
    pub scaling: DVec3,
}

impl Heightfield {
    pub fn from_map(map: &HeightMap, texel_x: f64, texel_z: f64) -> Self {
        let heights = map.data().iter().map(|h| h + ROAD_TERRAIN_OFFSET).collect();
        // Symmetric bounds covering the largest raw texel magnitude.
        let (lo, hi) = map.min_max();
        let hmax = lo.abs().max(hi.abs());
        Self {
            width: map.width(),
            depth: map.depth(),
            heights,
            min_height: -hmax,
            max_height: hmax,
            scaling: DVec3::new(texel_x, 1.0, texel_z),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhysicsShape {
    Heightfield(Heightfield),
    Analytic { resolution: f64 },
}

impl PhysicsShape {
    pub fn mode(&self) -> PhysicsMode {
        match self {
            PhysicsShape::Heightfield(_) => PhysicsMode::Heightfield,
            PhysicsShape::Analytic { .. } => PhysicsMode::Analytic,
        }
    }
}
