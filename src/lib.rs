//! # polyvr-rs — Procedural World Generation Core
//!
//! The spatial-query and content-generation machinery of a scene-graph VR
//! framework, without the scene graph: terrain height fields with
//! embankments, L-system-like tree growth, road networks, and ontologies of
//! concepts with inherited properties.
//!
//! ## Design Principles
//!
//! 1. **Arenas, not pointer webs**: tree segments and ontology concepts are
//!    addressed by index/id; parents are non-owning references.
//! 2. **Plain buffers out**: renderable output is [`GeoData`], physics output
//!    is [`PhysicsShape`]; no engine types cross the boundary.
//! 3. **Explicit shared state**: shared materials come from a
//!    [`MaterialRegistry`] passed to the builders, the ontology library is a
//!    read-only registry built once.
//! 4. **Degrade, don't panic**: lookups that miss return `None` and log a
//!    warning; construction errors are [`Error`] values.
//!
//! ## Quick Start
//!
//! ```rust
//! use polyvr::{HeightMap, MaterialRegistry, Terrain, TerrainConfig, Tree, TreeParams};
//! use glam::DVec2;
//!
//! # fn example() -> polyvr::Result<()> {
//! let materials = MaterialRegistry::new();
//!
//! let mut terrain = Terrain::new("ground", &TerrainConfig::default(), &materials);
//! terrain.set_map(HeightMap::from_fn(65, 65, |i, j| (i + j) as f32 * 0.1)?);
//! let h = terrain.height(DVec2::new(3.0, -7.5), true);
//! assert!(h.is_finite());
//!
//! let mut tree = Tree::new(&materials);
//! tree.setup(TreeParams { iterations: 3, ..TreeParams::default() }, 42);
//! tree.add_leaves(3, 20);
//! assert_eq!(tree.segments().len(), 1 + 5 + 25 + 125);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`math`] | bounding boxes, graphs, guide paths, polygons, hulls |
//! | [`geometry`] | CPU vertex/primitive buffers |
//! | [`terrain`] | height maps, terrain sampler, embankments, physics shapes |
//! | [`nature`] | tree grower and LOD generation |
//! | [`roads`] | road network lanes, intersections, markings |
//! | [`semantics`] | concepts, properties, ontologies, rules, library |
//! | [`export`] | JSON snapshots |

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod export;
pub mod geometry;
pub mod material;
pub mod math;
pub mod nature;
pub mod roads;
pub mod semantics;
pub mod terrain;

// ============================================================================
// Re-exports: Math / geometry
// ============================================================================

pub use geometry::{GeoData, Primitive};
pub use math::{Boundingbox, Connection, Graph, Path, PathPoint, Polygon};

// ============================================================================
// Re-exports: Terrain
// ============================================================================

pub use terrain::{
    Embankment, HeightMap, HeightProbe, PhysicsMode, PhysicsShape, Terrain,
};

// ============================================================================
// Re-exports: Nature
// ============================================================================

pub use nature::{Segment, SegmentId, Tree, TreeParams};

// ============================================================================
// Re-exports: Semantics
// ============================================================================

pub use semantics::{
    Concept, ConceptId, Ontology, OntologyLibrary, Property, PropertyId, Rule, Value,
};

// ============================================================================
// Re-exports: Roads, config, materials
// ============================================================================

pub use config::{TerrainConfig, WorldConfig};
pub use material::{Material, MaterialRegistry};
pub use roads::{Intersection, Lane, Road, RoadNetwork};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Cycle: {0}")]
    Cycle(String),

    #[error("Rule syntax error in '{rule}': {message}")]
    RuleSyntax { rule: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "raster")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
