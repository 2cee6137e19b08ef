//! # Nature
//!
//! Procedural trees. A [`Tree`] grows an L-system-like branching structure
//! from a unit trunk: every generation spawns `child_number` children per
//! tip, each rotated, shortened and thinned relative to its parent.
//!
//! Segments live in a flat arena addressed by [`SegmentId`]; parents are
//! plain indices, so trees can be cloned and serialized freely.

pub mod params;
pub mod segment;
pub mod tree;

pub use params::TreeParams;
pub use segment::{Segment, SegmentId};
pub use tree::{Tree, LOD_DISTANCES};
