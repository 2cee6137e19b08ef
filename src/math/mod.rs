//! # Math primitives
//!
//! Boxes, graphs, guide paths, polygons and hulls shared by the terrain,
//! nature and road modules. Pure data and geometry, no I/O.

pub mod boundingbox;
pub mod convex_hull;
pub mod graph;
pub mod path;
pub mod polygon;

pub use boundingbox::Boundingbox;
pub use convex_hull::{convex_hull, Hull};
pub use graph::{Connection, Edge, Graph, GraphNode};
pub use path::{Path, PathPoint};
pub use polygon::Polygon;
