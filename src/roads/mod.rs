//! # Roads
//!
//! A [`RoadNetwork`] is a graph of nodes joined by roads. Each road has a
//! cross-section of lanes and green belts laid out left to right across its
//! guide path. From that the network derives lane centre paths,
//! intersections with connecting lanes, and surface markings.
//!
//! ```text
//!   left edge                                   right edge
//!   |  lane <-  |  lane <-  : green :  lane ->  |
//!   ^ solid     ^ dashed    ^ solid            ^ solid
//! ```

pub mod network;

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::math::Path;
use crate::semantics::Ontology;
use crate::Result;

pub use network::RoadNetwork;

/// Default lane width used by [`RoadNetwork::add_road`].
pub const DEFAULT_LANE_WIDTH: f64 = 3.0;
/// Painted line width.
pub const MARKING_WIDTH: f64 = 0.15;
/// Dash and gap length of dashed markings.
pub const MARKING_DASH: (f64, f64) = (1.5, 3.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoadId(pub usize);

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Travel direction of a lane relative to its road's guide path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneKind {
    Traffic(TravelDirection),
    GreenBelt,
}

/// One strip of a road cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub kind: LaneKind,
    pub width: f64,
    /// Centre line in travel direction, set by
    /// [`RoadNetwork::compute_lane_paths`].
    pub path: Option<Path>,
}

impl Lane {
    pub fn direction(&self) -> Option<TravelDirection> {
        match self.kind {
            LaneKind::Traffic(d) => Some(d),
            LaneKind::GreenBelt => None,
        }
    }

    pub fn is_traffic(&self) -> bool {
        matches!(self.kind, LaneKind::Traffic(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: RoadId,
    pub name: String,
    /// Concept name of the road type, e.g. `"Residential"`.
    pub kind: String,
    pub start: usize,
    pub end: usize,
    pub path: Path,
    pub lanes: Vec<Lane>,
}

impl Road {
    /// Total cross-section width.
    pub fn width(&self) -> f64 {
        self.lanes.iter().map(|l| l.width).sum()
    }

    /// Signed offset of each strip's centre from the guide path.
    pub fn lane_offsets(&self) -> Vec<f64> {
        let mut left = -self.width() * 0.5;
        self.lanes
            .iter()
            .map(|l| {
                let c = left + l.width * 0.5;
                left += l.width;
                c
            })
            .collect()
    }

    /// Centre line of strip `i` in its travel direction. Green belts and
    /// forward lanes follow the guide path.
    pub fn lane_path(&self, i: usize) -> Option<Path> {
        let lane = self.lanes.get(i)?;
        let c = *self.lane_offsets().get(i)?;
        let path = self.path.offset(c, 0.0, DVec3::Y);
        Some(match lane.direction() {
            Some(TravelDirection::Backward) => path.reversed(),
            _ => path,
        })
    }

    pub fn touches(&self, node: usize) -> bool {
        self.start == node || self.end == node
    }
}

/// Graph payload of a network node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadNode {
    pub roads: SmallVec<[RoadId; 4]>,
}

/// Reference to a lane by road and position in its cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneRef {
    pub road: RoadId,
    pub lane: usize,
}

/// Connection through an intersection from the end of one lane to the start
/// of a lane on another road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionLane {
    pub from: LaneRef,
    pub to: LaneRef,
    pub path: Path,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub node: usize,
    pub position: DVec3,
    pub roads: Vec<RoadId>,
    pub lanes: Vec<IntersectionLane>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marking {
    pub road: RoadId,
    pub path: Path,
    pub width: f64,
    /// `(dash, gap)` lengths for dashed lines, `None` for solid ones.
    pub dashes: Option<(f64, f64)>,
}

/// Road type hierarchy for validating [`Road::kind`].
pub fn road_ontology() -> Result<Ontology> {
    let mut o = Ontology::new("Roads");
    let road = o.add_concept("Road", None)?;
    o.add_property(road, "width", "float")?;
    o.add_property(road, "lanes", "int")?;
    for kind in ["Motorway", "Primary", "Secondary", "Residential", "Track"] {
        o.add_concept(kind, Some("Road"))?;
    }
    o.add_concept("Lane", None)?;
    o.add_concept("GreenBelt", Some("Lane"))?;
    Ok(o)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn road(widths: &[f64]) -> Road {
        Road {
            id: RoadId(0),
            name: "r".into(),
            kind: "Road".into(),
            start: 0,
            end: 1,
            path: Path::line(DVec3::ZERO, DVec3::X * 10.0),
            lanes: widths
                .iter()
                .map(|&w| Lane { kind: LaneKind::Traffic(TravelDirection::Forward), width: w, path: None })
                .collect(),
        }
    }

    #[test]
    fn test_lane_offsets_span_cross_section() {
        let r = road(&[3.0, 2.0, 3.0]);
        assert_eq!(r.width(), 8.0);
        assert_eq!(r.lane_offsets(), vec![-2.5, 0.0, 2.5]);
    }

    #[test]
    fn test_road_ontology() {
        let o = road_ontology().unwrap();
        let r = o.concept_id("Residential").unwrap();
        assert!(o.is_a(r, "Road"));
        assert_eq!(o.properties(r).len(), 2);
        assert!(!o.is_a(o.concept_id("GreenBelt").unwrap(), "Road"));
    }
}
