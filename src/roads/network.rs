//! Road network builder.

use std::sync::Arc;

use glam::{DVec3, Vec2, Vec3};
use tracing::{debug, warn};

use super::{
    Intersection, IntersectionLane, Lane, LaneKind, LaneRef, Marking, Road, RoadId, RoadNode,
    TravelDirection, DEFAULT_LANE_WIDTH, MARKING_DASH, MARKING_WIDTH,
};
use crate::geometry::GeoData;
use crate::math::{Connection, Graph, Path, PathPoint};
use crate::semantics::Ontology;
use crate::terrain::Terrain;
use crate::{Error, Result};

/// Samples along a road for surface geometry.
const SURFACE_STEPS: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    graph: Graph<RoadNode>,
    roads: Vec<Road>,
    intersections: Vec<Intersection>,
    markings: Vec<Marking>,
    ontology: Option<Arc<Ontology>>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate road kinds against `ontology`: every kind must be a concept
    /// that `is_a("Road")`.
    pub fn with_ontology(mut self, ontology: Arc<Ontology>) -> Self {
        self.ontology = Some(ontology);
        self
    }

    pub fn graph(&self) -> &Graph<RoadNode> { &self.graph }
    pub fn roads(&self) -> &[Road] { &self.roads }
    pub fn intersections(&self) -> &[Intersection] { &self.intersections }
    pub fn markings(&self) -> &[Marking] { &self.markings }

    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(id.0)
    }

    fn road_mut(&mut self, id: RoadId) -> Result<&mut Road> {
        self.roads
            .get_mut(id.0)
            .ok_or_else(|| Error::NotFound(format!("road {id}")))
    }

    fn node_position(&self, node: usize) -> Result<DVec3> {
        self.graph
            .position(node)
            .ok_or_else(|| Error::NotFound(format!("road node {node}")))
    }

    // ========================================================================
    // Construction
    // ========================================================================

    pub fn add_node(&mut self, pos: DVec3) -> usize {
        self.graph.add_node_at(RoadNode::default(), pos)
    }

    /// Add a road from node `a` to node `b` with `lanes` default-width lanes,
    /// half of them (rounded down) running backwards on the left. `n1` and
    /// `n2` are the path directions at the two ends; zero vectors fall back
    /// to the chord.
    pub fn add_road(
        &mut self,
        name: impl Into<String>,
        kind: &str,
        a: usize,
        b: usize,
        n1: DVec3,
        n2: DVec3,
        lanes: usize,
    ) -> Result<RoadId> {
        if a == b {
            return Err(Error::InvalidParameter(format!("road loops on node {a}")));
        }
        let pa = self.node_position(a)?;
        let pb = self.node_position(b)?;
        if let Some(o) = &self.ontology {
            let known = o.concept_id(kind).is_some_and(|c| o.is_a(c, "Road"));
            if !known {
                return Err(Error::InvalidParameter(format!("'{kind}' is not a kind of Road")));
            }
        }

        let chord = (pb - pa).normalize_or_zero();
        let dir = |n: DVec3| {
            let n = n.normalize_or_zero();
            if n == DVec3::ZERO { chord } else { n }
        };
        let path = Path::from_points([PathPoint::new(pa, dir(n1)), PathPoint::new(pb, dir(n2))]);

        let backward = lanes / 2;
        let lanes = (0..lanes)
            .map(|i| {
                let d = if i < backward { TravelDirection::Backward } else { TravelDirection::Forward };
                Lane { kind: LaneKind::Traffic(d), width: DEFAULT_LANE_WIDTH, path: None }
            })
            .collect();

        let id = RoadId(self.roads.len());
        self.roads.push(Road { id, name: name.into(), kind: kind.to_owned(), start: a, end: b, path, lanes });
        for n in [a, b] {
            if let Some(node) = self.graph.node_mut(n) {
                node.payload.roads.push(id);
            }
        }
        self.graph.connect(a, b, Connection::Simple);
        debug!(road = %id, a, b, "road added");
        Ok(id)
    }

    /// Append a traffic lane on the side of its direction: backward lanes
    /// join on the left, forward lanes on the right.
    pub fn add_lane(&mut self, road: RoadId, direction: TravelDirection, width: f64) -> Result<usize> {
        check_width(width)?;
        let r = self.road_mut(road)?;
        let lane = Lane { kind: LaneKind::Traffic(direction), width, path: None };
        let at = match direction {
            TravelDirection::Backward => 0,
            TravelDirection::Forward => r.lanes.len(),
        };
        r.lanes.insert(at, lane);
        Ok(at)
    }

    /// Insert a green belt between the backward and forward lanes.
    pub fn add_green_belt(&mut self, road: RoadId, width: f64) -> Result<usize> {
        check_width(width)?;
        let r = self.road_mut(road)?;
        let at = r
            .lanes
            .iter()
            .position(|l| l.direction() == Some(TravelDirection::Forward))
            .unwrap_or(r.lanes.len());
        r.lanes.insert(at, Lane { kind: LaneKind::GreenBelt, width, path: None });
        Ok(at)
    }

    // ========================================================================
    // Derived layout
    // ========================================================================

    pub fn compute_lane_paths(&mut self, road: RoadId) -> Result<()> {
        let r = self.road_mut(road)?;
        let paths: Vec<Option<Path>> = (0..r.lanes.len()).map(|i| r.lane_path(i)).collect();
        for (lane, path) in r.lanes.iter_mut().zip(paths) {
            lane.path = path;
        }
        Ok(())
    }

    /// Rebuild the intersection list: one per node joined by two or more
    /// roads. Connecting lanes are left empty.
    pub fn compute_intersections(&mut self) {
        self.intersections = self
            .graph
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.payload.roads.len() >= 2)
            .map(|(node, n)| {
                let mut roads: Vec<RoadId> = n.payload.roads.to_vec();
                roads.sort();
                roads.dedup();
                Intersection {
                    node,
                    position: self.graph.position(node).unwrap_or_default(),
                    roads,
                    lanes: Vec::new(),
                }
            })
            .collect();
        debug!(count = self.intersections.len(), "intersections computed");
    }

    /// Connect every lane arriving at the intersection to every lane leaving
    /// it on a different road.
    pub fn compute_intersection_lanes(&mut self, intersection: usize) -> Result<()> {
        let isec = self
            .intersections
            .get(intersection)
            .ok_or_else(|| Error::NotFound(format!("intersection {intersection}")))?;
        let node = isec.node;

        let mut incoming: Vec<(LaneRef, PathPoint)> = Vec::new();
        let mut outgoing: Vec<(LaneRef, PathPoint)> = Vec::new();
        for &rid in &isec.roads {
            let Some(road) = self.roads.get(rid.0) else { continue };
            for (i, lane) in road.lanes.iter().enumerate() {
                let Some(d) = lane.direction() else { continue };
                let Some(path) = lane.path.clone().or_else(|| road.lane_path(i)) else { continue };
                let (Some(&first), Some(&last)) = (path.points().first(), path.points().last()) else {
                    continue;
                };
                let at_end = match d {
                    TravelDirection::Forward => road.end == node,
                    TravelDirection::Backward => road.start == node,
                };
                let lref = LaneRef { road: rid, lane: i };
                if at_end {
                    incoming.push((lref, last));
                } else {
                    outgoing.push((lref, first));
                }
            }
        }

        let mut lanes = Vec::new();
        for (from, a) in &incoming {
            for (to, b) in outgoing.iter().filter(|(to, _)| to.road != from.road) {
                lanes.push(IntersectionLane {
                    from: *from,
                    to: *to,
                    path: Path::from_points([*a, *b]),
                });
            }
        }
        if lanes.is_empty() {
            warn!(node, "intersection without connecting lanes");
        }
        if let Some(isec) = self.intersections.get_mut(intersection) {
            isec.lanes = lanes;
        }
        Ok(())
    }

    /// Edge lines are solid. Separators are dashed between lanes of the same
    /// direction and solid otherwise.
    pub fn compute_markings(&mut self) {
        let mut markings = Vec::new();
        for road in &self.roads {
            if road.lanes.is_empty() {
                continue;
            }
            let half = road.width() * 0.5;
            let line = |offset: f64, dashes: Option<(f64, f64)>| Marking {
                road: road.id,
                path: road.path.offset(offset, 0.0, DVec3::Y),
                width: MARKING_WIDTH,
                dashes,
            };
            markings.push(line(-half, None));
            let mut edge = -half;
            for pair in road.lanes.windows(2) {
                edge += pair[0].width;
                let same = matches!(
                    (pair[0].direction(), pair[1].direction()),
                    (Some(x), Some(y)) if x == y
                );
                markings.push(line(edge, same.then_some(MARKING_DASH)));
            }
            markings.push(line(half, None));
        }
        self.markings = markings;
    }

    /// Lane paths for every road, then intersections, their lanes and the
    /// markings.
    pub fn compute(&mut self) -> Result<()> {
        for i in 0..self.roads.len() {
            self.compute_lane_paths(RoadId(i))?;
        }
        self.compute_intersections();
        for i in 0..self.intersections.len() {
            self.compute_intersection_lanes(i)?;
        }
        self.compute_markings();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.roads.clear();
        self.intersections.clear();
        self.markings.clear();
    }

    // ========================================================================
    // Terrain coupling
    // ========================================================================

    /// Guide paths of a raised road bed: the two road edges widened by
    /// `margin`, then the two feet a further `margin` out and `drop` lower.
    /// Returned in [`Terrain::add_embankment`] order `[p1, p2, p3, p4]` where
    /// `p2` and `p4` run backwards.
    pub fn embankment_for(&self, road: RoadId, margin: f64, drop: f64) -> Result<[Path; 4]> {
        let r = self.road(road).ok_or_else(|| Error::NotFound(format!("road {road}")))?;
        let half = r.width() * 0.5 + margin;
        let foot = half + margin;
        Ok([
            r.path.offset(-half, 0.0, DVec3::Y),
            r.path.offset(half, 0.0, DVec3::Y).reversed(),
            r.path.offset(-foot, -drop, DVec3::Y),
            r.path.offset(foot, -drop, DVec3::Y).reversed(),
        ])
    }

    /// Register the road bed of `road` on `terrain` under the road's name.
    pub fn embank(&self, road: RoadId, terrain: &mut Terrain, margin: f64, drop: f64) -> Result<()> {
        let [p1, p2, p3, p4] = self.embankment_for(road, margin, drop)?;
        let name = self.road(road).map(|r| r.name.clone()).unwrap_or_default();
        terrain.add_embankment(name, p1, p2, Some((p3, p4)));
        Ok(())
    }

    /// Surface strip across the full road width, draped on `terrain` when
    /// given.
    pub fn road_geometry(&self, road: RoadId, terrain: Option<&Terrain>) -> Result<GeoData> {
        let r = self.road(road).ok_or_else(|| Error::NotFound(format!("road {road}")))?;
        let half = r.width() * 0.5;
        let left = r.path.offset(-half, 0.0, DVec3::Y).sample(SURFACE_STEPS);
        let right = r.path.offset(half, 0.0, DVec3::Y).sample(SURFACE_STEPS);

        let mut geo = GeoData::new();
        for (i, (l, rt)) in left.into_iter().zip(right).enumerate() {
            let v = i as f32 / SURFACE_STEPS as f32;
            for (mut p, u) in [(l, 0.0), (rt, 1.0)] {
                if let Some(t) = terrain {
                    t.elevate_point(&mut p, 0.0, true);
                }
                geo.push_vert_tc(p.as_vec3(), Vec3::Y, Vec2::new(u, v));
            }
            if i > 0 {
                let (a, b) = ((i as u32 - 1) * 2, i as u32 * 2);
                geo.push_quad(a, a + 1, b + 1, b);
            }
        }
        geo.update_normals();
        Ok(geo)
    }
}

fn check_width(width: f64) -> Result<()> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!("lane width {width}")))
    }
}
