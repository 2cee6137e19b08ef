//! Generic adjacency-list graph.
//!
//! Nodes carry a payload and a bounding box; edges are directed and tagged
//! with a [`Connection`] kind. Used by the road network and layout code.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Boundingbox;

/// Kind of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connection {
    Simple,
    Hierarchy,
    Dependency,
    Sibling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub connection: Connection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode<N> {
    pub payload: N,
    pub bbox: Boundingbox,
}

/// Directed graph with per-node adjacency lists.
///
/// Invariant: every stored edge references valid node indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph<N> {
    nodes: Vec<GraphNode<N>>,
    edges: Vec<Vec<Edge>>,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self { nodes: Vec::new(), edges: Vec::new() }
    }
}

impl<N> Graph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self, payload: N) -> usize {
        self.nodes.push(GraphNode { payload, bbox: Boundingbox::new() });
        self.edges.push(Vec::new());
        self.nodes.len() - 1
    }

    /// Add a node whose box is centered on `pos`.
    pub fn add_node_at(&mut self, payload: N, pos: DVec3) -> usize {
        let i = self.add_node(payload);
        self.nodes[i].bbox.set_center(pos);
        i
    }

    /// Connect `i -> j`. Out-of-range endpoints are ignored.
    pub fn connect(&mut self, i: usize, j: usize, connection: Connection) {
        if i >= self.nodes.len() || j >= self.nodes.len() {
            warn!(from = i, to = j, nodes = self.nodes.len(), "graph connect with invalid endpoint ignored");
            return;
        }
        self.edges[i].push(Edge { from: i, to: j, connection });
    }

    /// Remove the first edge `i -> j`, if any.
    pub fn disconnect(&mut self, i: usize, j: usize) {
        if let Some(list) = self.edges.get_mut(i) {
            if let Some(k) = list.iter().position(|e| e.to == j) {
                list.remove(k);
            }
        }
    }

    pub fn is_connected(&self, i: usize, j: usize) -> bool {
        self.edges.get(i).is_some_and(|l| l.iter().any(|e| e.to == j))
    }

    pub fn node(&self, i: usize) -> Option<&GraphNode<N>> { self.nodes.get(i) }
    pub fn node_mut(&mut self, i: usize) -> Option<&mut GraphNode<N>> { self.nodes.get_mut(i) }
    pub fn nodes(&self) -> &[GraphNode<N>] { &self.nodes }
    pub fn edges(&self) -> &[Vec<Edge>] { &self.edges }

    pub fn out_edges(&self, i: usize) -> &[Edge] {
        self.edges.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edges ending at `i`.
    pub fn in_edges(&self, i: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().flatten().filter(move |e| e.to == i)
    }

    pub fn len(&self) -> usize { self.nodes.len() }
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn position(&self, i: usize) -> Option<DVec3> {
        self.nodes.get(i).map(|n| n.bbox.center())
    }

    pub fn set_position(&mut self, i: usize, pos: DVec3) {
        if let Some(n) = self.nodes.get_mut(i) {
            n.bbox.set_center(pos);
        }
    }
}
