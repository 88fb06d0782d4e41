//! The graph model (C1): nodes, weighted bidirectional edges, the leaf
//! predicate and the two frozen-after-construction landscapes.

mod balance;
mod builder;

pub use balance::{BalancePlanner, SpawnChoice};
pub use builder::GraphBuilder;

use derive_more::{Display, From, Into};
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

/// Stable, small identifier for a node. Never reused within a session.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub label: String,
    pub pos: (f64, f64),
}

type Inner = UnGraph<NodeData, f64, u32>;

/// A connected, weighted, undirected graph satisfying §3's invariants.
/// Edge weights are assigned once at construction and never mutated; the
/// heuristic and path-cost landscapes are written exactly once by the
/// balance planner and frozen thereafter.
#[derive(Debug, Clone)]
pub struct Graph {
    inner: Inner,
    /// Adjacency cache, sorted by neighbour id, so kernels get a
    /// deterministic "ordered sequence" independent of petgraph's internal
    /// (reverse-insertion) iteration order.
    adjacency: Vec<Vec<(NodeId, f64)>>,
    heuristic: Vec<f64>,
    path_cost: Vec<f64>,
}

impl Graph {
    pub(crate) fn from_inner(inner: Inner) -> Self {
        let n = inner.node_count();
        let mut adjacency: Vec<Vec<(NodeId, f64)>> = vec![Vec::new(); n];
        for edge in inner.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            let w = *edge.weight();
            adjacency[a].push((NodeId(b as u32), w));
            adjacency[b].push((NodeId(a as u32), w));
        }
        for list in &mut adjacency {
            list.sort_by_key(|(id, _)| id.0);
        }
        let heuristic = vec![0.0; n];
        let path_cost = vec![0.0; n];
        Self {
            inner,
            adjacency,
            heuristic,
            path_cost,
        }
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_count() as u32).map(NodeId)
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.inner[petgraph::graph::NodeIndex::new(id.0 as usize)].label
    }

    pub fn position(&self, id: NodeId) -> (f64, f64) {
        self.inner[petgraph::graph::NodeIndex::new(id.0 as usize)].pos
    }

    /// Total: returns `&[]` for an id with no neighbours (a disconnected
    /// node never occurs post-construction, but the accessor never panics).
    pub fn neighbours(&self, id: NodeId) -> &[(NodeId, f64)] {
        self.adjacency
            .get(id.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.neighbours(id).len() == 1
    }

    pub fn weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.neighbours(a)
            .iter()
            .find(|(n, _)| *n == b)
            .map(|(_, w)| *w)
    }

    pub fn heuristic(&self, id: NodeId) -> f64 {
        self.heuristic.get(id.0 as usize).copied().unwrap_or(0.0)
    }

    pub fn path_cost(&self, id: NodeId) -> f64 {
        self.path_cost.get(id.0 as usize).copied().unwrap_or(0.0)
    }

    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        let (ax, ay) = self.position(a);
        let (bx, by) = self.position(b);
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    pub(crate) fn set_heuristic(&mut self, id: NodeId, h: f64) {
        self.heuristic[id.0 as usize] = h;
    }

    pub(crate) fn set_path_cost(&mut self, id: NodeId, c: f64) {
        self.path_cost[id.0 as usize] = c;
    }

    pub fn leaf_count(&self) -> usize {
        self.node_ids().filter(|&id| self.is_leaf(id)).count()
    }

    /// Snapshot sent to the presenter/shell on `Built` (§4.7).
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self
                .node_ids()
                .map(|id| NodeSnapshot {
                    id,
                    label: self.label(id).to_owned(),
                    pos: self.position(id),
                    neighbours: self.neighbours(id).to_vec(),
                })
                .collect(),
        }
    }

    /// Hover payload for a node (§6): fields `h`/`path_cost` are filled in
    /// by the caller, which knows the active policy; here we only assemble
    /// the policy-independent part.
    pub fn hover_base(&self, id: NodeId, visited: bool) -> HoverPayload {
        HoverPayload {
            id,
            label: self.label(id).to_owned(),
            neighbours: self.neighbours(id).len(),
            visited,
            h: None,
            path_cost: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub label: String,
    pub pos: (f64, f64),
    pub neighbours: Vec<(NodeId, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoverPayload {
    pub id: NodeId,
    pub label: String,
    pub neighbours: usize,
    pub visited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_cost: Option<f64>,
}
