//! Policy kernel (C4): seven named next-move functions sharing a common
//! contract and a shared, Pursuer-owned `VisitedSets`.

mod astar;
mod greedy;
mod traversal;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::NonNeighbourPanic;
use crate::graph::{Graph, NodeId};

/// Closed tagged set of pursuer search policies. The stable string form
/// (via `Display`/`FromStr`) matches §6's policy identifiers exactly.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Policy {
    #[strum(serialize = "BFS")]
    Bfs,
    #[strum(serialize = "DFS")]
    Dfs,
    #[strum(serialize = "UCS")]
    Ucs,
    #[strum(serialize = "Greedy (Local Min)")]
    GreedyMin,
    #[strum(serialize = "Greedy (Local Max)")]
    GreedyMax,
    #[strum(serialize = "A* (Local Min)")]
    AStarMin,
    #[strum(serialize = "A* (Local Max)")]
    AStarMax,
}

impl Policy {
    /// The no-backtrack family (Greedy/A*) shares the "conditional
    /// tracking" cadence rule in the pursuer controller (§4.5).
    pub fn is_no_backtrack(self) -> bool {
        matches!(
            self,
            Policy::GreedyMin | Policy::GreedyMax | Policy::AStarMin | Policy::AStarMax
        )
    }

    pub fn is_min_variant(self) -> bool {
        matches!(self, Policy::GreedyMin | Policy::AStarMin)
    }
}

/// The tagged cause of a pursuer's terminal halt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StuckReason {
    LocalMin,
    LocalMax,
    GraphExplored,
    DeadEnd,
    CombatKO,
}

impl StuckReason {
    pub fn wire_name(self) -> &'static str {
        match self {
            StuckReason::LocalMin => "local_min",
            StuckReason::LocalMax => "local_max",
            StuckReason::GraphExplored => "graph_explored",
            StuckReason::DeadEnd => "dead_end",
            StuckReason::CombatKO => "combat",
        }
    }
}

/// What a kernel invocation decides: step to a neighbour, or halt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Step(NodeId),
    Stuck(StuckReason),
}

/// Persistent, Pursuer-owned visitation bookkeeping (§3). Nodes themselves
/// carry no mutable per-search state; this is the only state a kernel
/// invocation reads and writes, and it survives repeated recomputations.
#[derive(Debug, Clone, Default)]
pub struct VisitedSets {
    pub visited_nodes: HashSet<NodeId>,
    pub visited_leaves: HashSet<NodeId>,
    pub backtracked_from: HashSet<NodeId>,
}

impl VisitedSets {
    pub fn starting_at(start: NodeId, graph: &Graph) -> Self {
        let mut sets = Self::default();
        sets.mark_visited(start, graph);
        sets
    }

    pub fn mark_visited(&mut self, node: NodeId, graph: &Graph) {
        self.visited_nodes.insert(node);
        if graph.is_leaf(node) {
            self.visited_leaves.insert(node);
        }
    }
}

/// Common kernel contract (§4.4): pure apart from the `visited` sets the
/// Pursuer owns, and never proposes a non-neighbour of `current`.
pub fn next_move(
    graph: &Graph,
    policy: Policy,
    visited: &mut VisitedSets,
    current: NodeId,
    runner: NodeId,
) -> Decision {
    let decision = match policy {
        Policy::Bfs => traversal::next_move_bfs(graph, visited, current),
        Policy::Dfs => traversal::next_move_dfs(graph, visited, current),
        Policy::Ucs => traversal::next_move_ucs(graph, visited, current),
        Policy::GreedyMin => greedy::next_move(graph, visited, current, true),
        Policy::GreedyMax => greedy::next_move(graph, visited, current, false),
        Policy::AStarMin => astar::next_move(graph, visited, current, true),
        Policy::AStarMax => astar::next_move(graph, visited, current, false),
    };

    if let Decision::Step(next) = decision {
        assert_admissible(graph, current, next);
        visited.mark_visited(next, graph);
    }
    let _ = runner; // no policy currently reasons about the runner beyond cadence (see §4.5/§4.6)

    decision
}

/// Assertion-class contract check (§7 `PolicyPanic::NonNeighbour`): a
/// kernel must never propose a non-neighbour. A bug here aborts the
/// session rather than being silently "recovered".
fn assert_admissible(graph: &Graph, current: NodeId, proposed: NodeId) {
    let is_neighbour = graph.neighbours(current).iter().any(|&(n, _)| n == proposed);
    if !is_neighbour {
        panic!(
            "{}",
            NonNeighbourPanic {
                current,
                proposed,
            }
        );
    }
}
