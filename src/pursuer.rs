//! Pursuer controller (C5, §4.5): wraps a policy kernel invocation with
//! cadence gating and, for the no-backtrack family, the "conditional
//! tracking" rule that keeps the pursuer from re-homing on every lateral
//! or regressive runner hop.

use crate::graph::{Graph, NodeId};
use crate::policy::{self, Decision, Policy, StuckReason, VisitedSets};

#[derive(Debug, Clone)]
pub struct Pursuer {
    pub current: NodeId,
    pub policy: Policy,
    pub visited: VisitedSets,
    pub stuck: bool,
    pub stuck_reason: Option<StuckReason>,
    /// `None` until the first decision is made, so a fresh pursuer is
    /// never cadence-gated out of its first move.
    last_move_time: Option<u64>,
    last_decision: Option<Decision>,
    nodes_expanded: usize,
}

impl Pursuer {
    pub fn new(start: NodeId, policy: Policy, graph: &Graph) -> Self {
        Self {
            current: start,
            policy,
            visited: VisitedSets::starting_at(start, graph),
            stuck: false,
            stuck_reason: None,
            last_move_time: None,
            last_decision: None,
            nodes_expanded: 0,
        }
    }

    pub fn nodes_expanded(&self) -> usize {
        self.nodes_expanded
    }

    /// A decision is requested only when all of §4.5's conditions hold:
    /// the session isn't stuck already, cadence has elapsed, and (for
    /// the no-backtrack family) the runner's own last hop still counts
    /// as progress in the policy's direction. Co-location with the
    /// runner pauses decisions entirely until the runner moves away.
    pub fn maybe_decide(
        &mut self,
        graph: &Graph,
        now_ms: u64,
        cadence_ms: u64,
        runner_current: NodeId,
        runner_moved: bool,
        runner_previous: NodeId,
    ) -> Option<Decision> {
        if self.stuck {
            return None;
        }
        if self.current == runner_current {
            return None;
        }
        if let Some(last) = self.last_move_time {
            if now_ms.saturating_sub(last) < cadence_ms {
                return None;
            }
        }

        if self.policy.is_no_backtrack() && runner_moved {
            let progressed = runner_progressed(graph, self.policy, runner_previous, runner_current);
            if !progressed {
                // keeps its previously decided Decision rather than re-engaging
                return self.last_decision;
            }
        }

        let decision = policy::next_move(
            graph,
            self.policy,
            &mut self.visited,
            self.current,
            runner_current,
        );
        self.last_move_time = Some(now_ms);
        self.nodes_expanded += 1;
        self.last_decision = Some(decision);

        match decision {
            Decision::Step(next) => self.current = next,
            Decision::Stuck(reason) => {
                self.stuck = true;
                self.stuck_reason = Some(reason);
            }
        }

        Some(decision)
    }
}

fn runner_progressed(graph: &Graph, policy: Policy, prev: NodeId, current: NodeId) -> bool {
    let h_prev = graph.heuristic(prev);
    let h_current = graph.heuristic(current);
    if policy.is_min_variant() {
        h_current < h_prev
    } else {
        h_current > h_prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::rng::seeded_rng;

    #[test]
    fn cadence_gates_repeated_decisions() {
        let mut rng = seeded_rng(Some(7));
        let graph = GraphBuilder::default().build(&mut rng).unwrap();
        let start = graph.node_ids().next().unwrap();
        let runner = graph
            .node_ids()
            .find(|&n| n != start)
            .expect("graph has at least two nodes");

        let mut pursuer = Pursuer::new(start, Policy::Bfs, &graph);
        let first = pursuer.maybe_decide(&graph, 0, 800, runner, false, runner);
        assert!(first.is_some());

        let second = pursuer.maybe_decide(&graph, 100, 800, runner, false, runner);
        assert!(second.is_none(), "cadence has not elapsed yet");
    }

    #[test]
    fn lateral_runner_hop_does_not_reengage_no_backtrack_family() {
        let mut rng = seeded_rng(Some(9));
        let mut graph = GraphBuilder::default().build(&mut rng).unwrap();
        let start = graph.node_ids().next().unwrap();
        let neighbours = graph.neighbours(start).to_vec();
        assert!(neighbours.len() >= 2);
        let runner_a = neighbours[0].0;
        let runner_b = neighbours[1].0;

        // pin heuristics so the pursuer's first move is deterministically
        // toward runner_a, and runner_b is strictly worse (not progress).
        graph.set_heuristic(start, 1000.0);
        for &(n, _) in &neighbours {
            graph.set_heuristic(n, 500.0);
        }
        graph.set_heuristic(runner_a, 10.0);
        graph.set_heuristic(runner_b, 20.0);

        let mut pursuer = Pursuer::new(start, Policy::GreedyMin, &graph);
        let engaged = pursuer.maybe_decide(&graph, 0, 600, runner_a, false, runner_a);
        assert_eq!(engaged, Some(Decision::Step(runner_a)));
        let cached = pursuer.last_decision;

        let result = pursuer.maybe_decide(&graph, 600, 600, runner_b, true, runner_a);
        assert_eq!(result, cached, "should keep its previously decided Decision");
    }
}
