//! GreedyMin / GreedyMax (§4.4): no-backtrack, heuristic-driven.

use ordered_float::OrderedFloat;

use crate::graph::{Graph, NodeId};
use crate::policy::{Decision, StuckReason, VisitedSets};

pub(super) fn next_move(
    graph: &Graph,
    visited: &VisitedSets,
    current: NodeId,
    is_min: bool,
) -> Decision {
    let admissible: Vec<(NodeId, f64)> = graph
        .neighbours(current)
        .iter()
        .copied()
        .filter(|(n, _)| !visited.visited_nodes.contains(n))
        .map(|(n, _)| (n, graph.heuristic(n)))
        .collect();

    if admissible.is_empty() {
        return Decision::Stuck(StuckReason::DeadEnd);
    }

    let best = *admissible
        .iter()
        .min_by_key(|&&(n, h)| {
            let ranked = if is_min { h } else { -h };
            (OrderedFloat(ranked), n)
        })
        .expect("admissible is non-empty");

    let current_h = graph.heuristic(current);
    let plateau = if is_min { best.1 >= current_h } else { best.1 <= current_h };
    if plateau {
        return Decision::Stuck(if is_min {
            StuckReason::LocalMin
        } else {
            StuckReason::LocalMax
        });
    }

    Decision::Step(best.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::rng::seeded_rng;

    #[test]
    fn deadend_when_every_neighbour_visited() {
        let mut rng = seeded_rng(Some(5));
        let graph = GraphBuilder::default().build(&mut rng).unwrap();
        let start = graph.node_ids().next().unwrap();
        let mut visited = VisitedSets::starting_at(start, &graph);
        for (n, _) in graph.neighbours(start).to_vec() {
            visited.mark_visited(n, &graph);
        }

        assert_eq!(next_move(&graph, &visited, start, true), Decision::Stuck(StuckReason::DeadEnd));
    }
}
