//! AStarMin / AStarMax (§4.4): no-backtrack, `f = g + h` driven, where `g`
//! is the frozen path-cost landscape baked in by the balance planner.

use ordered_float::OrderedFloat;

use crate::graph::{Graph, NodeId};
use crate::policy::{Decision, StuckReason, VisitedSets};

fn f(graph: &Graph, node: NodeId) -> f64 {
    graph.path_cost(node) + graph.heuristic(node)
}

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
        .map(|(n, _)| (n, f(graph, n)))
        .collect();

    if admissible.is_empty() {
        return Decision::Stuck(StuckReason::DeadEnd);
    }

    let best = *admissible
        .iter()
        .min_by_key(|&&(n, f)| {
            let ranked = if is_min { f } else { -f };
            (OrderedFloat(ranked), n)
        })
        .expect("admissible is non-empty");

    let current_f = f(graph, current);
    let plateau = if is_min { best.1 >= current_f } else { best.1 <= current_f };
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
    use crate::graph::{Graph, GraphBuilder, NodeId};
    use crate::rng::seeded_rng;

    #[test]
    fn tiebreak_picks_smaller_id_deterministically() {
        let mut rng = seeded_rng(Some(11));
        let mut graph = GraphBuilder::default().build(&mut rng).unwrap();
        let start = graph.node_ids().next().unwrap();
        let neighbours = graph.neighbours(start).to_vec();
        assert!(neighbours.len() >= 2, "need at least two neighbours to tie");

        // force an exact f tie between the two lowest-id neighbours
        equalize_f(&mut graph, neighbours[0].0, neighbours[1].0);

        let visited = VisitedSets::starting_at(start, &graph);
        let expected = neighbours[0].0.min(neighbours[1].0);
        let decision = next_move(&graph, &visited, start, true);
        assert_eq!(decision, Decision::Step(expected));
    }

    fn equalize_f(graph: &mut Graph, a: NodeId, b: NodeId) {
        let target = f(graph, a);
        let h = target - graph.path_cost(b);
        graph.set_heuristic(b, h);
    }
}
