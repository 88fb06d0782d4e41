//! BFS / DFS / UCS (§4.4 graph-traversal family): admissible neighbours
//! exclude already-visited leaves; ties within "unvisited" are broken
//! deterministically by id (FIFO == smallest id, LIFO == largest id) so
//! that neighbour order never hides behind insertion order, per the
//! open question in §9 about hidden iteration-order dependence.

use ordered_float::OrderedFloat;

use crate::graph::{Graph, NodeId};
use crate::policy::{Decision, StuckReason, VisitedSets};

fn admissible(graph: &Graph, visited: &VisitedSets, current: NodeId) -> Vec<(NodeId, f64)> {
    graph
        .neighbours(current)
        .iter()
        .copied()
        .filter(|(n, _)| !(graph.is_leaf(*n) && visited.visited_leaves.contains(n)))
        .collect()
}

fn backtrack_or_stuck(visited: &mut VisitedSets, current: NodeId, admissible: &[(NodeId, f64)]) -> Decision {
    visited.backtracked_from.insert(current);
    admissible
        .iter()
        .map(|(n, _)| *n)
        .filter(|n| !visited.backtracked_from.contains(n))
        .min_by_key(|n| n.0)
        .map(Decision::Step)
        .unwrap_or(Decision::Stuck(StuckReason::GraphExplored))
}

pub(super) fn next_move_bfs(graph: &Graph, visited: &mut VisitedSets, current: NodeId) -> Decision {
    let admissible = admissible(graph, visited, current);
    let unvisited: Vec<_> = admissible
        .iter()
        .filter(|(n, _)| !visited.visited_nodes.contains(n))
        .collect();

    match unvisited.iter().map(|(n, _)| *n).min_by_key(|n| n.0) {
        Some(next) => Decision::Step(next),
        None => backtrack_or_stuck(visited, current, &admissible),
    }
}

pub(super) fn next_move_dfs(graph: &Graph, visited: &mut VisitedSets, current: NodeId) -> Decision {
    let admissible = admissible(graph, visited, current);
    let unvisited: Vec<_> = admissible
        .iter()
        .filter(|(n, _)| !visited.visited_nodes.contains(n))
        .collect();

    match unvisited.iter().map(|(n, _)| *n).max_by_key(|n| n.0) {
        Some(next) => Decision::Step(next),
        None => backtrack_or_stuck(visited, current, &admissible),
    }
}

pub(super) fn next_move_ucs(graph: &Graph, visited: &mut VisitedSets, current: NodeId) -> Decision {
    let admissible = admissible(graph, visited, current);
    let unvisited: Vec<_> = admissible
        .iter()
        .copied()
        .filter(|(n, _)| !visited.visited_nodes.contains(n))
        .collect();

    let pick = unvisited
        .iter()
        .min_by_key(|(n, w)| (OrderedFloat(*w), *n))
        .map(|(n, _)| *n);

    match pick {
        Some(next) => Decision::Step(next),
        None => backtrack_or_stuck(visited, current, &admissible),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::rng::seeded_rng;

    #[test]
    fn ucs_picks_cheapest_neighbour_first() {
        let mut rng = seeded_rng(Some(42));
        let graph = GraphBuilder::default().build(&mut rng).unwrap();
        let start = graph.node_ids().next().unwrap();
        let mut visited = VisitedSets::starting_at(start, &graph);

        let cheapest = graph
            .neighbours(start)
            .iter()
            .min_by(|(_, wa), (_, wb)| wa.partial_cmp(wb).unwrap())
            .map(|(n, _)| *n);

        if let Some(expected) = cheapest {
            let decision = next_move_ucs(&graph, &mut visited, start);
            assert_eq!(decision, Decision::Step(expected));
        }
    }

    #[test]
    fn bfs_never_revisits_a_fully_explored_leaf() {
        let mut rng = seeded_rng(Some(1));
        let graph = GraphBuilder::default().build(&mut rng).unwrap();
        let leaf = graph.node_ids().find(|&n| graph.is_leaf(n)).expect("graph has leaves");
        let mut visited = VisitedSets::starting_at(leaf, &graph);

        // leaf's one neighbour becomes current, leaf is already visited
        let (parent, _) = graph.neighbours(leaf)[0];
        visited.mark_visited(parent, &graph);

        let admissible = super::admissible(&graph, &visited, parent);
        assert!(!admissible.iter().any(|(n, _)| *n == leaf));
    }
}
