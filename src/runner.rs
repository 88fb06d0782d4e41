//! Runner (C5 companion): the human-controlled side. Holds a bounded
//! click queue (§4.2/§4.6) and paces its own hops independently of the
//! pursuer's cadence.

use smallvec::SmallVec;

use crate::error::TickError;
use crate::graph::{Graph, NodeId};

/// Inline-capacity-3 by construction: §4.2 bounds the click queue at the
/// same depth, so it never spills to the heap in practice.
type ClickQueue = SmallVec<[NodeId; 3]>;

#[derive(Debug, Clone)]
pub struct Runner {
    pub current: NodeId,
    queue: ClickQueue,
    last_moved_time: u64,
}

impl Runner {
    pub fn new(start: NodeId) -> Self {
        Self {
            current: start,
            queue: SmallVec::new(),
            last_moved_time: 0,
        }
    }

    pub fn queue(&self) -> &[NodeId] {
        &self.queue
    }

    /// Applies a single click intent (§4.6 step 2). A click on the
    /// runner's own current node clears the queue outright. A click
    /// adjacent to the queue's tail (or current, if the queue is empty)
    /// extends the queue, up to `queue_depth`. A click adjacent to
    /// current but not chainable onto the tail replaces the queue
    /// wholesale. Anything else is an invalid intent, surfaced to the
    /// caller but otherwise inert.
    pub fn apply_click(&mut self, graph: &Graph, node: NodeId, queue_depth: usize) -> Result<(), TickError> {
        if node == self.current {
            self.queue.clear();
            return Ok(());
        }

        let tail = self.queue.last().copied().unwrap_or(self.current);
        if graph.weight(tail, node).is_some() && self.queue.len() < queue_depth {
            self.queue.push(node);
            return Ok(());
        }

        if graph.weight(self.current, node).is_some() {
            self.queue.clear();
            self.queue.push(node);
            return Ok(());
        }

        Err(TickError::BadIntent(node))
    }

    /// Pops the head of the queue once `step_ms` has elapsed since the
    /// last hop. Returns `true` iff `current` advanced this call.
    pub fn maybe_step(&mut self, now_ms: u64, step_ms: u64) -> bool {
        if self.queue.is_empty() {
            return false;
        }
        if now_ms.saturating_sub(self.last_moved_time) < step_ms {
            return false;
        }
        self.current = self.queue.remove(0);
        self.last_moved_time = now_ms;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::rng::seeded_rng;

    #[test]
    fn click_on_current_clears_queue() {
        let mut rng = seeded_rng(Some(3));
        let graph = GraphBuilder::default().build(&mut rng).unwrap();
        let start = graph.node_ids().next().unwrap();
        let neighbour = graph.neighbours(start)[0].0;

        let mut runner = Runner::new(start);
        runner.apply_click(&graph, neighbour, 3).unwrap();
        assert_eq!(runner.queue().len(), 1);

        runner.apply_click(&graph, start, 3).unwrap();
        assert!(runner.queue().is_empty());
    }

    #[test]
    fn click_on_non_adjacent_node_is_bad_intent() {
        let mut rng = seeded_rng(Some(4));
        let graph = GraphBuilder::default().build(&mut rng).unwrap();
        let start = graph.node_ids().next().unwrap();
        let far = graph
            .node_ids()
            .find(|&n| n != start && graph.weight(start, n).is_none())
            .expect("graph has a non-neighbour of start");

        let mut runner = Runner::new(start);
        let err = runner.apply_click(&graph, far, 3).unwrap_err();
        assert!(matches!(err, TickError::BadIntent(node) if node == far));
        assert!(runner.queue().is_empty());
    }

    #[test]
    fn queue_is_bounded_by_depth() {
        let mut rng = seeded_rng(Some(6));
        let graph = GraphBuilder::default().build(&mut rng).unwrap();
        let start = graph.node_ids().next().unwrap();
        let neighbours = graph.neighbours(start).to_vec();
        assert!(neighbours.len() >= 2, "need at least two neighbours of start");

        // two clicks on distinct neighbours of start chain onto the queue
        // only while both are mutually adjacent or adjacent-to-current;
        // with a depth of 1 the second click always replaces the first
        // unless the two neighbours are themselves adjacent.
        let mut runner = Runner::new(start);
        runner.apply_click(&graph, neighbours[0].0, 1).unwrap();
        assert_eq!(runner.queue().len(), 1);

        if graph.weight(neighbours[0].0, neighbours[1].0).is_none() {
            runner.apply_click(&graph, neighbours[1].0, 1).unwrap();
            assert_eq!(runner.queue().len(), 1, "depth of 1 never holds more than one hop");
        }
    }
}
