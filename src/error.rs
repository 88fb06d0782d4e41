use thiserror::Error;

use crate::graph::NodeId;

/// Errors from graph construction (C2). Per the error handling design,
/// `Disconnected` bubbles to the host for a fresh-seed retry while
/// `LeafCountUnmet` is logged and accepted with the nearest feasible count.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not connect the graph after exhausting cross-component bridge attempts")]
    Disconnected,

    #[error("leaf count {actual} could not be brought into [{min}, {max}] without disconnecting")]
    LeafCountUnmet { actual: usize, min: usize, max: usize },

    #[error("leaf count could not be satisfied without breaking connectivity")]
    Unsatisfiable,
}

/// Errors from spawn placement and landscape balancing (C3).
#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("no node pair is at least {min_distance} units apart; falling back to the maximum-distance pair")]
    SpawnTooClose { min_distance: f64 },

    #[error("balance post-condition failed for pursuer spawn {spawn:?} after {attempts} attempts")]
    Plateau { spawn: NodeId, attempts: u32 },
}

/// Errors surfaced while applying a tick's runner intent (C6 step 2).
/// Per disposition, these are recoverable: the session silently ignores
/// the offending intent and leaves state unchanged.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("clicked node {0:?} is not adjacent to the runner or its queue tail")]
    BadIntent(NodeId),
}

/// Raised (as a panic, not a `Result`) when a policy kernel violates the
/// `Decision` contract by proposing a non-neighbour of `current`. This is
/// assertion-class per the error handling design: it indicates a bug in a
/// kernel implementation and must not be silently recovered from.
#[derive(Debug, Error)]
#[error("policy kernel proposed non-neighbour {proposed:?} of current node {current:?}")]
pub struct NonNeighbourPanic {
    pub current: NodeId,
    pub proposed: NodeId,
}
