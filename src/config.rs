//! Tunables consumed once at `Start` (§6). Unlike the ambient stack this is
//! modelled on, this core does not hot-reload from a watched file: the host
//! supplies a `Tunables` value synchronously and the session treats it as
//! immutable for its lifetime.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::Policy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tunables file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tunables: {0}")]
    Parsing(#[from] ron::de::Error),
}

/// Per-policy-family decision cadence, in milliseconds (§4.5 design values).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceMs {
    pub bfs_dfs: u64,
    pub ucs_astar: u64,
    pub greedy: u64,
}

impl Default for CadenceMs {
    fn default() -> Self {
        Self {
            bfs_dfs: 800,
            ucs_astar: 700,
            greedy: 600,
        }
    }
}

impl CadenceMs {
    pub fn for_policy(&self, policy: Policy) -> u64 {
        match policy {
            Policy::Bfs | Policy::Dfs => self.bfs_dfs,
            Policy::Ucs | Policy::AStarMin | Policy::AStarMax => self.ucs_astar,
            Policy::GreedyMin | Policy::GreedyMax => self.greedy,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tunables {
    pub node_count: usize,
    pub leaf_range: Range<usize>,
    pub edge_weight_range: Range<f64>,
    pub cadence_ms: CadenceMs,
    pub contact_damage: f64,
    pub contact_cooldown_ms: u64,
    pub runner_hp: f64,
    pub pursuer_hp: f64,
    pub min_spawn_distance: f64,
    pub queue_depth: usize,
    pub rng_seed: Option<u64>,
    /// Not in §6's tunables table: the core's moves are discrete and
    /// instantaneous (§9), but the runner's queue still needs *some* pace
    /// at which queued hops are popped, since a human can queue up to
    /// three clicks well ahead of the pursuer's own cadence. Animation
    /// interpolation remains entirely a presenter concern; this only
    /// paces when `runner.current` itself advances.
    pub runner_step_ms: u64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            node_count: 28,
            leaf_range: Range { min: 8, max: 12 },
            edge_weight_range: Range { min: 1.0, max: 10.0 },
            cadence_ms: CadenceMs::default(),
            contact_damage: 10.0,
            contact_cooldown_ms: 1000,
            runner_hp: 100.0,
            pursuer_hp: 150.0,
            min_spawn_distance: 400.0,
            queue_depth: 3,
            rng_seed: None,
            runner_step_ms: 700,
        }
    }
}

impl Tunables {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::de::from_str(s)?)
    }

    pub fn from_ron_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let t = Tunables::default();
        assert_eq!(t.node_count, 28);
        assert_eq!(t.leaf_range, Range { min: 8, max: 12 });
        assert_eq!(t.cadence_ms.for_policy(Policy::Bfs), 800);
        assert_eq!(t.cadence_ms.for_policy(Policy::Ucs), 700);
        assert_eq!(t.cadence_ms.for_policy(Policy::GreedyMin), 600);
        assert_eq!(t.contact_damage, 10.0);
        assert_eq!(t.runner_hp, 100.0);
        assert_eq!(t.pursuer_hp, 150.0);
    }

    #[test]
    fn roundtrips_through_ron() {
        let t = Tunables::default();
        let encoded = ron::to_string(&t).unwrap();
        let decoded = Tunables::from_ron_str(&encoded).unwrap();
        assert_eq!(t, decoded);
    }
}
