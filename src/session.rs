//! Session state machine (C6, §4.6): owns the graph, both actors and the
//! HP/outcome bookkeeping, and drives everything from a single `tick`.

use rand::rngs::StdRng;

use crate::config::Tunables;
use crate::error::{BuildError, TickError};
use crate::graph::{BalancePlanner, Graph, GraphBuilder, NodeId};
use crate::logging::prelude::*;
use crate::policy::{Policy, StuckReason};
use crate::pursuer::Pursuer;
use crate::rng::seeded_rng;
use crate::runner::Runner;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Outcome {
    InProgress,
    /// The runner wins: the pursuer got stuck, or its HP hit zero first.
    Victory(StuckReason),
    /// The pursuer wins: the runner's HP hit zero first.
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionStats {
    pub elapsed_ms: u64,
    pub runner_hp: f64,
    pub pursuer_hp: f64,
    pub nodes_visited: usize,
    pub nodes_expanded: usize,
}

#[derive(Debug)]
pub struct Session {
    graph: Graph,
    runner: Runner,
    pursuer: Pursuer,
    tunables: Tunables,
    outcome: Outcome,
    runner_hp: f64,
    pursuer_hp: f64,
    elapsed_ms: u64,
    paused: bool,
    last_contact_time: Option<u64>,
    last_decision_runner_node: NodeId,
}

impl Session {
    pub fn new(tunables: Tunables, policy: Policy) -> Result<Self, BuildError> {
        let mut rng = seeded_rng(tunables.rng_seed);
        Self::new_with_rng(tunables, policy, &mut rng)
    }

    pub fn new_with_rng(tunables: Tunables, policy: Policy, rng: &mut StdRng) -> Result<Self, BuildError> {
        let builder = GraphBuilder {
            node_count: tunables.node_count,
            leaf_range: (tunables.leaf_range.min, tunables.leaf_range.max),
            edge_weight_range: (tunables.edge_weight_range.min, tunables.edge_weight_range.max),
            ..GraphBuilder::default()
        };
        let mut graph = builder.build(rng)?;

        let planner = BalancePlanner {
            min_spawn_distance: tunables.min_spawn_distance,
            ..BalancePlanner::default()
        };
        let spawns = planner.choose_spawns(&graph, rng);
        let (spawns, _seed_path) = planner.plan(&mut graph, policy, spawns, rng);

        let runner = Runner::new(spawns.runner);
        let pursuer = Pursuer::new(spawns.pursuer, policy, &graph);

        info!("session started"; "policy" => %policy, "pursuer_spawn" => %spawns.pursuer, "runner_spawn" => %spawns.runner);

        Ok(Self {
            graph,
            runner,
            pursuer,
            outcome: Outcome::InProgress,
            runner_hp: tunables.runner_hp,
            pursuer_hp: tunables.pursuer_hp,
            elapsed_ms: 0,
            paused: false,
            last_contact_time: None,
            last_decision_runner_node: spawns.runner,
            tunables,
        })
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn pursuer(&self) -> &Pursuer {
        &self.pursuer
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            elapsed_ms: self.elapsed_ms,
            runner_hp: self.runner_hp,
            pursuer_hp: self.pursuer_hp,
            nodes_visited: self.pursuer.visited.visited_nodes.len(),
            nodes_expanded: self.pursuer.nodes_expanded(),
        }
    }

    /// Advances the session by one tick (§4.6's six ordered steps). `clicks`
    /// are the runner-intent node ids queued by the host since the last
    /// tick; invalid ones are silently ignored (their `TickError`s are
    /// returned for telemetry, never propagated as a fatal error).
    pub fn tick(&mut self, now_ms: u64, dt_ms: u64, clicks: &[NodeId]) -> Vec<TickError> {
        if self.paused {
            return Vec::new();
        }
        if self.outcome != Outcome::InProgress {
            return Vec::new();
        }

        let mut errors = Vec::new();

        // step 1 (after the pause passthrough above): apply runner intents.
        for &node in clicks {
            if let Err(e) = self.runner.apply_click(&self.graph, node, self.tunables.queue_depth) {
                debug!("ignoring bad runner intent"; "error" => %e);
                errors.push(e);
            }
        }

        // step 2: advance runner movement on its own pace.
        let runner_before = self.runner.current;
        let runner_moved = self.runner.maybe_step(now_ms, self.tunables.runner_step_ms);

        // step 3: cadence-gated pursuer decision.
        let cadence = self.tunables.cadence_ms.for_policy(self.pursuer.policy);
        self.pursuer.maybe_decide(
            &self.graph,
            now_ms,
            cadence,
            self.runner.current,
            runner_moved,
            if runner_moved { runner_before } else { self.last_decision_runner_node },
        );
        if runner_moved {
            self.last_decision_runner_node = runner_before;
        }

        // step 4: combat, with a cooldown so standing contact doesn't melt
        // both actors in a single tick.
        if self.pursuer.current == self.runner.current {
            let cooldown_elapsed = self
                .last_contact_time
                .map(|t| now_ms.saturating_sub(t) >= self.tunables.contact_cooldown_ms)
                .unwrap_or(true);
            if cooldown_elapsed {
                self.runner_hp -= self.tunables.contact_damage;
                self.pursuer_hp -= self.tunables.contact_damage;
                self.last_contact_time = Some(now_ms);
                info!("contact damage applied"; "runner_hp" => self.runner_hp, "pursuer_hp" => self.pursuer_hp);
            }
        }

        // step 5: clock.
        self.elapsed_ms += dt_ms;

        // step 6: resolution, in priority order.
        self.outcome = if self.runner_hp <= 0.0 {
            Outcome::Defeat
        } else if self.pursuer_hp <= 0.0 {
            Outcome::Victory(StuckReason::CombatKO)
        } else if self.pursuer.stuck {
            Outcome::Victory(self.pursuer.stuck_reason.expect("stuck implies a reason"))
        } else {
            Outcome::InProgress
        };

        if self.outcome != Outcome::InProgress {
            info!("session resolved"; "outcome" => ?self.outcome, "elapsed_ms" => self.elapsed_ms);
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_hp_reaching_zero_defeats_before_pursuer_hp() {
        let mut tunables = Tunables::default();
        tunables.rng_seed = Some(42);
        tunables.runner_hp = 1.0;
        tunables.pursuer_hp = 1.0;
        tunables.contact_damage = 50.0;
        tunables.contact_cooldown_ms = 0;

        let mut session = Session::new(tunables, Policy::GreedyMin).unwrap();
        // force contact by teleporting the runner onto the pursuer
        let pursuer_node = session.pursuer().current;
        session.runner = Runner::new(pursuer_node);

        let _ = session.tick(0, 16, &[]);
        assert_eq!(session.outcome(), Outcome::Defeat);
    }

    #[test]
    fn paused_session_does_not_advance() {
        let mut tunables = Tunables::default();
        tunables.rng_seed = Some(3);
        let mut session = Session::new(tunables, Policy::Bfs).unwrap();
        session.pause();
        let before = session.stats();
        let _ = session.tick(1000, 16, &[]);
        let after = session.stats();
        assert_eq!(before, after);
    }

    #[test]
    fn equal_contact_damage_still_favours_the_higher_hp_pool() {
        // runner_hp (100) and pursuer_hp (150) are asymmetric by default;
        // equal per-contact damage still exhausts the runner first.
        let mut tunables = Tunables::default();
        tunables.rng_seed = Some(1);
        tunables.contact_cooldown_ms = 0;
        let mut session = Session::new(tunables, Policy::Bfs).unwrap();

        let pursuer_node = session.pursuer().current;
        session.runner = Runner::new(pursuer_node);

        let mut now = 0;
        loop {
            let _ = session.tick(now, 100, &[]);
            match session.outcome() {
                Outcome::InProgress => now += 100,
                other => {
                    assert_eq!(other, Outcome::Defeat, "lower HP pool should lose first");
                    break;
                }
            }
        }
    }
}
