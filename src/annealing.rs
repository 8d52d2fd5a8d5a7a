//! Simulated annealing over single-node moves between partitions.

use std::time::{Duration, Instant};

use itertools::Itertools;
use log::{debug, info, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    error::PartitionError,
    partitioning::Partitioning,
    types::{Cost, NodeIndex, PartitionIndex},
};

/// Parameters of the annealing schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealingConfig {
    /// Number of rounds over which the temperature cools down to zero. The
    /// optimizer always runs at least this many rounds.
    pub rounds: usize,
    /// Probability of accepting an arbitrary move in the first round.
    pub initial_temperature: f64,
    /// Hard limit on the total number of rounds, including the rounds that run
    /// past `rounds` while the cost keeps improving.
    pub max_rounds: Option<usize>,
    /// Wall-clock budget for the whole optimization.
    pub max_time: Option<Duration>,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            rounds: 100,
            initial_temperature: 0.1,
            max_rounds: None,
            max_time: None,
        }
    }
}

impl AnnealingConfig {
    pub fn new(rounds: usize, initial_temperature: f64) -> Self {
        Self {
            rounds,
            initial_temperature,
            ..Default::default()
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = Some(max_time);
        self
    }
}

/// Why the optimization loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// A round after the cooling phase kept no improving move.
    Converged,
    /// `max_rounds` was reached.
    RoundLimit,
    /// `max_time` was exceeded.
    TimeLimit,
}

/// Summary of an optimization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnealingReport {
    /// Number of rounds that were run.
    pub rounds: usize,
    pub initial_cost: Cost,
    pub final_cost: Cost,
    /// Tentative moves that were kept because they strictly lowered the cost.
    pub improving_moves: usize,
    /// Moves that were accepted unconditionally due to the temperature.
    pub exploratory_moves: usize,
    pub stop_reason: StopReason,
}

/// Linearly cools from `initial_temperature` at round 0 to zero at round
/// `rounds`, staying at zero afterwards.
#[inline]
fn temperature(initial_temperature: f64, round: usize, rounds: usize) -> f64 {
    (initial_temperature * (1.0 - round as f64 / rounds as f64)).max(0.0)
}

/// Optimizer that moves single nodes between non-fixed partitions.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedAnnealing {
    config: AnnealingConfig,
}

impl SimulatedAnnealing {
    /// # Panics
    /// Panics if `config.rounds` is zero.
    pub fn new(config: AnnealingConfig) -> Self {
        assert!(config.rounds > 0, "annealing requires at least one round");
        Self { config }
    }

    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    /// Improves `partitioning` in place.
    ///
    /// Every round visits each node of each non-fixed partition once and moves it
    /// to a random other non-fixed partition. With probability equal to the
    /// current temperature the move is accepted regardless of cost, otherwise it
    /// is only kept if it strictly lowers the cost. After the cooling phase, the
    /// loop continues as long as the previous round kept an improving move.
    ///
    /// The partitioning must contain at least two non-fixed partitions. Any
    /// [`PartitionError`] from the cost evaluation aborts the optimization and
    /// leaves `partitioning` in its current (valid) state.
    pub fn optimize<R>(
        &self,
        partitioning: &mut Partitioning,
        rng: &mut R,
    ) -> Result<AnnealingReport, PartitionError>
    where
        R: ?Sized + Rng,
    {
        let AnnealingConfig {
            rounds,
            initial_temperature,
            max_rounds,
            max_time,
        } = self.config;
        let end_time = max_time.map(|max_time| Instant::now() + max_time);

        let initial_cost = partitioning.cost()?.objective;
        let mut current_cost = initial_cost;
        let mut improving_moves = 0;
        let mut exploratory_moves = 0;
        info!(config:serde = self.config, initial_cost; "Starting simulated annealing");

        let mut round = 0;
        let mut improved = false;
        let stop_reason = loop {
            if round >= rounds && !improved {
                break StopReason::Converged;
            }
            if max_rounds.is_some_and(|max_rounds| round >= max_rounds) {
                break StopReason::RoundLimit;
            }
            if end_time.is_some_and(|end_time| Instant::now() >= end_time) {
                break StopReason::TimeLimit;
            }

            improved = false;
            let temperature = temperature(initial_temperature, round, rounds);
            debug!(round, temperature, cost = current_cost; "Annealing round");

            // Moves during the round must not change the sets being iterated
            let snapshot: Vec<(PartitionIndex, Vec<NodeIndex>)> = partitioning
                .movable_partitions()
                .map(|group| {
                    let nodes = partitioning.partition(group).nodes().iter().copied();
                    (group, nodes.collect_vec())
                })
                .collect();

            for (group, nodes) in snapshot {
                for node in nodes {
                    let target = partitioning.pick_other_group(group, rng);
                    let explore = rng.gen::<f64>() < temperature;
                    partitioning.move_node(node, group, target);
                    let new_cost = partitioning.cost()?.objective;

                    if explore {
                        trace!(node, from = group, to = target, cost = new_cost; "Exploratory move");
                        current_cost = new_cost;
                        exploratory_moves += 1;
                    } else if new_cost < current_cost {
                        current_cost = new_cost;
                        improved = true;
                        improving_moves += 1;
                    } else {
                        partitioning.move_node(node, target, group);
                    }
                }
            }
            round += 1;
        };

        info!(rounds = round, initial_cost, final_cost = current_cost, stop_reason:?; "Finished simulated annealing");
        Ok(AnnealingReport {
            rounds: round,
            initial_cost,
            final_cost: current_cost,
            improving_moves,
            exploratory_moves,
            stop_reason,
        })
    }
}
