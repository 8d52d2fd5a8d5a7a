use serde::{Deserialize, Serialize};

use crate::types::{NodeIndex, PartitionIndex};

/// Policy for the starting assignment of nodes to partitions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialAssignment {
    /// Assigns consecutive runs of `max(num_nodes / num_partitions, 1)` nodes to
    /// each partition. The `num_nodes % num_partitions` remaining nodes join the
    /// last partition. With fewer nodes than partitions, the trailing partitions
    /// stay empty.
    #[default]
    Contiguous,
    /// Assigns node `i` to partition `i % num_partitions`.
    RoundRobin,
}

impl InitialAssignment {
    /// Returns the partition of every node, indexed by node id.
    ///
    /// # Panics
    /// Panics if `num_partitions` is zero.
    pub(crate) fn assign(self, num_nodes: usize, num_partitions: usize) -> Vec<PartitionIndex> {
        assert!(num_partitions > 0, "at least one partition is required");
        match self {
            InitialAssignment::Contiguous => {
                let chunk = (num_nodes / num_partitions).max(1);
                (0..num_nodes)
                    .map(|node: NodeIndex| (node / chunk).min(num_partitions - 1))
                    .collect()
            }
            InitialAssignment::RoundRobin => (0..num_nodes)
                .map(|node: NodeIndex| node % num_partitions)
                .collect(),
        }
    }
}
