//! Heuristic partitioning of dataflow graphs onto a fixed number of parallel
//! execution units.
//!
//! A graph is a list of [`Node`]s that consume and produce edges, together with
//! the communication cost of each edge ([`EdgeCosts`]). A [`Partitioning`]
//! assigns every node to one partition. [`SimulatedAnnealing`] then moves
//! single nodes between partitions to lower the objective computed by
//! [`compute_cost`]: execution cost, plus cut edges charged to both sides, plus
//! a penalty for unevenly loaded partitions.
//!
//! ```
//! use graphpartition::{graph::chain, partition_graph, AnnealingConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let (nodes, edge_costs) = chain(3, 10, 1);
//! let mut rng = StdRng::seed_from_u64(42);
//! let partitioning =
//!     partition_graph(nodes, edge_costs, 3, &AnnealingConfig::new(100, 0.1), &mut rng).unwrap();
//! assert_eq!(partitioning.num_partitions(), 3);
//! assert!(partitioning.cost().unwrap().objective <= 90);
//! ```

pub mod annealing;
pub mod cost;
mod error;
pub mod graph;
pub mod partitioning;
pub mod types;

pub use annealing::{AnnealingConfig, AnnealingReport, SimulatedAnnealing, StopReason};
pub use cost::{compute_cost, PartitionCost};
pub use error::PartitionError;
pub use graph::{EdgeCosts, Node};
pub use partitioning::{InitialAssignment, Partition, Partitioning};

use log::info;
use rand::Rng;

/// Partitions `nodes` into `num_partitions` groups: builds a contiguous initial
/// assignment, anneals it with `config` and normalizes the result.
///
/// Requires `num_partitions >= 2` so that the optimizer has somewhere to move
/// nodes.
pub fn partition_graph<R>(
    nodes: Vec<Node>,
    edge_costs: EdgeCosts,
    num_partitions: usize,
    config: &AnnealingConfig,
    rng: &mut R,
) -> Result<Partitioning, PartitionError>
where
    R: ?Sized + Rng,
{
    let mut partitioning = Partitioning::with_partition_count(
        nodes,
        edge_costs,
        num_partitions,
        InitialAssignment::default(),
    )?;
    let report = SimulatedAnnealing::new(*config).optimize(&mut partitioning, rng)?;
    partitioning.normalize();
    info!(report:serde; "Partitioned graph");
    Ok(partitioning)
}
