//! The objective minimized by the optimizer: execution cost plus communication
//! across partition boundaries, plus a penalty for uneven load.

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::{
    error::PartitionError,
    graph::edge_cost,
    partitioning::{Partition, Partitioning},
    types::{Cost, EdgeIndex, PartitionIndex},
};

/// The result of evaluating a [`Partitioning`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionCost {
    /// Sum of the non-fixed partition costs plus [`Self::imbalance`].
    pub objective: Cost,
    /// Cost of every partition, fixed ones included, in partition order.
    pub partition_costs: Vec<Cost>,
    /// Balance penalty over the non-fixed partitions.
    pub imbalance: Cost,
}

/// Computes the objective of `partitioning`.
///
/// Each partition is charged
/// - the execution cost of its nodes,
/// - the cost of its declared external inputs,
/// - the cost of every edge crossing its boundary. A crossing edge is charged
///   to both the producing and the consuming partition.
///
/// The objective is the sum over non-fixed partitions plus their
/// [`imbalance`]. Fails with [`PartitionError::MissingEdgeSource`] if an input
/// edge has no producer.
///
/// All sums saturate at `Cost::MAX`, so the objective stops discriminating
/// between assignments once it gets that large.
pub fn compute_cost(partitioning: &Partitioning) -> Result<PartitionCost, PartitionError> {
    let nodes = partitioning.nodes();
    let edge_costs = partitioning.edge_costs();
    let partitions = partitioning.partitions();

    // Find the producing partition of every edge
    let mut sources = FxHashMap::<EdgeIndex, PartitionIndex>::default();
    for (group, partition) in partitions.iter().enumerate() {
        for &node_id in partition.nodes() {
            for &output in &nodes[node_id].outputs {
                sources.insert(output, group);
            }
        }
        for &edge in partition.external_inputs() {
            sources.insert(edge, group);
        }
    }

    let mut costs = partitions
        .iter()
        .map(|partition| {
            partition
                .external_inputs()
                .iter()
                .map(|&edge| edge_cost(edge_costs, edge))
                .fold(0, Cost::saturating_add)
        })
        .collect_vec();

    for (group, partition) in partitions.iter().enumerate() {
        for &node_id in partition.nodes() {
            let node = &nodes[node_id];
            costs[group] = costs[group].saturating_add(node.cost);
            for &input in &node.inputs {
                let Some(&source) = sources.get(&input) else {
                    return Err(PartitionError::MissingEdgeSource {
                        edge: input,
                        node: node_id,
                    });
                };
                if source != group {
                    let cut = edge_cost(edge_costs, input);
                    costs[group] = costs[group].saturating_add(cut);
                    costs[source] = costs[source].saturating_add(cut);
                }
            }
        }
    }

    let imbalance = imbalance(&costs, partitions);
    let total = zip_movable(&costs, partitions).fold(0, Cost::saturating_add);

    Ok(PartitionCost {
        objective: total.saturating_add(imbalance),
        partition_costs: costs,
        imbalance,
    })
}

/// Computes `sum(max - cost)` over the costs of the non-fixed partitions. This is
/// zero exactly when all non-fixed partitions carry the same cost.
pub fn imbalance(costs: &[Cost], partitions: &[Partition]) -> Cost {
    let Some(max) = zip_movable(costs, partitions).max() else {
        return 0;
    };
    zip_movable(costs, partitions)
        .map(|cost| max - cost)
        .fold(0, Cost::saturating_add)
}

/// Iterates the costs of the non-fixed partitions.
fn zip_movable<'a>(
    costs: &'a [Cost],
    partitions: &'a [Partition],
) -> impl Iterator<Item = Cost> + 'a {
    costs
        .iter()
        .zip(partitions)
        .filter(|(_, partition)| !partition.is_fixed())
        .map(|(&cost, _)| cost)
}
