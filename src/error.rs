//! Error types for graph partitioning.

use crate::types::{EdgeIndex, NodeIndex, PartitionIndex};

/// Errors that can occur while building or evaluating a partitioning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    /// An input edge is neither produced by a node nor declared as an external
    /// input of any partition. The graph contains a dangling reference.
    #[error("failed to find source for input {edge} of node {node}")]
    MissingEdgeSource { edge: EdgeIndex, node: NodeIndex },

    /// A partitioning needs at least one partition.
    #[error("partition count must be at least 1")]
    InvalidPartitionCount,

    /// A partition owns a node id outside the node list.
    #[error("partition {partition} owns unknown node {node} (graph has {num_nodes} nodes)")]
    UnknownNode {
        node: NodeIndex,
        partition: PartitionIndex,
        num_nodes: usize,
    },

    /// A node id passed to a mutation is outside the node list.
    #[error("node {node} does not exist (graph has {num_nodes} nodes)")]
    NodeOutOfRange { node: NodeIndex, num_nodes: usize },

    /// A node is assigned or moved to a partition that does not exist.
    #[error("node {node} is assigned to partition {partition} but only {num_partitions} exist")]
    UnknownPartition {
        node: NodeIndex,
        partition: PartitionIndex,
        num_partitions: usize,
    },

    /// A node is owned by more than one partition.
    #[error("node {node} is owned by partitions {first} and {second}")]
    DuplicateNode {
        node: NodeIndex,
        first: PartitionIndex,
        second: PartitionIndex,
    },

    /// A node is not owned by any partition.
    #[error("node {node} is not assigned to any partition")]
    UnassignedNode { node: NodeIndex },
}
