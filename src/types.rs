//! Index and cost aliases shared across the crate.

pub type NodeIndex = usize;
pub type EdgeIndex = usize;
pub type PartitionIndex = usize;

/// Execution and communication costs are non-negative integers.
pub type Cost = u64;
