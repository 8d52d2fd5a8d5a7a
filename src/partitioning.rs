//! Partition bookkeeping: which node lives in which group, plus the fixed
//! groups and external inputs used to model boundaries.

use std::collections::BTreeSet;

use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    cost::{compute_cost, PartitionCost},
    error::PartitionError,
    graph::{EdgeCosts, Node},
    types::{EdgeIndex, NodeIndex, PartitionIndex},
};

pub mod initial;

pub use initial::InitialAssignment;

/// A group of nodes that is executed on the same unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    nodes: BTreeSet<NodeIndex>,
    external_inputs: BTreeSet<EdgeIndex>,
    fixed: bool,
}

impl Partition {
    /// Creates a movable partition owning `nodes`.
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = NodeIndex>,
    {
        Self {
            nodes: nodes.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Declares edges that enter this partition from outside the modeled graph.
    pub fn with_external_inputs<I>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = EdgeIndex>,
    {
        self.external_inputs.extend(edges);
        self
    }

    /// Pins this partition: the optimizer neither moves nodes out of it nor into
    /// it, and its cost is left out of the balance penalty.
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    #[inline]
    pub fn nodes(&self) -> &BTreeSet<NodeIndex> {
        &self.nodes
    }

    #[inline]
    pub fn external_inputs(&self) -> &BTreeSet<EdgeIndex> {
        &self.external_inputs
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Smallest owned node id, or 0 for an empty partition.
    pub fn min_node(&self) -> NodeIndex {
        self.nodes.first().copied().unwrap_or_default()
    }
}

/// Assignment of the nodes of a graph to an ordered list of partitions.
///
/// The node list and edge costs never change after construction; only the
/// partitions are mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partitioning {
    nodes: Vec<Node>,
    edge_costs: EdgeCosts,
    partitions: Vec<Partition>,
}

impl Partitioning {
    /// Assembles a partitioning from explicit partitions, e.g. to model fixed
    /// groups or external inputs. Every node must be owned by exactly one
    /// partition.
    pub fn new(
        nodes: Vec<Node>,
        edge_costs: EdgeCosts,
        partitions: Vec<Partition>,
    ) -> Result<Self, PartitionError> {
        let mut owner: Vec<Option<PartitionIndex>> = vec![None; nodes.len()];
        for (partition_index, partition) in partitions.iter().enumerate() {
            for &node in &partition.nodes {
                let Some(slot) = owner.get_mut(node) else {
                    return Err(PartitionError::UnknownNode {
                        node,
                        partition: partition_index,
                        num_nodes: nodes.len(),
                    });
                };
                if let Some(first) = *slot {
                    return Err(PartitionError::DuplicateNode {
                        node,
                        first,
                        second: partition_index,
                    });
                }
                *slot = Some(partition_index);
            }
        }
        if let Some(node) = owner.iter().position(Option::is_none) {
            return Err(PartitionError::UnassignedNode { node });
        }

        Ok(Self {
            nodes,
            edge_costs,
            partitions,
        })
    }

    /// Creates `num_partitions` movable partitions and distributes the nodes
    /// among them according to `policy`.
    pub fn with_partition_count(
        nodes: Vec<Node>,
        edge_costs: EdgeCosts,
        num_partitions: usize,
        policy: InitialAssignment,
    ) -> Result<Self, PartitionError> {
        if num_partitions == 0 {
            return Err(PartitionError::InvalidPartitionCount);
        }
        let assignment = policy.assign(nodes.len(), num_partitions);
        Self::from_assignment(nodes, edge_costs, &assignment, num_partitions)
    }

    /// Creates `num_partitions` movable partitions where node `i` is placed in
    /// partition `assignment[i]`.
    pub fn from_assignment(
        nodes: Vec<Node>,
        edge_costs: EdgeCosts,
        assignment: &[PartitionIndex],
        num_partitions: usize,
    ) -> Result<Self, PartitionError> {
        if num_partitions == 0 {
            return Err(PartitionError::InvalidPartitionCount);
        }
        let mut partitions = vec![Partition::default(); num_partitions];
        for (node, &partition) in assignment.iter().enumerate() {
            let Some(target) = partitions.get_mut(partition) else {
                return Err(PartitionError::UnknownPartition {
                    node,
                    partition,
                    num_partitions,
                });
            };
            target.nodes.insert(node);
        }
        Self::new(nodes, edge_costs, partitions)
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn edge_costs(&self) -> &EdgeCosts {
        &self.edge_costs
    }

    #[inline]
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    #[inline]
    pub fn partition(&self, index: PartitionIndex) -> &Partition {
        &self.partitions[index]
    }

    #[inline]
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Returns the partition index of every node, indexed by node id.
    pub fn assignment(&self) -> Vec<PartitionIndex> {
        let mut assignment = vec![0; self.nodes.len()];
        for (partition_index, partition) in self.partitions.iter().enumerate() {
            for &node in &partition.nodes {
                assignment[node] = partition_index;
            }
        }
        assignment
    }

    /// Evaluates the objective of the current assignment. See [`compute_cost`].
    pub fn cost(&self) -> Result<PartitionCost, PartitionError> {
        compute_cost(self)
    }

    /// Moves `node` from partition `from` to partition `to`. Both steps are plain
    /// set operations, so removing an absent node or inserting a present one is
    /// a no-op. Callers must pass the partition that currently owns `node`.
    pub(crate) fn move_node(
        &mut self,
        node: NodeIndex,
        from: PartitionIndex,
        to: PartitionIndex,
    ) {
        debug_assert!(node < self.nodes.len(), "unknown node {node}");
        self.partitions[from].nodes.remove(&node);
        self.partitions[to].nodes.insert(node);
        debug_assert!(
            self.partitions[to].nodes.contains(&node)
                && self
                    .partitions
                    .iter()
                    .enumerate()
                    .all(|(index, partition)| index == to || !partition.nodes.contains(&node)),
            "node {node} must be owned by exactly one partition"
        );
    }

    /// Moves `node` to partition `to`, wherever it currently lives, and returns
    /// the partition it was taken from. Fixed partitions are not protected here;
    /// only the optimizer respects them.
    pub fn reassign(
        &mut self,
        node: NodeIndex,
        to: PartitionIndex,
    ) -> Result<PartitionIndex, PartitionError> {
        if to >= self.partitions.len() {
            return Err(PartitionError::UnknownPartition {
                node,
                partition: to,
                num_partitions: self.partitions.len(),
            });
        }
        let Some(from) = self
            .partitions
            .iter()
            .position(|partition| partition.nodes.contains(&node))
        else {
            return Err(PartitionError::NodeOutOfRange {
                node,
                num_nodes: self.nodes.len(),
            });
        };
        self.move_node(node, from, to);
        Ok(from)
    }

    /// Picks a uniformly random non-fixed partition other than `group`.
    ///
    /// # Panics
    /// Panics if there is no other non-fixed partition to pick.
    pub fn pick_other_group<R>(&self, group: PartitionIndex, rng: &mut R) -> PartitionIndex
    where
        R: ?Sized + Rng,
    {
        let candidates = self
            .partitions
            .iter()
            .enumerate()
            .filter(|(index, partition)| *index != group && !partition.fixed)
            .map(|(index, _)| index)
            .collect_vec();
        assert!(
            !candidates.is_empty(),
            "at least two non-fixed partitions are required to pick a move target"
        );
        candidates[rng.gen_range(0..candidates.len())]
    }

    /// Indices of all partitions the optimizer may move nodes between.
    pub(crate) fn movable_partitions(&self) -> impl Iterator<Item = PartitionIndex> + '_ {
        self.partitions
            .iter()
            .enumerate()
            .filter(|(_, partition)| !partition.fixed)
            .map(|(index, _)| index)
    }

    /// Orders partitions by their smallest node id (empty partitions count as
    /// 0), making results independent of how groups were labeled.
    pub fn normalize(&mut self) {
        self.partitions.sort_by_key(Partition::min_node);
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use rustc_hash::FxHashSet;

    use super::*;
    use crate::graph::chain;

    fn setup_simple() -> Partitioning {
        let (nodes, edge_costs) = chain(4, 10, 1);
        Partitioning::new(
            nodes,
            edge_costs,
            vec![
                Partition::new([2, 3]),
                Partition::default().with_external_inputs([7]).fixed(),
                Partition::new([0, 1]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_unknown_node() {
        let (nodes, edge_costs) = chain(2, 1, 1);
        let err = Partitioning::new(nodes, edge_costs, vec![Partition::new([0, 1, 5])]);
        assert_eq!(
            err,
            Err(PartitionError::UnknownNode {
                node: 5,
                partition: 0,
                num_nodes: 2
            })
        );
    }

    #[test]
    fn test_new_rejects_duplicate_node() {
        let (nodes, edge_costs) = chain(2, 1, 1);
        let err = Partitioning::new(
            nodes,
            edge_costs,
            vec![Partition::new([0, 1]), Partition::new([1])],
        );
        assert_eq!(
            err,
            Err(PartitionError::DuplicateNode {
                node: 1,
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn test_new_rejects_unassigned_node() {
        let (nodes, edge_costs) = chain(3, 1, 1);
        let err = Partitioning::new(
            nodes,
            edge_costs,
            vec![Partition::new([0]), Partition::new([2])],
        );
        assert_eq!(err, Err(PartitionError::UnassignedNode { node: 1 }));
    }

    #[test]
    fn test_with_partition_count() {
        let (nodes, edge_costs) = chain(7, 1, 1);
        let p = Partitioning::with_partition_count(
            nodes,
            edge_costs,
            3,
            InitialAssignment::Contiguous,
        )
        .unwrap();
        assert_eq!(p.num_partitions(), 3);
        assert_eq!(p.assignment(), vec![0, 0, 1, 1, 2, 2, 2]);
        assert!(p.partitions().iter().all(|partition| !partition.is_fixed()));
    }

    #[test]
    fn test_with_zero_partitions() {
        let (nodes, edge_costs) = chain(3, 1, 1);
        let err = Partitioning::with_partition_count(
            nodes,
            edge_costs,
            0,
            InitialAssignment::default(),
        );
        assert_eq!(err, Err(PartitionError::InvalidPartitionCount));
    }

    #[test]
    fn test_from_assignment() {
        let (nodes, edge_costs) = chain(4, 1, 1);
        let assignment = [1, 0, 1, 2];
        let p = Partitioning::from_assignment(nodes, edge_costs, &assignment, 4).unwrap();
        assert_eq!(p.assignment(), assignment);
        assert_eq!(p.partition(0).nodes(), &BTreeSet::from([1]));
        assert_eq!(p.partition(1).nodes(), &BTreeSet::from([0, 2]));
        assert!(p.partition(3).is_empty());
    }

    #[test]
    fn test_move_node() {
        let mut p = setup_simple();
        p.move_node(2, 0, 2);
        assert_eq!(p.partition(0).nodes(), &BTreeSet::from([3]));
        assert_eq!(p.partition(2).nodes(), &BTreeSet::from([0, 1, 2]));

        // Repeating the move changes nothing
        p.move_node(2, 0, 2);
        assert_eq!(p.partition(0).nodes(), &BTreeSet::from([3]));
        assert_eq!(p.partition(2).nodes(), &BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn test_reassign_keeps_single_owner() {
        let (nodes, edge_costs) = chain(3, 1, 1);
        let mut p = Partitioning::with_partition_count(
            nodes,
            edge_costs,
            3,
            InitialAssignment::Contiguous,
        )
        .unwrap();
        assert_eq!(p.reassign(2, 1), Ok(2));
        assert_eq!(p.assignment(), vec![0, 1, 1]);
        assert!(p.partition(2).is_empty());
        let owned: usize = p.partitions().iter().map(Partition::len).sum();
        assert_eq!(owned, 3);

        // Reassigning to the current owner changes nothing
        assert_eq!(p.reassign(2, 1), Ok(1));
        assert_eq!(p.assignment(), vec![0, 1, 1]);
        assert!(p.cost().is_ok());
    }

    #[test]
    fn test_reassign_rejects_unknown_ids() {
        let (nodes, edge_costs) = chain(3, 1, 1);
        let mut p = Partitioning::with_partition_count(
            nodes,
            edge_costs,
            3,
            InitialAssignment::Contiguous,
        )
        .unwrap();
        let before = p.clone();
        assert_eq!(
            p.reassign(7, 1),
            Err(PartitionError::NodeOutOfRange {
                node: 7,
                num_nodes: 3
            })
        );
        assert_eq!(
            p.reassign(0, 3),
            Err(PartitionError::UnknownPartition {
                node: 0,
                partition: 3,
                num_partitions: 3
            })
        );
        assert_eq!(p, before);
        assert!(p.cost().is_ok());
    }

    #[test]
    fn test_pick_other_group_skips_fixed() {
        let p = setup_simple();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(p.pick_other_group(0, &mut rng), 2);
            assert_eq!(p.pick_other_group(2, &mut rng), 0);
        }
    }

    #[test]
    fn test_pick_other_group_covers_all_candidates() {
        let (nodes, edge_costs) = chain(4, 1, 1);
        let p = Partitioning::with_partition_count(
            nodes,
            edge_costs,
            4,
            InitialAssignment::default(),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let picked: FxHashSet<_> = (0..200).map(|_| p.pick_other_group(1, &mut rng)).collect();
        assert_eq!(picked, FxHashSet::from_iter([0, 2, 3]));
    }

    #[test]
    #[should_panic(expected = "at least two non-fixed partitions")]
    fn test_pick_other_group_without_candidates() {
        let mut p = setup_simple();
        p.partitions[0].fixed = true;
        let mut rng = StdRng::seed_from_u64(1);
        p.pick_other_group(2, &mut rng);
    }

    #[test]
    fn test_normalize() {
        let mut p = setup_simple();
        p.normalize();
        // The empty fixed partition and [0, 1] both have key 0 and keep their
        // relative order
        assert!(p.partition(0).is_fixed());
        assert!(p.partition(0).is_empty());
        assert_eq!(p.partition(0).external_inputs(), &BTreeSet::from([7]));
        assert_eq!(p.partition(1).nodes(), &BTreeSet::from([0, 1]));
        assert_eq!(p.partition(2).nodes(), &BTreeSet::from([2, 3]));
        assert_eq!(p.assignment(), vec![1, 1, 2, 2]);

        let once = p.clone();
        p.normalize();
        assert_eq!(p, once);
    }

    #[test]
    fn test_min_node() {
        assert_eq!(Partition::new([5, 3, 9]).min_node(), 3);
        assert_eq!(Partition::default().min_node(), 0);
    }
}
