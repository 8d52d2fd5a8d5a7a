//! The immutable graph model: nodes with execution costs and the
//! communication cost of every edge.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::types::{Cost, EdgeIndex};

/// Communication cost per edge id. Edges missing from the map cost nothing.
pub type EdgeCosts = FxHashMap<EdgeIndex, Cost>;

/// A unit of work in the dataflow graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Edges consumed by this node.
    pub inputs: Vec<EdgeIndex>,
    /// Edges produced by this node.
    pub outputs: Vec<EdgeIndex>,
    /// Execution cost of this node.
    pub cost: Cost,
}

impl Node {
    pub fn new(inputs: Vec<EdgeIndex>, outputs: Vec<EdgeIndex>, cost: Cost) -> Self {
        Self {
            inputs,
            outputs,
            cost,
        }
    }
}

/// Looks up the cost of `edge`, defaulting to zero for unknown edges.
#[inline]
pub(crate) fn edge_cost(edge_costs: &EdgeCosts, edge: EdgeIndex) -> Cost {
    edge_costs.get(&edge).copied().unwrap_or_default()
}

/// Builds a linear chain `0 -> 1 -> ... -> n-1` where node `i` produces edge
/// `i + 1` and consumes edge `i`. Every node costs `node_cost` and every edge
/// costs `edge_cost`.
pub fn chain(n: usize, node_cost: Cost, edge_cost: Cost) -> (Vec<Node>, EdgeCosts) {
    let nodes = (0..n)
        .map(|i| {
            let inputs = if i == 0 { vec![] } else { vec![i] };
            let outputs = if i + 1 == n { vec![] } else { vec![i + 1] };
            Node::new(inputs, outputs, node_cost)
        })
        .collect();
    let edge_costs = (1..n).map(|edge| (edge, edge_cost)).collect();
    (nodes, edge_costs)
}
