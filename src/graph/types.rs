//! Nodes and edges.

use std::hash::{Hash, Hasher};

/// Identifier of a graph node.
pub type NodeId = u64;

/// A directed, weighted outgoing edge.
///
/// Equality and hashing are by value; costs compare bitwise, which is
/// well defined because stores reject NaN costs.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// Non-negative traversal cost.
    pub cost: f64,
    /// Head of the edge.
    pub target: NodeId,
}

impl Edge {
    /// Creates an edge.
    pub fn new(cost: f64, target: NodeId) -> Self {
        Self { cost, target }
    }

    /// Whether the cost is usable by a label-setting search.
    pub fn has_valid_cost(&self) -> bool {
        self.cost.is_finite() && self.cost >= 0.0
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.cost.to_bits() == other.cost.to_bits()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cost.to_bits().hash(state);
        self.target.hash(state);
    }
}

/// A node and its outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Node identifier.
    pub id: NodeId,
    /// Outgoing edges in store order.
    pub edges: Vec<Edge>,
}

impl Node {
    /// Creates a node with the given edges.
    pub fn new(id: NodeId, edges: Vec<Edge>) -> Self {
        Self { id, edges }
    }

    /// Creates a node holding a single edge, as done while preloading.
    pub fn with_edge(id: NodeId, edge: Edge) -> Self {
        Self {
            id,
            edges: vec![edge],
        }
    }

    /// Elements this node occupies in a cache: itself plus its edges.
    pub fn element_count(&self) -> usize {
        1 + self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_edge_value_equality() {
        let a = Edge::new(1.5, 7);
        let b = Edge::new(1.5, 7);
        let c = Edge::new(1.5, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: FxHashSet<Edge> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_edge_cost_validity() {
        assert!(Edge::new(0.0, 1).has_valid_cost());
        assert!(!Edge::new(-0.5, 1).has_valid_cost());
        assert!(!Edge::new(f64::NAN, 1).has_valid_cost());
        assert!(!Edge::new(f64::INFINITY, 1).has_valid_cost());
    }

    #[test]
    fn test_element_count() {
        let node = Node::new(3, vec![Edge::new(1.0, 4), Edge::new(2.0, 5)]);
        assert_eq!(node.element_count(), 3);
        assert_eq!(Node::new(9, Vec::new()).element_count(), 1);
    }
}
