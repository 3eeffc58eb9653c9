//! # Graph Engine
//!
//! The undirected graph grown by a trial.
//!
//! This module implements the `GraphStore` trait over an adjacency-set
//! `Graph`. All data structures use `BTreeMap`/`BTreeSet` so iteration order
//! (and therefore every result derived from it) is deterministic.

use crate::{CycleforgeError, NodeId};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// =============================================================================
// GRAPHSTORE TRAIT
// =============================================================================

/// The GraphStore trait defines the graph capabilities the engine relies on.
///
/// Edges are undirected and simple: no self-loops, no parallel edges.
pub trait GraphStore {
    /// Allocate a fresh node. Identifiers increase strictly and are never
    /// reused, even after edges are removed.
    fn add_node(&mut self) -> NodeId;

    /// Add the undirected edge `{a, b}`.
    ///
    /// Returns `Ok(false)` if the edge already exists (no-op),
    /// `SelfLoop` when `a == b`, and `NodeNotFound` for unknown endpoints.
    fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<bool, CycleforgeError>;

    /// Remove the undirected edge `{a, b}`. Returns whether it existed.
    fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool;

    /// Check if the undirected edge `{a, b}` exists.
    fn has_edge(&self, a: NodeId, b: NodeId) -> bool;

    /// Check if a node exists in the graph.
    fn contains_node(&self, id: NodeId) -> bool;

    /// Get the total number of nodes.
    fn node_count(&self) -> usize;

    /// Get the total number of edges.
    fn edge_count(&self) -> usize;

    /// Number of connected components, isolated nodes included.
    fn connected_component_count(&self) -> usize;

    /// All edges as `(low, high)` pairs in ascending order.
    fn edge_list(&self) -> Vec<(NodeId, NodeId)>;

    /// A fundamental cycle basis: one cycle per edge outside a BFS
    /// spanning forest, each given as its node sequence.
    fn cycle_basis(&self) -> Vec<Vec<NodeId>>;
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// In-memory undirected graph.
///
/// Uses `BTreeMap` exclusively for deterministic ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    /// Adjacency sets, one entry per node (possibly empty).
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,

    /// Number of undirected edges.
    edge_count: usize,

    /// Next available NodeId
    next_node_id: u64,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all node identifiers in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Get the neighbors of a node in ascending order.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|targets| targets.iter().copied())
    }

    /// Number of edges incident to a node.
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map_or(0, BTreeSet::len)
    }

    /// Get the next node ID that would be assigned.
    #[must_use]
    pub fn next_node_id(&self) -> u64 {
        self.next_node_id
    }

    /// BFS spanning forest in ascending root order.
    ///
    /// Returns `(parent, depth)` for every node; roots have no parent.
    fn spanning_forest(&self) -> BTreeMap<NodeId, (Option<NodeId>, usize)> {
        let mut tree: BTreeMap<NodeId, (Option<NodeId>, usize)> = BTreeMap::new();
        let mut queue = VecDeque::new();

        for root in self.nodes() {
            if tree.contains_key(&root) {
                continue;
            }
            tree.insert(root, (None, 0));
            queue.push_back((root, 0usize));

            while let Some((current, depth)) = queue.pop_front() {
                for neighbor in self.neighbors(current) {
                    if !tree.contains_key(&neighbor) {
                        tree.insert(neighbor, (Some(current), depth.saturating_add(1)));
                        queue.push_back((neighbor, depth.saturating_add(1)));
                    }
                }
            }
        }

        tree
    }
}

impl GraphStore for Graph {
    fn add_node(&mut self) -> NodeId {
        let node_id = NodeId(self.next_node_id);
        self.next_node_id = self.next_node_id.saturating_add(1);
        self.adjacency.insert(node_id, BTreeSet::new());
        node_id
    }

    fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<bool, CycleforgeError> {
        if a == b {
            return Err(CycleforgeError::SelfLoop(a));
        }
        for node in [a, b] {
            if !self.adjacency.contains_key(&node) {
                return Err(CycleforgeError::NodeNotFound(node));
            }
        }

        let inserted = self
            .adjacency
            .get_mut(&a)
            .is_some_and(|targets| targets.insert(b));
        if !inserted {
            return Ok(false);
        }
        if let Some(targets) = self.adjacency.get_mut(&b) {
            targets.insert(a);
        }
        self.edge_count = self.edge_count.saturating_add(1);
        Ok(true)
    }

    fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        let removed = self
            .adjacency
            .get_mut(&a)
            .is_some_and(|targets| targets.remove(&b));
        if removed {
            if let Some(targets) = self.adjacency.get_mut(&b) {
                targets.remove(&a);
            }
            self.edge_count = self.edge_count.saturating_sub(1);
        }
        removed
    }

    fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get(&a)
            .is_some_and(|targets| targets.contains(&b))
    }

    fn contains_node(&self, id: NodeId) -> bool {
        self.adjacency.contains_key(&id)
    }

    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn connected_component_count(&self) -> usize {
        self.spanning_forest()
            .values()
            .filter(|(parent, _)| parent.is_none())
            .count()
    }

    fn edge_list(&self) -> Vec<(NodeId, NodeId)> {
        self.adjacency
            .iter()
            .flat_map(|(from, targets)| {
                targets
                    .range((std::ops::Bound::Excluded(*from), std::ops::Bound::Unbounded))
                    .map(move |to| (*from, *to))
            })
            .collect()
    }

    fn cycle_basis(&self) -> Vec<Vec<NodeId>> {
        let tree = self.spanning_forest();
        let is_tree_edge = |a: NodeId, b: NodeId| {
            tree.get(&a).is_some_and(|(p, _)| *p == Some(b))
                || tree.get(&b).is_some_and(|(p, _)| *p == Some(a))
        };

        let mut basis = Vec::new();
        for (a, b) in self.edge_list() {
            if is_tree_edge(a, b) {
                continue;
            }

            // Climb both endpoints to their lowest common ancestor.
            let mut left = vec![a];
            let mut right = vec![b];
            let (mut u, mut v) = (a, b);
            let depth = |n: NodeId| tree.get(&n).map_or(0, |(_, d)| *d);
            let parent = |n: NodeId| tree.get(&n).and_then(|(p, _)| *p);

            while u != v {
                if depth(u) >= depth(v) {
                    match parent(u) {
                        Some(p) => u = p,
                        None => break,
                    }
                    left.push(u);
                } else {
                    match parent(v) {
                        Some(p) => v = p,
                        None => break,
                    }
                    right.push(v);
                }
            }

            // Both paths end at the common ancestor; keep it once.
            right.pop();
            right.reverse();
            left.extend(right);
            basis.push(left);
        }

        basis
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_nodes(n: usize) -> (Graph, Vec<NodeId>) {
        let mut graph = Graph::new();
        let ids = (0..n).map(|_| graph.add_node()).collect();
        (graph, ids)
    }

    #[test]
    fn node_ids_strictly_increase() {
        let (graph, ids) = graph_with_nodes(4);
        assert_eq!(ids, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(graph.next_node_id(), 4);
    }

    #[test]
    fn edges_are_undirected() {
        let (mut graph, ids) = graph_with_nodes(2);
        assert!(graph.add_edge(ids[1], ids[0]).expect("edge"));
        assert!(graph.has_edge(ids[0], ids[1]));
        assert!(graph.has_edge(ids[1], ids[0]));
        assert_eq!(graph.edge_list(), vec![(ids[0], ids[1])]);
    }

    #[test]
    fn duplicate_edge_is_noop() {
        let (mut graph, ids) = graph_with_nodes(2);
        assert!(graph.add_edge(ids[0], ids[1]).expect("edge"));
        assert!(!graph.add_edge(ids[1], ids[0]).expect("edge"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn self_loop_rejected() {
        let (mut graph, ids) = graph_with_nodes(1);
        assert!(matches!(
            graph.add_edge(ids[0], ids[0]),
            Err(CycleforgeError::SelfLoop(_))
        ));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn dangling_endpoint_rejected() {
        let (mut graph, ids) = graph_with_nodes(1);
        assert!(matches!(
            graph.add_edge(ids[0], NodeId(99)),
            Err(CycleforgeError::NodeNotFound(NodeId(99)))
        ));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.degree(ids[0]), 0);
    }

    #[test]
    fn remove_edge_updates_both_sides() {
        let (mut graph, ids) = graph_with_nodes(3);
        graph.add_edge(ids[0], ids[1]).expect("edge");
        graph.add_edge(ids[1], ids[2]).expect("edge");

        assert!(graph.remove_edge(ids[1], ids[0]));
        assert!(!graph.remove_edge(ids[1], ids[0]));
        assert!(!graph.has_edge(ids[0], ids[1]));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree(ids[1]), 1);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn components_count_isolated_nodes() {
        let (mut graph, ids) = graph_with_nodes(5);
        assert_eq!(graph.connected_component_count(), 5);

        graph.add_edge(ids[0], ids[1]).expect("edge");
        graph.add_edge(ids[2], ids[3]).expect("edge");
        assert_eq!(graph.connected_component_count(), 3);

        graph.add_edge(ids[1], ids[2]).expect("edge");
        assert_eq!(graph.connected_component_count(), 2);
    }

    #[test]
    fn empty_graph_has_no_components() {
        let graph = Graph::new();
        assert_eq!(graph.connected_component_count(), 0);
        assert!(graph.cycle_basis().is_empty());
    }

    #[test]
    fn tree_has_empty_cycle_basis() {
        let (mut graph, ids) = graph_with_nodes(4);
        graph.add_edge(ids[0], ids[1]).expect("edge");
        graph.add_edge(ids[0], ids[2]).expect("edge");
        graph.add_edge(ids[2], ids[3]).expect("edge");
        assert!(graph.cycle_basis().is_empty());
    }

    #[test]
    fn square_yields_one_four_cycle() {
        let (mut graph, ids) = graph_with_nodes(4);
        graph.add_edge(ids[0], ids[1]).expect("edge");
        graph.add_edge(ids[1], ids[2]).expect("edge");
        graph.add_edge(ids[2], ids[3]).expect("edge");
        graph.add_edge(ids[3], ids[0]).expect("edge");

        let basis = graph.cycle_basis();
        assert_eq!(basis.len(), 1);
        let cycle: BTreeSet<_> = basis[0].iter().copied().collect();
        assert_eq!(cycle.len(), 4);
        assert_eq!(basis[0].len(), 4);
    }

    #[test]
    fn cycle_basis_closes_over_existing_edges() {
        let (mut graph, ids) = graph_with_nodes(5);
        for (a, b) in [(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2), (0, 4)] {
            graph.add_edge(ids[a], ids[b]).expect("edge");
        }

        let basis = graph.cycle_basis();
        assert_eq!(basis.len(), 7 - 5 + 1);
        for cycle in &basis {
            assert!(cycle.len() >= 3);
            for pair in cycle.windows(2) {
                assert!(graph.has_edge(pair[0], pair[1]));
            }
            let first = cycle[0];
            let last = cycle[cycle.len() - 1];
            assert!(graph.has_edge(first, last));
        }
    }
}
