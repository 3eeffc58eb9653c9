//! # Position Store
//!
//! Maps each node to its point in the toroidal space.
//!
//! Positions are write-once: a node receives exactly one position for its
//! entire lifetime and the store only ever grows.

use crate::{CycleforgeError, NodeId, Position};
use std::collections::BTreeMap;

/// Write-once mapping from `NodeId` to `Position`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionStore {
    positions: BTreeMap<NodeId, Position>,
}

impl PositionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the position of a node.
    ///
    /// Returns `PositionAlreadyAssigned` if the node already has one.
    pub fn assign(&mut self, node: NodeId, position: Position) -> Result<(), CycleforgeError> {
        if self.positions.contains_key(&node) {
            return Err(CycleforgeError::PositionAlreadyAssigned(node));
        }
        self.positions.insert(node, position);
        Ok(())
    }

    /// Position of a node, if assigned.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&Position> {
        self.positions.get(&node)
    }

    /// Position of a node, or `NodeNotFound`.
    pub fn require(&self, node: NodeId) -> Result<&Position, CycleforgeError> {
        self.get(node).ok_or(CycleforgeError::NodeNotFound(node))
    }

    /// Number of assigned positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when no position has been assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All assignments in node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Position)> {
        self.positions.iter().map(|(id, p)| (*id, p))
    }
}
