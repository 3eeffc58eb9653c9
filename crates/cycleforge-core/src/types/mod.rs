//! # Core Type Definitions
//!
//! This module contains the shared types of the Cycleforge growth engine:
//! - Node identifiers (`NodeId`)
//! - Points on the periodic hypercube (`Position`)
//! - Error types (`CycleforgeError`)
//!
//! ## Ordering Guarantees
//!
//! `NodeId` implements `Ord` so that graph storage in `BTreeMap`/`BTreeSet`
//! iterates in allocation order. Identifiers are allocated monotonically and
//! never reused within a trial.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Unique identifier for a node in a growing graph.
///
/// Allocated from a per-graph counter starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Get the raw identifier value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

// =============================================================================
// POSITION
// =============================================================================

/// A point in `[0,1)^d`.
///
/// Coordinates are only ever produced by `ToroidalSpace`, which wraps them
/// into the unit interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position(Vec<f64>);

impl Position {
    /// Wrap raw coordinates without range checks.
    ///
    /// Callers outside the crate go through `ToroidalSpace::wrap`.
    pub(crate) fn from_coords(coords: Vec<f64>) -> Self {
        Self(coords)
    }

    /// Number of coordinates.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Coordinates as a slice.
    #[must_use]
    pub fn coords(&self) -> &[f64] {
        &self.0
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Cycleforge engine.
///
/// - Configuration is rejected before a trial starts
/// - Once a trial starts it always completes; the graph variants only
///   surface misuse of the graph API
/// - Degenerate arithmetic (division by zero, negative rank) is clamped,
///   never raised
#[derive(Debug, Error)]
pub enum CycleforgeError {
    /// A configuration value is outside its permitted range.
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// The requested node was not found in the graph.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// An edge from a node to itself was requested.
    #[error("Self-loop rejected on {0}")]
    SelfLoop(NodeId),

    /// A position was assigned twice to the same node.
    #[error("Position already assigned for {0}")]
    PositionAlreadyAssigned(NodeId),

    /// A point does not have the dimension of the space it is used in.
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CycleforgeError {
    /// Build an `InvalidConfig` error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
