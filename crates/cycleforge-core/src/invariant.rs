//! # Invariant Estimator
//!
//! Cycle rank (first Betti number) of a graph viewed as a 1-dimensional
//! complex, and the per-step history of that value over a trial.
//!
//! `rank = max(0, |E| - |V| + C)` with `C` the number of connected
//! components. The value is exact for simple graphs; no correction terms
//! are applied on top of it.

use crate::graph::GraphStore;
use crate::primitives::INITIAL_GENUS;
use serde::{Deserialize, Serialize};

/// Cycle rank of a graph, clamped at zero.
pub fn cycle_rank<G: GraphStore + ?Sized>(graph: &G) -> u64 {
    let edges = graph.edge_count() as i128;
    let nodes = graph.node_count() as i128;
    let components = graph.connected_component_count() as i128;
    (edges - nodes + components).max(0) as u64
}

// =============================================================================
// GENUS HISTORY
// =============================================================================

/// Append-only record of the cycle rank, one entry per growth step.
///
/// Entry 0 is the value before the first step ([`INITIAL_GENUS`]); entry `k`
/// is the value after step `k`. The history never shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenusHistory {
    values: Vec<u64>,
}

impl Default for GenusHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl GenusHistory {
    /// A history holding only the seed entry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: vec![INITIAL_GENUS],
        }
    }

    /// Record the value after a completed step.
    pub fn record(&mut self, value: u64) {
        self.values.push(value);
    }

    /// Number of completed steps recorded.
    #[must_use]
    pub fn steps_recorded(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// All entries, seed entry first.
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Entries recorded by growth steps, seed entry excluded.
    #[must_use]
    pub fn per_step(&self) -> &[u64] {
        self.values.get(1..).unwrap_or(&[])
    }

    /// Entry at a given index (0 = before the first step).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u64> {
        self.values.get(index).copied()
    }

    /// Most recent entry.
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.values.last().copied().unwrap_or(INITIAL_GENUS)
    }

    /// Total number of entries, seed entry included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: the seed entry is present from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
