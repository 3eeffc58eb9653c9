//! # Robustness Evaluator
//!
//! Perturb-and-remeasure: remove a random fraction of a graph's edges from a
//! copy and report how much of the cycle rank survives.
//!
//! The input graph is never mutated.

use crate::CycleforgeError;
use crate::graph::GraphStore;
use crate::invariant::cycle_rank;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Outcome of one perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobustnessReport {
    /// Cycle rank of the untouched graph.
    pub original_rank: u64,
    /// Cycle rank after edge removal.
    pub reduced_rank: u64,
    /// Edges removed from the copy.
    pub removed_edges: usize,
    /// `reduced_rank / max(1, original_rank)`. Never negative; callers must
    /// not rely on it being at most 1.
    pub ratio: f64,
}

/// Removes `floor(drop_frac * |E|)` random edges and remeasures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobustnessEvaluator {
    drop_frac: f64,
}

impl RobustnessEvaluator {
    /// Create an evaluator. `drop_frac` must lie in `[0, 1]`.
    pub fn new(drop_frac: f64) -> Result<Self, CycleforgeError> {
        if !drop_frac.is_finite() || !(0.0..=1.0).contains(&drop_frac) {
            return Err(CycleforgeError::invalid(
                "drop_frac",
                format!("{drop_frac} is outside [0, 1]"),
            ));
        }
        Ok(Self { drop_frac })
    }

    /// Fraction of edges removed per evaluation.
    #[must_use]
    pub fn drop_frac(&self) -> f64 {
        self.drop_frac
    }

    /// Number of edges removed from a graph with `edge_count` edges.
    #[must_use]
    pub fn removal_count(&self, edge_count: usize) -> usize {
        ((self.drop_frac * edge_count as f64).floor() as usize).min(edge_count)
    }

    /// Shuffle a copy's edge list under `rng`, drop the leading share and
    /// compare cycle ranks.
    pub fn evaluate<G, R>(&self, graph: &G, rng: &mut R) -> RobustnessReport
    where
        G: GraphStore + Clone,
        R: Rng + ?Sized,
    {
        let original_rank = cycle_rank(graph);

        let mut reduced = graph.clone();
        let mut edges = reduced.edge_list();
        edges.shuffle(rng);
        let removed_edges = self.removal_count(edges.len());
        for &(a, b) in edges.iter().take(removed_edges) {
            reduced.remove_edge(a, b);
        }

        let reduced_rank = cycle_rank(&reduced);
        RobustnessReport {
            original_rank,
            reduced_rank,
            removed_edges,
            ratio: reduced_rank as f64 / original_rank.max(1) as f64,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
