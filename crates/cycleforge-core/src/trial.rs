//! # Trial
//!
//! One seeded, self-contained run: grow, perturb, derive scalar metrics.
//!
//! The trial owns its generator (`ChaCha8Rng` seeded from the trial seed).
//! Growth draws from it first; the robustness shuffle continues the same
//! stream. Equal seeds and configurations therefore give equal results.

use crate::config::{Thresholds, TrialConfig};
use crate::graph::Graph;
use crate::growth::{GrowthEngine, GrowthStats, StepReport};
use crate::invariant::GenusHistory;
use crate::positions::PositionStore;
use crate::primitives::GROWTH_WINDOW;
use crate::robustness::{RobustnessEvaluator, RobustnessReport};
use crate::CycleforgeError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

// =============================================================================
// METRICS
// =============================================================================

/// Scalar summary of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialMetrics {
    /// ΔG: mean log2 growth of the running-max genus across windows.
    pub growth_rate: f64,
    /// R: share of cycle rank surviving edge removal.
    pub robustness: f64,
    /// ρ: fusions per new tip.
    pub fusion_density: f64,
    /// ρ scaled down by the final cycle rank.
    pub leak: f64,
    /// Cycle rank after the last step.
    pub final_rank: u64,
}

impl TrialMetrics {
    /// True when all four scalars satisfy `thresholds` at once.
    #[must_use]
    pub fn passes(&self, thresholds: &Thresholds) -> bool {
        thresholds.growth_rate_ok(self.growth_rate)
            && thresholds.robustness_ok(self.robustness)
            && thresholds.fusion_density_ok(self.fusion_density)
            && thresholds.leak_ok(self.leak)
    }
}

/// Growth-rate exponent of a genus history.
///
/// Takes the running maximum of `value + 1` over the per-step entries,
/// samples it every [`GROWTH_WINDOW`] steps and averages the `log2` ratios
/// of consecutive samples. Returns `0.0` with fewer than two samples.
pub fn growth_rate(history: &GenusHistory) -> f64 {
    let mut running = 0u64;
    let envelope: Vec<f64> = history
        .per_step()
        .iter()
        .map(|&v| {
            running = running.max(v.saturating_add(1));
            running as f64
        })
        .collect();
    let samples: Vec<f64> = envelope.into_iter().step_by(GROWTH_WINDOW).collect();

    if samples.len() < 2 {
        return 0.0;
    }
    let total: f64 = samples.windows(2).map(|w| (w[1] / w[0]).log2()).sum();
    total / (samples.len() - 1) as f64
}

/// Fusions per tip created, with the tip count clamped to at least 1.
pub fn fusion_density(stats: &GrowthStats) -> f64 {
    stats.fusions as f64 / stats.new_tips.max(1) as f64
}

/// Fusion density divided by `max(1, final_rank)`.
pub fn leak_ratio(fusion_density: f64, final_rank: u64) -> f64 {
    fusion_density / final_rank.max(1) as f64
}

// =============================================================================
// TRIAL RESULT
// =============================================================================

/// Immutable record of a finished trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    seed: u64,
    steps_executed: usize,
    graph: Graph,
    positions: PositionStore,
    history: GenusHistory,
    stats: GrowthStats,
    robustness: RobustnessReport,
    metrics: TrialMetrics,
}

impl TrialResult {
    /// Seed the trial ran with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Growth steps executed.
    #[must_use]
    pub fn steps_executed(&self) -> usize {
        self.steps_executed
    }

    /// Final graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Final position map.
    #[must_use]
    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    /// Cycle rank per step, seed entry first.
    #[must_use]
    pub fn history(&self) -> &GenusHistory {
        &self.history
    }

    /// Growth totals.
    #[must_use]
    pub fn stats(&self) -> &GrowthStats {
        &self.stats
    }

    /// Robustness measurement on the final graph.
    #[must_use]
    pub fn robustness(&self) -> &RobustnessReport {
        &self.robustness
    }

    /// Derived scalar metrics.
    #[must_use]
    pub fn metrics(&self) -> &TrialMetrics {
        &self.metrics
    }
}

// =============================================================================
// RUNNING A TRIAL
// =============================================================================

/// Run one trial with the given seed and configuration.
pub fn run_trial(seed: u64, config: &TrialConfig) -> Result<TrialResult, CycleforgeError> {
    run_trial_observed(seed, config, |_| {})
}

/// Run one trial, handing every step report to `observer`.
pub fn run_trial_observed<F>(
    seed: u64,
    config: &TrialConfig,
    observer: F,
) -> Result<TrialResult, CycleforgeError>
where
    F: FnMut(&StepReport),
{
    config.validate()?;
    let evaluator = RobustnessEvaluator::new(config.drop_frac)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut engine = GrowthEngine::seed(config, &mut rng)?;
    engine.run(config.steps, &mut rng, observer)?;
    let steps_executed = engine.steps_executed();
    let (graph, positions, history, stats) = engine.into_parts();

    let robustness = evaluator.evaluate(&graph, &mut rng);
    let final_rank = history.latest();
    let rho = fusion_density(&stats);
    let metrics = TrialMetrics {
        growth_rate: growth_rate(&history),
        robustness: robustness.ratio,
        fusion_density: rho,
        leak: leak_ratio(rho, final_rank),
        final_rank,
    };

    Ok(TrialResult {
        seed,
        steps_executed,
        graph,
        positions,
        history,
        stats,
        robustness,
        metrics,
    })
}

// =============================================================================
// TESTS
// =============================================================================
