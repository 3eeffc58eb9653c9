//! # Metrics Aggregator
//!
//! Runs many independent trials and reduces their scalar metrics.
//!
//! Trial `i` is seeded with `base_seed + i`. Trials share no state, so they
//! can run sequentially or on the rayon pool; results are always collected
//! in trial-index order and the report does not depend on the mode.

use crate::config::{AggregateConfig, Thresholds, TrialConfig};
use crate::trial::{TrialMetrics, run_trial};
use crate::CycleforgeError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// SUMMARY STATISTICS
// =============================================================================

/// Mean and population standard deviation of one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std_dev: f64,
}

impl MetricSummary {
    /// Summarize a sample. An empty sample summarizes to zeros.
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// One trial's contribution to the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub index: usize,
    pub seed: u64,
    pub metrics: TrialMetrics,
    /// All four thresholds satisfied at once.
    pub passed: bool,
}

/// Per-metric verdict on the batch means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeanVerdict {
    pub growth_rate: bool,
    pub robustness: bool,
    pub fusion_density: bool,
    pub leak: bool,
}

/// Reduction of a batch of trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub trials: usize,
    pub base_seed: u64,
    pub growth_rate: MetricSummary,
    pub robustness: MetricSummary,
    pub fusion_density: MetricSummary,
    pub leak: MetricSummary,
    pub final_rank: MetricSummary,
    /// Trials passing every threshold simultaneously.
    pub pass_count: usize,
    /// `pass_count / trials`.
    pub pass_rate: f64,
    pub mean_verdict: MeanVerdict,
    pub outcomes: Vec<TrialOutcome>,
}

impl AggregateReport {
    /// Reduce trial outcomes, given in index order.
    #[must_use]
    pub fn from_outcomes(
        base_seed: u64,
        outcomes: Vec<TrialOutcome>,
        thresholds: &Thresholds,
    ) -> Self {
        let growth_rate = summarize(&outcomes, |m| m.growth_rate);
        let robustness = summarize(&outcomes, |m| m.robustness);
        let fusion_density = summarize(&outcomes, |m| m.fusion_density);
        let leak = summarize(&outcomes, |m| m.leak);
        let final_rank = summarize(&outcomes, |m| m.final_rank as f64);

        let trials = outcomes.len();
        let pass_count = outcomes.iter().filter(|o| o.passed).count();
        let pass_rate = pass_count as f64 / trials.max(1) as f64;

        Self {
            trials,
            base_seed,
            growth_rate,
            robustness,
            fusion_density,
            leak,
            final_rank,
            pass_count,
            pass_rate,
            mean_verdict: MeanVerdict {
                growth_rate: thresholds.growth_rate_ok(growth_rate.mean),
                robustness: thresholds.robustness_ok(robustness.mean),
                fusion_density: thresholds.fusion_density_ok(fusion_density.mean),
                leak: thresholds.leak_ok(leak.mean),
            },
            outcomes,
        }
    }
}

fn summarize(outcomes: &[TrialOutcome], metric: impl Fn(&TrialMetrics) -> f64) -> MetricSummary {
    let values: Vec<f64> = outcomes.iter().map(|o| metric(&o.metrics)).collect();
    MetricSummary::from_samples(&values)
}

// =============================================================================
// AGGREGATOR
// =============================================================================

/// Runs a validated batch of trials.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsAggregator {
    trial: TrialConfig,
    batch: AggregateConfig,
    thresholds: Thresholds,
}

impl MetricsAggregator {
    /// Validate all configuration up front.
    pub fn new(
        trial: TrialConfig,
        batch: AggregateConfig,
        thresholds: Thresholds,
    ) -> Result<Self, CycleforgeError> {
        trial.validate()?;
        batch.validate()?;
        thresholds.validate()?;
        Ok(Self {
            trial,
            batch,
            thresholds,
        })
    }

    /// Run every trial and reduce.
    pub fn run(&self) -> Result<AggregateReport, CycleforgeError> {
        self.run_observed(|_| {})
    }

    /// Run every trial, handing each outcome to `observer` as it completes.
    ///
    /// In parallel mode the observer may be called from several threads and
    /// out of index order.
    pub fn run_observed<F>(&self, observer: F) -> Result<AggregateReport, CycleforgeError>
    where
        F: Fn(&TrialOutcome) + Sync,
    {
        let run_one = |index: usize| -> Result<TrialOutcome, CycleforgeError> {
            let seed = self.batch.trial_seed(index);
            let metrics = *run_trial(seed, &self.trial)?.metrics();
            let outcome = TrialOutcome {
                index,
                seed,
                metrics,
                passed: metrics.passes(&self.thresholds),
            };
            observer(&outcome);
            Ok(outcome)
        };

        let outcomes = if self.batch.parallel {
            (0..self.batch.num_trials)
                .into_par_iter()
                .map(run_one)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            (0..self.batch.num_trials)
                .map(run_one)
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(AggregateReport::from_outcomes(
            self.batch.base_seed,
            outcomes,
            &self.thresholds,
        ))
    }
}

/// Run `num_trials` sequential trials starting at `base_seed`.
pub fn aggregate(
    num_trials: usize,
    base_seed: u64,
    trial_config: &TrialConfig,
    thresholds: &Thresholds,
) -> Result<AggregateReport, CycleforgeError> {
    let batch = AggregateConfig {
        num_trials,
        base_seed,
        parallel: false,
    };
    MetricsAggregator::new(trial_config.clone(), batch, *thresholds)?.run()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn small_trial() -> TrialConfig {
        TrialConfig {
            steps: 10,
            seed_count: 6,
            ..TrialConfig::default()
        }
    }

    #[test]
    fn summary_of_known_sample() {
        let s = MetricSummary::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn summary_of_single_value_has_zero_spread() {
        let s = MetricSummary::from_samples(&[0.7]);
        assert!((s.mean - 0.7).abs() < 1e-12);
        assert_eq!(s.std_dev, 0.0);
    }

    #[test]
    fn summary_of_empty_sample_is_zero() {
        assert_eq!(MetricSummary::from_samples(&[]), MetricSummary::default());
    }

    #[test]
    fn report_counts_passing_trials() {
        let thresholds = Thresholds::default();
        let pass = TrialMetrics {
            growth_rate: 1.5,
            robustness: 0.7,
            fusion_density: 0.42,
            leak: 0.01,
            final_rank: 40,
        };
        let fail = TrialMetrics {
            robustness: 0.1,
            ..pass
        };
        let outcomes = vec![
            TrialOutcome {
                index: 0,
                seed: 10,
                metrics: pass,
                passed: pass.passes(&thresholds),
            },
            TrialOutcome {
                index: 1,
                seed: 11,
                metrics: fail,
                passed: fail.passes(&thresholds),
            },
        ];
        let report = AggregateReport::from_outcomes(10, outcomes, &thresholds);
        assert_eq!(report.trials, 2);
        assert_eq!(report.pass_count, 1);
        assert!((report.pass_rate - 0.5).abs() < 1e-12);
        assert!((report.robustness.mean - 0.4).abs() < 1e-12);
        assert!(report.mean_verdict.growth_rate);
        assert!(!report.mean_verdict.robustness);
        assert!(report.mean_verdict.fusion_density);
        assert!(report.mean_verdict.leak);
    }

    #[test]
    fn invalid_batch_rejected() {
        let batch = AggregateConfig {
            num_trials: 0,
            ..AggregateConfig::default()
        };
        assert!(MetricsAggregator::new(small_trial(), batch, Thresholds::default()).is_err());
    }

    #[test]
    fn trials_use_consecutive_seeds() {
        let report = aggregate(4, 100, &small_trial(), &Thresholds::default()).expect("run");
        let seeds: Vec<u64> = report.outcomes.iter().map(|o| o.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102, 103]);
        let indices: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let sequential = AggregateConfig {
            num_trials: 6,
            base_seed: 7,
            parallel: false,
        };
        let parallel = AggregateConfig {
            parallel: true,
            ..sequential.clone()
        };
        let a = MetricsAggregator::new(small_trial(), sequential, Thresholds::default())
            .expect("new")
            .run()
            .expect("run");
        let b = MetricsAggregator::new(small_trial(), parallel, Thresholds::default())
            .expect("new")
            .run()
            .expect("run");
        assert_eq!(a, b);
    }

    #[test]
    fn observer_called_once_per_trial() {
        let seen = Mutex::new(Vec::new());
        let batch = AggregateConfig {
            num_trials: 5,
            base_seed: 1,
            parallel: true,
        };
        MetricsAggregator::new(small_trial(), batch, Thresholds::default())
            .expect("new")
            .run_observed(|o| {
                if let Ok(mut guard) = seen.lock() {
                    guard.push(o.index);
                }
            })
            .expect("run");
        let mut indices = seen.into_inner().unwrap_or_default();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }
}
