//! # Configuration
//!
//! Parameters for a single trial, for a batch of trials, and the threshold
//! tuple trials are judged against.
//!
//! Every type deserializes with `#[serde(default)]`, so a partial document
//! only overrides the fields it names. `validate()` is the boundary check:
//! nothing is simulated with a configuration that fails it.

use crate::CycleforgeError;
use crate::primitives::{
    DEFAULT_BASE_SEED, DEFAULT_BRANCH_PROBABILITY, DEFAULT_DIMENSION, DEFAULT_DROP_FRAC,
    DEFAULT_EXTEND_SIGMA, DEFAULT_FUSE_RADIUS, DEFAULT_MAX_FUSION_DENSITY, DEFAULT_MAX_LEAK,
    DEFAULT_MIN_FUSION_DENSITY, DEFAULT_MIN_GROWTH_RATE, DEFAULT_MIN_ROBUSTNESS,
    DEFAULT_NUM_TRIALS, DEFAULT_SEED_COUNT, DEFAULT_STEPS,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

fn require_finite(field: &'static str, value: f64) -> Result<(), CycleforgeError> {
    if !value.is_finite() {
        return Err(CycleforgeError::invalid(field, format!("{value} is not finite")));
    }
    Ok(())
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), CycleforgeError> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(CycleforgeError::invalid(field, format!("{value} is negative")));
    }
    Ok(())
}

fn require_unit_interval(field: &'static str, value: f64) -> Result<(), CycleforgeError> {
    require_finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(CycleforgeError::invalid(
            field,
            format!("{value} is outside [0, 1]"),
        ));
    }
    Ok(())
}

// =============================================================================
// TRIAL CONFIG
// =============================================================================

/// Parameters of one growth-and-measurement trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Growth steps to execute.
    pub steps: usize,
    /// Initial terminals.
    pub seed_count: usize,
    /// Two tips fuse when strictly closer than this. Zero disables fusion.
    pub fuse_radius: f64,
    /// Chance that a terminal spawns a second tip.
    pub branch_probability: f64,
    /// Dimension of the periodic hypercube.
    pub dimension: usize,
    /// Per-axis standard deviation of a new tip's displacement, in `[0, 1]`.
    pub extend_sigma: f64,
    /// Fraction of edges removed by the robustness evaluator.
    pub drop_frac: f64,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            seed_count: DEFAULT_SEED_COUNT,
            fuse_radius: DEFAULT_FUSE_RADIUS,
            branch_probability: DEFAULT_BRANCH_PROBABILITY,
            dimension: DEFAULT_DIMENSION,
            extend_sigma: DEFAULT_EXTEND_SIGMA,
            drop_frac: DEFAULT_DROP_FRAC,
        }
    }
}

impl TrialConfig {
    /// Check every field against its permitted range.
    pub fn validate(&self) -> Result<(), CycleforgeError> {
        if self.seed_count == 0 {
            return Err(CycleforgeError::invalid("seed_count", "must be at least 1"));
        }
        if self.dimension == 0 {
            return Err(CycleforgeError::invalid("dimension", "must be at least 1"));
        }
        require_non_negative("fuse_radius", self.fuse_radius)?;
        require_unit_interval("branch_probability", self.branch_probability)?;
        require_unit_interval("extend_sigma", self.extend_sigma)?;
        require_unit_interval("drop_frac", self.drop_frac)?;
        Ok(())
    }
}

// =============================================================================
// AGGREGATE CONFIG
// =============================================================================

/// Parameters of a batch of independent trials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Number of trials.
    pub num_trials: usize,
    /// Trial `i` is seeded with `base_seed + i` (wrapping).
    pub base_seed: u64,
    /// Run trials on the rayon pool. The report is identical either way.
    pub parallel: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            num_trials: DEFAULT_NUM_TRIALS,
            base_seed: DEFAULT_BASE_SEED,
            parallel: false,
        }
    }
}

impl AggregateConfig {
    /// Check every field against its permitted range.
    pub fn validate(&self) -> Result<(), CycleforgeError> {
        if self.num_trials == 0 {
            return Err(CycleforgeError::invalid("num_trials", "must be at least 1"));
        }
        Ok(())
    }

    /// Seed of trial `index`.
    #[must_use]
    pub fn trial_seed(&self, index: usize) -> u64 {
        self.base_seed.wrapping_add(index as u64)
    }
}

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Pass criteria for a trial. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// ΔG must exceed this.
    pub min_growth_rate: f64,
    /// R must exceed this.
    pub min_robustness: f64,
    /// ρ must exceed this.
    pub min_fusion_density: f64,
    /// ρ must stay below this.
    pub max_fusion_density: f64,
    /// Leak must stay below this.
    pub max_leak: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_growth_rate: DEFAULT_MIN_GROWTH_RATE,
            min_robustness: DEFAULT_MIN_ROBUSTNESS,
            min_fusion_density: DEFAULT_MIN_FUSION_DENSITY,
            max_fusion_density: DEFAULT_MAX_FUSION_DENSITY,
            max_leak: DEFAULT_MAX_LEAK,
        }
    }
}

impl Thresholds {
    /// Check that every bound is finite and the density band is non-empty.
    pub fn validate(&self) -> Result<(), CycleforgeError> {
        require_finite("min_growth_rate", self.min_growth_rate)?;
        require_finite("min_robustness", self.min_robustness)?;
        require_finite("min_fusion_density", self.min_fusion_density)?;
        require_finite("max_fusion_density", self.max_fusion_density)?;
        require_finite("max_leak", self.max_leak)?;
        if self.min_fusion_density >= self.max_fusion_density {
            return Err(CycleforgeError::invalid(
                "min_fusion_density",
                format!(
                    "{} must be below max_fusion_density {}",
                    self.min_fusion_density, self.max_fusion_density
                ),
            ));
        }
        Ok(())
    }

    /// Growth-rate criterion.
    #[must_use]
    pub fn growth_rate_ok(&self, value: f64) -> bool {
        value > self.min_growth_rate
    }

    /// Robustness criterion.
    #[must_use]
    pub fn robustness_ok(&self, value: f64) -> bool {
        value > self.min_robustness
    }

    /// Fusion-density criterion.
    #[must_use]
    pub fn fusion_density_ok(&self, value: f64) -> bool {
        value > self.min_fusion_density && value < self.max_fusion_density
    }

    /// Leak criterion.
    #[must_use]
    pub fn leak_ok(&self, value: f64) -> bool {
        value < self.max_leak
    }
}

// =============================================================================
// SIMULATION CONFIG
// =============================================================================

/// Everything a batch run needs, as loaded from a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub trial: TrialConfig,
    pub aggregate: AggregateConfig,
    pub thresholds: Thresholds,
}

impl SimulationConfig {
    /// Validate all three sections.
    pub fn validate(&self) -> Result<(), CycleforgeError> {
        self.trial.validate()?;
        self.aggregate.validate()?;
        self.thresholds.validate()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), CycleforgeError>) -> Option<&'static str> {
        match result {
            Err(CycleforgeError::InvalidConfig { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_steps_allowed() {
        let config = TrialConfig {
            steps: 0,
            ..TrialConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_fuse_radius_allowed() {
        let config = TrialConfig {
            fuse_radius: 0.0,
            ..TrialConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_seed_count_rejected() {
        let config = TrialConfig {
            seed_count: 0,
            ..TrialConfig::default()
        };
        assert_eq!(field_of(config.validate()), Some("seed_count"));
    }

    #[test]
    fn zero_dimension_rejected() {
        let config = TrialConfig {
            dimension: 0,
            ..TrialConfig::default()
        };
        assert_eq!(field_of(config.validate()), Some("dimension"));
    }

    #[test]
    fn negative_fuse_radius_rejected() {
        let config = TrialConfig {
            fuse_radius: -0.1,
            ..TrialConfig::default()
        };
        assert_eq!(field_of(config.validate()), Some("fuse_radius"));
    }

    #[test]
    fn branch_probability_out_of_range_rejected() {
        for p in [-0.01, 1.01, f64::NAN] {
            let config = TrialConfig {
                branch_probability: p,
                ..TrialConfig::default()
            };
            assert_eq!(field_of(config.validate()), Some("branch_probability"));
        }
    }

    #[test]
    fn drop_frac_bounds_inclusive() {
        for f in [0.0, 1.0] {
            let config = TrialConfig {
                drop_frac: f,
                ..TrialConfig::default()
            };
            assert!(config.validate().is_ok());
        }
        let config = TrialConfig {
            drop_frac: 1.5,
            ..TrialConfig::default()
        };
        assert_eq!(field_of(config.validate()), Some("drop_frac"));
    }

    #[test]
    fn infinite_sigma_rejected() {
        let config = TrialConfig {
            extend_sigma: f64::INFINITY,
            ..TrialConfig::default()
        };
        assert_eq!(field_of(config.validate()), Some("extend_sigma"));
    }

    #[test]
    fn oversized_sigma_rejected() {
        for sigma in [1.5, 1e6, f64::MAX] {
            let config = TrialConfig {
                extend_sigma: sigma,
                ..TrialConfig::default()
            };
            assert_eq!(field_of(config.validate()), Some("extend_sigma"));
        }
        let config = TrialConfig {
            extend_sigma: 1.0,
            ..TrialConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_trials_rejected() {
        let config = AggregateConfig {
            num_trials: 0,
            ..AggregateConfig::default()
        };
        assert_eq!(field_of(config.validate()), Some("num_trials"));
    }

    #[test]
    fn trial_seeds_offset_from_base() {
        let config = AggregateConfig {
            base_seed: u64::MAX,
            ..AggregateConfig::default()
        };
        assert_eq!(config.trial_seed(0), u64::MAX);
        assert_eq!(config.trial_seed(1), 0);
    }

    #[test]
    fn empty_density_band_rejected() {
        let thresholds = Thresholds {
            min_fusion_density: 0.5,
            max_fusion_density: 0.5,
            ..Thresholds::default()
        };
        assert_eq!(field_of(thresholds.validate()), Some("min_fusion_density"));
    }

    #[test]
    fn threshold_comparisons_are_strict() {
        let t = Thresholds::default();
        assert!(!t.growth_rate_ok(t.min_growth_rate));
        assert!(t.growth_rate_ok(1.31));
        assert!(!t.robustness_ok(t.min_robustness));
        assert!(!t.fusion_density_ok(t.min_fusion_density));
        assert!(!t.fusion_density_ok(t.max_fusion_density));
        assert!(t.fusion_density_ok(0.42));
        assert!(!t.leak_ok(t.max_leak));
        assert!(t.leak_ok(0.0));
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let json = r#"{"trial":{"steps":12},"aggregate":{"parallel":true}}"#;
        let config: SimulationConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(config.trial.steps, 12);
        assert_eq!(config.trial.seed_count, DEFAULT_SEED_COUNT);
        assert!(config.aggregate.parallel);
        assert_eq!(config.aggregate.num_trials, DEFAULT_NUM_TRIALS);
        assert_eq!(config.thresholds, Thresholds::default());
    }
}
