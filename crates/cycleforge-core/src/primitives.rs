//! # Innate Primitives
//!
//! Compiled-in constants for the Cycleforge CORE.
//!
//! The `DEFAULT_*` values seed the configuration layer and may be overridden
//! per run. The remaining constants are fixed logic and are not configurable.

// =============================================================================
// FIXED CONSTANTS
// =============================================================================

/// Value of the genus history before any growth step has run.
///
/// A forest of isolated seeds carries no cycles.
pub const INITIAL_GENUS: u64 = 0;

/// Window length, in steps, used when sampling the genus history for the
/// growth-rate exponent.
pub const GROWTH_WINDOW: usize = 8;

/// Fusions credited for a mutual triple (three edges, one junction).
pub const TRIANGLE_FUSIONS: u64 = 3;

// =============================================================================
// TRIAL DEFAULTS
// =============================================================================

/// Growth steps per trial.
pub const DEFAULT_STEPS: usize = 80;

/// Initial terminals placed uniformly at random.
pub const DEFAULT_SEED_COUNT: usize = 25;

/// Fusion threshold on toroidal distance.
pub const DEFAULT_FUSE_RADIUS: f64 = 0.22;

/// Probability that a terminal spawns a second tip in one step.
pub const DEFAULT_BRANCH_PROBABILITY: f64 = 0.45;

/// Dimension of the periodic hypercube.
pub const DEFAULT_DIMENSION: usize = 3;

/// Standard deviation of the per-axis Gaussian step of a new tip.
pub const DEFAULT_EXTEND_SIGMA: f64 = 0.07;

/// Fraction of edges removed by the robustness evaluator.
pub const DEFAULT_DROP_FRAC: f64 = 0.25;

// =============================================================================
// AGGREGATE DEFAULTS
// =============================================================================

/// Independent trials per aggregate run.
pub const DEFAULT_NUM_TRIALS: usize = 50;

/// Seed of trial 0; trial `i` uses `DEFAULT_BASE_SEED + i`.
pub const DEFAULT_BASE_SEED: u64 = 314_159_265;

// =============================================================================
// THRESHOLD DEFAULTS
// =============================================================================

/// Growth-rate exponent must exceed this value.
pub const DEFAULT_MIN_GROWTH_RATE: f64 = 1.3;

/// Robustness ratio must exceed this value.
pub const DEFAULT_MIN_ROBUSTNESS: f64 = 0.6;

/// Fusion density must lie strictly above this value.
pub const DEFAULT_MIN_FUSION_DENSITY: f64 = 0.38;

/// Fusion density must lie strictly below this value.
pub const DEFAULT_MAX_FUSION_DENSITY: f64 = 0.46;

/// Leak ratio must stay strictly below this value.
pub const DEFAULT_MAX_LEAK: f64 = 0.05;
