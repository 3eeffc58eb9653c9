//! # cycleforge-core
//!
//! The toroidal growth engine for Cycleforge - THE LOGIC.
//!
//! A trial scatters seed tips over the periodic unit hypercube, lets them
//! branch, extend and fuse step by step, records the cycle rank (first Betti
//! number) of the growing graph after every step, and finally measures how
//! much of that rank survives random edge removal. Batches of independently
//! seeded trials are reduced to mean/standard-deviation summaries and a pass
//! rate against a threshold tuple.
//!
//! ## Layout
//!
//! - `space` / `positions`: geometry and node placement
//! - `graph`: the undirected graph and its capability trait
//! - `invariant`: cycle rank and genus history
//! - `growth`: the step state machine
//! - `robustness`: perturb-and-remeasure
//! - `trial` / `metrics`: one run, many runs
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: NO async, NO I/O, NO logging backend. Callers observe
//!   progress through step and trial observers.
//! - Every stochastic function takes its generator as an argument; a trial
//!   owns a `ChaCha8Rng` seeded from the trial seed.
//! - Configuration is validated before anything is simulated.

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod graph;
pub mod growth;
pub mod invariant;
pub mod metrics;
pub mod positions;
pub mod primitives;
pub mod robustness;
pub mod space;
pub mod trial;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CycleforgeError, NodeId, Position};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use config::{AggregateConfig, SimulationConfig, Thresholds, TrialConfig};
pub use graph::{Graph, GraphStore};
pub use growth::{FusionPlan, GrowthEngine, GrowthStats, StepReport, plan_fusion};
pub use invariant::{GenusHistory, cycle_rank};
pub use metrics::{
    AggregateReport, MeanVerdict, MetricSummary, MetricsAggregator, TrialOutcome, aggregate,
};
pub use positions::PositionStore;
pub use robustness::{RobustnessEvaluator, RobustnessReport};
pub use space::ToroidalSpace;
pub use trial::{
    TrialMetrics, TrialResult, fusion_density, growth_rate, leak_ratio, run_trial,
    run_trial_observed,
};
