//! # Cycleforge CLI Module
//!
//! This module implements the CLI interface for Cycleforge.
//!
//! ## Available Commands
//!
//! - `trial` - Run one seeded trial
//! - `aggregate` - Run a batch of trials and reduce their metrics
//! - `config` - Print the effective configuration as TOML
//!
//! Configuration is resolved as compiled defaults, then `--config` file,
//! then per-parameter flags.

mod commands;

use clap::{Args, Parser, Subcommand};
use cycleforge_core::{CycleforgeError, SimulationConfig};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Cycleforge - Toroidal Growth Simulator
///
/// Grows branching graphs on a periodic hypercube, tracks their cycle rank
/// and measures how much of it survives random edge removal.
#[derive(Parser, Debug)]
#[command(name = "cycleforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Per-parameter overrides of the trial configuration
    #[command(flatten)]
    pub overrides: TrialOverrides,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags overriding individual `[trial]` settings.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct TrialOverrides {
    /// Growth steps per trial
    #[arg(long, global = true)]
    pub steps: Option<usize>,

    /// Initial terminals per trial
    #[arg(long, global = true)]
    pub seed_count: Option<usize>,

    /// Fusion radius (strict)
    #[arg(long, global = true)]
    pub fuse_radius: Option<f64>,

    /// Probability that a terminal sprouts a second tip
    #[arg(long, global = true)]
    pub branch_probability: Option<f64>,

    /// Dimension of the periodic space
    #[arg(long, global = true)]
    pub dimension: Option<usize>,

    /// Standard deviation of a tip's displacement
    #[arg(long, global = true)]
    pub extend_sigma: Option<f64>,

    /// Fraction of edges removed by the robustness check
    #[arg(long, global = true)]
    pub drop_frac: Option<f64>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one seeded trial
    Trial {
        /// Trial seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Show growth totals and the cycle basis
        #[arg(short, long)]
        detailed: bool,
    },

    /// Run a batch of trials and reduce their metrics
    Aggregate {
        /// Number of trials (overrides `[aggregate] num_trials`)
        #[arg(short = 'n', long)]
        trials: Option<usize>,

        /// Seed of trial 0 (overrides `[aggregate] base_seed`)
        #[arg(short = 's', long)]
        base_seed: Option<u64>,

        /// Run trials on all cores
        #[arg(short, long)]
        parallel: bool,
    },

    /// Print the effective configuration
    Config,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CycleforgeError> {
    let mut config = load_config(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);

    let output = OutputMode {
        json: cli.json_mode,
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Trial { seed, detailed }) => {
            config.validate()?;
            cmd_trial(&config, seed, detailed, output)
        }
        Some(Commands::Aggregate {
            trials,
            base_seed,
            parallel,
        }) => {
            apply_batch_overrides(&mut config, trials, base_seed, parallel);
            cmd_aggregate(&config, output)
        }
        Some(Commands::Config) => {
            config.validate()?;
            cmd_config(&config, output)
        }
        None => {
            // No subcommand - run the configured batch by default
            cmd_aggregate(&config, output)
        }
    }
}

/// Apply the `aggregate` subcommand's flags to the batch settings.
pub fn apply_batch_overrides(
    config: &mut SimulationConfig,
    trials: Option<usize>,
    base_seed: Option<u64>,
    parallel: bool,
) {
    if let Some(n) = trials {
        config.aggregate.num_trials = n;
    }
    if let Some(seed) = base_seed {
        config.aggregate.base_seed = seed;
    }
    if parallel {
        config.aggregate.parallel = true;
    }
}

impl TrialOverrides {
    /// Write every given flag into `config.trial`.
    pub fn apply(&self, config: &mut SimulationConfig) {
        let trial = &mut config.trial;
        if let Some(v) = self.steps {
            trial.steps = v;
        }
        if let Some(v) = self.seed_count {
            trial.seed_count = v;
        }
        if let Some(v) = self.fuse_radius {
            trial.fuse_radius = v;
        }
        if let Some(v) = self.branch_probability {
            trial.branch_probability = v;
        }
        if let Some(v) = self.dimension {
            trial.dimension = v;
        }
        if let Some(v) = self.extend_sigma {
            trial.extend_sigma = v;
        }
        if let Some(v) = self.drop_frac {
            trial.drop_frac = v;
        }
    }
}
