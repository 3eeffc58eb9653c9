//! Tests for argument parsing, configuration loading and command execution.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use clap::Parser;
use cycleforge::cli::{
    Cli, Commands, OutputMode, TrialOverrides, apply_batch_overrides, cmd_aggregate, cmd_config,
    cmd_trial, execute, load_config,
};
use cycleforge_core::{CycleforgeError, SimulationConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn small_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.trial.steps = 6;
    config.trial.seed_count = 5;
    config.aggregate.num_trials = 3;
    config
}

// =============================================================================
// CONFIG LOADING TESTS
// =============================================================================

#[test]
fn test_no_path_gives_defaults() {
    assert_eq!(load_config(None).unwrap(), SimulationConfig::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let file = config_file(
        r#"
[trial]
steps = 12
fuse_radius = 0.3

[aggregate]
num_trials = 7
"#,
    );
    let config = load_config(Some(file.path())).unwrap();
    let defaults = SimulationConfig::default();

    assert_eq!(config.trial.steps, 12);
    assert!((config.trial.fuse_radius - 0.3).abs() < 1e-12);
    assert_eq!(config.trial.seed_count, defaults.trial.seed_count);
    assert_eq!(config.aggregate.num_trials, 7);
    assert_eq!(config.aggregate.base_seed, defaults.aggregate.base_seed);
    assert_eq!(config.thresholds, defaults.thresholds);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(
        load_config(Some(&missing)),
        Err(CycleforgeError::IoError(_))
    ));
}

#[test]
fn test_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_config(Some(dir.path())),
        Err(CycleforgeError::IoError(_))
    ));
}

#[test]
fn test_malformed_file_is_serialization_error() {
    let file = config_file("[trial]\nsteps = \"many\"\n");
    assert!(matches!(
        load_config(Some(file.path())),
        Err(CycleforgeError::SerializationError(_))
    ));
}

#[test]
fn test_printed_config_loads_back() {
    let config = small_config();
    let text = toml::to_string(&config).unwrap();
    let file = config_file(&text);
    assert_eq!(load_config(Some(file.path())).unwrap(), config);
}

// =============================================================================
// ARGUMENT PARSING TESTS
// =============================================================================

#[test]
fn test_parse_trial_with_global_overrides() {
    let cli = Cli::try_parse_from([
        "cycleforge",
        "--steps",
        "5",
        "trial",
        "--seed",
        "7",
        "--drop-frac",
        "0.5",
        "--detailed",
    ])
    .unwrap();

    assert_eq!(cli.overrides.steps, Some(5));
    assert_eq!(cli.overrides.drop_frac, Some(0.5));
    assert!(matches!(
        cli.command,
        Some(Commands::Trial {
            seed: 7,
            detailed: true
        })
    ));
}

#[test]
fn test_parse_aggregate_flags() {
    let cli = Cli::try_parse_from([
        "cycleforge",
        "--json-mode",
        "aggregate",
        "-n",
        "10",
        "--base-seed",
        "99",
        "--parallel",
    ])
    .unwrap();

    assert!(cli.json_mode);
    match cli.command {
        Some(Commands::Aggregate {
            trials,
            base_seed,
            parallel,
        }) => {
            assert_eq!(trials, Some(10));
            assert_eq!(base_seed, Some(99));
            assert!(parallel);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_rejects_non_numeric_override() {
    assert!(Cli::try_parse_from(["cycleforge", "--steps", "lots", "config"]).is_err());
}

// =============================================================================
// OVERRIDE TESTS
// =============================================================================

#[test]
fn test_flags_override_file_values() {
    let file = config_file("[trial]\nsteps = 12\nseed_count = 9\n");
    let mut config = load_config(Some(file.path())).unwrap();
    let overrides = TrialOverrides {
        steps: Some(3),
        dimension: Some(2),
        ..TrialOverrides::default()
    };
    overrides.apply(&mut config);

    assert_eq!(config.trial.steps, 3);
    assert_eq!(config.trial.dimension, 2);
    assert_eq!(config.trial.seed_count, 9);
}

#[test]
fn test_batch_overrides() {
    let mut config = SimulationConfig::default();
    apply_batch_overrides(&mut config, Some(4), None, true);
    assert_eq!(config.aggregate.num_trials, 4);
    assert_eq!(
        config.aggregate.base_seed,
        SimulationConfig::default().aggregate.base_seed
    );
    assert!(config.aggregate.parallel);

    // --parallel absent leaves a configured true untouched
    apply_batch_overrides(&mut config, None, Some(1), false);
    assert!(config.aggregate.parallel);
    assert_eq!(config.aggregate.base_seed, 1);
}

// =============================================================================
// COMMAND TESTS
// =============================================================================

#[test]
fn test_cmd_trial_text_and_json() {
    let config = small_config();
    cmd_trial(&config, 42, true, OutputMode::default()).unwrap();
    cmd_trial(
        &config,
        42,
        true,
        OutputMode {
            json: true,
            verbose: true,
        },
    )
    .unwrap();
}

#[test]
fn test_cmd_aggregate_text_and_json() {
    let config = small_config();
    cmd_aggregate(
        &config,
        OutputMode {
            json: false,
            verbose: true,
        },
    )
    .unwrap();
    cmd_aggregate(
        &config,
        OutputMode {
            json: true,
            verbose: false,
        },
    )
    .unwrap();
}

#[test]
fn test_cmd_config_both_formats() {
    let config = SimulationConfig::default();
    cmd_config(&config, OutputMode::default()).unwrap();
    cmd_config(
        &config,
        OutputMode {
            json: true,
            verbose: false,
        },
    )
    .unwrap();
}

#[test]
fn test_execute_with_config_file() {
    let file = config_file("[trial]\nsteps = 4\nseed_count = 3\n\n[aggregate]\nnum_trials = 2\n");
    let path = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["cycleforge", "--quiet", "--config", path, "aggregate"]).unwrap();
    execute(cli).unwrap();
}

#[test]
fn test_execute_rejects_invalid_override() {
    let cli = Cli::try_parse_from(["cycleforge", "--drop-frac", "2.0", "trial"]).unwrap();
    assert!(matches!(
        execute(cli),
        Err(CycleforgeError::InvalidConfig {
            field: "drop_frac",
            ..
        })
    ));
}

#[test]
fn test_execute_rejects_zero_trials() {
    let cli = Cli::try_parse_from(["cycleforge", "--steps", "2", "aggregate", "-n", "0"]).unwrap();
    assert!(matches!(
        execute(cli),
        Err(CycleforgeError::InvalidConfig {
            field: "num_trials",
            ..
        })
    ));
}
