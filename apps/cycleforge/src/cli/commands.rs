//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use cycleforge_core::{
    AggregateReport, CycleforgeError, GraphStore, MetricSummary, MetricsAggregator,
    SimulationConfig, StepReport, Thresholds, TrialOutcome, run_trial_observed,
};
use std::path::{Path, PathBuf};

// =============================================================================
// CONFIGURATION FILES
// =============================================================================

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputMode {
    pub json: bool,
    pub verbose: bool,
}

/// Validate file path before reading.
///
/// Canonicalizes the path (resolving symlinks and `..`), then checks that it
/// names a regular file within the size limit.
fn validate_config_path(path: &Path) -> Result<PathBuf, CycleforgeError> {
    let canonical = path.canonicalize().map_err(|e| {
        CycleforgeError::IoError(format!("Invalid config path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CycleforgeError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| CycleforgeError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(CycleforgeError::SerializationError(format!(
            "Config size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }

    Ok(canonical)
}

/// Load a configuration file, or the compiled defaults when `path` is `None`.
///
/// Missing sections and keys fall back to their defaults. The result is not
/// validated; flag overrides are applied first.
pub fn load_config(path: Option<&Path>) -> Result<SimulationConfig, CycleforgeError> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };

    let canonical = validate_config_path(path)?;
    let content = std::fs::read_to_string(&canonical)
        .map_err(|e| CycleforgeError::IoError(format!("Cannot read config: {}", e)))?;
    let config: SimulationConfig = toml::from_str(&content).map_err(|e| {
        CycleforgeError::SerializationError(format!(
            "Invalid config '{}': {}",
            path.display(),
            e
        ))
    })?;

    tracing::info!("Loaded configuration from {}", canonical.display());
    Ok(config)
}

// =============================================================================
// TRIAL COMMAND
// =============================================================================

fn log_step(report: &StepReport) {
    tracing::debug!(
        step = report.step,
        new_tips = report.new_tips,
        pair_fusions = report.pair_fusions,
        triangle = report.triangle.is_some(),
        terminals = report.terminals,
        genus = report.genus,
        "step complete"
    );
}

/// Run one seeded trial and print its metrics.
pub fn cmd_trial(
    config: &SimulationConfig,
    seed: u64,
    detailed: bool,
    output: OutputMode,
) -> Result<(), CycleforgeError> {
    tracing::info!(seed, steps = config.trial.steps, "Running trial");
    let result = run_trial_observed(seed, &config.trial, log_step)?;
    let metrics = result.metrics();
    let thresholds = &config.thresholds;
    let graph = result.graph();
    tracing::info!(
        final_rank = metrics.final_rank,
        passed = metrics.passes(thresholds),
        "Trial finished"
    );

    if output.json {
        let mut value = serde_json::json!({
            "seed": result.seed(),
            "steps": result.steps_executed(),
            "node_count": graph.node_count(),
            "edge_count": graph.edge_count(),
            "components": graph.connected_component_count(),
            "metrics": metrics,
            "passed": metrics.passes(thresholds),
        });
        if detailed {
            value["stats"] = serde_json::json!(result.stats());
            value["robustness"] = serde_json::json!(result.robustness());
            value["cycle_basis_size"] = serde_json::json!(graph.cycle_basis().len());
        }
        if output.verbose {
            value["history"] = serde_json::json!(result.history());
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Cycleforge Trial");
    println!("================");
    println!("Seed:        {}", result.seed());
    println!("Steps:       {}", result.steps_executed());
    println!("Nodes:       {}", graph.node_count());
    println!("Edges:       {}", graph.edge_count());
    println!("Components:  {}", graph.connected_component_count());
    println!("Final rank:  {}", metrics.final_rank);
    println!();
    print_metric_line(
        "ΔG",
        metrics.growth_rate,
        thresholds.growth_rate_ok(metrics.growth_rate),
    );
    print_metric_line(
        "R",
        metrics.robustness,
        thresholds.robustness_ok(metrics.robustness),
    );
    print_metric_line(
        "ρ",
        metrics.fusion_density,
        thresholds.fusion_density_ok(metrics.fusion_density),
    );
    print_metric_line("leak", metrics.leak, thresholds.leak_ok(metrics.leak));
    println!();
    println!("Overall:     {}", verdict(metrics.passes(thresholds)));

    if detailed {
        let stats = result.stats();
        let robustness = result.robustness();
        let basis = graph.cycle_basis();
        let longest = basis.iter().map(Vec::len).max().unwrap_or(0);
        println!();
        println!("Growth Totals");
        println!("-------------");
        println!("New tips:      {}", stats.new_tips);
        println!("Fusions:       {}", stats.fusions);
        println!("Pair fusions:  {}", stats.pair_fusions);
        println!("Triangles:     {}", stats.triangles);
        println!();
        println!("Robustness");
        println!("----------");
        println!("Edges removed: {}", robustness.removed_edges);
        println!(
            "Rank:          {} -> {}",
            robustness.original_rank, robustness.reduced_rank
        );
        println!();
        println!("Cycle basis:   {} cycles, longest {}", basis.len(), longest);
    }

    if output.verbose {
        println!();
        println!("Genus history: {:?}", result.history().values());
    }

    Ok(())
}

// =============================================================================
// AGGREGATE COMMAND
// =============================================================================

fn log_outcome(outcome: &TrialOutcome) {
    tracing::debug!(
        trial = outcome.index,
        seed = outcome.seed,
        growth_rate = outcome.metrics.growth_rate,
        robustness = outcome.metrics.robustness,
        fusion_density = outcome.metrics.fusion_density,
        leak = outcome.metrics.leak,
        passed = outcome.passed,
        "trial complete"
    );
}

/// Run the configured batch and print the reduced report.
pub fn cmd_aggregate(config: &SimulationConfig, output: OutputMode) -> Result<(), CycleforgeError> {
    let aggregator = MetricsAggregator::new(
        config.trial.clone(),
        config.aggregate.clone(),
        config.thresholds,
    )?;

    tracing::info!(
        trials = config.aggregate.num_trials,
        base_seed = config.aggregate.base_seed,
        parallel = config.aggregate.parallel,
        "Running batch"
    );
    let report = aggregator.run_observed(log_outcome)?;
    tracing::info!(
        pass_count = report.pass_count,
        trials = report.trials,
        "Batch finished"
    );

    if output.json {
        let mut value = serde_json::json!({
            "trials": report.trials,
            "base_seed": report.base_seed,
            "growth_rate": report.growth_rate,
            "robustness": report.robustness,
            "fusion_density": report.fusion_density,
            "leak": report.leak,
            "final_rank": report.final_rank,
            "pass_count": report.pass_count,
            "pass_rate": report.pass_rate,
            "mean_verdict": report.mean_verdict,
        });
        if output.verbose {
            value["outcomes"] = serde_json::json!(report.outcomes);
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_default()
        );
        return Ok(());
    }

    print_report(&report, &config.thresholds, output.verbose);
    Ok(())
}

fn print_report(report: &AggregateReport, thresholds: &Thresholds, verbose: bool) {
    let verdicts = &report.mean_verdict;

    println!("Cycleforge Aggregate Report");
    println!("===========================");
    println!("Trials:      {}", report.trials);
    println!("Base seed:   {}", report.base_seed);
    println!();
    print_summary_line(
        "ΔG",
        &report.growth_rate,
        &format!("> {}", thresholds.min_growth_rate),
        verdicts.growth_rate,
    );
    print_summary_line(
        "R",
        &report.robustness,
        &format!("> {}", thresholds.min_robustness),
        verdicts.robustness,
    );
    print_summary_line(
        "ρ",
        &report.fusion_density,
        &format!(
            "in ({}, {})",
            thresholds.min_fusion_density, thresholds.max_fusion_density
        ),
        verdicts.fusion_density,
    );
    print_summary_line(
        "leak",
        &report.leak,
        &format!("< {}", thresholds.max_leak),
        verdicts.leak,
    );
    println!(
        "{:<6} {:>10.2} ± {:<10.2}",
        "rank", report.final_rank.mean, report.final_rank.std_dev
    );
    println!();
    println!(
        "All-four pass rate: {}/{} ({:.1}%)",
        report.pass_count,
        report.trials,
        report.pass_rate * 100.0
    );

    if verbose {
        println!();
        println!(
            "{:>5} {:>12} {:>8} {:>8} {:>8} {:>8} {:>6}",
            "trial", "seed", "ΔG", "R", "ρ", "leak", "pass"
        );
        for o in &report.outcomes {
            println!(
                "{:>5} {:>12} {:>8.3} {:>8.3} {:>8.3} {:>8.4} {:>6}",
                o.index,
                o.seed,
                o.metrics.growth_rate,
                o.metrics.robustness,
                o.metrics.fusion_density,
                o.metrics.leak,
                verdict(o.passed)
            );
        }
    }
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective configuration.
pub fn cmd_config(config: &SimulationConfig, output: OutputMode) -> Result<(), CycleforgeError> {
    if output.json {
        let text = serde_json::to_string_pretty(config)
            .map_err(|e| CycleforgeError::SerializationError(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    let text =
        toml::to_string(config).map_err(|e| CycleforgeError::SerializationError(e.to_string()))?;
    print!("{}", text);
    Ok(())
}

// =============================================================================
// FORMATTING HELPERS
// =============================================================================

fn verdict(ok: bool) -> &'static str {
    if ok { "PASS" } else { "FAIL" }
}

fn print_metric_line(label: &str, value: f64, ok: bool) {
    println!("{:<6} {:>10.4}  [{}]", label, value, verdict(ok));
}

fn print_summary_line(label: &str, summary: &MetricSummary, target: &str, ok: bool) {
    println!(
        "{:<6} {:>10.4} ± {:<10.4} {:<16} [{}]",
        label,
        summary.mean,
        summary.std_dev,
        target,
        verdict(ok)
    );
}
