//! # Cycleforge - Toroidal Growth Simulator
//!
//! The main binary for the Cycleforge growth engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │          apps/cycleforge (THE BINARY)         │
//! │                                               │
//! │   ┌─────────────┐        ┌────────────────┐   │
//! │   │    CLI      │        │  Config loader │   │
//! │   │   (clap)    │        │    (toml)      │   │
//! │   └──────┬──────┘        └───────┬────────┘   │
//! │          └───────────┬───────────┘            │
//! │                      ▼                        │
//! │             ┌─────────────────┐               │
//! │             │ cycleforge-core │               │
//! │             │  (THE LOGIC)    │               │
//! │             └─────────────────┘               │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # One trial with a fixed seed
//! cycleforge trial --seed 42 --detailed
//!
//! # A batch of 50 trials, on all cores
//! cycleforge --config sim.toml aggregate --trials 50 --parallel
//!
//! # Print the effective configuration
//! cycleforge --steps 120 config
//! ```

use clap::Parser;
use cycleforge::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // CYCLEFORGE_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("CYCLEFORGE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cycleforge=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Cycleforge startup banner.
fn print_banner() {
    println!(
        r#"
   ___           _       __
  / __|_  _ __ _| |___  / _|___ _ _ __ _ ___
 | (_| || / _| | / -_)|  _/ _ \ '_/ _` / -_)
  \___\_, \__|_|_\___||_| \___/_| \__, \___|
      |__/                        |___/

  Toroidal Growth Simulator v{}

  Seeded • Periodic • Cycle-Tracking
"#,
        env!("CARGO_PKG_VERSION")
    );
}
