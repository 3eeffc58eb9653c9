//! # Cycleforge
//!
//! Library half of the `cycleforge` binary: argument parsing, configuration
//! loading and command execution on top of `cycleforge-core`.

pub mod cli;
