//! Command-line interface for music-catalog.
//!
//! One invocation runs the whole pipeline over a library root: scan, then
//! optional enrichment, export, and optional organization.

mod commands;

pub use commands::{Cli, run_command};
