//! Music Catalog - scan a music library, fill missing tags from MusicBrainz,
//! export a catalog to CSV/SQLite, and organize files into Artist/Album
//! folders.

pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod export;
pub mod metadata;
pub mod metrics;
pub mod model;
pub mod organizer;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "music_catalog=debug" } else { "music_catalog=info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    cli::run_command(&args)
}
