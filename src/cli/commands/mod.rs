//! CLI definition, settings resolution and pipeline dispatch.
//!
//! Each stage is implemented in its own submodule:
//! - `scan`: library walk and tag reading
//! - `enrich`: MusicBrainz lookups and tag write-back
//! - `export`: metrics and CSV/SQLite exports
//! - `organize`: file organization and sidecar-only moves
//! - `summary`: run summary and warning logs

mod enrich;
mod export;
mod organize;
mod scan;
mod summary;

use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

use crate::config::{self, Config};
use crate::enrichment::EnrichmentPolicy;
use crate::error::{Error, Result};
use crate::export::ExportFormat;
use crate::organizer::{Action, ExecuteOptions};

use summary::{ORGANIZE_WARNINGS_LOG, RunSummary, SCAN_WARNINGS_LOG, write_warning_log};

/// Catalog a music library: read tags, fill gaps from MusicBrainz, export
/// CSV/SQLite, and optionally organize files into Artist/Album folders.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("organize_mode").args(["organize", "organize_sidecars_only"])))]
pub struct Cli {
    /// Root directory of the music library
    pub root: PathBuf,

    /// Directory for exports and warning logs [default: ./output]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Export target
    #[arg(long, value_enum)]
    pub export: Option<ExportFormat>,

    /// Look up records missing artist or album on MusicBrainz
    #[arg(long)]
    pub enrich: bool,

    /// Look up every record and let accepted matches overwrite present tags
    #[arg(long, requires = "enrich")]
    pub enrich_all: bool,

    /// Minimum MusicBrainz match score (0-100) [default: 85]
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_score: Option<u8>,

    /// Contact URL or email sent to MusicBrainz in the User-Agent
    #[arg(long, env = "MUSIC_CATALOG_CONTACT")]
    pub contact: Option<String>,

    /// Seconds between MusicBrainz requests [default: 1.1]
    #[arg(long, allow_negative_numbers = true)]
    pub request_interval: Option<f64>,

    /// Write enriched fields back into the files' tags
    #[arg(long, requires = "enrich")]
    pub write_tags: bool,

    /// Organize tracks into <dest-root>/Artist/Album/
    #[arg(long)]
    pub organize: bool,

    /// Only move sidecar files (art, cue, nfo...) from "Artist - Album" folders
    #[arg(long, conflicts_with_all = ["enrich", "organize"])]
    pub organize_sidecars_only: bool,

    /// Destination root for organizing [default: the library root]
    #[arg(long, requires = "organize_mode")]
    pub dest_root: Option<PathBuf>,

    /// Actually move/copy files (default is a preview)
    #[arg(long, requires = "organize_mode")]
    pub apply: bool,

    /// Copy instead of move, leaving sources in place
    #[arg(long, requires = "organize_mode")]
    pub copy: bool,

    /// Rename colliding destinations to "name (N).ext" instead of skipping them
    #[arg(long, requires = "organize_mode")]
    pub resolve_collisions: bool,

    /// Config file to read [default: OS config dir/music-catalog/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Save the effective enrichment/export/organize settings to the config file
    #[arg(long)]
    pub save_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Organize step settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizeSettings {
    pub dest_root: PathBuf,
    pub options: ExecuteOptions,
    pub resolve_collisions: bool,
    pub sidecars_only: bool,
}

/// Effective settings: flags over config file over defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub output_dir: PathBuf,
    pub export: ExportFormat,
    /// Present when enrichment is enabled
    pub enrichment: Option<EnrichmentPolicy>,
    /// Present when an organize mode is enabled
    pub organize: Option<OrganizeSettings>,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        // Enrichment values are only checked when enrichment runs
        let enrichment = if cli.enrich {
            Some(Self::resolve_enrichment(cli, config)?)
        } else {
            None
        };

        let organize = (cli.organize || cli.organize_sidecars_only).then(|| OrganizeSettings {
            dest_root: cli
                .dest_root
                .clone()
                .or_else(|| config.organize.dest_root.clone())
                .unwrap_or_else(|| cli.root.clone()),
            options: ExecuteOptions {
                apply: cli.apply,
                action: if cli.copy { Action::Copy } else { Action::Move },
            },
            resolve_collisions: cli.resolve_collisions,
            sidecars_only: cli.organize_sidecars_only,
        });

        Ok(Self {
            root: cli.root.clone(),
            output_dir: cli
                .output_dir
                .clone()
                .unwrap_or_else(|| config.export.output_dir.clone()),
            export: cli.export.unwrap_or(config.export.format),
            enrichment,
            organize,
        })
    }

    fn resolve_enrichment(cli: &Cli, config: &Config) -> Result<EnrichmentPolicy> {
        let interval_seconds = cli
            .request_interval
            .unwrap_or(config.enrichment.request_interval_seconds);
        let request_interval = Duration::try_from_secs_f64(interval_seconds).map_err(|_| {
            Error::invalid_argument(format!(
                "request interval must be a non-negative number of seconds, got {interval_seconds}"
            ))
        })?;

        let min_score = cli.min_score.unwrap_or(config.enrichment.min_score);
        if min_score > 100 {
            return Err(Error::invalid_argument(format!("min score must be 0-100, got {min_score}")));
        }

        Ok(EnrichmentPolicy {
            enrich_all: cli.enrich_all,
            min_score,
            contact: cli
                .contact
                .clone()
                .unwrap_or_else(|| config.enrichment.contact.clone()),
            request_interval,
            write_tags: cli.write_tags,
        })
    }

    /// Config reflecting these settings, for `--save-config`.
    fn to_config(&self, base: &Config) -> Config {
        let mut config = base.clone();
        if let Some(policy) = &self.enrichment {
            config.enrichment.contact = policy.contact.clone();
            config.enrichment.min_score = policy.min_score;
            config.enrichment.request_interval_seconds = policy.request_interval.as_secs_f64();
        }
        config.export.format = self.export;
        config.export.output_dir = self.output_dir.clone();
        if let Some(organize) = &self.organize {
            config.organize.dest_root = Some(organize.dest_root.clone());
        }
        config
    }
}

/// Parse settings and run the pipeline.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = config::load(cli.config.as_deref());
    let settings = Settings::resolve(cli, &config)?;
    debug!(?settings, "Resolved settings");

    if cli.save_config {
        if let Err(e) = config::save(&settings.to_config(&config), cli.config.as_deref()) {
            tolerate(e.into())?;
        }
    }

    // Lookups and exports are awaited one at a time; no worker threads needed
    let rt = Builder::new_current_thread().enable_all().build()?;
    let summary = run(&rt, &settings)?;
    summary.print();
    Ok(())
}

/// Run every enabled stage in order.
fn run(rt: &Runtime, settings: &Settings) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    if let Some(organize) = settings.organize.as_ref().filter(|o| o.sidecars_only) {
        let (report, mut warnings) = organize::cmd_sidecars_only(&settings.root, organize)?;
        warnings.extend(report.warnings());
        summary.record_organize(&report);
        save_log(&settings.output_dir, ORGANIZE_WARNINGS_LOG, &warnings)?;
        return Ok(summary);
    }

    let mut scan = scan::cmd_scan(&settings.root)?;
    summary.record_scan(&scan);
    save_log(&settings.output_dir, SCAN_WARNINGS_LOG, &scan.warnings)?;

    if let Some(policy) = &settings.enrichment {
        match rt.block_on(enrich::cmd_enrich(&mut scan.catalog, policy)) {
            Ok(enriched) => summary.enrichment = Some(enriched),
            // Export and organize still run on the scanned tags
            Err(e) => tolerate(Error::from(e).context("enrichment skipped"))?,
        }
    }

    let written = rt.block_on(export::cmd_export(&scan.catalog, &settings.output_dir, settings.export))?;
    summary.exports = written;

    if let Some(organize) = &settings.organize {
        let report = organize::cmd_organize(&scan.catalog, organize);
        summary.record_organize(&report);
        save_log(&settings.output_dir, ORGANIZE_WARNINGS_LOG, &report.warnings())?;
    }

    Ok(summary)
}

/// Warning logs are a convenience; failing to write one never ends the run.
fn save_log(output_dir: &Path, name: &str, lines: &[String]) -> Result<()> {
    match write_warning_log(&output_dir.join(name), lines) {
        Ok(()) => Ok(()),
        Err(e) => tolerate(e),
    }
}

/// Pass fatal errors up; log the rest and carry on.
fn tolerate(error: Error) -> Result<()> {
    if error.is_fatal() {
        return Err(error);
    }
    warn!("{}", error);
    Ok(())
}
