//! Catalog exporters.
//!
//! Both writers consume the same flat row shapes, so a CSV export and a
//! SQLite export of one run always agree:
//! - [`CatalogRow`] - one per track
//! - [`MetricRow`] - one per library-wide metric
//! - [`FormatRow`] - one per observed format
//!
//! # Example
//!
//! ```ignore
//! let metrics = metrics::summarize(&catalog);
//! let written = export::export_all(&catalog, &metrics, Path::new("output"), ExportFormat::Both).await?;
//! ```

pub mod csv;
pub mod sqlite;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics::{LibraryMetrics, bytes_to_mb, round2};
use crate::model::{Catalog, TrackRecord};

/// Catalog CSV filename.
pub const TRACKS_CSV: &str = "tracks_catalog.csv";
/// Metrics CSV filename.
pub const METRICS_CSV: &str = "library_metrics.csv";
/// SQLite database filename.
pub const SQLITE_DB: &str = "music_catalog.db";

/// Which exporters to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Sqlite,
    #[default]
    Both,
}

impl ExportFormat {
    pub fn includes_csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    pub fn includes_sqlite(self) -> bool {
        matches!(self, Self::Sqlite | Self::Both)
    }
}

/// Errors writing exports. Fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV export to {} failed: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },

    #[error("SQLite export to {} failed: {source}", path.display())]
    Sqlite {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },
}

/// One exported track. Absent values stay `None` (empty cell / NULL).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRow {
    pub path: String,
    pub relative_path: String,
    pub format: String,
    pub size_bytes: u64,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub track: Option<u32>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub duration_seconds: Option<f64>,
    pub bitrate_kbps: Option<u32>,
    pub sample_rate_hz: Option<u32>,
    pub metadata_source: &'static str,
}

impl CatalogRow {
    pub const COLUMNS: [&'static str; 14] = [
        "path",
        "relative_path",
        "format",
        "size_bytes",
        "artist",
        "album",
        "title",
        "track",
        "year",
        "genre",
        "duration_seconds",
        "bitrate_kbps",
        "sample_rate_hz",
        "metadata_source",
    ];
}

impl From<&TrackRecord> for CatalogRow {
    fn from(track: &TrackRecord) -> Self {
        Self {
            path: track.path.display().to_string(),
            relative_path: track.relative_path.display().to_string(),
            format: track.format.clone(),
            size_bytes: track.size_bytes,
            artist: track.artist.clone(),
            album: track.album.clone(),
            title: track.title.clone(),
            track: track.track_number,
            year: track.year,
            genre: track.genre.clone(),
            duration_seconds: track.duration_seconds.map(round2),
            bitrate_kbps: track.bitrate_kbps,
            sample_rate_hz: track.sample_rate_hz,
            metadata_source: track.source.as_str(),
        }
    }
}

/// One library-wide metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    pub metric: &'static str,
    pub value: String,
}

impl MetricRow {
    pub const COLUMNS: [&'static str; 2] = ["metric", "value"];

    fn new(metric: &'static str, value: impl ToString) -> Self {
        Self {
            metric,
            value: value.to_string(),
        }
    }
}

/// Byte share of one format, rounded for output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatRow {
    pub format: String,
    pub size_bytes: u64,
    pub size_mb: f64,
    pub percent_of_library: f64,
}

impl FormatRow {
    pub const COLUMNS: [&'static str; 4] = ["format", "size_bytes", "size_mb", "percent_of_library"];
}

/// Metric rows, including the export timestamp.
pub fn metric_rows(metrics: &LibraryMetrics, exported_at: &str) -> Vec<MetricRow> {
    vec![
        MetricRow::new("total_tracks", metrics.total_tracks),
        MetricRow::new("total_size_bytes", metrics.total_bytes),
        MetricRow::new("total_size_mb", format!("{:.2}", metrics.total_mb())),
        MetricRow::new("unique_artists", metrics.unique_artists),
        MetricRow::new("unique_albums", metrics.unique_albums),
        MetricRow::new("exported_at", exported_at),
    ]
}

pub fn format_rows(metrics: &LibraryMetrics) -> Vec<FormatRow> {
    metrics
        .formats
        .iter()
        .map(|share| FormatRow {
            format: share.format.clone(),
            size_bytes: share.bytes,
            size_mb: round2(bytes_to_mb(share.bytes)),
            percent_of_library: round2(share.percent),
        })
        .collect()
}

/// Write the selected exports into `output_dir`, creating it if needed.
///
/// Returns the paths written, in the order they were produced.
pub async fn export_all(
    catalog: &Catalog,
    metrics: &LibraryMetrics,
    output_dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(output_dir).map_err(|source| ExportError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let rows: Vec<CatalogRow> = catalog.iter().map(CatalogRow::from).collect();
    let exported_at = chrono::Utc::now().to_rfc3339();
    let metric_rows = metric_rows(metrics, &exported_at);
    let format_rows = format_rows(metrics);

    let mut written = Vec::new();

    if format.includes_csv() {
        let tracks_path = output_dir.join(TRACKS_CSV);
        csv::write_tracks(&tracks_path, &rows).map_err(|source| ExportError::Csv {
            path: tracks_path.clone(),
            source,
        })?;
        written.push(tracks_path);

        let metrics_path = output_dir.join(METRICS_CSV);
        csv::write_metrics(&metrics_path, &metric_rows, &format_rows).map_err(|source| ExportError::Csv {
            path: metrics_path.clone(),
            source,
        })?;
        written.push(metrics_path);
    }

    if format.includes_sqlite() {
        let db_path = output_dir.join(SQLITE_DB);
        sqlite::write_database(&db_path, &rows, &metric_rows, &format_rows)
            .await
            .map_err(|source| ExportError::Sqlite {
                path: db_path.clone(),
                source,
            })?;
        written.push(db_path);
    }

    for path in &written {
        info!(target: "music_catalog::export", path = %path.display(), "Wrote export");
    }
    Ok(written)
}
