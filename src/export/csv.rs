//! CSV writers for the catalog and metrics tables.

use std::path::Path;

use csv::WriterBuilder;

use super::{CatalogRow, FormatRow, MetricRow};

/// Write `tracks_catalog.csv`: header plus one row per track.
///
/// The header is written explicitly so an empty catalog still yields one.
pub fn write_tracks(path: &Path, rows: &[CatalogRow]) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(CatalogRow::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `library_metrics.csv`: the metric/value table followed by the
/// per-format table with its own header.
pub fn write_metrics(path: &Path, metrics: &[MetricRow], formats: &[FormatRow]) -> Result<(), csv::Error> {
    // Two tables of different widths share the file
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    writer.write_record(MetricRow::COLUMNS)?;
    for row in metrics {
        writer.serialize(row)?;
    }

    writer.write_record(FormatRow::COLUMNS)?;
    for row in formats {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}
