//! Metrics and export stage.

use std::path::{Path, PathBuf};

use crate::export::{self, ExportError, ExportFormat};
use crate::metrics::{self, LibraryMetrics, human_size, round2};
use crate::model::Catalog;

/// Summarize the catalog, print the metrics and write the exports
pub async fn cmd_export(catalog: &Catalog, output_dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>, ExportError> {
    let metrics = metrics::summarize(catalog);
    print_metrics(&metrics);

    let written = export::export_all(catalog, &metrics, output_dir, format).await?;
    for path in &written {
        println!("Wrote {}", path.display());
    }
    Ok(written)
}

fn print_metrics(metrics: &LibraryMetrics) {
    println!();
    println!("Library metrics");
    println!("  Tracks:         {}", metrics.total_tracks);
    println!("  Total size:     {}", human_size(metrics.total_bytes));
    println!("  Unique artists: {}", metrics.unique_artists);
    println!("  Unique albums:  {}", metrics.unique_albums);
    for share in &metrics.formats {
        println!(
            "  {:<6} {:>12} {:>7.2}%",
            share.format,
            human_size(share.bytes),
            round2(share.percent)
        );
    }
    println!();
}
