//! Library scanning stage.

use std::path::Path;

use crate::scanner::{self, ScanError, ScanResult};

/// Scan a library root into a catalog
pub fn cmd_scan(root: &Path) -> Result<ScanResult, ScanError> {
    println!("Scanning directory: {}", root.display());

    let result = scanner::scan_catalog(root)?;

    println!(
        "Scan complete. {} tracks cataloged ({} audio files found, {} unreadable).",
        result.catalog.len(),
        result.files_found,
        result.tag_read_failures
    );
    Ok(result)
}
