//! Run summary and warning logs.

use std::path::{Path, PathBuf};

use crate::enrichment::EnrichmentSummary;
use crate::error::{Result, ResultExt};
use crate::organizer::OrganizeReport;
use crate::scanner::ScanResult;

/// Scan warnings (unreadable files, walk errors), one per line
pub const SCAN_WARNINGS_LOG: &str = "scan_warnings.log";
/// Organize warnings (collisions, failures, unmapped sidecar folders)
pub const ORGANIZE_WARNINGS_LOG: &str = "organize_warnings.log";

/// Per-category counts for one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub tracks_cataloged: usize,
    pub tag_read_failures: usize,
    pub walk_warnings: usize,
    pub enrichment: Option<EnrichmentSummary>,
    pub exports: Vec<PathBuf>,
    pub organize_ran: bool,
    pub organized: usize,
    pub previewed: usize,
    pub no_ops: usize,
    pub collisions: usize,
    pub organize_failures: usize,
    pub sidecars_carried: usize,
}

impl RunSummary {
    pub fn record_scan(&mut self, scan: &ScanResult) {
        self.files_scanned = scan.files_found;
        self.tracks_cataloged = scan.catalog.len();
        self.tag_read_failures = scan.tag_read_failures;
        self.walk_warnings = scan.walk_warnings;
    }

    pub fn record_organize(&mut self, report: &OrganizeReport) {
        self.organize_ran = true;
        // Sidecars are reported on their own line
        self.organized = report.performed() - report.sidecars_carried();
        self.previewed = report.planned();
        self.no_ops = report.no_ops();
        self.collisions = report.collisions();
        self.organize_failures = report.failures();
        self.sidecars_carried = report.sidecars_carried();
    }

    pub fn print(&self) {
        println!();
        println!("Summary");
        println!("  Files scanned:      {}", self.files_scanned);
        println!("  Tracks cataloged:   {}", self.tracks_cataloged);
        println!("  Tag read failures:  {}", self.tag_read_failures);
        println!("  Scan warnings:      {}", self.walk_warnings);

        if let Some(enrichment) = &self.enrichment {
            println!("  Enrichment checked: {}", enrichment.checked);
            println!("  Enriched:           {}", enrichment.updated);
            println!("  Unmatched:          {}", enrichment.unmatched);
            println!("  Lookup failures:    {}", enrichment.lookup_failures);
            println!("  Tags written:       {}", enrichment.tags_written);
            println!("  Tag write failures: {}", enrichment.tag_write_failures);
        }

        if self.organize_ran {
            println!("  Tracks organized:   {}", self.organized);
            if self.previewed > 0 {
                println!("  Previewed:          {}", self.previewed);
            }
            println!("  Already in place:   {}", self.no_ops);
            println!("  Collisions:         {}", self.collisions);
            println!("  Organize failures:  {}", self.organize_failures);
            println!("  Sidecars carried:   {}", self.sidecars_carried);
        }
    }
}

/// Write warning lines to `path`, one per line. Nothing is written when
/// there are no warnings.
pub fn write_warning_log(path: &Path, lines: &[String]) -> Result<()> {
    if lines.is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(format!("creating {}", parent.display()))?;
    }

    let mut contents = lines.join("\n");
    contents.push('\n');
    std::fs::write(path, contents).with_context(format!("writing warning log {}", path.display()))
}
