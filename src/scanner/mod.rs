//! Library scanner - walks a root directory and builds the catalog.
//!
//! The walk is synchronous and sorted by file name so repeated scans of the
//! same tree produce the same catalog order. Unreadable nested directories
//! and untaggable files are recorded as warnings; only a bad root is fatal.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::metadata;
use crate::model::{Catalog, TrackRecord};

/// Extensions (lowercase) treated as audio files.
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "wav", "m4a", "aac", "ogg", "opus", "wma", "aiff", "alac",
];

/// Fatal scan errors. Anything else is a warning.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan root does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("scan root is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("scan root is not readable: {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything one scan produced.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub catalog: Catalog,
    /// Audio files found, including those that failed to read
    pub files_found: usize,
    /// Files skipped because their metadata could not be read
    pub tag_read_failures: usize,
    /// Nested walk errors (permissions, vanished entries)
    pub walk_warnings: usize,
    /// Human-readable warning lines, in discovery order
    pub warnings: Vec<String>,
}

/// Returns true for files with an audio extension (case-insensitive),
/// excluding AppleDouble `._` companions.
pub fn is_audio_file(path: &Path) -> bool {
    if is_apple_double(path) {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// macOS resource-fork companions (`._name`) are never real media.
pub fn is_apple_double(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("._"))
}

/// Validate and canonicalize a scan root.
pub fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let unreadable = |source| ScanError::Unreadable {
        path: root.to_path_buf(),
        source,
    };
    std::fs::read_dir(root).map_err(unreadable)?;
    root.canonicalize().map_err(unreadable)
}

/// Walk `root` and read every audio file into a catalog.
pub fn scan_catalog(root: &Path) -> Result<ScanResult, ScanError> {
    let root = resolve_root(root)?;
    info!(target: "music_catalog::scanner", root = %root.display(), "Scanning library");

    let mut result = ScanResult::default();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let location = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                warn!(target: "music_catalog::scanner", path = %location, error = %e, "Walk error");
                result.walk_warnings += 1;
                result.warnings.push(format!("{location}: {e}"));
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_audio_file(entry.path()) {
            continue;
        }
        result.files_found += 1;

        let path = entry.path().to_path_buf();
        let size_bytes = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(target: "music_catalog::scanner", path = %path.display(), error = %e, "Cannot stat file");
                result.walk_warnings += 1;
                result.warnings.push(format!("{}: {e}", path.display()));
                continue;
            }
        };

        let tags = match metadata::read(&path) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(target: "music_catalog::scanner", error = %e, "Skipping unreadable file");
                result.tag_read_failures += 1;
                result.warnings.push(e.to_string());
                continue;
            }
        };

        let relative_path = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();
        debug!(target: "music_catalog::scanner", path = %relative_path.display(), "Read");

        let record = TrackRecord::from_tags(path, relative_path, size_bytes, tags);
        result.catalog.insert(record);
    }

    info!(
        target: "music_catalog::scanner",
        tracks = result.catalog.len(),
        failures = result.tag_read_failures,
        warnings = result.walk_warnings,
        "Scan complete"
    );

    Ok(result)
}
