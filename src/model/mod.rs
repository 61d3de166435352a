//! Core data models for the catalog.
//!
//! Defines [`TrackRecord`] (one scanned audio file) and [`Catalog`], the
//! ordered, path-unique collection built by a scan.
//!
//! Tag fields are `Option`s: an absent tag and a present value have different
//! meaning during enrichment, so no sentinel strings ("Unknown Artist") are
//! ever stored here. Display fallbacks live with the code that needs them.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::metadata::TagInfo;

/// Format label used when a file has no extension.
pub const UNKNOWN_FORMAT: &str = "unknown";

/// Where the current tag values of a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataSource {
    /// Embedded tags were present in the file
    Tags,
    /// The stream was readable but carried no tags
    AudioInfo,
    /// At least one field was updated from MusicBrainz
    MusicBrainz,
}

impl MetadataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::AudioInfo => "audio-info",
            Self::MusicBrainz => "musicbrainz",
        }
    }
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audio file in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    /// Absolute file path (identity within a catalog)
    pub path: PathBuf,
    /// Path relative to the scan root
    pub relative_path: PathBuf,
    /// Lowercased file extension, or [`UNKNOWN_FORMAT`]
    pub format: String,
    /// File size in bytes
    pub size_bytes: u64,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub track_number: Option<u32>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub duration_seconds: Option<f64>,
    pub bitrate_kbps: Option<u32>,
    pub sample_rate_hz: Option<u32>,
    pub source: MetadataSource,
}

impl TrackRecord {
    /// Build a record from tags read off `path`.
    pub fn from_tags(path: PathBuf, relative_path: PathBuf, size_bytes: u64, tags: TagInfo) -> Self {
        let source = if tags.has_tags {
            MetadataSource::Tags
        } else {
            MetadataSource::AudioInfo
        };

        Self {
            format: format_of(&path),
            path,
            relative_path,
            size_bytes,
            artist: tags.artist,
            album: tags.album,
            title: tags.title,
            track_number: tags.track_number,
            year: tags.year,
            genre: tags.genre,
            duration_seconds: tags.duration_seconds,
            bitrate_kbps: tags.bitrate_kbps,
            sample_rate_hz: tags.sample_rate_hz,
            source,
        }
    }

    /// Artist name if present and not blank.
    pub fn artist_name(&self) -> Option<&str> {
        non_blank(self.artist.as_deref())
    }

    /// Album title if present and not blank.
    pub fn album_title(&self) -> Option<&str> {
        non_blank(self.album.as_deref())
    }

    /// File stem, used as a search term when the title tag is missing.
    pub fn file_stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Derive the catalog format label from a path's extension (case-insensitive).
pub fn format_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| UNKNOWN_FORMAT.to_string())
}

/// Ordered, path-unique sequence of track records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<TrackRecord>,
    paths: HashSet<PathBuf>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Returns `false` (and drops the record) if its path is
    /// already in the catalog.
    pub fn insert(&mut self, record: TrackRecord) -> bool {
        if !self.paths.insert(record.path.clone()) {
            return false;
        }
        self.tracks.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackRecord> {
        self.tracks.iter()
    }

    /// Mutable access for in-place enrichment. Callers must not change `path`.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, TrackRecord> {
        self.tracks.iter_mut()
    }
}

impl FromIterator<TrackRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = TrackRecord>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for record in iter {
            catalog.insert(record);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a TrackRecord;
    type IntoIter = std::slice::Iter<'a, TrackRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
