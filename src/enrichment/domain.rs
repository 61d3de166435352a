//! Internal domain models for metadata enrichment.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external API responses get converted into these types via adapters.

use crate::model::TrackRecord;

/// One match returned by a metadata lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentCandidate {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
    /// Match score from 0 to 100
    pub score: u8,
}

/// Search terms for a recording lookup, built from whatever a record has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingQuery {
    /// Recording title, or the file stem when the title tag is missing
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl RecordingQuery {
    /// Build a query for `record`. Returns `None` if there is nothing to search
    /// for (no title and no usable file stem).
    pub fn for_record(record: &TrackRecord) -> Option<Self> {
        let title = record
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| record.file_stem().map(str::trim).filter(|s| !s.is_empty()))?;

        Some(Self {
            title: title.to_string(),
            artist: record.artist_name().map(str::to_string),
            album: record.album_title().map(str::to_string),
        })
    }
}

/// Errors that can occur during a lookup. All are non-fatal to a run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No matches found")]
    NoMatches,

    #[error("Rate limited - try again later")]
    RateLimited,
}
