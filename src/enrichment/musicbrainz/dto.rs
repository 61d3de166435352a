//! MusicBrainz API Data Transfer Objects
//!
//! These types match EXACTLY what the MusicBrainz API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the musicbrainz module - convert to domain types.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API/Search
//!
//! We use the /recording search endpoint with `fmt=json`, which returns a
//! ranked list of recordings with an integer `score` (0-100).

use serde::{Deserialize, Serialize};

/// Recording search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    /// Total hits for the query
    pub count: Option<u32>,
    /// Offset of this page
    pub offset: Option<u32>,
    /// Matched recordings, best first
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

/// A recording in search results
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Recording {
    /// MusicBrainz recording ID
    pub id: String,
    /// Search relevance (0-100)
    #[serde(default)]
    pub score: u32,
    /// Recording title
    pub title: String,
    /// Duration in milliseconds
    pub length: Option<u64>,
    /// Earliest release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub first_release_date: Option<String>,
    /// Artist credits
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    /// Releases this recording appears on
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
    /// The artist
    pub artist: Artist,
}

/// Artist info
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    /// MusicBrainz artist ID
    pub id: String,
    /// Official artist name
    pub name: String,
    /// Sort name (e.g., "Beatles, The")
    pub sort_name: Option<String>,
}

/// Release (album/single/EP) summary
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Release {
    /// MusicBrainz release ID
    pub id: String,
    /// Release title
    pub title: String,
    /// Release date
    pub date: Option<String>,
    /// Release status (Official, Bootleg, etc.)
    pub status: Option<String>,
}

/// Error response from MusicBrainz API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
    pub help: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_empty_search() {
        let json = r#"{"created": "2024-01-01T00:00:00.000Z", "count": 0, "offset": 0, "recordings": []}"#;

        let response: SearchResponse = serde_json::from_str(json).expect("Should parse empty search");
        assert_eq!(response.count, Some(0));
        assert!(response.recordings.is_empty());
    }

    #[test]
    fn test_parse_search_with_recordings() {
        let json = r#"{
            "created": "2024-01-01T00:00:00.000Z",
            "count": 2,
            "offset": 0,
            "recordings": [
                {
                    "id": "rec-1",
                    "score": 100,
                    "title": "Bohemian Rhapsody",
                    "length": 354000,
                    "first-release-date": "1975-10-31",
                    "artist-credit": [{
                        "name": "Queen",
                        "artist": {"id": "art-1", "name": "Queen", "sort-name": "Queen"}
                    }],
                    "releases": [{
                        "id": "rel-1",
                        "title": "A Night at the Opera",
                        "status": "Official",
                        "date": "1975-11-21"
                    }]
                },
                {
                    "id": "rec-2",
                    "score": 87,
                    "title": "Bohemian Rhapsody (live)"
                }
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).expect("Should parse search");
        assert_eq!(response.recordings.len(), 2);

        let first = &response.recordings[0];
        assert_eq!(first.score, 100);
        assert_eq!(first.first_release_date.as_deref(), Some("1975-10-31"));
        assert_eq!(first.artist_credit[0].artist.name, "Queen");
        assert_eq!(first.releases[0].title, "A Night at the Opera");

        let second = &response.recordings[1];
        assert_eq!(second.score, 87);
        assert!(second.artist_credit.is_empty());
        assert!(second.releases.is_empty());
    }

    #[test]
    fn test_parse_collaboration() {
        let json = r#"{
            "id": "rec-collab",
            "score": 95,
            "title": "Under Pressure",
            "artist-credit": [
                {"name": "Queen", "joinphrase": " & ", "artist": {"id": "queen-id", "name": "Queen"}},
                {"name": "David Bowie", "artist": {"id": "bowie-id", "name": "David Bowie"}}
            ]
        }"#;

        let recording: Recording = serde_json::from_str(json).expect("Should parse collaboration");
        assert_eq!(recording.artist_credit.len(), 2);
        assert_eq!(recording.artist_credit[0].joinphrase.as_deref(), Some(" & "));
        assert_eq!(recording.artist_credit[1].joinphrase, None);
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{
            "error": "Invalid query",
            "help": "For usage, please see: https://musicbrainz.org/development/mmd"
        }"#;

        let error: ApiError = serde_json::from_str(json).expect("Should parse error");
        assert_eq!(error.error, "Invalid query");
        assert!(error.help.is_some());
    }
}
