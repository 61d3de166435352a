//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if MusicBrainz changes their response format,
//! only this file and dto.rs need to change.

use super::dto;
use crate::enrichment::domain::EnrichmentCandidate;

/// Convert a search response into candidates, preserving response order.
pub fn to_candidates(response: dto::SearchResponse) -> Vec<EnrichmentCandidate> {
    response.recordings.into_iter().map(to_candidate).collect()
}

/// Convert one search hit into a candidate
pub fn to_candidate(recording: dto::Recording) -> EnrichmentCandidate {
    let artist = build_artist_string(&recording.artist_credit);
    let release = recording.releases.first();

    let album = release
        .map(|r| r.title.trim().to_string())
        .filter(|t| !t.is_empty());

    let year = recording
        .first_release_date
        .as_deref()
        .and_then(year_from_date)
        .or_else(|| release.and_then(|r| r.date.as_deref()).and_then(year_from_date));

    let title = Some(recording.title.trim().to_string()).filter(|t| !t.is_empty());

    EnrichmentCandidate {
        artist,
        album,
        title,
        year,
        score: recording.score.min(100) as u8,
    }
}

/// Build a combined artist string from artist credits
fn build_artist_string(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for credit in credits {
        // Use credited name if available, otherwise official name
        let name = credit.name.as_ref().unwrap_or(&credit.artist.name);
        result.push_str(name);

        // Add join phrase if present (e.g., " & ", " feat. ")
        if let Some(ref join) = credit.joinphrase {
            result.push_str(join);
        }
    }

    let trimmed = result.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Extract the year from a MusicBrainz partial date ("1975", "1975-10", "1975-10-31")
fn year_from_date(date: &str) -> Option<i32> {
    let year = date.trim().get(..4)?;
    if !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    year.parse().ok().filter(|y| *y > 0)
}
