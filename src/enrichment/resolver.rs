//! Enrichment resolver - decides whether to trust a lookup and merges it.
//!
//! For each eligible record:
//! 1. Wait for the [`Throttle`] so lookups stay at least one interval apart
//! 2. Search the external service with the record's present fields
//! 3. Select the highest-scoring candidate (first seen wins ties)
//! 4. Reject it if it scores below `min_score`
//! 5. Merge artist/album/title/year under the fill-or-overwrite rule
//! 6. Optionally write the merged fields back into the file's tags
//!
//! Every per-record failure is logged and counted; none stops the pass.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::domain::{EnrichmentCandidate, EnrichmentError, RecordingQuery};
use super::throttle::Throttle;
use super::traits::RecordingSearch;
use crate::metadata::{TagUpdate, TagWriteError, TagWriter};
use crate::model::{Catalog, MetadataSource, TrackRecord};

/// Default minimum score for accepting a match
pub const DEFAULT_MIN_SCORE: u8 = 85;

/// Default spacing between MusicBrainz requests, slightly above their 1 req/sec limit
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(1100);

/// How aggressively to enrich and how to treat the service.
#[derive(Debug, Clone)]
pub struct EnrichmentPolicy {
    /// Enrich every record and let accepted values overwrite present ones
    pub enrich_all: bool,
    /// Minimum candidate score (0-100) to accept a match
    pub min_score: u8,
    /// URL or email identifying the operator to the lookup service
    pub contact: String,
    /// Minimum time between the starts of consecutive lookups
    pub request_interval: Duration,
    /// Persist merged fields into the file's tags
    pub write_tags: bool,
}

impl Default for EnrichmentPolicy {
    fn default() -> Self {
        Self {
            enrich_all: false,
            min_score: DEFAULT_MIN_SCORE,
            contact: "https://example.com/contact".to_string(),
            request_interval: DEFAULT_REQUEST_INTERVAL,
            write_tags: false,
        }
    }
}

impl EnrichmentPolicy {
    /// Records missing artist or album are always eligible; with
    /// `enrich_all`, every record is.
    pub fn is_eligible(&self, record: &TrackRecord) -> bool {
        self.enrich_all || record.artist.is_none() || record.album.is_none()
    }
}

/// Outcome of candidate selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Best candidate meets the threshold
    Accepted(&'a EnrichmentCandidate),
    /// Best candidate scored below the threshold
    BelowThreshold { best: u8 },
    /// Lookup returned nothing
    Empty,
}

/// Pick the highest-scoring candidate, keeping the first one on ties.
pub fn select_candidate(candidates: &[EnrichmentCandidate], min_score: u8) -> Selection<'_> {
    let mut best: Option<&EnrichmentCandidate> = None;
    for candidate in candidates {
        // Strictly greater keeps the earliest of equal scores
        if best.is_none_or(|b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }

    match best {
        None => Selection::Empty,
        Some(c) if c.score < min_score => Selection::BelowThreshold { best: c.score },
        Some(c) => Selection::Accepted(c),
    }
}

/// A tag field touched by enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Artist,
    Album,
    Title,
    Year,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Artist => "artist",
            Field::Album => "album",
            Field::Title => "title",
            Field::Year => "year",
        })
    }
}

/// Merge an accepted candidate into `record`.
///
/// A candidate value is adopted only when the record's value is absent, or
/// when `overwrite` is set. Values the candidate lacks are never touched.
/// Returns the fields whose value actually changed.
pub fn merge_candidate(record: &mut TrackRecord, candidate: &EnrichmentCandidate, overwrite: bool) -> Vec<Field> {
    let mut changed = Vec::new();

    if merge_field(&mut record.artist, &candidate.artist, overwrite) {
        changed.push(Field::Artist);
    }
    if merge_field(&mut record.album, &candidate.album, overwrite) {
        changed.push(Field::Album);
    }
    if merge_field(&mut record.title, &candidate.title, overwrite) {
        changed.push(Field::Title);
    }
    if merge_field(&mut record.year, &candidate.year, overwrite) {
        changed.push(Field::Year);
    }

    if !changed.is_empty() {
        record.source = MetadataSource::MusicBrainz;
    }
    changed
}

fn merge_field<T: Clone + PartialEq>(current: &mut Option<T>, incoming: &Option<T>, overwrite: bool) -> bool {
    let Some(value) = incoming else {
        return false;
    };
    if (current.is_none() || overwrite) && current.as_ref() != Some(value) {
        *current = Some(value.clone());
        return true;
    }
    false
}

/// What happened to one record.
#[derive(Debug)]
pub enum ResolveOutcome {
    /// Record has artist and album and `enrich_all` is off
    Ineligible,
    /// No title or file stem to search with
    NoQuery,
    /// Lookup failed; record unchanged
    LookupFailed(EnrichmentError),
    /// Lookup returned no candidates
    NoCandidates,
    /// Best candidate scored below the threshold
    BelowThreshold { best: u8 },
    /// Accepted candidate matched what the record already had
    Unchanged { score: u8 },
    /// Fields were merged; `tags` is set when write-back was attempted
    Updated {
        score: u8,
        changed: Vec<Field>,
        tags: Option<Result<(), TagWriteError>>,
    },
}

/// Per-category counts for an enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    /// Eligible records looked up (or attempted)
    pub checked: usize,
    pub updated: usize,
    /// Accepted but nothing changed
    pub unchanged: usize,
    /// Zero candidates, below threshold, or nothing to search with
    pub unmatched: usize,
    pub lookup_failures: usize,
    pub tags_written: usize,
    pub tag_write_failures: usize,
}

impl EnrichmentSummary {
    fn record(&mut self, outcome: &ResolveOutcome) {
        if !matches!(outcome, ResolveOutcome::Ineligible) {
            self.checked += 1;
        }
        match outcome {
            ResolveOutcome::Ineligible => {}
            ResolveOutcome::NoQuery | ResolveOutcome::NoCandidates | ResolveOutcome::BelowThreshold { .. } => {
                self.unmatched += 1
            }
            ResolveOutcome::LookupFailed(_) => self.lookup_failures += 1,
            ResolveOutcome::Unchanged { .. } => self.unchanged += 1,
            ResolveOutcome::Updated { tags, .. } => {
                self.updated += 1;
                match tags {
                    Some(Ok(())) => self.tags_written += 1,
                    Some(Err(_)) => self.tag_write_failures += 1,
                    None => {}
                }
            }
        }
    }
}

/// Runs lookups for records, one at a time, under a policy.
///
/// The resolver owns the [`Throttle`], so request spacing holds across every
/// record it sees, whether the previous lookup failed, matched or was rejected.
pub struct Resolver<'a, S: ?Sized, W: ?Sized> {
    search: &'a S,
    writer: &'a W,
    policy: &'a EnrichmentPolicy,
    throttle: Throttle,
}

impl<'a, S, W> Resolver<'a, S, W>
where
    S: RecordingSearch + ?Sized,
    W: TagWriter + ?Sized,
{
    pub fn new(search: &'a S, writer: &'a W, policy: &'a EnrichmentPolicy) -> Self {
        Self {
            search,
            writer,
            policy,
            throttle: Throttle::new(policy.request_interval),
        }
    }

    /// Resolve a single record in place.
    pub async fn resolve(&mut self, record: &mut TrackRecord) -> ResolveOutcome {
        if !self.policy.is_eligible(record) {
            return ResolveOutcome::Ineligible;
        }

        let Some(query) = RecordingQuery::for_record(record) else {
            debug!(target: "music_catalog::enrichment", path = %record.path.display(), "Nothing to search with");
            return ResolveOutcome::NoQuery;
        };

        self.throttle.wait().await;
        let candidates = match self.search.search(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(target: "music_catalog::enrichment", path = %record.path.display(), error = %e, "Lookup failed");
                return ResolveOutcome::LookupFailed(e);
            }
        };

        let candidate = match select_candidate(&candidates, self.policy.min_score) {
            Selection::Accepted(candidate) => candidate,
            Selection::BelowThreshold { best } => {
                debug!(
                    target: "music_catalog::enrichment",
                    path = %record.path.display(),
                    best,
                    min = self.policy.min_score,
                    "Low score, not merging"
                );
                return ResolveOutcome::BelowThreshold { best };
            }
            Selection::Empty => return ResolveOutcome::NoCandidates,
        };

        let before = (record.artist.clone(), record.album.clone());
        let changed = merge_candidate(record, candidate, self.policy.enrich_all);
        if changed.is_empty() {
            return ResolveOutcome::Unchanged { score: candidate.score };
        }

        info!(
            target: "music_catalog::enrichment",
            path = %record.path.display(),
            score = candidate.score,
            artist = ?before.0,
            new_artist = ?record.artist,
            album = ?before.1,
            new_album = ?record.album,
            "Enriched"
        );

        let tags = self
            .policy
            .write_tags
            .then(|| write_back(self.writer, &record.path, &TagUpdate::from_record(record)));

        ResolveOutcome::Updated {
            score: candidate.score,
            changed,
            tags,
        }
    }

    /// Resolve every record of a catalog in order.
    pub async fn enrich_catalog(&mut self, catalog: &mut Catalog) -> EnrichmentSummary {
        let mut summary = EnrichmentSummary::default();
        for record in catalog.iter_mut() {
            let outcome = self.resolve(record).await;
            summary.record(&outcome);
        }
        summary
    }
}

fn write_back<W: TagWriter + ?Sized>(writer: &W, path: &Path, update: &TagUpdate) -> Result<(), TagWriteError> {
    let result = writer.write(path, update);
    if let Err(ref e) = result {
        warn!(target: "music_catalog::enrichment", path = %path.display(), error = %e, "Tag write-back failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::traits::mocks::{MockSearch, RecordingTagWriter, candidate};
    use crate::test_utils::{tagged_track, track};

    fn policy() -> EnrichmentPolicy {
        EnrichmentPolicy {
            request_interval: Duration::ZERO,
            ..Default::default()
        }
    }

    fn scored(scores: &[u8]) -> Vec<EnrichmentCandidate> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| candidate(&format!("A{i}"), &format!("X{i}"), *s))
            .collect()
    }

    #[test]
    fn test_select_highest_score() {
        let candidates = scored(&[60, 90, 85]);
        assert_eq!(select_candidate(&candidates, 85), Selection::Accepted(&candidates[1]));
    }

    #[test]
    fn test_select_ties_keep_first_seen() {
        let candidates = scored(&[70, 95, 95, 10]);
        assert_eq!(select_candidate(&candidates, 0), Selection::Accepted(&candidates[1]));
    }

    #[test]
    fn test_select_below_threshold() {
        assert_eq!(
            select_candidate(&scored(&[40, 84, 10]), 85),
            Selection::BelowThreshold { best: 84 }
        );
        assert_eq!(select_candidate(&[], 0), Selection::Empty);
    }

    #[test]
    fn test_merge_fills_only_missing_fields() {
        let mut record = TrackRecord {
            artist: Some("Local Artist".to_string()),
            album: None,
            ..track("/m/a.mp3")
        };
        let incoming = EnrichmentCandidate {
            artist: Some("Remote Artist".to_string()),
            album: Some("Remote Album".to_string()),
            title: Some("Remote Title".to_string()),
            year: Some(1999),
            score: 100,
        };

        let changed = merge_candidate(&mut record, &incoming, false);

        assert_eq!(record.artist.as_deref(), Some("Local Artist"));
        assert_eq!(record.album.as_deref(), Some("Remote Album"));
        assert_eq!(record.title.as_deref(), Some("Remote Title"));
        assert_eq!(record.year, Some(1999));
        assert_eq!(changed, vec![Field::Album, Field::Title, Field::Year]);
        assert_eq!(record.source, MetadataSource::MusicBrainz);
    }

    #[test]
    fn test_merge_overwrite_replaces_present_fields() {
        let mut record = tagged_track("/m/a.mp3", "Old", Some("Old Album"));
        let incoming = candidate("New", "New Album", 99);

        let changed = merge_candidate(&mut record, &incoming, true);

        assert_eq!(record.artist.as_deref(), Some("New"));
        assert_eq!(record.album.as_deref(), Some("New Album"));
        assert_eq!(changed, vec![Field::Artist, Field::Album]);
    }

    #[test]
    fn test_merge_leaves_fields_candidate_lacks() {
        let mut record = TrackRecord {
            title: Some("Keep".to_string()),
            year: Some(2001),
            ..track("/m/a.mp3")
        };
        let incoming = EnrichmentCandidate {
            score: 100,
            ..Default::default()
        };

        let changed = merge_candidate(&mut record, &incoming, true);

        assert!(changed.is_empty());
        assert_eq!(record.title.as_deref(), Some("Keep"));
        assert_eq!(record.year, Some(2001));
        assert_eq!(record.source, MetadataSource::Tags);
    }

    #[test]
    fn test_eligibility() {
        let complete = tagged_track("/m/a.mp3", "A", Some("X"));
        let missing_album = tagged_track("/m/b.mp3", "A", None);

        let default = policy();
        assert!(!default.is_eligible(&complete));
        assert!(default.is_eligible(&missing_album));

        let all = EnrichmentPolicy {
            enrich_all: true,
            ..policy()
        };
        assert!(all.is_eligible(&complete));
    }

    #[tokio::test]
    async fn test_scenario_selects_ninety_of_sixty_ninety_eightyfive() {
        let search = MockSearch::default().with_candidates(scored(&[60, 90, 85]));
        let writer = RecordingTagWriter::default();
        let policy = EnrichmentPolicy {
            min_score: 85,
            ..policy()
        };
        let mut resolver = Resolver::new(&search, &writer, &policy);

        let mut record = tagged_track("/m/a.mp3", "A1", None);
        let outcome = resolver.resolve(&mut record).await;

        assert!(matches!(outcome, ResolveOutcome::Updated { score: 90, .. }));
        assert_eq!(record.album.as_deref(), Some("X1"));
        // Present artist kept without enrich_all
        assert_eq!(record.artist.as_deref(), Some("A1"));
        assert!(writer.writes().is_empty());
    }

    #[tokio::test]
    async fn test_low_score_leaves_record_untouched() {
        let search = MockSearch::default().with_scores(&[50, 84]);
        let writer = RecordingTagWriter::default();
        let policy = policy();
        let mut resolver = Resolver::new(&search, &writer, &policy);

        let original = tagged_track("/m/a.mp3", "A", None);
        let mut record = original.clone();
        let outcome = resolver.resolve(&mut record).await;

        assert!(matches!(outcome, ResolveOutcome::BelowThreshold { best: 84 }));
        assert_eq!(record, original);
    }

    #[tokio::test]
    async fn test_ineligible_records_are_not_looked_up() {
        let search = MockSearch::default().with_scores(&[100]);
        let writer = RecordingTagWriter::default();
        let policy = policy();
        let mut resolver = Resolver::new(&search, &writer, &policy);

        let mut record = tagged_track("/m/a.mp3", "A", Some("X"));
        let outcome = resolver.resolve(&mut record).await;

        assert!(matches!(outcome, ResolveOutcome::Ineligible));
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_write_back_only_when_opted_in() {
        let search = MockSearch::default().with_candidates(vec![candidate("A", "X", 95)]);
        let writer = RecordingTagWriter::default();
        let policy = EnrichmentPolicy {
            write_tags: true,
            ..policy()
        };
        let mut resolver = Resolver::new(&search, &writer, &policy);

        let mut record = track("/m/a.mp3");
        let outcome = resolver.resolve(&mut record).await;

        assert!(matches!(outcome, ResolveOutcome::Updated { tags: Some(Ok(())), .. }));
        let writes = writer.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1.artist.as_deref(), Some("A"));
        assert_eq!(writes[0].1.album.as_deref(), Some("X"));
    }

    #[tokio::test]
    async fn test_no_write_back_when_nothing_changed() {
        let search = MockSearch::default().with_candidates(vec![candidate("A", "X", 95)]);
        let writer = RecordingTagWriter::default();
        let policy = EnrichmentPolicy {
            enrich_all: true,
            write_tags: true,
            ..policy()
        };
        let mut resolver = Resolver::new(&search, &writer, &policy);

        let mut record = tagged_track("/m/a.mp3", "A", Some("X"));
        let outcome = resolver.resolve(&mut record).await;

        assert!(matches!(outcome, ResolveOutcome::Unchanged { score: 95 }));
        assert!(writer.writes().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_pass_continues_past_failures() {
        let search = MockSearch::default()
            .with_error(EnrichmentError::Network("down".to_string()))
            .with_candidates(vec![])
            .with_scores(&[10])
            .with_candidates(vec![candidate("A", "X", 99)]);
        let writer = RecordingTagWriter::failing();
        let policy = EnrichmentPolicy {
            write_tags: true,
            ..policy()
        };
        let mut resolver = Resolver::new(&search, &writer, &policy);

        let mut catalog: Catalog = [
            track("/m/1.mp3"),
            track("/m/2.mp3"),
            track("/m/3.mp3"),
            tagged_track("/m/complete.mp3", "A", Some("X")),
            track("/m/4.mp3"),
        ]
        .into_iter()
        .collect();

        let summary = resolver.enrich_catalog(&mut catalog).await;

        assert_eq!(
            summary,
            EnrichmentSummary {
                checked: 4,
                updated: 1,
                unchanged: 0,
                unmatched: 2,
                lookup_failures: 1,
                tags_written: 0,
                tag_write_failures: 1,
            }
        );
        assert_eq!(catalog.tracks()[4].artist.as_deref(), Some("A"));
        assert_eq!(catalog.tracks()[0].artist, None);
    }

    #[tokio::test]
    async fn test_lookups_are_spaced_even_after_failures() {
        let interval = Duration::from_millis(30);
        let search = MockSearch::default()
            .with_error(EnrichmentError::RateLimited)
            .with_scores(&[1]);
        let writer = RecordingTagWriter::default();
        let policy = EnrichmentPolicy {
            request_interval: interval,
            ..Default::default()
        };
        let mut resolver = Resolver::new(&search, &writer, &policy);

        let mut catalog: Catalog = [track("/m/1.mp3"), track("/m/2.mp3"), track("/m/3.mp3")]
            .into_iter()
            .collect();
        resolver.enrich_catalog(&mut catalog).await;

        let times = search.call_times();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= interval);
        }
    }

    #[tokio::test]
    async fn test_query_carries_present_fields() {
        let search = MockSearch::no_matches();
        let writer = RecordingTagWriter::default();
        let policy = policy();
        let mut resolver = Resolver::new(&search, &writer, &policy);

        let mut record = TrackRecord {
            title: Some("Song".to_string()),
            ..tagged_track("/m/a.mp3", "Band", None)
        };
        resolver.resolve(&mut record).await;

        let queries = search.queries();
        assert_eq!(queries[0].title, "Song");
        assert_eq!(queries[0].artist.as_deref(), Some("Band"));
        assert_eq!(queries[0].album, None);
    }
}
