//! Trait definitions for external lookup clients.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses [`MusicBrainzClient`](super::musicbrainz::MusicBrainzClient),
//! while tests substitute the mock implementations below.
//!
//! # Example
//!
//! ```ignore
//! use music_catalog::enrichment::traits::RecordingSearch;
//!
//! async fn best<T: RecordingSearch>(client: &T, query: &RecordingQuery) {
//!     let candidates = client.search(query).await?;
//! }
//! ```

use async_trait::async_trait;

use super::domain::{EnrichmentCandidate, EnrichmentError, RecordingQuery};

/// Trait for recording search lookups.
///
/// Implementations return candidates in the service's own ranking order;
/// callers rely on that order to break score ties.
#[async_trait]
pub trait RecordingSearch: Send + Sync {
    async fn search(&self, query: &RecordingQuery) -> Result<Vec<EnrichmentCandidate>, EnrichmentError>;
}

#[async_trait]
impl RecordingSearch for super::musicbrainz::MusicBrainzClient {
    async fn search(&self, query: &RecordingQuery) -> Result<Vec<EnrichmentCandidate>, EnrichmentError> {
        self.search_recordings(query).await
    }
}

/// Mock lookup and tag-writer implementations for testing.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::metadata::{TagUpdate, TagWriteError, TagWriter};
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Mock search that replays queued responses in order.
    ///
    /// Once the queue is empty, every further search returns no candidates.
    #[derive(Default)]
    pub struct MockSearch {
        responses: Mutex<VecDeque<Result<Vec<EnrichmentCandidate>, EnrichmentError>>>,
        calls: Mutex<Vec<(RecordingQuery, Instant)>>,
    }

    impl MockSearch {
        /// Create a mock that returns no matches.
        pub fn no_matches() -> Self {
            Self::default()
        }

        /// Queue one response containing candidates with the given scores.
        pub fn with_scores(self, scores: &[u8]) -> Self {
            let candidates = scores
                .iter()
                .enumerate()
                .map(|(i, score)| candidate(&format!("Artist {i}"), &format!("Album {i}"), *score))
                .collect();
            self.with_candidates(candidates)
        }

        /// Queue one response with explicit candidates.
        pub fn with_candidates(self, candidates: Vec<EnrichmentCandidate>) -> Self {
            self.responses.lock().unwrap().push_back(Ok(candidates));
            self
        }

        /// Queue one failing response.
        pub fn with_error(self, error: EnrichmentError) -> Self {
            self.responses.lock().unwrap().push_back(Err(error));
            self
        }

        /// Queries received so far.
        pub fn queries(&self) -> Vec<RecordingQuery> {
            self.calls.lock().unwrap().iter().map(|(q, _)| q.clone()).collect()
        }

        /// Start times of every search, in call order.
        pub fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }
    }

    #[async_trait]
    impl RecordingSearch for MockSearch {
        async fn search(&self, query: &RecordingQuery) -> Result<Vec<EnrichmentCandidate>, EnrichmentError> {
            self.calls.lock().unwrap().push((query.clone(), Instant::now()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// Build a candidate with artist, album and score.
    pub fn candidate(artist: &str, album: &str, score: u8) -> EnrichmentCandidate {
        EnrichmentCandidate {
            artist: Some(artist.to_string()),
            album: Some(album.to_string()),
            title: None,
            year: None,
            score,
        }
    }

    /// Tag writer that records writes instead of touching files.
    #[derive(Default)]
    pub struct RecordingTagWriter {
        writes: Mutex<Vec<(PathBuf, TagUpdate)>>,
        fail: bool,
    }

    impl RecordingTagWriter {
        /// A writer whose every write fails.
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn writes(&self) -> Vec<(PathBuf, TagUpdate)> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl TagWriter for RecordingTagWriter {
        fn write(&self, path: &Path, update: &TagUpdate) -> Result<(), TagWriteError> {
            if self.fail {
                return Err(TagWriteError::NoTag {
                    path: path.to_path_buf(),
                });
            }
            self.writes
                .lock()
                .unwrap()
                .push((path.to_path_buf(), update.clone()));
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn query() -> RecordingQuery {
            RecordingQuery {
                title: "Song".to_string(),
                artist: None,
                album: None,
            }
        }

        #[tokio::test]
        async fn test_mock_search_no_matches() {
            let mock = MockSearch::no_matches();
            let results = mock.search(&query()).await.unwrap();
            assert!(results.is_empty());
            assert_eq!(mock.queries(), vec![query()]);
        }

        #[tokio::test]
        async fn test_mock_search_replays_in_order() {
            let mock = MockSearch::default()
                .with_scores(&[10, 20])
                .with_error(EnrichmentError::Network("timeout".to_string()));

            assert_eq!(mock.search(&query()).await.unwrap().len(), 2);
            assert!(matches!(
                mock.search(&query()).await,
                Err(EnrichmentError::Network(_))
            ));
            assert!(mock.search(&query()).await.unwrap().is_empty());
        }

        #[test]
        fn test_recording_writer() {
            let writer = RecordingTagWriter::default();
            writer.write(Path::new("/a.mp3"), &TagUpdate::default()).unwrap();
            assert_eq!(writer.writes().len(), 1);

            let failing = RecordingTagWriter::failing();
            assert!(failing.write(Path::new("/a.mp3"), &TagUpdate::default()).is_err());
        }
    }
}
