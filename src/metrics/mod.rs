//! Library metrics - summary statistics folded from the catalog.

use std::collections::HashSet;

use crate::model::TrackRecord;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Byte share of one format.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatShare {
    /// Lowercase extension, or `unknown`
    pub format: String,
    pub bytes: u64,
    /// Exact share of total bytes, 0-100
    pub percent: f64,
}

/// Summary statistics over a catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryMetrics {
    pub total_tracks: usize,
    pub total_bytes: u64,
    pub unique_artists: usize,
    /// Distinct (artist, album) pairs
    pub unique_albums: usize,
    /// Sorted by bytes descending, then format name
    pub formats: Vec<FormatShare>,
}

impl LibraryMetrics {
    pub fn total_mb(&self) -> f64 {
        bytes_to_mb(self.total_bytes)
    }
}

/// Fold records into [`LibraryMetrics`].
///
/// Blank artists are excluded from the artist set, and records without an
/// album are excluded from the album set; both still count toward totals.
pub fn summarize<'a>(tracks: impl IntoIterator<Item = &'a TrackRecord>) -> LibraryMetrics {
    let mut total_tracks = 0;
    let mut total_bytes = 0u64;
    let mut artists: HashSet<&str> = HashSet::new();
    let mut albums: HashSet<(Option<&str>, &str)> = HashSet::new();
    let mut by_format: Vec<(String, u64)> = Vec::new();

    for track in tracks {
        total_tracks += 1;
        total_bytes += track.size_bytes;

        let artist = track.artist_name();
        if let Some(artist) = artist {
            artists.insert(artist);
        }
        if let Some(album) = track.album_title() {
            albums.insert((artist, album));
        }

        match by_format.iter_mut().find(|(f, _)| *f == track.format) {
            Some((_, bytes)) => *bytes += track.size_bytes,
            None => by_format.push((track.format.clone(), track.size_bytes)),
        }
    }

    let mut formats: Vec<FormatShare> = by_format
        .into_iter()
        .map(|(format, bytes)| FormatShare {
            format,
            bytes,
            percent: percent_of(bytes, total_bytes),
        })
        .collect();
    formats.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.format.cmp(&b.format)));

    LibraryMetrics {
        total_tracks,
        total_bytes,
        unique_artists: artists.len(),
        unique_albums: albums.len(),
        formats,
    }
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Round to two decimals for display and export.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Render a byte count as `N.NN MB`.
pub fn human_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes_to_mb(bytes))
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use crate::test_utils::track;
    use proptest::prelude::*;

    proptest! {
        /// Percentages sum to 100 whenever there are bytes to share
        #[test]
        fn percentages_sum_to_hundred(
            files in proptest::collection::vec(
                (prop::sample::select(vec!["mp3", "flac", "wav", "ogg", "m4a"]), 0u64..10_000_000),
                1..40,
            )
        ) {
            let tracks: Vec<TrackRecord> = files
                .iter()
                .enumerate()
                .map(|(i, (ext, size))| TrackRecord {
                    size_bytes: *size,
                    ..track(&format!("/m/{i}.{ext}"))
                })
                .collect();
            let metrics = summarize(&tracks);

            let total: u64 = files.iter().map(|(_, s)| s).sum();
            prop_assert_eq!(metrics.total_bytes, total);
            prop_assert_eq!(metrics.formats.iter().map(|f| f.bytes).sum::<u64>(), total);

            if total > 0 {
                let sum: f64 = metrics.formats.iter().map(|f| f.percent).sum();
                prop_assert!((sum - 100.0).abs() < 1e-6, "sum was {}", sum);
            }
        }
    }
}
