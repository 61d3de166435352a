//! Test utilities and fixtures for music-catalog tests.
//!
//! Provides record factories and helpers that lay out small audio
//! libraries on disk, to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use music_catalog::test_utils::{track, write_silent_wav};
//!
//! let record = TrackRecord { size_bytes: 1024, ..track("/music/a.mp3") };
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{MetadataSource, TrackRecord, format_of};

/// Creates an untagged TrackRecord at `path` with every tag field absent.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let custom = TrackRecord {
///     artist: Some("Custom".to_string()),
///     ..track("/music/song.flac")
/// };
/// ```
pub fn track(path: &str) -> TrackRecord {
    let path = PathBuf::from(path);
    let relative_path = path.file_name().map(PathBuf::from).unwrap_or_default();

    TrackRecord {
        format: format_of(&path),
        path,
        relative_path,
        size_bytes: 0,
        artist: None,
        album: None,
        title: None,
        track_number: None,
        year: None,
        genre: None,
        duration_seconds: None,
        bitrate_kbps: None,
        sample_rate_hz: None,
        source: MetadataSource::Tags,
    }
}

/// Creates a TrackRecord with an artist and optional album.
pub fn tagged_track(path: &str, artist: &str, album: Option<&str>) -> TrackRecord {
    TrackRecord {
        artist: Some(artist.to_string()),
        album: album.map(str::to_string),
        ..track(path)
    }
}

/// Writes a tiny but valid PCM WAV file (44.1kHz, mono, 16-bit, 0.1s of silence).
///
/// Parent directories are created as needed.
pub fn write_silent_wav(path: &Path) {
    const SAMPLE_RATE: u32 = 44_100;
    const CHANNELS: u16 = 1;
    const BITS: u16 = 16;
    let samples = SAMPLE_RATE / 10;
    let block_align = CHANNELS * BITS / 8;
    let data_len = samples * u32::from(block_align);

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&CHANNELS.to_le_bytes());
    bytes.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    bytes.extend_from_slice(&(SAMPLE_RATE * u32::from(block_align)).to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&BITS.to_le_bytes());

    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, 0);

    write_file(path, &bytes);
}

/// Writes arbitrary bytes to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    fs::write(path, contents).expect("Failed to write test file");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_defaults() {
        let record = track("/music/Song.FLAC");
        assert_eq!(record.format, "flac");
        assert_eq!(record.relative_path, PathBuf::from("Song.FLAC"));
        assert_eq!(record.artist, None);
        assert_eq!(record.source, MetadataSource::Tags);
    }

    #[test]
    fn test_silent_wav_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/silence.wav");
        write_silent_wav(&path);

        let info = crate::metadata::read(&path).unwrap();
        assert_eq!(info.sample_rate_hz, Some(44_100));
        assert!(!info.has_tags);
    }
}
