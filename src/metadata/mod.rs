//! Audio file metadata reading and writing.
//!
//! Uses the lofty crate for format-independent metadata access.
//!
//! # Features
//! - Read tag fields (artist, album, title, track, year, genre) and stream
//!   properties (duration, bitrate, sample rate)
//! - Write enriched fields back through the [`TagWriter`] seam
//!
//! Missing or blank tags are reported as `None`. This layer never invents
//! defaults such as "Unknown Artist".

use lofty::config::WriteOptions;
use lofty::error::LoftyError;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::model::TrackRecord;

/// Tag fields and stream properties read from one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagInfo {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub track_number: Option<u32>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub duration_seconds: Option<f64>,
    pub bitrate_kbps: Option<u32>,
    pub sample_rate_hz: Option<u32>,
    /// Whether the file carried any tag at all
    pub has_tags: bool,
}

/// Errors reading a file's metadata. The file is skipped.
#[derive(Debug, thiserror::Error)]
pub enum TagReadError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: LoftyError,
    },

    #[error("failed to read metadata from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: LoftyError,
    },
}

/// Errors writing tags back into a file. Only the write-back is skipped.
#[derive(Debug, thiserror::Error)]
pub enum TagWriteError {
    #[error("failed to open {} for writing: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: LoftyError,
    },

    #[error("no writable tag in {}", path.display())]
    NoTag { path: PathBuf },

    #[error("failed to save tags to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: LoftyError,
    },
}

/// Read tag fields and stream properties from an audio file.
pub fn read(path: &Path) -> Result<TagInfo, TagReadError> {
    let tagged_file = Probe::open(path)
        .map_err(|source| TagReadError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .read()
        .map_err(|source| TagReadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    // Get the primary tag, or fall back to the first available tag
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let properties = tagged_file.properties();
    let duration = properties.duration();

    let mut info = TagInfo {
        duration_seconds: (!duration.is_zero()).then(|| duration.as_secs_f64()),
        bitrate_kbps: properties.audio_bitrate().filter(|b| *b > 0),
        sample_rate_hz: properties.sample_rate().filter(|r| *r > 0),
        has_tags: tag.is_some(),
        ..Default::default()
    };

    if let Some(tag) = tag {
        info.artist = clean(tag.artist())
            .or_else(|| clean(tag.get_string(&ItemKey::AlbumArtist).map(Cow::Borrowed)));
        info.album = clean(tag.album());
        info.title = clean(tag.title());
        info.genre = clean(tag.genre());
        info.track_number = tag.track().filter(|n| *n > 0);
        info.year = tag.year().filter(|y| *y > 0).map(|y| y as i32);
    }

    Ok(info)
}

/// Trim a tag value, treating blank as absent.
fn clean(value: Option<Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fields to persist into a file's tags after enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagUpdate {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
}

impl TagUpdate {
    /// Snapshot the writable fields of a record.
    pub fn from_record(record: &TrackRecord) -> Self {
        Self {
            artist: record.artist.clone(),
            album: record.album.clone(),
            title: record.title.clone(),
            year: record.year,
        }
    }
}

/// Persists tag updates into audio files.
///
/// The resolver writes through this trait so tests can observe write-back
/// without touching real audio files.
pub trait TagWriter {
    fn write(&self, path: &Path, update: &TagUpdate) -> Result<(), TagWriteError>;
}

/// [`TagWriter`] backed by lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagWriter;

impl TagWriter for LoftyTagWriter {
    fn write(&self, path: &Path, update: &TagUpdate) -> Result<(), TagWriteError> {
        let mut tagged_file = Probe::open(path)
            .and_then(|opened| opened.read())
            .map_err(|source| TagWriteError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        // Write into the tag `read` sees (primary, else first), so fields we
        // don't touch survive. Only an untagged file gets a new primary tag.
        let existing = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .map(|tag| tag.tag_type());
        let tag_type = match existing {
            Some(tag_type) => tag_type,
            None => {
                let tag_type = tagged_file.primary_tag_type();
                tagged_file.insert_tag(Tag::new(tag_type));
                tag_type
            }
        };
        let tag = tagged_file
            .tag_mut(tag_type)
            .ok_or_else(|| TagWriteError::NoTag {
                path: path.to_path_buf(),
            })?;

        if let Some(ref artist) = update.artist {
            tag.set_artist(artist.clone());
        }
        if let Some(ref album) = update.album {
            tag.set_album(album.clone());
        }
        if let Some(ref title) = update.title {
            tag.set_title(title.clone());
        }
        if let Some(year) = update.year.filter(|y| *y > 0) {
            tag.set_year(year as u32);
        }

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|source| TagWriteError::Save {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_silent_wav;
    use lofty::tag::TagType;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn test_read_non_audio_file_returns_error() {
        let mut file = NamedTempFile::with_suffix(".mp3").expect("Failed to create temp file");
        writeln!(file, "This is just some text, not music.").expect("Failed to write to temp file");

        assert!(read(file.path()).is_err());
    }

    #[test]
    fn test_read_non_existent_file_returns_open_error() {
        let result = read(Path::new("non_existent_file.mp3"));
        assert!(matches!(result, Err(TagReadError::Open { .. })));
    }

    #[test]
    fn test_untagged_wav_has_no_fabricated_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_silent_wav(&path);

        let info = read(&path).expect("valid wav should be readable");
        assert!(!info.has_tags);
        assert_eq!(info.artist, None);
        assert_eq!(info.album, None);
        assert_eq!(info.title, None);
        assert_eq!(info.sample_rate_hz, Some(44_100));
    }

    #[test]
    fn test_lofty_writer_round_trips_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_silent_wav(&path);

        let update = TagUpdate {
            artist: Some("Queen".to_string()),
            album: Some("A Night at the Opera".to_string()),
            title: Some("Bohemian Rhapsody".to_string()),
            year: Some(1975),
        };
        LoftyTagWriter.write(&path, &update).expect("write should succeed");

        let info = read(&path).unwrap();
        assert!(info.has_tags);
        assert_eq!(info.artist.as_deref(), Some("Queen"));
        assert_eq!(info.album.as_deref(), Some("A Night at the Opera"));
        assert_eq!(info.title.as_deref(), Some("Bohemian Rhapsody"));
    }

    #[test]
    fn test_writer_keeps_fields_of_existing_non_primary_tag() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("riff.wav");
        write_silent_wav(&path);

        // RIFF INFO is not the primary tag type for WAV
        let mut riff = Tag::new(TagType::RiffInfo);
        riff.set_genre("Jazz".to_string());
        riff.set_track(7);
        riff.save_to_path(&path, WriteOptions::default()).unwrap();

        let before = read(&path).unwrap();
        assert_eq!(before.genre.as_deref(), Some("Jazz"));
        assert_eq!(before.track_number, Some(7));

        let update = TagUpdate {
            artist: Some("Miles Davis".to_string()),
            album: Some("Kind of Blue".to_string()),
            ..Default::default()
        };
        LoftyTagWriter.write(&path, &update).unwrap();

        let after = read(&path).unwrap();
        assert_eq!(after.artist.as_deref(), Some("Miles Davis"));
        assert_eq!(after.album.as_deref(), Some("Kind of Blue"));
        assert_eq!(after.genre.as_deref(), Some("Jazz"));
        assert_eq!(after.track_number, Some(7));
    }

    #[test]
    fn test_writer_on_non_audio_fails() {
        let mut file = NamedTempFile::with_suffix(".flac").unwrap();
        writeln!(file, "Not an audio file").unwrap();

        let result = LoftyTagWriter.write(file.path(), &TagUpdate::default());
        assert!(matches!(result, Err(TagWriteError::Open { .. })));
    }

    #[test]
    fn test_clean_trims_and_drops_blank() {
        assert_eq!(clean(Some(Cow::Borrowed("  Abba "))), Some("Abba".to_string()));
        assert_eq!(clean(Some(Cow::Borrowed("   "))), None);
        assert_eq!(clean(None), None);
    }
}
