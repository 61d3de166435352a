//! File organization into an `Artist/Album/` layout.
//!
//! Organizing is two-phase so it can always be previewed:
//! 1. [`plan`] computes a destination per track and flags collisions
//! 2. [`execute`] performs (or, without `apply`, only reports) the entries
//!
//! # Features
//! - Preview mode with zero filesystem mutation
//! - Exists-on-disk and intra-run collision flags; colliding entries are never executed
//! - [`disambiguate`] rewrites colliding destinations to `stem (N).ext`
//! - Move (hard link then delete, or copy-then-delete across devices) or copy
//! - Sidecar files (cover art, cue sheets) travel with their tracks

pub mod sidecar;

use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::model::{Catalog, TrackRecord};

/// Folder used when a track has no artist
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Folder used when a track has no album
pub const MISC_ALBUM: &str = "Miscellaneous";
/// Result of sanitizing a name with nothing usable left
pub const UNKNOWN_NAME: &str = "Unknown";

/// Characters not allowed in path components on common filesystems
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make `name` safe as a single path component.
///
/// Invalid and control characters become `_`, surrounding whitespace and
/// trailing dots are removed, and an empty result becomes `Unknown`.
/// Distinct inputs can collapse to one name (`AC/DC` and `AC:DC`).
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) || c.is_ascii_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let cleaned = replaced
        .trim_start()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    if cleaned.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Destination directory for a track: `dest_root/Artist/Album`.
pub fn destination_dir(track: &TrackRecord, dest_root: &Path) -> PathBuf {
    let artist = sanitize(track.artist_name().unwrap_or(UNKNOWN_ARTIST));
    let album = match track.album_title() {
        Some(album) => sanitize(album),
        None => MISC_ALBUM.to_string(),
    };
    dest_root.join(artist).join(album)
}

/// Full destination path for a track, keeping its file name.
pub fn destination_for(track: &TrackRecord, dest_root: &Path) -> PathBuf {
    destination_dir(track, dest_root).join(track.path.file_name().unwrap_or_default())
}

/// What a plan entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Track,
    Sidecar,
}

/// One planned file operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: EntryKind,
    /// Destination already exists and is a different file
    pub exists_on_disk: bool,
    /// Another entry in this plan targets the same destination
    pub intra_run: bool,
    /// Source and destination are the same file
    pub no_op: bool,
}

impl PlanEntry {
    pub fn new(source: PathBuf, destination: PathBuf, kind: EntryKind) -> Self {
        Self {
            source,
            destination,
            kind,
            exists_on_disk: false,
            intra_run: false,
            no_op: false,
        }
    }

    pub fn is_collision(&self) -> bool {
        !self.no_op && (self.exists_on_disk || self.intra_run)
    }
}

/// Plan a destination for every track in the catalog.
pub fn plan(catalog: &Catalog, dest_root: &Path) -> Vec<PlanEntry> {
    flag_entries(track_entries(catalog, dest_root))
}

/// Plan tracks plus the sidecar files that travel with them.
pub fn plan_with_sidecars(catalog: &Catalog, dest_root: &Path) -> Vec<PlanEntry> {
    let mut entries = track_entries(catalog, dest_root);
    let sidecars = sidecar::sidecar_entries(&entries);
    entries.extend(sidecars);
    flag_entries(entries)
}

fn track_entries(catalog: &Catalog, dest_root: &Path) -> Vec<PlanEntry> {
    catalog
        .iter()
        .map(|track| PlanEntry::new(track.path.clone(), destination_for(track, dest_root), EntryKind::Track))
        .collect()
}

/// Compute the no-op and collision flags against the current filesystem.
pub(crate) fn flag_entries(mut entries: Vec<PlanEntry>) -> Vec<PlanEntry> {
    let mut claims: HashMap<PathBuf, usize> = HashMap::new();
    for entry in &entries {
        *claims.entry(entry.destination.clone()).or_default() += 1;
    }

    for entry in &mut entries {
        entry.no_op = same_file(&entry.source, &entry.destination);
        entry.exists_on_disk = !entry.no_op && path_exists(&entry.destination);
        entry.intra_run = claims.get(&entry.destination).copied().unwrap_or(0) > 1;
    }
    entries
}

/// True when anything (file, dir or dangling symlink) occupies `path`
fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Rewrite colliding destinations to the first free `stem (N).ext`.
///
/// The first entry claiming a destination that is free on disk keeps it.
/// Rewritten names are neither on disk nor claimed by any other entry.
pub fn disambiguate(entries: Vec<PlanEntry>) -> Vec<PlanEntry> {
    let mut claimed: HashSet<PathBuf> = entries
        .iter()
        .filter(|e| !e.is_collision())
        .map(|e| e.destination.clone())
        .collect();

    entries
        .into_iter()
        .map(|mut entry| {
            if !entry.is_collision() {
                return entry;
            }

            if entry.exists_on_disk || claimed.contains(&entry.destination) {
                let renamed = free_name(&entry.destination, &claimed);
                debug!(
                    target: "music_catalog::organizer",
                    from = %entry.destination.display(),
                    to = %renamed.display(),
                    "Disambiguated"
                );
                entry.destination = renamed;
            }

            claimed.insert(entry.destination.clone());
            entry.exists_on_disk = false;
            entry.intra_run = false;
            entry
        })
        .collect()
}

fn free_name(destination: &Path, claimed: &HashSet<PathBuf>) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = destination.extension().map(|e| e.to_string_lossy().into_owned());

    (1u32..)
        .map(|n| {
            let name = match &extension {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            };
            destination.with_file_name(name)
        })
        .find(|candidate| !path_exists(candidate) && !claimed.contains(candidate))
        .unwrap_or_else(|| destination.to_path_buf())
}

/// How executed entries treat their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Move,
    Copy,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::Move => "move",
            Action::Copy => "copy",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Perform the operations; without it nothing on disk changes
    pub apply: bool,
    pub action: Action,
}

/// Per-entry file operation failures. Only that entry is skipped.
#[derive(Debug, thiserror::Error)]
pub enum FileOpError {
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("destination appeared before writing: {}", path.display())]
    DestinationExists { path: PathBuf },

    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("copied to destination but failed to remove source {}: {source}", path.display())]
    RemoveSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What happened to one entry.
#[derive(Debug)]
pub enum EntryOutcome {
    /// Would be performed with `apply`
    Planned(Action),
    Performed(Action),
    NoOp,
    /// Blocked by a collision flag
    Collision,
    Failed(FileOpError),
}

#[derive(Debug)]
pub struct EntryReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: EntryKind,
    pub outcome: EntryOutcome,
}

/// Per-entry outcomes of an organize run.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    pub entries: Vec<EntryReport>,
}

impl OrganizeReport {
    fn count(&self, pred: impl Fn(&EntryReport) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(e)).count()
    }

    pub fn performed(&self) -> usize {
        self.count(|e| matches!(e.outcome, EntryOutcome::Performed(_)))
    }

    pub fn planned(&self) -> usize {
        self.count(|e| matches!(e.outcome, EntryOutcome::Planned(_)))
    }

    pub fn no_ops(&self) -> usize {
        self.count(|e| matches!(e.outcome, EntryOutcome::NoOp))
    }

    pub fn collisions(&self) -> usize {
        self.count(|e| matches!(e.outcome, EntryOutcome::Collision))
    }

    pub fn failures(&self) -> usize {
        self.count(|e| matches!(e.outcome, EntryOutcome::Failed(_)))
    }

    /// Sidecar files actually moved or copied
    pub fn sidecars_carried(&self) -> usize {
        self.count(|e| e.kind == EntryKind::Sidecar && matches!(e.outcome, EntryOutcome::Performed(_)))
    }

    /// Warning lines for collisions and failures
    pub fn warnings(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| match &e.outcome {
                EntryOutcome::Collision => Some(format!(
                    "collision: {} -> {}",
                    e.source.display(),
                    e.destination.display()
                )),
                EntryOutcome::Failed(err) => Some(format!("failed: {}: {err}", e.source.display())),
                _ => None,
            })
            .collect()
    }
}

/// Execute (or preview) a plan, one entry at a time.
///
/// Collisions and no-ops are reported, never performed. A failing entry is
/// recorded and the batch continues.
pub fn execute(entries: &[PlanEntry], options: ExecuteOptions) -> OrganizeReport {
    let mut report = OrganizeReport::default();

    for entry in entries {
        let outcome = if entry.no_op {
            EntryOutcome::NoOp
        } else if entry.is_collision() {
            warn!(
                target: "music_catalog::organizer",
                source = %entry.source.display(),
                destination = %entry.destination.display(),
                exists_on_disk = entry.exists_on_disk,
                intra_run = entry.intra_run,
                "Collision, skipping"
            );
            EntryOutcome::Collision
        } else if !options.apply {
            EntryOutcome::Planned(options.action)
        } else {
            match perform(entry, options.action) {
                Ok(()) => {
                    info!(
                        target: "music_catalog::organizer",
                        action = %options.action,
                        source = %entry.source.display(),
                        destination = %entry.destination.display(),
                        "Organized"
                    );
                    EntryOutcome::Performed(options.action)
                }
                Err(e) => {
                    warn!(target: "music_catalog::organizer", error = %e, "Organize failed");
                    EntryOutcome::Failed(e)
                }
            }
        };

        report.entries.push(EntryReport {
            source: entry.source.clone(),
            destination: entry.destination.clone(),
            kind: entry.kind,
            outcome,
        });
    }

    report
}

fn perform(entry: &PlanEntry, action: Action) -> Result<(), FileOpError> {
    let (source, destination) = (&entry.source, &entry.destination);

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|source| FileOpError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // The plan is from the past; never overwrite what appeared since
    if path_exists(destination) {
        return Err(FileOpError::DestinationExists {
            path: destination.clone(),
        });
    }

    match action {
        Action::Copy => copy_new(source, destination),
        Action::Move => move_new(source, destination),
    }
}

/// Move `from` to a destination that must not exist yet.
///
/// `rename` silently replaces an existing destination on Unix, so a
/// same-device move links the new name first; the link fails with
/// `AlreadyExists` instead of overwriting. Across devices (or on filesystems
/// without hard links) it falls back to an exclusive copy plus delete.
fn move_new(from: &Path, to: &Path) -> Result<(), FileOpError> {
    match fs::hard_link(from, to) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(FileOpError::DestinationExists { path: to.to_path_buf() });
        }
        Err(e) => {
            debug!(target: "music_catalog::organizer", error = %e, "Hard link failed, copying");
            copy_new(from, to)?;
        }
    }

    fs::remove_file(from).map_err(|source| FileOpError::RemoveSource {
        path: from.to_path_buf(),
        source,
    })
}

/// Copy `from` to a destination that must not exist yet.
fn copy_new(from: &Path, to: &Path) -> Result<(), FileOpError> {
    let copy_err = |source| FileOpError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let mut reader = fs::File::open(from).map_err(copy_err)?;
    let mut writer = match OpenOptions::new().write(true).create_new(true).open(to) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(FileOpError::DestinationExists { path: to.to_path_buf() });
        }
        Err(e) => return Err(copy_err(e)),
    };

    if let Err(e) = io::copy(&mut reader, &mut writer) {
        drop(writer);
        let _ = fs::remove_file(to);
        return Err(copy_err(e));
    }

    if let Ok(meta) = reader.metadata() {
        let _ = fs::set_permissions(to, meta.permissions());
    }
    Ok(())
}
