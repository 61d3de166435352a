//! Sidecar files - cover art, cue sheets, playlists and notes kept next to tracks.
//!
//! Sidecars follow the tracks of their directory when organizing. The
//! sidecar-only mode moves them for libraries whose tracks were already
//! organized, guessing the destination from `Artist - Album` folder names.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{EntryKind, PlanEntry, flag_entries, sanitize};
use crate::scanner::{ScanError, is_apple_double, resolve_root};

/// Extensions (lowercase) of files that travel with tracks.
pub const SIDECAR_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff", "nfo", "cue", "txt", "m3u", "m3u8", "pdf",
];

pub fn is_sidecar(path: &Path) -> bool {
    if is_apple_double(path) {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SIDECAR_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

/// Sidecar files directly inside `dir`, sorted by name.
fn sidecars_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(target: "music_catalog::organizer", dir = %dir.display(), error = %e, "Cannot list sidecars");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .map(|e| e.path())
        .filter(|p| is_sidecar(p))
        .collect();
    files.sort();
    files
}

/// Entries carrying each track directory's sidecars to where its tracks go.
///
/// A source directory maps to the destination directory most of its tracks
/// target; ties go to the one seen first. The result is unflagged.
pub fn sidecar_entries(track_entries: &[PlanEntry]) -> Vec<PlanEntry> {
    // (source dir, [(destination dir, count)]) in plan order
    let mut dirs: Vec<(&Path, Vec<(&Path, usize)>)> = Vec::new();

    for entry in track_entries.iter().filter(|e| e.kind == EntryKind::Track) {
        let (Some(source_dir), Some(dest_dir)) = (entry.source.parent(), entry.destination.parent()) else {
            continue;
        };

        let index = match dirs.iter().position(|(dir, _)| *dir == source_dir) {
            Some(index) => index,
            None => {
                dirs.push((source_dir, Vec::new()));
                dirs.len() - 1
            }
        };
        let targets = &mut dirs[index].1;

        match targets.iter_mut().find(|(dir, _)| *dir == dest_dir) {
            Some((_, count)) => *count += 1,
            None => targets.push((dest_dir, 1)),
        }
    }

    let mut entries = Vec::new();
    for (source_dir, targets) in dirs {
        let Some(dest_dir) = majority(&targets) else {
            continue;
        };
        for file in sidecars_in(source_dir) {
            let Some(name) = file.file_name() else {
                continue;
            };
            let destination = dest_dir.join(name);
            entries.push(PlanEntry::new(file, destination, EntryKind::Sidecar));
        }
    }
    entries
}

/// Highest count wins, first seen on ties
fn majority<'a>(targets: &[(&'a Path, usize)]) -> Option<&'a Path> {
    let mut best: Option<(&Path, usize)> = None;
    for &(dir, count) in targets {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((dir, count));
        }
    }
    best.map(|(dir, _)| dir)
}

/// Split an `Artist - Album` folder name.
///
/// Trailing `(...)` and `[...]` groups (years, formats, editions) are
/// stripped from the album part.
pub fn parse_folder_name(name: &str) -> Option<(String, String)> {
    let (artist, album) = name.split_once(" - ")?;
    let artist = artist.trim();
    let album = strip_trailing_groups(album);
    if artist.is_empty() || album.is_empty() {
        return None;
    }
    Some((artist.to_string(), album.to_string()))
}

fn strip_trailing_groups(mut album: &str) -> &str {
    loop {
        album = album.trim();
        let open = match album.chars().last() {
            Some(')') => '(',
            Some(']') => '[',
            _ => return album,
        };
        match album.rfind(open) {
            Some(start) => album = &album[..start],
            _ => return album,
        }
    }
}

/// Existing destination folder for an `Artist - Album` directory name.
pub fn guess_destination_dir(dir_name: &str, dest_root: &Path) -> Option<PathBuf> {
    let (artist, album) = parse_folder_name(dir_name)?;
    let candidate = dest_root.join(sanitize(&artist)).join(sanitize(&album));
    candidate.is_dir().then_some(candidate)
}

/// Plan for the sidecar-only mode.
#[derive(Debug, Default)]
pub struct SidecarPlan {
    pub entries: Vec<PlanEntry>,
    /// Directories holding sidecars with no known destination
    pub warnings: Vec<String>,
}

/// Plan sidecar moves for every directory under `root`.
///
/// Directories inside `dest_root` are skipped (unless it is `root` itself),
/// so running this twice does not chase already-organized files.
pub fn plan_sidecars_only(root: &Path, dest_root: &Path) -> Result<SidecarPlan, ScanError> {
    let root = resolve_root(root)?;
    let dest_root = dest_root.canonicalize().unwrap_or_else(|_| dest_root.to_path_buf());

    let mut plan = SidecarPlan::default();
    let mut entries = Vec::new();

    // Organizing in place leaves nothing to skip
    let skip_dest = dest_root != root;
    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(skip_dest && e.file_type().is_dir() && e.path().starts_with(&dest_root)));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(target: "music_catalog::organizer", error = %e, "Walk error");
                plan.warnings.push(e.to_string());
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let sidecars = sidecars_in(entry.path());
        if sidecars.is_empty() {
            continue;
        }

        let dir_name = entry.file_name().to_string_lossy();
        let Some(dest_dir) = guess_destination_dir(&dir_name, &dest_root) else {
            warn!(target: "music_catalog::organizer", dir = %entry.path().display(), "No destination for sidecars");
            plan.warnings.push(format!("no destination for sidecars in {}", entry.path().display()));
            continue;
        };

        for file in sidecars {
            if let Some(name) = file.file_name() {
                let destination = dest_dir.join(name);
                entries.push(PlanEntry::new(file, destination, EntryKind::Sidecar));
            }
        }
    }

    plan.entries = flag_entries(entries);
    Ok(plan)
}
