//! Audio Directory Merge
//!
//! The development set ships its audio in two archives that unpack into
//! separate directories. Annotations only reference files by name, so both
//! partitions are flattened into one directory before the dataset is used.
//!
//! Two different files sharing a name would make one of them unreachable and
//! pair its annotations with the wrong audio. Same-named files are compared by
//! content digest: identical copies are deduplicated, differing ones abort the
//! merge before anything is written.

pub mod digest;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Result, TutSedError};
use self::digest::file_digest;

/// Whether source files are copied or moved into the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Leave the sources untouched
    #[default]
    Copy,
    /// Move files, removing them from the sources
    Move,
}

/// Merge behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Copy or move
    pub mode: MergeMode,
    /// Plan and check collisions without touching the filesystem
    pub dry_run: bool,
}

/// What a merge did (or would do, for a dry run)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Merged directory
    pub target: PathBuf,
    /// Destination paths of placed files
    pub placed: Vec<PathBuf>,
    /// Source files skipped because an identical same-named file won
    pub duplicates: Vec<PathBuf>,
}

/// Flatten the WAV files of `sources` into `target`
///
/// Sources are searched recursively. Files already present in `target`
/// take part in collision checks.
///
/// # Errors
/// * `SourceDirNotFound` - If a source is not a directory
/// * `FilenameCollision` - If differing files share a name; nothing is written
pub fn merge_audio_dirs(
    sources: &[PathBuf],
    target: &Path,
    options: MergeOptions,
) -> Result<MergeReport> {
    let candidates = collect_candidates(sources, target)?;

    let mut report = MergeReport {
        target: target.to_path_buf(),
        ..MergeReport::default()
    };
    let mut plan: Vec<(PathBuf, PathBuf)> = Vec::new();
    let mut collisions = Vec::new();

    for (name, files) in &candidates {
        let dest = target.join(name);
        let existing = dest.is_file();

        if files.len() == 1 && !existing {
            plan.push((files[0].clone(), dest));
            continue;
        }

        // Every same-named file must be byte-identical
        let reference = if existing { dest.clone() } else { files[0].clone() };
        let reference_digest = file_digest(&reference)?;
        let mut identical = true;
        for file in files {
            if file_digest(file)? != reference_digest {
                identical = false;
                break;
            }
        }

        if !identical {
            warn!("Filename collision: {} differs across {:?}", name, files);
            collisions.push(name.clone());
            continue;
        }

        let mut rest = files.iter();
        if !existing {
            if let Some(first) = rest.next() {
                plan.push((first.clone(), dest));
            }
        }
        report.duplicates.extend(rest.cloned());
    }

    if !collisions.is_empty() {
        return Err(TutSedError::FilenameCollision { names: collisions });
    }

    if !options.dry_run {
        fs::create_dir_all(target)?;
        for (src, dest) in &plan {
            place_file(src, dest, options.mode)?;
        }
        if options.mode == MergeMode::Move {
            for duplicate in &report.duplicates {
                fs::remove_file(duplicate)?;
            }
        }
    }

    report.placed = plan.into_iter().map(|(_, dest)| dest).collect();

    info!(
        "{} {} files into {} ({} duplicates){}",
        match options.mode {
            MergeMode::Copy => "Copied",
            MergeMode::Move => "Moved",
        },
        report.placed.len(),
        target.display(),
        report.duplicates.len(),
        if options.dry_run { " [dry run]" } else { "" }
    );

    Ok(report)
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Group every WAV file under `sources` by leaf filename
fn collect_candidates(sources: &[PathBuf], target: &Path) -> Result<BTreeMap<String, Vec<PathBuf>>> {
    let mut candidates: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for source in sources {
        if !source.is_dir() {
            return Err(TutSedError::SourceDirNotFound {
                path: source.clone(),
            });
        }

        let walker = WalkDir::new(source)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !entry.path().starts_with(target));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_wav(entry.path()) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            debug!("Found {} in {}", name, source.display());
            candidates
                .entry(name)
                .or_default()
                .push(entry.into_path());
        }
    }

    Ok(candidates)
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

fn place_file(src: &Path, dest: &Path, mode: MergeMode) -> Result<()> {
    match mode {
        MergeMode::Copy => {
            fs::copy(src, dest)?;
        }
        MergeMode::Move => {
            if let Err(e) = fs::rename(src, dest) {
                // Rename fails across filesystems; fall back to copy + delete
                if e.kind() == io::ErrorKind::NotFound {
                    return Err(e.into());
                }
                fs::copy(src, dest)?;
                fs::remove_file(src)?;
            }
        }
    }
    Ok(())
}
