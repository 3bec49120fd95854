//! Eager validation of annotation rows against the audio directory.
//!
//! Fetches fail lazily and per index. This pass checks every row up front
//! and collects all failures instead of stopping at the first one.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::adapter::resolve_audio_path;
use crate::annotations::AnnotationTable;
use crate::audio::read_audio_info;

/// How thoroughly rows are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// No up-front checks; failures surface on fetch
    #[default]
    Off,
    /// Every referenced file must exist
    Exists,
    /// Every referenced file must exist and have a readable WAV header
    Decodable,
}

/// A row whose audio reference cannot be used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    /// Annotation row index
    pub index: usize,
    /// Resolved audio path
    pub path: PathBuf,
    /// What went wrong
    pub reason: String,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {} ({})", self.index, self.path.display(), self.reason)
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of rows checked
    pub checked: usize,
    /// Every failing row, in row order
    pub issues: Vec<RowIssue>,
}

impl ValidationReport {
    /// True when every row resolved
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// Distinct failing paths, sorted
    pub fn unresolved_paths(&self) -> Vec<&Path> {
        self.issues
            .iter()
            .map(|issue| issue.path.as_path())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Check every row of `table` against `audio_dir`
///
/// Files shared by several rows are only inspected once.
pub fn validate_table(
    table: &AnnotationTable,
    audio_dir: &Path,
    mode: ValidationMode,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    if mode == ValidationMode::Off {
        return report;
    }

    let mut verdicts: HashMap<PathBuf, Option<String>> = HashMap::new();

    for (index, record) in table.iter().enumerate() {
        let path = resolve_audio_path(audio_dir, record);
        let verdict = verdicts
            .entry(path.clone())
            .or_insert_with(|| check_file(&path, mode))
            .clone();

        report.checked += 1;
        if let Some(reason) = verdict {
            let issue = RowIssue {
                index,
                path,
                reason,
            };
            warn!("Unusable annotation {}", issue);
            report.issues.push(issue);
        }
    }

    info!(
        "Validated {} rows against {}: {} issues across {} files",
        report.checked,
        audio_dir.display(),
        report.issues.len(),
        report.unresolved_paths().len()
    );
    report
}

fn check_file(path: &Path, mode: ValidationMode) -> Option<String> {
    if !path.is_file() {
        return Some("file not found".to_string());
    }
    if mode == ValidationMode::Decodable {
        if let Err(e) = read_audio_info(path) {
            return Some(e.to_string());
        }
    }
    None
}
