//! Annotation Module
//!
//! Ground-truth sound event annotations:
//! - Typed annotation records
//! - The immutable annotation table and its parsers
//! - The closed set of event classes

pub mod class;
pub mod record;
pub mod table;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use class::EventClass;
pub use record::AnnotationRecord;
pub use table::{AnnotationTable, ANNOTATION_COLUMNS};

/// On-disk layout of an annotation file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationFormat {
    /// Pick by extension: `.txt` is raw, anything else is processed
    #[default]
    Auto,
    /// Tab-delimited `meta.txt` without a header, seven columns
    RawMeta,
    /// Comma-delimited CSV with a header row, five columns
    ProcessedCsv,
}

impl AnnotationFormat {
    /// Replace `Auto` with the concrete format for `path`
    pub fn resolve(self, path: &Path) -> AnnotationFormat {
        match self {
            AnnotationFormat::Auto => {
                let is_txt = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("txt"))
                    .unwrap_or(false);
                if is_txt {
                    AnnotationFormat::RawMeta
                } else {
                    AnnotationFormat::ProcessedCsv
                }
            }
            other => other,
        }
    }
}
