//! Error handling for tut-sed
//!
//! Every error carries a stable code and, where it helps, recovery
//! suggestions for the person running the tool.

use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::validation::ValidationReport;

/// Result type alias for tut-sed operations
pub type Result<T> = std::result::Result<T, TutSedError>;

/// Main error type for tut-sed operations
#[derive(Error, Debug)]
pub enum TutSedError {
    // Annotation Errors
    #[error("Failed to read annotations at {path}: {source}")]
    AnnotationRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed annotations in {path} (line {line}): {reason}")]
    AnnotationParse {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    // Dataset Errors
    #[error("Index {index} out of bounds for dataset of {len} samples")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Audio file not found: {path}")]
    AudioNotFound {
        path: PathBuf,
        /// Annotation row that referenced the file, when known
        index: Option<usize>,
    },

    #[error("Invalid audio file {path}: {reason}")]
    InvalidAudio {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Signal transform failed: {reason}")]
    Transform { reason: String },

    #[error("{} of {} annotation rows reference unusable audio", .report.issues.len(), .report.checked)]
    ValidationFailed { report: ValidationReport },

    // Merge Errors
    #[error("Filename collision between differing files: {}", .names.join(", "))]
    FilenameCollision { names: Vec<String> },

    #[error("Source directory not found: {path}")]
    SourceDirNotFound { path: PathBuf },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // Library Errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TutSedError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            TutSedError::AnnotationRead { .. } => "ANNOTATION_READ",
            TutSedError::AnnotationParse { .. } => "ANNOTATION_PARSE",
            TutSedError::IndexOutOfBounds { .. } => "INDEX_OUT_OF_BOUNDS",
            TutSedError::AudioNotFound { .. } => "AUDIO_NOT_FOUND",
            TutSedError::InvalidAudio { .. } => "INVALID_AUDIO",
            TutSedError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            TutSedError::Transform { .. } => "TRANSFORM_ERROR",
            TutSedError::ValidationFailed { .. } => "VALIDATION_FAILED",
            TutSedError::FilenameCollision { .. } => "FILENAME_COLLISION",
            TutSedError::SourceDirNotFound { .. } => "SOURCE_DIR_NOT_FOUND",
            TutSedError::Config { .. } => "CONFIG_ERROR",
            TutSedError::Csv(_) => "CSV_ERROR",
            TutSedError::Json(_) => "SERIALIZATION_ERROR",
            TutSedError::Walk(_) => "WALK_ERROR",
            TutSedError::Io(_) => "IO_ERROR",
        }
    }

    /// Check if this error only affects a single sample.
    ///
    /// A training loop may skip the offending index and carry on; every
    /// other error means the dataset itself is unusable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TutSedError::IndexOutOfBounds { .. }
                | TutSedError::AudioNotFound { .. }
                | TutSedError::InvalidAudio { .. }
                | TutSedError::UnsupportedFormat { .. }
                | TutSedError::Transform { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TutSedError::AnnotationRead { .. } => vec![
                "Check the annotation path is correct",
                "Unzip the TUT-sound-events-2017-development.meta.zip archive first",
            ],
            TutSedError::AnnotationParse { .. } => vec![
                "Raw meta.txt files are tab-delimited without a header",
                "Processed CSV files need the header written by 'tut-sed prepare-meta'",
                "Pass the annotation format explicitly if the extension is misleading",
            ],
            TutSedError::AudioNotFound { .. } => vec![
                "Check the audio directory points at the merged audio folder",
                "Run 'tut-sed merge' to consolidate the split audio archives",
                "Run 'tut-sed validate' to list every missing file",
            ],
            TutSedError::InvalidAudio { .. } => vec![
                "The file may be truncated - re-extract it from the archive",
                "Only WAV audio is supported",
            ],
            TutSedError::ValidationFailed { .. } => vec![
                "Inspect the listed rows and restore the missing files",
                "Disable eager validation to fail lazily per sample instead",
            ],
            TutSedError::FilenameCollision { .. } => vec![
                "The source partitions contain different files with the same name",
                "Rename one side before merging to avoid silently losing audio",
            ],
            TutSedError::SourceDirNotFound { .. } => {
                vec!["Unzip both audio archives before merging"]
            }
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = TutSedError::IndexOutOfBounds { index: 3, len: 2 };
        assert_eq!(err.error_code(), "INDEX_OUT_OF_BOUNDS");
        assert_eq!(
            err.to_string(),
            "Index 3 out of bounds for dataset of 2 samples"
        );
    }

    #[test]
    fn test_recoverable_per_sample_errors() {
        let err = TutSedError::AudioNotFound {
            path: PathBuf::from("a.wav"),
            index: Some(0),
        };
        assert!(err.is_recoverable());
        assert!(!err.recovery_suggestions().is_empty());

        let err = TutSedError::FilenameCollision {
            names: vec!["a001.wav".to_string()],
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("a001.wav"));
    }
}
