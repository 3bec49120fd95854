//! Annotation Record
//!
//! One labeled sound event from the dataset's ground truth.

use serde::{Deserialize, Serialize};

/// A single labeled sound event
///
/// Field names serialize to the column headers of the processed
/// metadata CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Audio file reference as stored in the annotation source
    #[serde(rename = "Audio file path")]
    pub audio_file: String,
    /// Recording environment (e.g. "street")
    #[serde(rename = "Scene")]
    pub scene: String,
    /// Event start in seconds
    #[serde(rename = "Onset")]
    pub onset: f64,
    /// Event end in seconds
    #[serde(rename = "Offset")]
    pub offset: f64,
    /// Sound event class name (e.g. "car")
    #[serde(rename = "Event label")]
    pub event_label: String,
}

impl AnnotationRecord {
    /// Create a new record
    pub fn new(
        audio_file: impl Into<String>,
        scene: impl Into<String>,
        onset: f64,
        offset: f64,
        event_label: impl Into<String>,
    ) -> Self {
        Self {
            audio_file: audio_file.into(),
            scene: scene.into(),
            onset,
            offset,
            event_label: event_label.into(),
        }
    }

    /// Leaf filename of the audio reference
    ///
    /// Both `/` and `\` count as separators since annotation files are
    /// shared across platforms.
    pub fn file_name(&self) -> &str {
        self.audio_file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.audio_file.as_str())
    }

    /// Event length in seconds
    pub fn duration(&self) -> f64 {
        self.offset - self.onset
    }
}
