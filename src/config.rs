//! Dataset configuration
//!
//! Describes where the audio and annotations live. Loadable from JSON so a
//! training setup can be checked into a repository next to its code.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::annotations::AnnotationFormat;
use crate::dataset::{TutSedDataset, ValidationMode};
use crate::error::{Result, TutSedError};

/// Everything needed to open a [`TutSedDataset`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Flat directory holding the merged audio files
    pub audio_dir: PathBuf,
    /// Annotation file (raw meta.txt or processed CSV)
    pub annotations: PathBuf,
    /// Annotation layout
    #[serde(default)]
    pub format: AnnotationFormat,
    /// Up-front validation of audio references
    #[serde(default)]
    pub validation: ValidationMode,
}

impl DatasetConfig {
    /// Create a config with default format detection and no validation
    pub fn new(audio_dir: impl Into<PathBuf>, annotations: impl Into<PathBuf>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
            annotations: annotations.into(),
            format: AnnotationFormat::Auto,
            validation: ValidationMode::Off,
        }
    }

    /// Load a config from a JSON file
    ///
    /// Relative paths inside the file are resolved against the file's
    /// directory.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| TutSedError::Config {
            reason: format!("cannot open {}: {}", path.display(), e),
        })?;
        let mut config: DatasetConfig = serde_json::from_reader(BufReader::new(file))?;

        if let Some(base) = path.parent() {
            config.audio_dir = base.join(&config.audio_dir);
            config.annotations = base.join(&config.annotations);
        }
        Ok(config)
    }

    /// Build the dataset this config describes
    pub fn open(&self) -> Result<TutSedDataset> {
        TutSedDataset::builder(&self.audio_dir)
            .annotations_path(&self.annotations)
            .format(self.format)
            .validation(self.validation)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_json_file_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        fs::write(
            &path,
            r#"{"audio_dir": "audio_merged", "annotations": "meta/meta.txt", "validation": "exists"}"#,
        )
        .unwrap();

        let config = DatasetConfig::from_json_file(&path).unwrap();

        assert_eq!(config.audio_dir, dir.path().join("audio_merged"));
        assert_eq!(config.annotations, dir.path().join("meta/meta.txt"));
        assert_eq!(config.format, AnnotationFormat::Auto);
        assert_eq!(config.validation, ValidationMode::Exists);
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        fs::write(
            &path,
            r#"{"audio_dir": "/data/audio", "annotations": "/data/meta.csv", "format": "processed_csv"}"#,
        )
        .unwrap();

        let config = DatasetConfig::from_json_file(&path).unwrap();
        assert_eq!(config.audio_dir, PathBuf::from("/data/audio"));
        assert_eq!(config.format, AnnotationFormat::ProcessedCsv);
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        fs::write(&path, "{ not json").unwrap();

        let err = DatasetConfig::from_json_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_open_builds_dataset() {
        let dir = tempdir().unwrap();
        let meta = dir.path().join("meta.txt");
        fs::write(&meta, "a.wav\tstreet\t0.0\t1.0\tcar\ta\tm\n").unwrap();

        let dataset = DatasetConfig::new(dir.path(), &meta).open().unwrap();
        assert_eq!(dataset.annotations().len(), 1);
    }
}
