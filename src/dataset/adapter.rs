//! TUT-SED 2017 dataset adapter
//!
//! Maps an ordinal index to a (signal, label) pair. The annotation table is
//! loaded once at construction and never mutated; audio is decoded on every
//! fetch.
//!
//! Stored audio paths reflect the archive layout the annotations were
//! written against, so only their leaf filename is used. Every reference is
//! re-rooted onto the adapter's own audio directory.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::transform::SignalTransform;
use super::validation::{validate_table, ValidationMode, ValidationReport};
use super::Dataset;
use crate::annotations::{AnnotationFormat, AnnotationRecord, AnnotationTable};
use crate::audio::{load_audio, AudioSample};
use crate::error::{Result, TutSedError};

/// One fetched sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundEventItem {
    /// Decoded waveform at its native sample rate
    pub signal: AudioSample,
    /// Event label exactly as stored in the annotations
    pub label: String,
}

/// Join the leaf filename of `record` onto `audio_dir`
pub fn resolve_audio_path(audio_dir: &Path, record: &AnnotationRecord) -> PathBuf {
    audio_dir.join(record.file_name())
}

/// Index-based adapter over the TUT-SED 2017 annotations and audio
pub struct TutSedDataset {
    audio_dir: PathBuf,
    table: AnnotationTable,
    transform: Option<Box<dyn SignalTransform>>,
}

impl TutSedDataset {
    /// Load annotations from `annotations` and serve audio from `audio_dir`
    ///
    /// The annotation file is parsed eagerly; the audio directory is not
    /// inspected until a sample is fetched.
    ///
    /// # Errors
    /// * `AnnotationRead` - If the annotation file cannot be opened
    /// * `AnnotationParse` - If any annotation row is malformed
    pub fn new(
        audio_dir: impl Into<PathBuf>,
        annotations: impl AsRef<Path>,
        transform: Option<Box<dyn SignalTransform>>,
    ) -> Result<Self> {
        let mut builder = Self::builder(audio_dir).annotations_path(annotations.as_ref());
        if let Some(transform) = transform {
            builder = builder.boxed_transform(transform);
        }
        builder.build()
    }

    /// Start configuring a dataset rooted at `audio_dir`
    pub fn builder(audio_dir: impl Into<PathBuf>) -> TutSedDatasetBuilder {
        TutSedDatasetBuilder::new(audio_dir)
    }

    /// Directory audio files are resolved against
    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// The annotation table backing this dataset
    pub fn annotations(&self) -> &AnnotationTable {
        &self.table
    }

    /// True when a signal transform is configured
    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    /// Annotation row at `index`
    pub fn record(&self, index: usize) -> Result<&AnnotationRecord> {
        self.table.get(index).ok_or(TutSedError::IndexOutOfBounds {
            index,
            len: self.table.len(),
        })
    }

    /// Path of the audio file for `index`, re-rooted onto the audio directory
    pub fn resolve_audio_path(&self, index: usize) -> Result<PathBuf> {
        Ok(resolve_audio_path(&self.audio_dir, self.record(index)?))
    }

    /// Event label for `index`, unchanged
    pub fn label(&self, index: usize) -> Result<&str> {
        Ok(self.record(index)?.event_label.as_str())
    }

    /// Check every row's audio reference, collecting all failures
    pub fn validate(&self, mode: ValidationMode) -> ValidationReport {
        validate_table(&self.table, &self.audio_dir, mode)
    }
}

impl Dataset<SoundEventItem> for TutSedDataset {
    /// Decode the audio for `index` and pair it with its label
    ///
    /// # Errors
    /// * `IndexOutOfBounds` - If `index >= len()`
    /// * `AudioNotFound` - If the resolved audio file does not exist
    /// * `InvalidAudio` - If the file cannot be decoded
    /// * `Transform` - If the configured transform fails
    fn get(&self, index: usize) -> Result<SoundEventItem> {
        let path = self.resolve_audio_path(index)?;
        let label = self.label(index)?.to_string();

        let signal = load_audio(&path).map_err(|e| match e {
            TutSedError::AudioNotFound { path, .. } => TutSedError::AudioNotFound {
                path,
                index: Some(index),
            },
            other => other,
        })?;

        let signal = match &self.transform {
            Some(transform) => transform.apply(signal)?,
            None => signal,
        };

        debug!(
            "Fetched sample {} ({}, {} ch x {} frames @ {} Hz)",
            index,
            label,
            signal.num_channels(),
            signal.num_frames(),
            signal.sample_rate()
        );

        Ok(SoundEventItem { signal, label })
    }

    fn len(&self) -> usize {
        self.table.len()
    }
}

impl fmt::Debug for TutSedDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TutSedDataset")
            .field("audio_dir", &self.audio_dir)
            .field("rows", &self.table.len())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

enum AnnotationSource {
    Path(PathBuf),
    Table(AnnotationTable),
}

/// Configures and constructs a [`TutSedDataset`]
pub struct TutSedDatasetBuilder {
    audio_dir: PathBuf,
    source: Option<AnnotationSource>,
    format: AnnotationFormat,
    validation: ValidationMode,
    transform: Option<Box<dyn SignalTransform>>,
}

impl TutSedDatasetBuilder {
    /// Create a builder for `audio_dir`
    pub fn new(audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
            source: None,
            format: AnnotationFormat::Auto,
            validation: ValidationMode::Off,
            transform: None,
        }
    }

    /// Read annotations from a file
    pub fn annotations_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(AnnotationSource::Path(path.into()));
        self
    }

    /// Use an already loaded table
    pub fn annotations_table(mut self, table: AnnotationTable) -> Self {
        self.source = Some(AnnotationSource::Table(table));
        self
    }

    /// Layout of the annotation file (default: by extension)
    pub fn format(mut self, format: AnnotationFormat) -> Self {
        self.format = format;
        self
    }

    /// Validate every row at construction time (default: off)
    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    /// Apply `transform` to every fetched signal
    pub fn transform<T>(self, transform: T) -> Self
    where
        T: SignalTransform + 'static,
    {
        self.boxed_transform(Box::new(transform))
    }

    /// Apply an already boxed transform to every fetched signal
    pub fn boxed_transform(mut self, transform: Box<dyn SignalTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Load annotations and, if requested, validate them
    ///
    /// # Errors
    /// * `Config` - If no annotation source was given
    /// * `AnnotationRead` / `AnnotationParse` - If annotations cannot be loaded
    /// * `ValidationFailed` - If eager validation finds unusable rows
    pub fn build(self) -> Result<TutSedDataset> {
        let table = match self.source {
            Some(AnnotationSource::Path(path)) => AnnotationTable::from_path(&path, self.format)?,
            Some(AnnotationSource::Table(table)) => table,
            None => {
                return Err(TutSedError::Config {
                    reason: "no annotation source given".to_string(),
                })
            }
        };

        let dataset = TutSedDataset {
            audio_dir: self.audio_dir,
            table,
            transform: self.transform,
        };

        if self.validation != ValidationMode::Off {
            let report = dataset.validate(self.validation);
            if !report.is_ok() {
                return Err(TutSedError::ValidationFailed { report });
            }
        }

        info!(
            "Dataset ready: {} samples from {}",
            dataset.len(),
            dataset.audio_dir.display()
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ToMono;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write_wav(path: &Path, channels: u16, frames: usize, seed: i16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames * channels as usize {
            writer.write_sample(seed.wrapping_add(i as i16)).unwrap();
        }
        writer.finalize().unwrap();
    }

    /// Audio directory with `a.wav` (stereo) plus a raw meta.txt
    fn fixture() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let audio_dir = dir.path().join("audio_merged");
        fs::create_dir(&audio_dir).unwrap();
        write_wav(&audio_dir.join("a.wav"), 2, 441, 100);

        let meta = dir.path().join("meta.txt");
        fs::write(
            &meta,
            "/orig/audio1/a.wav\tstreet\t10.0\t12.5\tcar\t\t\n\
audio/street/a.wav\tstreet\t13.0\t14.0\tpeople walking\ta\tm\n\
audio/street/gone.wav\tstreet\t1.0\t2.0\tchildren\tgone\tm\n",
        )
        .unwrap();
        (dir, meta)
    }

    #[test]
    fn test_single_row_scenario() {
        let dir = tempdir().unwrap();
        write_wav(&dir.path().join("a.wav"), 1, 100, 7);
        let meta = dir.path().join("meta.txt");
        fs::write(&meta, "/orig/audio1/a.wav\tstreet\t10.0\t12.5\tcar\t\t\n").unwrap();

        let dataset = TutSedDataset::new(dir.path(), &meta, None).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.resolve_audio_path(0).unwrap(), dir.path().join("a.wav"));

        let item = dataset.get(0).unwrap();
        assert_eq!(item.label, "car");
        assert_eq!(item.signal.num_frames(), 100);
        assert_eq!(item.signal.sample_rate(), 44100);
    }

    #[test]
    fn test_len_ignores_directory_contents() {
        let (dir, meta) = fixture();
        let dataset = TutSedDataset::new(dir.path().join("nowhere"), &meta, None).unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_prefixes_resolve_to_same_file() {
        let (dir, meta) = fixture();
        let dataset = TutSedDataset::new(dir.path().join("audio_merged"), &meta, None).unwrap();

        assert_eq!(
            dataset.resolve_audio_path(0).unwrap(),
            dataset.resolve_audio_path(1).unwrap()
        );
        let first = dataset.get(0).unwrap();
        let second = dataset.get(1).unwrap();
        assert_eq!(first.signal, second.signal);
        assert_eq!(second.label, "people walking");
    }

    #[test]
    fn test_out_of_bounds_never_wraps() {
        let (dir, meta) = fixture();
        let dataset = TutSedDataset::new(dir.path().join("audio_merged"), &meta, None).unwrap();

        for index in [3, 4, usize::MAX] {
            match dataset.get(index).unwrap_err() {
                TutSedError::IndexOutOfBounds { index: i, len } => {
                    assert_eq!(i, index);
                    assert_eq!(len, 3);
                }
                other => panic!("Expected IndexOutOfBounds, got: {:?}", other),
            }
        }
    }

    #[test]
    fn test_missing_audio_fails_lazily() {
        let (dir, meta) = fixture();
        let dataset = TutSedDataset::new(dir.path().join("audio_merged"), &meta, None).unwrap();

        match dataset.get(2).unwrap_err() {
            TutSedError::AudioNotFound { path, index } => {
                assert!(path.ends_with("gone.wav"));
                assert_eq!(index, Some(2));
            }
            other => panic!("Expected AudioNotFound, got: {:?}", other),
        }
        assert!(dataset.get(0).is_ok());
    }

    #[test]
    fn test_eager_validation_fails_construction() {
        let (dir, meta) = fixture();
        let result = TutSedDataset::builder(dir.path().join("audio_merged"))
            .annotations_path(&meta)
            .validation(ValidationMode::Exists)
            .build();

        match result.unwrap_err() {
            TutSedError::ValidationFailed { report } => {
                assert_eq!(report.checked, 3);
                assert_eq!(report.issues.len(), 1);
                assert_eq!(report.issues[0].index, 2);
            }
            other => panic!("Expected ValidationFailed, got: {:?}", other),
        }
    }

    #[test]
    fn test_transform_is_applied() {
        let (dir, meta) = fixture();
        let dataset = TutSedDataset::builder(dir.path().join("audio_merged"))
            .annotations_path(&meta)
            .transform(ToMono)
            .build()
            .unwrap();

        assert!(dataset.has_transform());
        let item = dataset.get(0).unwrap();
        assert_eq!(item.signal.num_channels(), 1);
        assert_eq!(item.signal.num_frames(), 441);
    }

    #[test]
    fn test_repeated_fetch_is_identical() {
        let (dir, meta) = fixture();
        let dataset = TutSedDataset::new(dir.path().join("audio_merged"), &meta, None).unwrap();
        assert_eq!(dataset.get(0).unwrap(), dataset.get(0).unwrap());
    }

    #[test]
    fn test_builds_from_loaded_table() {
        let (dir, _) = fixture();
        let table = AnnotationTable::from_records(vec![
            AnnotationRecord::new("audio/street/a.wav", "street", 10.0, 12.5, "car"),
            AnnotationRecord::new("a.wav", "street", 13.0, 14.0, "children"),
        ]);

        let dataset = TutSedDataset::builder(dir.path().join("audio_merged"))
            .annotations_table(table)
            .validation(ValidationMode::Decodable)
            .build()
            .unwrap();

        assert_eq!(dataset.len(), 2);
        let item = dataset.get(1).unwrap();
        assert_eq!(item.label, "children");
        assert_eq!(item.signal.num_channels(), 2);
        assert_eq!(item.signal.num_frames(), 441);
    }

    #[test]
    fn test_loaded_table_is_still_validated() {
        let (dir, _) = fixture();
        let table = AnnotationTable::from_records(vec![
            AnnotationRecord::new("a.wav", "street", 0.0, 1.0, "car"),
            AnnotationRecord::new("gone.wav", "street", 1.0, 2.0, "car"),
        ]);

        let result = TutSedDataset::builder(dir.path().join("audio_merged"))
            .annotations_table(table)
            .validation(ValidationMode::Exists)
            .build();

        match result.unwrap_err() {
            TutSedError::ValidationFailed { report } => {
                assert_eq!(report.checked, 2);
                assert_eq!(report.issues.len(), 1);
                assert_eq!(report.issues[0].index, 1);
            }
            other => panic!("Expected ValidationFailed, got: {:?}", other),
        }
    }

    #[test]
    fn test_label_keeps_surrounding_whitespace() {
        let (dir, _) = fixture();
        let raw = "a.wav\tstreet\t1.0\t2.0\t car \ta\tm\n";
        let table = AnnotationTable::from_reader(raw.as_bytes(), AnnotationFormat::RawMeta).unwrap();

        let dataset = TutSedDataset::builder(dir.path().join("audio_merged"))
            .annotations_table(table)
            .build()
            .unwrap();

        assert_eq!(dataset.label(0).unwrap(), " car ");
        assert_eq!(dataset.get(0).unwrap().label, " car ");
    }

    #[test]
    fn test_builder_without_annotations() {
        let err = TutSedDataset::builder("audio").build().unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_malformed_annotations_fail_construction() {
        let dir = tempdir().unwrap();
        let meta = dir.path().join("meta.txt");
        fs::write(&meta, "a.wav\tstreet\n").unwrap();

        let err = TutSedDataset::new(dir.path(), &meta, None).unwrap_err();
        assert_eq!(err.error_code(), "ANNOTATION_PARSE");
    }
}
