//! tut-sed - TUT Sound Events 2017 dataset tools
//!
//! Loads the dataset's sound event annotations and serves (signal, label)
//! pairs by ordinal index for a training loop to consume.
//!
//! # Architecture
//!
//! - `annotations`: typed records parsed once into an immutable table
//! - `audio`: WAV decoding at the file's native sample rate
//! - `dataset`: the index-based adapter, signal transforms and validation
//! - `merge`: flattening the split audio archives with collision checks
//! - `config` / `cli`: JSON configuration and the `tut-sed` binary

pub mod annotations;
pub mod audio;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod merge;

pub use annotations::{AnnotationFormat, AnnotationRecord, AnnotationTable, EventClass};
pub use audio::AudioSample;
pub use config::DatasetConfig;
pub use dataset::{Dataset, SoundEventItem, TutSedDataset, ValidationMode};
pub use error::{Result, TutSedError};
