//! CLI Module
//!
//! Command-line interface for preparing and inspecting the TUT-SED 2017
//! dataset.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::annotations::AnnotationFormat;
use crate::config::DatasetConfig;
use crate::error::{Result, TutSedError};

/// TUT-SED 2017 dataset tools
#[derive(Parser, Debug)]
#[command(name = "tut-sed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge split audio directories into one flat directory
    #[command(name = "merge")]
    Merge {
        /// Source audio directories (searched recursively)
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Merged output directory
        #[arg(short, long)]
        target: PathBuf,

        /// Move files instead of copying them
        #[arg(long = "move")]
        move_files: bool,

        /// Only report what would happen
        #[arg(long)]
        dry_run: bool,
    },

    /// Convert a raw meta.txt into the five-column processed CSV
    #[command(name = "prepare-meta")]
    PrepareMeta {
        /// Raw tab-delimited annotation file
        input: PathBuf,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show dataset size, scenes and label counts
    #[command(name = "info")]
    Info {
        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// Fetch one sample by index
    #[command(name = "get")]
    Get {
        /// Sample index
        index: usize,

        #[command(flatten)]
        dataset: DatasetArgs,

        /// Downmix the signal to mono
        #[arg(long)]
        mono: bool,

        /// Write the fetched signal to a WAV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check every annotation row against the audio directory
    #[command(name = "validate")]
    Validate {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Also check that each file has a readable WAV header
        #[arg(long)]
        decode: bool,
    },
}

/// Annotation layout selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Auto,
    RawMeta,
    ProcessedCsv,
}

impl From<FormatArg> for AnnotationFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Auto => AnnotationFormat::Auto,
            FormatArg::RawMeta => AnnotationFormat::RawMeta,
            FormatArg::ProcessedCsv => AnnotationFormat::ProcessedCsv,
        }
    }
}

/// Where to find the dataset
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// JSON dataset config; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory of merged audio files
    #[arg(short, long)]
    pub audio_dir: Option<PathBuf>,

    /// Annotation file (meta.txt or processed CSV)
    #[arg(short = 'n', long)]
    pub annotations: Option<PathBuf>,

    /// Annotation layout
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

impl DatasetArgs {
    /// Combine the optional config file with command-line overrides
    pub fn to_config(&self) -> Result<DatasetConfig> {
        let mut config = match &self.config {
            Some(path) => Some(DatasetConfig::from_json_file(path)?),
            None => None,
        };

        let audio_dir = self
            .audio_dir
            .clone()
            .or_else(|| config.as_ref().map(|c| c.audio_dir.clone()));
        let annotations = self
            .annotations
            .clone()
            .or_else(|| config.as_ref().map(|c| c.annotations.clone()));

        let (audio_dir, annotations) = match (audio_dir, annotations) {
            (Some(a), Some(n)) => (a, n),
            _ => {
                return Err(TutSedError::Config {
                    reason: "both --audio-dir and --annotations (or --config) are required"
                        .to_string(),
                })
            }
        };

        let mut resolved = config
            .take()
            .unwrap_or_else(|| DatasetConfig::new(&audio_dir, &annotations));
        resolved.audio_dir = audio_dir;
        resolved.annotations = annotations;
        if let Some(format) = self.format {
            resolved.format = format.into();
        }
        Ok(resolved)
    }
}
