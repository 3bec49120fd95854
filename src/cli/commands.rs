//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};

use log::info;

use super::DatasetArgs;
use crate::annotations::{AnnotationFormat, AnnotationTable, EventClass};
use crate::audio::export_audio;
use crate::dataset::{Dataset, ToMono, TutSedDataset, ValidationMode};
use crate::error::{Result, TutSedError};
use crate::merge::{merge_audio_dirs, MergeMode, MergeOptions};

/// Merge split audio directories.
pub fn merge(sources: &[PathBuf], target: &Path, move_files: bool, dry_run: bool) -> Result<()> {
    info!("Merging {} source directories into {}", sources.len(), target.display());

    let options = MergeOptions {
        mode: if move_files {
            MergeMode::Move
        } else {
            MergeMode::Copy
        },
        dry_run,
    };
    let report = merge_audio_dirs(sources, target, options)?;

    if dry_run {
        println!("Dry run: nothing was written");
    }
    println!("Placed {} files in {}", report.placed.len(), report.target.display());
    if !report.duplicates.is_empty() {
        println!("Skipped {} identical duplicates:", report.duplicates.len());
        for duplicate in &report.duplicates {
            println!("  {}", duplicate.display());
        }
    }

    Ok(())
}

/// Convert a raw meta.txt into the processed CSV form.
pub fn prepare_meta(input: &Path, output: &Path) -> Result<()> {
    info!("Preparing annotations: {} -> {}", input.display(), output.display());

    let table = AnnotationTable::from_path(input, AnnotationFormat::RawMeta)?;
    table.write_processed_csv(output)?;

    println!("Wrote {} rows to {}", table.len(), output.display());
    Ok(())
}

/// Print dataset size, scenes and label counts.
pub fn info(args: &DatasetArgs) -> Result<()> {
    let dataset = args.to_config()?.open()?;
    let table = dataset.annotations();

    println!("There are {} samples in the dataset", dataset.len());
    println!("Audio directory: {}", dataset.audio_dir().display());
    println!("Scenes: {}", table.scenes().join(", "));
    println!("{:-<40}", "");

    for (label, count) in table.event_label_counts() {
        let marker = if label.parse::<EventClass>().is_ok() { " " } else { "?" };
        println!("{} {:<24} {:>6}", marker, label, count);
    }

    Ok(())
}

/// Fetch one sample and describe it.
pub fn get(index: usize, args: &DatasetArgs, mono: bool, output: Option<&Path>) -> Result<()> {
    let config = args.to_config()?;
    let mut builder = TutSedDataset::builder(&config.audio_dir)
        .annotations_path(&config.annotations)
        .format(config.format)
        .validation(config.validation);
    if mono {
        builder = builder.transform(ToMono);
    }
    let dataset = builder.build()?;

    let path = dataset.resolve_audio_path(index)?;
    let record = dataset.record(index)?;
    let item = dataset.get(index)?;

    println!("Index:       {}", index);
    println!("Audio file:  {}", path.display());
    println!("Label:       {}", item.label);
    println!("Event:       {:.3}s - {:.3}s", record.onset, record.offset);
    println!(
        "Signal:      {} ch x {} frames @ {} Hz ({:.2}s)",
        item.signal.num_channels(),
        item.signal.num_frames(),
        item.signal.sample_rate(),
        item.signal.duration_secs()
    );

    if let Some(output) = output {
        export_audio(&item.signal, output, 32)?;
        println!("Signal written to {}", output.display());
    }

    Ok(())
}

/// Validate every annotation row; fails when any row is unusable.
pub fn validate(args: &DatasetArgs, decode: bool) -> Result<()> {
    let config = args.to_config()?;
    let dataset = TutSedDataset::builder(&config.audio_dir)
        .annotations_path(&config.annotations)
        .format(config.format)
        .build()?;

    let mode = if decode {
        ValidationMode::Decodable
    } else {
        ValidationMode::Exists
    };
    let report = dataset.validate(mode);

    if report.is_ok() {
        println!("All {} rows resolve to usable audio", report.checked);
        return Ok(());
    }

    println!("Unusable rows:");
    for issue in &report.issues {
        println!("  {}", issue);
    }
    Err(TutSedError::ValidationFailed { report })
}
