//! Annotation Table
//!
//! Ordered, immutable collection of annotation records parsed from either
//! the dataset's raw `meta.txt` or the reduced processed CSV.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, info};

use super::record::AnnotationRecord;
use super::AnnotationFormat;
use crate::error::{Result, TutSedError};

/// Number of columns the adapter uses; raw files carry two more
pub const ANNOTATION_COLUMNS: usize = 5;

/// Ordered sequence of annotation records, indexed `0..len`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationTable {
    records: Vec<AnnotationRecord>,
}

impl AnnotationTable {
    /// Build a table from records already in memory
    pub fn from_records(records: Vec<AnnotationRecord>) -> Self {
        Self { records }
    }

    /// Read and parse an annotation file
    ///
    /// # Errors
    /// * `AnnotationRead` - If the file cannot be opened
    /// * `AnnotationParse` - If any row is malformed
    pub fn from_path(path: &Path, format: AnnotationFormat) -> Result<Self> {
        let format = format.resolve(path);
        let file = File::open(path).map_err(|source| TutSedError::AnnotationRead {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::parse(file, format, path)?;
        info!(
            "Loaded {} annotation rows from {} ({:?})",
            table.len(),
            path.display(),
            format
        );
        Ok(table)
    }

    /// Parse annotations from any reader
    ///
    /// `AnnotationFormat::Auto` is treated as the processed CSV form since
    /// there is no file extension to inspect.
    pub fn from_reader<R: Read>(reader: R, format: AnnotationFormat) -> Result<Self> {
        let format = match format {
            AnnotationFormat::Auto => AnnotationFormat::ProcessedCsv,
            other => other,
        };
        Self::parse(reader, format, Path::new("<reader>"))
    }

    fn parse<R: Read>(reader: R, format: AnnotationFormat, origin: &Path) -> Result<Self> {
        let mut builder = ReaderBuilder::new();
        builder.flexible(true);
        match format {
            AnnotationFormat::RawMeta => builder.delimiter(b'\t').has_headers(false),
            _ => builder.delimiter(b',').has_headers(true),
        };

        let mut records = Vec::new();
        for row in builder.from_reader(reader).records() {
            let row = row.map_err(|e| TutSedError::AnnotationParse {
                path: origin.to_path_buf(),
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            // Blank lines at the end of meta.txt come through as one empty field
            if row.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let record = parse_row(&row).map_err(|reason| TutSedError::AnnotationParse {
                path: origin.to_path_buf(),
                line,
                reason,
            })?;
            records.push(record);
        }

        debug!("Parsed {} rows from {}", records.len(), origin.display());
        Ok(Self { records })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the record at `index`
    pub fn get(&self, index: usize) -> Option<&AnnotationRecord> {
        self.records.get(index)
    }

    /// Iterate over records in row order
    pub fn iter(&self) -> std::slice::Iter<'_, AnnotationRecord> {
        self.records.iter()
    }

    /// Number of rows per event label, ordered by label
    pub fn event_label_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.event_label.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct scene labels, sorted
    pub fn scenes(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.scene.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Write the table in the processed five-column CSV form
    pub fn write_processed_csv(&self, path: &Path) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!(
            "Wrote {} annotation rows to {}",
            self.records.len(),
            path.display()
        );
        Ok(())
    }
}

impl<'a> IntoIterator for &'a AnnotationTable {
    type Item = &'a AnnotationRecord;
    type IntoIter = std::slice::Iter<'a, AnnotationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ============================================================================
// Row parsing
// ============================================================================

/// Convert one delimited row into a record, ignoring trailing columns
fn parse_row(row: &StringRecord) -> std::result::Result<AnnotationRecord, String> {
    if row.len() < ANNOTATION_COLUMNS {
        return Err(format!(
            "expected at least {} columns, found {}",
            ANNOTATION_COLUMNS,
            row.len()
        ));
    }

    // Text columns are stored verbatim; only the times are trimmed for parsing
    let field = |i: usize| row.get(i).unwrap_or_default();

    let audio_file = field(0);
    if audio_file.trim().is_empty() {
        return Err("empty audio file path".to_string());
    }

    let onset = parse_seconds(field(2).trim(), "onset")?;
    let offset = parse_seconds(field(3).trim(), "offset")?;

    if onset < 0.0 {
        return Err(format!("negative onset {}", onset));
    }
    if offset <= onset {
        return Err(format!("offset {} not after onset {}", offset, onset));
    }

    Ok(AnnotationRecord::new(
        audio_file,
        field(1),
        onset,
        offset,
        field(4),
    ))
}

fn parse_seconds(value: &str, column: &str) -> std::result::Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("{} '{}' is not a number", column, value))?;
    if !seconds.is_finite() {
        return Err(format!("{} '{}' is not finite", column, value));
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const RAW_META: &str = "audio/street/a001.wav\tstreet\t1.589213\t2.531484\tpeople walking\ta001\tm\n\
audio/street/a001.wav\tstreet\t10.0\t12.5\tcar\ta001\tm\n\
audio/street/b093.wav\tstreet\t0.5\t3.25\tbrakes squeaking\tb093\tm\n";

    #[test]
    fn test_parse_raw_meta_drops_trailing_columns() {
        let table = AnnotationTable::from_reader(RAW_META.as_bytes(), AnnotationFormat::RawMeta)
            .unwrap();

        assert_eq!(table.len(), 3);
        let first = table.get(0).unwrap();
        assert_eq!(first.audio_file, "audio/street/a001.wav");
        assert_eq!(first.scene, "street");
        assert_eq!(first.event_label, "people walking");
        assert!((first.onset - 1.589213).abs() < 1e-9);
    }

    #[test]
    fn test_raw_and_processed_forms_agree() {
        let dir = tempdir().unwrap();
        let raw_path = dir.path().join("meta.txt");
        let csv_path = dir.path().join("processed_metadata.csv");
        fs::write(&raw_path, RAW_META).unwrap();

        let raw = AnnotationTable::from_path(&raw_path, AnnotationFormat::Auto).unwrap();
        raw.write_processed_csv(&csv_path).unwrap();

        let contents = fs::read_to_string(&csv_path).unwrap();
        assert!(contents.starts_with("Audio file path,Scene,Onset,Offset,Event label"));

        let processed = AnnotationTable::from_path(&csv_path, AnnotationFormat::Auto).unwrap();
        assert_eq!(raw, processed);
    }

    #[test]
    fn test_too_few_columns_reports_line() {
        let data = "a.wav\tstreet\t1.0\t2.0\tcar\n\
b.wav\tstreet\t1.0\n";
        let err = AnnotationTable::from_reader(data.as_bytes(), AnnotationFormat::RawMeta)
            .unwrap_err();

        match err {
            TutSedError::AnnotationParse { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("at least 5 columns"));
            }
            other => panic!("Expected AnnotationParse, got: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_times() {
        let not_a_number = "a.wav\tstreet\tsoon\t2.0\tcar\n";
        assert!(
            AnnotationTable::from_reader(not_a_number.as_bytes(), AnnotationFormat::RawMeta)
                .is_err()
        );

        let negative = "a.wav\tstreet\t-1.0\t2.0\tcar\n";
        assert!(
            AnnotationTable::from_reader(negative.as_bytes(), AnnotationFormat::RawMeta).is_err()
        );

        let reversed = "a.wav\tstreet\t3.0\t2.0\tcar\n";
        assert!(
            AnnotationTable::from_reader(reversed.as_bytes(), AnnotationFormat::RawMeta).is_err()
        );
    }

    #[test]
    fn test_text_columns_kept_verbatim() {
        let data = " a b.wav\tstreet \t 1.0 \t2.0\t car \ta\tm\n";
        let table =
            AnnotationTable::from_reader(data.as_bytes(), AnnotationFormat::RawMeta).unwrap();

        let record = table.get(0).unwrap();
        assert_eq!(record.audio_file, " a b.wav");
        assert_eq!(record.file_name(), " a b.wav");
        assert_eq!(record.scene, "street ");
        assert_eq!(record.event_label, " car ");
        assert!((record.onset - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_skips_blank_lines() {
        let data = "a.wav\tstreet\t1.0\t2.0\tcar\n\n";
        let table =
            AnnotationTable::from_reader(data.as_bytes(), AnnotationFormat::RawMeta).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = AnnotationTable::from_path(
            Path::new("/nonexistent/meta.txt"),
            AnnotationFormat::Auto,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "ANNOTATION_READ");
    }

    #[test]
    fn test_label_counts_and_scenes() {
        let table = AnnotationTable::from_reader(RAW_META.as_bytes(), AnnotationFormat::RawMeta)
            .unwrap();

        let counts = table.event_label_counts();
        assert_eq!(counts.get("car"), Some(&1));
        assert_eq!(counts.get("people walking"), Some(&1));
        assert_eq!(table.scenes(), vec!["street"]);
    }
}
