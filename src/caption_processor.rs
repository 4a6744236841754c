use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, warn};

use crate::errors::CaptionError;
use crate::file_utils::FileManager;
use crate::timeline::{Interval, rebase_entries};

// @module: Caption table loading, lookup and persistence

// @const: Caption table column names, in file order
const COLUMN_TEXT: &str = "text";
const COLUMN_START_MS: &str = "startMs";
const COLUMN_END_MS: &str = "endMs";

// @struct: Single timed caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionEntry {
    // @field: Caption text
    pub text: String,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms (inclusive)
    pub end_ms: u64,
}

impl CaptionEntry {
    /// Creates a new caption entry without validation - used by the rebasing
    /// transform and by tests
    pub fn new(text: String, start_ms: u64, end_ms: u64) -> Self {
        CaptionEntry {
            text,
            start_ms,
            end_ms,
        }
    }

    // @creates: Validated caption entry
    // @validates: start <= end (zero-length entries are legal)
    pub fn new_validated(text: String, start_ms: u64, end_ms: u64) -> Result<Self> {
        if start_ms > end_ms {
            return Err(CaptionError::InvalidTimeRange {
                start: start_ms,
                end: end_ms,
            }
            .into());
        }

        Ok(CaptionEntry {
            text,
            start_ms,
            end_ms,
        })
    }

    /// Length of the entry in ms
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    /// Whether the entry is on screen at the given timestamp
    pub fn is_active_at(&self, timestamp_ms: u64) -> bool {
        self.start_ms <= timestamp_ms && timestamp_ms <= self.end_ms
    }

    /// The entry's time range as a candidate cut window
    pub fn to_interval(&self) -> Interval {
        Interval::new(self.start_ms, self.end_ms)
    }
}

impl fmt::Display for CaptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms..{}ms: {}", self.start_ms, self.end_ms, self.text)
    }
}

/// Ordered collection of caption entries tied to one timeline.
///
/// Entries keep their source-file order and may overlap in time: this system
/// deliberately supports stacked simultaneous captions, so lookups return
/// every active entry rather than the first match. A collection is built
/// once and never mutated afterwards; rebasing produces a second,
/// independent collection so the original timeline stays available.
#[derive(Debug, Clone)]
pub struct CaptionCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of caption entries
    pub entries: Vec<CaptionEntry>,
}

impl CaptionCollection {
    /// Create a collection from already-parsed entries
    pub fn from_entries(source_file: PathBuf, entries: Vec<CaptionEntry>) -> Self {
        CaptionCollection {
            source_file,
            entries,
        }
    }

    /// Load a caption table from a CSV file with header `text,startMs,endMs`
    pub fn read_from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)
            .with_context(|| format!("Failed to read caption table: {}", path.display()))?;

        let entries = Self::parse_csv_string(&content)
            .with_context(|| format!("Failed to parse caption table: {}", path.display()))?;

        debug!("Loaded {} caption entries from {}", entries.len(), path.display());

        Ok(CaptionCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Parse caption table content into entries.
    ///
    /// Timestamp fields are parsed as floating point and truncated to integer
    /// milliseconds: upstream producers emit values like "123.0" and this
    /// truncation is part of the format contract. Any malformed row fails the
    /// whole load — downstream timing math assumes a complete, valid set.
    pub fn parse_csv_string(content: &str) -> Result<Vec<CaptionEntry>> {
        let mut reader = ReaderBuilder::new().from_reader(content.as_bytes());

        let headers = reader.headers().context("Failed to read table header")?.clone();
        let text_ix = headers
            .iter()
            .position(|h| h == COLUMN_TEXT)
            .ok_or(CaptionError::MissingColumn(COLUMN_TEXT))?;
        let start_ix = headers
            .iter()
            .position(|h| h == COLUMN_START_MS)
            .ok_or(CaptionError::MissingColumn(COLUMN_START_MS))?;
        let end_ix = headers
            .iter()
            .position(|h| h == COLUMN_END_MS)
            .ok_or(CaptionError::MissingColumn(COLUMN_END_MS))?;

        let mut entries = Vec::new();

        for (row_ix, record) in reader.records().enumerate() {
            let row = row_ix + 1;
            let record = record
                .map_err(|e| CaptionError::MalformedRow {
                    row,
                    message: e.to_string(),
                })?;

            let text = record
                .get(text_ix)
                .ok_or_else(|| CaptionError::MalformedRow {
                    row,
                    message: format!("missing '{}' field", COLUMN_TEXT),
                })?
                .to_string();

            let start_ms = Self::parse_timestamp_ms(&record, start_ix, COLUMN_START_MS, row)?;
            let end_ms = Self::parse_timestamp_ms(&record, end_ix, COLUMN_END_MS, row)?;

            let entry = CaptionEntry::new_validated(text, start_ms, end_ms)
                .with_context(|| format!("Invalid caption row {}", row))?;
            entries.push(entry);
        }

        if entries.is_empty() {
            warn!("Caption table contains no entries");
        }

        Ok(entries)
    }

    /// Parse one timestamp field as float-then-truncate milliseconds
    fn parse_timestamp_ms(
        record: &csv::StringRecord,
        index: usize,
        column: &'static str,
        row: usize,
    ) -> Result<u64> {
        let raw = record
            .get(index)
            .ok_or_else(|| CaptionError::MalformedRow {
                row,
                message: format!("missing '{}' field", column),
            })?
            .trim();

        let value: f64 = raw.parse().map_err(|_| CaptionError::MalformedRow {
            row,
            message: format!("non-numeric '{}' value: {:?}", column, raw),
        })?;

        if !value.is_finite() || value < 0.0 {
            return Err(CaptionError::MalformedRow {
                row,
                message: format!("out-of-range '{}' value: {:?}", column, raw),
            }
            .into());
        }

        Ok(value as u64)
    }

    /// Write the collection back in the same three-column table shape, so a
    /// rebased table can be cached and the pipeline resumed without
    /// recomputation
    pub fn write_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut writer = WriterBuilder::new()
            .from_path(path)
            .with_context(|| format!("Failed to create caption table: {}", path.display()))?;

        writer.write_record([COLUMN_TEXT, COLUMN_START_MS, COLUMN_END_MS])?;
        for entry in &self.entries {
            writer.write_record([
                entry.text.clone(),
                entry.start_ms.to_string(),
                entry.end_ms.to_string(),
            ])?;
        }

        writer
            .flush()
            .with_context(|| format!("Failed to write caption table: {}", path.display()))?;

        Ok(())
    }

    /// Every entry active at the given timestamp, in collection order.
    ///
    /// Zero, one or many results are all expected; the frame renderer stacks
    /// simultaneous captions. Returning only the first match would drop
    /// stacked speaker lines, so this lookup never short-circuits. A linear
    /// scan is fine at target sizes (a few thousand entries per collection).
    pub fn active_at(&self, timestamp_ms: u64) -> Vec<&CaptionEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_active_at(timestamp_ms))
            .collect()
    }

    /// One candidate cut window per entry
    pub fn to_intervals(&self) -> Vec<Interval> {
        self.entries.iter().map(|e| e.to_interval()).collect()
    }

    /// Build a second, independent collection whose timestamps are valid
    /// against the cut output's timeline
    pub fn rebased(&self) -> CaptionCollection {
        CaptionCollection {
            source_file: self.source_file.clone(),
            entries: rebase_entries(&self.entries),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest end timestamp across all entries, 0 when empty
    pub fn span_end_ms(&self) -> u64 {
        self.entries.iter().map(|e| e.end_ms).max().unwrap_or(0)
    }
}

impl fmt::Display for CaptionCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Caption Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
