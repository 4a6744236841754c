/*!
 * Error types for the shortsmith application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when loading or writing caption tables
#[derive(Error, Debug)]
pub enum CaptionError {
    /// A row in the caption table could not be parsed
    #[error("Malformed caption row {row}: {message}")]
    MalformedRow {
        /// 1-based data row number (header excluded)
        row: usize,
        /// What was wrong with the row
        message: String,
    },

    /// The table header is missing a required column
    #[error("Missing column '{0}' in caption table header")]
    MissingColumn(&'static str),

    /// An entry violated the start <= end invariant
    #[error("Invalid time range: start {start} > end {end}")]
    InvalidTimeRange {
        /// Start timestamp in ms
        start: u64,
        /// End timestamp in ms
        end: u64,
    },
}

/// Errors that can occur in the timeline core when a precondition is violated.
///
/// The CSV input path rejects inverted rows up front as
/// `CaptionError::InvalidTimeRange`, so this type is only reported for
/// intervals built programmatically by library consumers.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// An interval with start > end reached the merger
    #[error("Interval has start {start} after end {end}")]
    InvertedInterval {
        /// Start timestamp in ms
        start: u64,
        /// End timestamp in ms
        end: u64,
    },
}

/// Errors that can occur when driving ffmpeg/ffprobe
#[derive(Error, Debug)]
pub enum MediaError {
    /// The external command could not be spawned
    #[error("Failed to run {command}: {message}")]
    CommandFailed {
        /// Command name (ffmpeg or ffprobe)
        command: &'static str,
        /// Error message
        message: String,
    },

    /// The external command ran but exited with an error
    #[error("{command} exited with an error: {stderr}")]
    NonZeroExit {
        /// Command name
        command: &'static str,
        /// Filtered stderr output
        stderr: String,
    },

    /// The external command did not finish in time
    #[error("{command} timed out after {timeout_secs}s")]
    Timeout {
        /// Command name
        command: &'static str,
        /// Configured timeout
        timeout_secs: u64,
    },

    /// ffprobe output could not be interpreted
    #[error("Failed to parse ffprobe output: {0}")]
    ProbeParse(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from caption table handling
    #[error("Caption error: {0}")]
    Caption(#[from] CaptionError),

    /// Error from the timeline core
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// Error from media processing
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
