/*!
 * Tests for error types and conversions
 */

use shortsmith::errors::{AppError, CaptionError, MediaError, TimelineError};

#[test]
fn test_captionError_malformedRow_shouldDisplayRowAndMessage() {
    let error = CaptionError::MalformedRow {
        row: 7,
        message: "non-numeric 'startMs' value".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("row 7"));
    assert!(display.contains("startMs"));
}

#[test]
fn test_captionError_missingColumn_shouldDisplayColumnName() {
    let error = CaptionError::MissingColumn("endMs");
    let display = format!("{}", error);
    assert!(display.contains("Missing column"));
    assert!(display.contains("endMs"));
}

#[test]
fn test_captionError_invalidTimeRange_shouldDisplayBothEndpoints() {
    let error = CaptionError::InvalidTimeRange {
        start: 2000,
        end: 1000,
    };
    let display = format!("{}", error);
    assert!(display.contains("2000"));
    assert!(display.contains("1000"));
}

#[test]
fn test_timelineError_invertedInterval_shouldDisplayBothEndpoints() {
    let error = TimelineError::InvertedInterval {
        start: 500,
        end: 100,
    };
    let display = format!("{}", error);
    assert!(display.contains("500"));
    assert!(display.contains("100"));
}

#[test]
fn test_mediaError_timeout_shouldDisplayCommandAndSeconds() {
    let error = MediaError::Timeout {
        command: "ffmpeg",
        timeout_secs: 300,
    };
    let display = format!("{}", error);
    assert!(display.contains("ffmpeg"));
    assert!(display.contains("300"));
}

#[test]
fn test_mediaError_nonZeroExit_shouldDisplayFilteredStderr() {
    let error = MediaError::NonZeroExit {
        command: "ffprobe",
        stderr: "moov atom not found".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("ffprobe"));
    assert!(display.contains("moov atom not found"));
}

#[test]
fn test_appError_fromCaptionError_shouldWrapCorrectly() {
    let caption_error = CaptionError::MissingColumn("text");
    let app_error: AppError = caption_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Caption error"));
}

#[test]
fn test_appError_fromTimelineError_shouldWrapCorrectly() {
    let timeline_error = TimelineError::InvertedInterval { start: 10, end: 5 };
    let app_error: AppError = timeline_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Timeline error"));
}

#[test]
fn test_appError_fromMediaError_shouldWrapCorrectly() {
    let media_error = MediaError::ProbeParse("missing format.duration".to_string());
    let app_error: AppError = media_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Media error"));
}

#[test]
fn test_appError_fromIoError_shouldWrapAsFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let app_error: AppError = io_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("File error"));
    assert!(display.contains("File not found"));
}

#[test]
fn test_appError_fromAnyhowError_shouldWrapAsUnknown() {
    let anyhow_error = anyhow::anyhow!("Something went wrong");
    let app_error: AppError = anyhow_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Unknown error"));
    assert!(display.contains("Something went wrong"));
}

#[test]
fn test_captionError_debug_shouldBeImplemented() {
    let error = CaptionError::MissingColumn("text");
    let debug = format!("{:?}", error);
    assert!(debug.contains("MissingColumn"));
}
