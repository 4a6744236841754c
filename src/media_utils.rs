use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::errors::MediaError;
use crate::timeline::{CutPlan, CutSegment};

// @module: ffmpeg/ffprobe boundary for cutting and probing media

/// Basic stream facts about a video file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    /// Container duration in ms
    pub duration_ms: u64,

    /// Video frame rate
    pub fps: f64,

    /// Estimated frame count
    pub frame_count: u64,
}

/// Format an integer millisecond value as an ffmpeg seconds argument
fn ms_to_seconds_arg(ms: u64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}

/// Run an external command with a timeout, in the style used for all
/// ffmpeg/ffprobe invocations here
async fn run_with_timeout(
    name: &'static str,
    mut command: Command,
    timeout_secs: u64,
) -> Result<std::process::Output> {
    let future = command.output();

    let timeout_duration = std::time::Duration::from_secs(timeout_secs);
    let output = tokio::select! {
        result = future => {
            result.map_err(|e| MediaError::CommandFailed {
                command: name,
                message: e.to_string(),
            })?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(MediaError::Timeout { command: name, timeout_secs }.into());
        }
    };

    Ok(output)
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Chapter",
        "    Chapter",
        "  Stream #",
        "      Metadata:",
        "        title",
        "        BPS",
        "        DURATION",
        "        NUMBER_OF",
        "        _STATISTICS",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            !dominated_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

/// Probe duration, frame rate and frame count of a video file
pub async fn probe_video<P: AsRef<Path>>(video_path: P, timeout_secs: u64) -> Result<VideoInfo> {
    let video_path = video_path.as_ref();

    if !video_path.exists() {
        return Err(anyhow!("Video file not found: {:?}", video_path));
    }

    let mut command = Command::new("ffprobe");
    command.args([
        "-v",
        "quiet",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
        "-select_streams",
        "v:0",
        video_path.to_str().unwrap_or(""),
    ]);

    let output = run_with_timeout("ffprobe", command, timeout_secs).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("ffprobe failed: {}", stderr);
        return Err(MediaError::NonZeroExit {
            command: "ffprobe",
            stderr: stderr.to_string(),
        }
        .into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout)
        .map_err(|e| MediaError::ProbeParse(e.to_string()))?;

    let duration_secs: f64 = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse().ok())
        .ok_or_else(|| MediaError::ProbeParse("missing format.duration".to_string()))?;

    let stream = json
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|s| s.first())
        .ok_or_else(|| MediaError::ProbeParse("no video stream".to_string()))?;

    let fps = stream
        .get("r_frame_rate")
        .and_then(|r| r.as_str())
        .and_then(parse_frame_rate)
        .ok_or_else(|| MediaError::ProbeParse("missing r_frame_rate".to_string()))?;

    let duration_ms = (duration_secs * 1000.0) as u64;

    // nb_frames is not present in every container; estimate when absent
    let frame_count = stream
        .get("nb_frames")
        .and_then(|n| n.as_str())
        .and_then(|n| n.parse().ok())
        .unwrap_or_else(|| (duration_secs * fps) as u64);

    Ok(VideoInfo {
        duration_ms,
        fps,
        frame_count,
    })
}

/// Parse an ffprobe rational frame rate such as "30000/1001"
fn parse_frame_rate(raw: &str) -> Option<f64> {
    match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 { None } else { Some(num / den) }
        }
        None => raw.parse().ok(),
    }
}

/// Extract one planned segment losslessly (stream copy)
async fn extract_segment<P1: AsRef<Path>, P2: AsRef<Path>>(
    input: P1,
    output: P2,
    segment: &CutSegment,
    timeout_secs: u64,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let mut command = Command::new("ffmpeg");
    command.args([
        "-y",
        "-ss",
        &ms_to_seconds_arg(segment.source_start_ms),
        "-t",
        &ms_to_seconds_arg(segment.duration_ms()),
        "-i",
        input.to_str().unwrap_or_default(),
        "-c:v",
        "copy",
        "-c:a",
        "copy",
        output.to_str().unwrap_or_default(),
    ]);

    let result = run_with_timeout("ffmpeg", command, timeout_secs).await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("Segment extraction failed for {}: {}", segment, filtered);
        return Err(MediaError::NonZeroExit {
            command: "ffmpeg",
            stderr: filtered,
        }
        .into());
    }

    Ok(())
}

/// Extract every planned segment into numbered files next to the output.
///
/// Zero-length segments are skipped when `skip_empty_segments` is set: the
/// plan keeps them for traceability but ffmpeg rejects a zero `-t`.
pub async fn extract_segments<P: AsRef<Path>>(
    input: P,
    work_dir: P,
    plan: &CutPlan,
    skip_empty_segments: bool,
    timeout_secs: u64,
) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();
    let work_dir = work_dir.as_ref();

    let mut segment_files = Vec::with_capacity(plan.len());

    for (idx, segment) in plan.segments.iter().enumerate() {
        if segment.is_empty() && skip_empty_segments {
            warn!("Skipping zero-length segment {} ({})", idx, segment);
            continue;
        }

        let segment_file = work_dir.join(format!("segment_{:04}.mp4", idx));
        debug!("Extracting segment {} ({}) to {:?}", idx, segment, segment_file);
        extract_segment(input, &segment_file, segment, timeout_secs)
            .await
            .with_context(|| format!("Failed to extract segment {} ({})", idx, segment))?;
        segment_files.push(segment_file);
    }

    Ok(segment_files)
}

/// Concatenate extracted segments in order with the concat demuxer
pub async fn concat_segments<P: AsRef<Path>>(
    segment_files: &[PathBuf],
    output: P,
    timeout_secs: u64,
) -> Result<()> {
    let output = output.as_ref();

    if segment_files.is_empty() {
        return Err(anyhow!("No segments to concatenate"));
    }

    // Concat demuxer needs a list file; a tempfile keeps it out of the output dir
    let mut list_file = NamedTempFile::new().context("Failed to create concat list file")?;
    for file in segment_files {
        let absolute = file
            .canonicalize()
            .with_context(|| format!("Failed to resolve segment path: {:?}", file))?;
        writeln!(list_file, "file '{}'", absolute.display())?;
    }
    list_file.flush()?;

    let mut command = Command::new("ffmpeg");
    command.args([
        "-y",
        "-f",
        "concat",
        "-safe",
        "0",
        "-i",
        list_file.path().to_str().unwrap_or_default(),
        "-c",
        "copy",
        output.to_str().unwrap_or_default(),
    ]);

    let result = run_with_timeout("ffmpeg", command, timeout_secs).await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("Segment concatenation failed: {}", filtered);
        return Err(MediaError::NonZeroExit {
            command: "ffmpeg",
            stderr: filtered,
        }
        .into());
    }

    Ok(())
}

/// Cut a video down to the planned segments and assemble them into one file.
///
/// The extraction is a lossless stream copy, so the output duration equals
/// the sum of the planned segment durations. Returns early when the output
/// already exists so a resumed pipeline run does not redo the cut.
pub async fn cut_video<P1: AsRef<Path>, P2: AsRef<Path>>(
    input: P1,
    plan: &CutPlan,
    output: P2,
    skip_empty_segments: bool,
    timeout_secs: u64,
) -> Result<PathBuf> {
    let input = input.as_ref();
    let output = output.as_ref();

    if output.exists() {
        info!("Cut output already exists, skipping: {:?}", output);
        return Ok(output.to_path_buf());
    }

    if plan.is_empty() {
        return Err(anyhow!("Cut plan is empty, nothing to extract"));
    }

    let work_dir = tempfile::tempdir().context("Failed to create segment work directory")?;

    info!(
        "Cutting {:?}: {} segment(s), {}ms planned",
        input,
        plan.len(),
        plan.total_duration_ms()
    );

    let segment_files =
        extract_segments(input, work_dir.path(), plan, skip_empty_segments, timeout_secs).await?;

    concat_segments(&segment_files, output, timeout_secs).await?;

    // work_dir and the segment files are removed when the tempdir drops
    info!("Cut output written to {:?}", output);

    Ok(output.to_path_buf())
}
