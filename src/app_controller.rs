use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::caption_processor::CaptionCollection;
use crate::file_utils::FileManager;
use crate::media_utils;
use crate::timeline::{CutPlan, merge_intervals};

// @module: Application controller for the cut-and-rebase pipeline

/// One unit of batch work: a source video and its caption table
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Source video file
    pub video_path: PathBuf,

    /// Caption table (`text,startMs,endMs`) aligned with the video
    pub captions_path: PathBuf,
}

/// Main application controller for cutting videos down to their selected
/// caption spans and rebasing the caption table onto the cut timeline
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Run the pipeline for a single video and caption table.
    ///
    /// Steps: load captions, derive candidate cut windows from their timing,
    /// merge the windows into a canonical interval set, plan the cuts, have
    /// ffmpeg extract and concatenate the segments, then rebase the caption
    /// table onto the cut output's timeline and persist it next to the video.
    pub async fn run(&self, item: &WorkItem, force_overwrite: bool) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        if !item.video_path.exists() {
            return Err(anyhow::anyhow!(
                "Input video does not exist: {:?}",
                item.video_path
            ));
        }

        if !item.captions_path.exists() {
            return Err(anyhow::anyhow!(
                "Caption table does not exist: {:?}",
                item.captions_path
            ));
        }

        FileManager::ensure_dir(&self.config.output_dir)?;

        let cut_video_path = FileManager::generate_output_path(
            &item.video_path,
            &self.config.output_dir,
            &self.config.cut_suffix,
            "mp4",
        );
        let rebased_table_path = FileManager::generate_output_path(
            &item.captions_path,
            &self.config.output_dir,
            &self.config.rebased_suffix,
            "csv",
        );

        if cut_video_path.exists() && rebased_table_path.exists() && !force_overwrite {
            // Skip if both outputs already exist and no force flag
            warn!(
                "Skipping {:?}, outputs already exist (use -f to force overwrite)",
                item.video_path
            );
            return Ok(());
        }

        if force_overwrite && cut_video_path.exists() {
            std::fs::remove_file(&cut_video_path)
                .with_context(|| format!("Failed to remove {:?}", cut_video_path))?;
        }

        // Load the caption table; a malformed row aborts this item with
        // file and row context so the batch loop can skip and continue
        let captions = CaptionCollection::read_from_csv(&item.captions_path)?;
        if captions.is_empty() {
            return Err(anyhow::anyhow!(
                "Caption table has no entries: {:?}",
                item.captions_path
            ));
        }

        // Candidate windows come from caption timing; merging consolidates
        // overlapping and touching spans into the canonical cut list
        let merged = merge_intervals(captions.to_intervals());
        let plan = CutPlan::from_merged(&merged);
        info!(
            "{} caption entries -> {} merged interval(s), {}ms planned output",
            captions.len(),
            plan.len(),
            plan.total_duration_ms()
        );

        media_utils::cut_video(
            &item.video_path,
            &plan,
            &cut_video_path,
            self.config.skip_empty_segments,
            self.config.ffmpeg_timeout_secs,
        )
        .await?;

        // Rebase the captions onto the cut output's own timeline and persist
        // them in the same table shape for the frame-rendering stage
        let rebased = captions.rebased();
        rebased.write_to_csv(&rebased_table_path)?;
        info!("Rebased caption table written to {:?}", rebased_table_path);

        self.check_cut_output(&cut_video_path, &plan).await;

        let elapsed = start_time.elapsed();
        info!(
            "Finished {:?} in {}",
            item.video_path,
            Self::format_duration(elapsed)
        );

        Ok(())
    }

    /// Compare the cut output's probed duration against the plan. Purely
    /// informational, a probe failure never fails the pipeline run.
    async fn check_cut_output(&self, cut_video_path: &Path, plan: &CutPlan) {
        match media_utils::probe_video(cut_video_path, self.config.probe_timeout_secs).await {
            Ok(video_info) => {
                debug!(
                    "Cut output: {}ms at {:.3} fps ({} frames), planned {}ms",
                    video_info.duration_ms,
                    video_info.fps,
                    video_info.frame_count,
                    plan.total_duration_ms()
                );

                // Stream-copy cuts land on keyframes, so some drift is normal
                let planned = plan.total_duration_ms() as i64;
                let actual = video_info.duration_ms as i64;
                if (planned - actual).abs() > 2_000 {
                    warn!(
                        "Cut output duration {}ms deviates from planned {}ms",
                        actual, planned
                    );
                }
            }
            Err(e) => {
                debug!("Could not probe cut output {:?}: {}", cut_video_path, e);
            }
        }
    }

    /// Run the pipeline over a batch of work items.
    ///
    /// One failed item must not abort the batch: errors are logged with the
    /// failing file and the loop continues. Returns an error only when every
    /// item failed.
    pub async fn run_batch(&self, items: &[WorkItem], force_overwrite: bool) -> Result<()> {
        if items.is_empty() {
            return Err(anyhow::anyhow!("No work items to process"));
        }

        // Start timing the process
        let start_time = std::time::Instant::now();

        let progress = ProgressBar::new(items.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} videos ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(template_result.progress_chars("█▓▒░"));
        progress.set_message("Processing videos");

        // Track success and failure counts
        let mut success_count = 0;
        let mut error_count = 0;

        for item in items {
            let file_name = item
                .video_path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            progress.set_message(format!("Processing: {}", file_name));

            match self.run(item, force_overwrite).await {
                Ok(()) => {
                    success_count += 1;
                }
                Err(e) => {
                    error!("Error processing {}: {:#}", file_name, e);
                    error_count += 1;
                }
            }

            progress.inc(1);
        }

        progress.finish_with_message("Batch processing complete");

        let duration = start_time.elapsed();

        // Give summary results - important for batch operations
        info!(
            "Batch completed: {} processed, {} errors in {}",
            success_count,
            error_count,
            Self::format_duration(duration)
        );

        if success_count == 0 {
            return Err(anyhow::anyhow!("All {} work items failed", error_count));
        }

        Ok(())
    }

    /// Run the pipeline over every video in a directory that has a caption
    /// table next to it (same stem, .csv extension)
    pub async fn run_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<()> {
        if !input_dir.exists() {
            return Err(anyhow::anyhow!(
                "Input directory does not exist: {:?}",
                input_dir
            ));
        }

        // Find all video files in the directory (recursive)
        let mut video_files = FileManager::find_video_files(input_dir)?;
        video_files.sort();

        if video_files.is_empty() {
            return Err(anyhow::anyhow!(
                "No video files found in directory: {:?}",
                input_dir
            ));
        }

        let mut items = Vec::new();
        for video_path in video_files {
            match FileManager::caption_table_for_video(&video_path) {
                Some(captions_path) => items.push(WorkItem {
                    video_path,
                    captions_path,
                }),
                None => {
                    warn!("No caption table next to {:?}, skipping", video_path);
                }
            }
        }

        if items.is_empty() {
            return Err(anyhow::anyhow!(
                "No videos with caption tables found in {:?}",
                input_dir
            ));
        }

        self.run_batch(&items, force_overwrite).await
    }

    /// Format a duration for log output
    fn format_duration(duration: std::time::Duration) -> String {
        let total_secs = duration.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        if minutes > 0 {
            format!("{}m{:02}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
