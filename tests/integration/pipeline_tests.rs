/*!
 * End-to-end tests for the cut-and-rebase pipeline.
 *
 * These tests exercise the full data flow (caption table -> merged intervals
 * -> cut plan -> rebased table) without invoking ffmpeg; the media boundary
 * itself is only tested for its ffmpeg-free behavior.
 */

use anyhow::Result;
use rand::Rng;
use shortsmith::app_config::Config;
use shortsmith::app_controller::{Controller, WorkItem};
use shortsmith::caption_processor::{CaptionCollection, CaptionEntry};
use shortsmith::media_utils;
use shortsmith::timeline::{CutPlan, merge_intervals};
use std::path::PathBuf;

use crate::common;

/// Test the full derive-merge-plan-rebase flow on a known table
#[test]
fn test_pipeline_withSampleTable_shouldProduceConsistentPlanAndRebase() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let table = common::create_test_caption_table(&dir, "sample.csv")?;

    let captions = CaptionCollection::read_from_csv(&table)?;
    let merged = merge_intervals(captions.to_intervals());
    let plan = CutPlan::from_merged(&merged);

    // first+second touch at 2000 and merge; the third stays apart
    assert_eq!(merged.len(), 2);
    assert_eq!(plan.total_duration_ms(), 2000 + 1000);

    let rebased = captions.rebased();
    assert_eq!(rebased.entries[0].start_ms, 0);
    assert_eq!(rebased.span_end_ms(), plan.total_duration_ms());

    Ok(())
}

/// Test the round-trip bound: rebased timestamps of contiguous caption runs
/// always land within the planned output duration
#[test]
fn test_pipeline_withRandomContiguousRuns_shouldKeepRebasedWithinPlannedDuration() {
    let mut rng = rand::rng();

    for _ in 0..50 {
        // Build transcript-shaped data: runs of touching entries separated
        // by genuine gaps, the way caption rows arrive from a transcript
        let mut entries = Vec::new();
        let mut cursor = rng.random_range(0..5_000u64);
        for run in 0..rng.random_range(1..6usize) {
            if run > 0 {
                cursor += rng.random_range(60_000..120_000u64);
            }
            for i in 0..rng.random_range(1..8usize) {
                let duration = rng.random_range(1..4_000u64);
                entries.push(CaptionEntry::new(
                    format!("r{}e{}", run, i),
                    cursor,
                    cursor + duration,
                ));
                cursor += duration;
            }
        }

        let collection = CaptionCollection::from_entries(PathBuf::from("test.csv"), entries);
        let merged = merge_intervals(collection.to_intervals());
        let plan = CutPlan::from_merged(&merged);
        let rebased = collection.rebased();

        let total = plan.total_duration_ms();
        for entry in &rebased.entries {
            assert!(
                entry.end_ms <= total,
                "rebased entry {} exceeds planned duration {}ms",
                entry,
                total
            );
        }
    }
}

/// Test that rebased captions answer lookups on the output timeline
#[test]
fn test_pipeline_withRebasedCollection_shouldAnswerFrameLookups() -> Result<()> {
    let entries = vec![
        CaptionEntry::new("intro".to_string(), 30_000, 32_000),
        CaptionEntry::new("overlap".to_string(), 31_000, 33_000),
        CaptionEntry::new("outro".to_string(), 90_000, 92_000),
    ];
    let collection = CaptionCollection::from_entries(PathBuf::from("test.csv"), entries);
    let rebased = collection.rebased();

    // Frame at 1.5s into the cut output sees both stacked lines
    let active = rebased.active_at(1_500);
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].text, "intro");
    assert_eq!(active[1].text, "overlap");

    // The outro follows immediately after the collapsed gap
    let active = rebased.active_at(3_500);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].text, "outro");

    Ok(())
}

/// Test that construction rejects an invalid configuration
#[test]
fn test_controller_withInvalidConfig_shouldFailConstruction() {
    let mut config = Config::default();
    config.ffmpeg_timeout_secs = 0;
    assert!(Controller::with_config(config).is_err());
}

/// Test that the controller skips ffmpeg work when outputs already exist
#[tokio::test]
async fn test_controller_run_withExistingOutputs_shouldSkipWithoutError() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let video = common::create_test_file(&dir, "talk.mp4", "fake video bytes")?;
    let table = common::create_test_caption_table(&dir, "talk.csv")?;

    let output_dir = dir.join("out");
    std::fs::create_dir_all(&output_dir)?;
    // Pre-create both outputs so the run never reaches ffmpeg
    std::fs::write(output_dir.join("talk.cut.mp4"), "already cut")?;
    std::fs::write(output_dir.join("talk.rebased.csv"), "text,startMs,endMs\n")?;

    let mut config = Config::default();
    config.output_dir = output_dir;
    let controller = Controller::with_config(config)?;

    let item = WorkItem {
        video_path: video,
        captions_path: table,
    };
    controller.run(&item, false).await?;

    Ok(())
}

/// Test that a pre-existing cut output lets the run finish the rebased table
/// without touching ffmpeg
#[tokio::test]
async fn test_controller_run_withExistingCutVideo_shouldWriteRebasedTable() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let video = common::create_test_file(&dir, "talk.mp4", "fake video bytes")?;
    let table = common::create_test_caption_table(&dir, "talk.csv")?;

    let output_dir = dir.join("out");
    std::fs::create_dir_all(&output_dir)?;
    // cut_video returns early when its output exists; the probe failure on
    // the fake file is informational only
    std::fs::write(output_dir.join("talk.cut.mp4"), "already cut")?;

    let mut config = Config::default();
    config.output_dir = output_dir.clone();
    let controller = Controller::with_config(config)?;

    let item = WorkItem {
        video_path: video,
        captions_path: table,
    };
    controller.run(&item, false).await?;

    let rebased = CaptionCollection::read_from_csv(output_dir.join("talk.rebased.csv"))?;
    assert_eq!(rebased.len(), 3);
    assert_eq!(rebased.entries[0].start_ms, 0);
    assert_eq!(rebased.entries[2].end_ms, 3000);

    Ok(())
}

/// Test that missing inputs fail a run with a useful error
#[tokio::test]
async fn test_controller_run_withMissingVideo_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let table = common::create_test_caption_table(&dir, "talk.csv")?;

    let mut config = Config::default();
    config.output_dir = dir.join("out");
    let controller = Controller::with_config(config)?;

    let item = WorkItem {
        video_path: dir.join("missing.mp4"),
        captions_path: table,
    };
    let err = controller.run(&item, false).await.unwrap_err();
    assert!(format!("{:#}", err).contains("does not exist"));

    Ok(())
}

/// Test batch semantics: a failing item does not abort the batch
#[tokio::test]
async fn test_controller_batch_withOneBadItem_shouldContinueAndSucceed() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    // Good item with pre-existing outputs (no ffmpeg needed)
    let good_video = common::create_test_file(&dir, "good.mp4", "fake")?;
    let good_table = common::create_test_caption_table(&dir, "good.csv")?;
    let output_dir = dir.join("out");
    std::fs::create_dir_all(&output_dir)?;
    std::fs::write(output_dir.join("good.cut.mp4"), "cut")?;
    std::fs::write(output_dir.join("good.rebased.csv"), "text,startMs,endMs\n")?;

    let mut config = Config::default();
    config.output_dir = output_dir;
    let controller = Controller::with_config(config)?;

    let items = vec![
        WorkItem {
            video_path: dir.join("missing.mp4"),
            captions_path: good_table.clone(),
        },
        WorkItem {
            video_path: good_video,
            captions_path: good_table,
        },
    ];

    // One of two items succeeds, so the batch as a whole succeeds
    controller.run_batch(&items, false).await?;

    Ok(())
}

/// Test that a batch where every item fails reports an error
#[tokio::test]
async fn test_controller_batch_withAllBadItems_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let mut config = Config::default();
    config.output_dir = dir.join("out");
    let controller = Controller::with_config(config)?;

    let items = vec![WorkItem {
        video_path: dir.join("missing.mp4"),
        captions_path: dir.join("missing.csv"),
    }];

    assert!(controller.run_batch(&items, false).await.is_err());
    assert!(controller.run_batch(&[], false).await.is_err());

    Ok(())
}

/// Test folder discovery rejects directories without usable work items
#[tokio::test]
async fn test_controller_folder_withNoVideos_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::new_for_test()?;

    assert!(
        controller
            .run_folder(temp_dir.path(), false)
            .await
            .is_err()
    );

    Ok(())
}

/// Test media boundary behavior that needs no ffmpeg binary
#[tokio::test]
async fn test_media_utils_withoutFfmpegWork_shouldHandleEdges() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    // Probing a missing file fails before any process is spawned
    assert!(
        media_utils::probe_video(dir.join("missing.mp4"), 5)
            .await
            .is_err()
    );

    // Concatenating nothing is an error
    assert!(media_utils::concat_segments(&[], dir.join("out.mp4"), 5).await.is_err());

    // An existing cut output short-circuits the whole cut
    let existing = common::create_test_file(&dir, "done.mp4", "bytes")?;
    let plan = CutPlan::from_merged(&[shortsmith::timeline::Interval::new(0, 1000)]);
    let result = media_utils::cut_video(dir.join("in.mp4"), &plan, existing.clone(), true, 5).await?;
    assert_eq!(result, existing);

    // An empty plan is rejected before any extraction
    assert!(
        media_utils::cut_video(dir.join("in.mp4"), &CutPlan::default(), dir.join("new.mp4"), true, 5)
            .await
            .is_err()
    );

    Ok(())
}
