/*!
 * # shortsmith
 *
 * A Rust library for cutting long-form videos down to selected caption spans
 * and producing burned-caption-ready highlight clips.
 *
 * ## Features
 *
 * - Load time-aligned caption tables (`text,startMs,endMs`)
 * - Merge overlapping or touching time ranges into a canonical cut list
 * - Plan lossless ffmpeg segment extraction and concatenation
 * - Rebase caption timestamps onto the cut output's timeline
 * - Query all captions active at a timestamp (stacked captions supported)
 * - Batch processing across many videos with skip-and-continue semantics
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timeline`: The pure computational core:
 *   - `timeline::interval`: Interval type and merging
 *   - `timeline::cut_plan`: Extraction/concatenation planning
 *   - `timeline::rebase`: Gap-collapsing timestamp rebasing
 * - `caption_processor`: Caption table loading, lookup and persistence
 * - `media_utils`: ffmpeg/ffprobe boundary (cutting, concatenation, probing)
 * - `file_utils`: File system operations
 * - `app_config`: Configuration management
 * - `app_controller`: Pipeline orchestration and batch runs
 * - `errors`: Custom error types for the application
 *
 * The timeline core and the caption store are pure and immutable: rebasing
 * builds a new collection instead of mutating, and `active_at` lookups are
 * read-only, so parallel frame-rendering workers can share one collection
 * without synchronization.
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod caption_processor;
pub mod errors;
pub mod file_utils;
pub mod media_utils;
pub mod timeline;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, WorkItem};
pub use caption_processor::{CaptionCollection, CaptionEntry};
pub use errors::{AppError, CaptionError, MediaError, TimelineError};
pub use timeline::{CutPlan, CutSegment, Interval, merge_intervals, rebase_entries};
