/*!
 * Pure timeline computations.
 *
 * Everything in this module is synchronous and side-effect free: value types
 * in, new value types out. File and process I/O stay in the boundary modules
 * (`caption_processor`, `media_utils`) so the timeline math can be tested
 * without touching a video file.
 */

pub mod interval;
pub mod cut_plan;
pub mod rebase;

pub use interval::{Interval, merge_intervals};
pub use cut_plan::{CutPlan, CutSegment};
pub use rebase::rebase_entries;
