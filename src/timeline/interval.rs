use std::fmt;

// @module: Time interval type and merging

/// A closed time range in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// Start time in ms
    pub start_ms: u64,

    /// End time in ms (inclusive)
    pub end_ms: u64,
}

impl Interval {
    /// Creates a new interval. Callers must uphold `start_ms <= end_ms`;
    /// inverted intervals are a contract violation and are never silently
    /// swapped here.
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Interval { start_ms, end_ms }
    }

    /// Length of the interval in ms
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Whether a timestamp falls inside the closed range
    pub fn contains(&self, timestamp_ms: u64) -> bool {
        self.start_ms <= timestamp_ms && timestamp_ms <= self.end_ms
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}..{}]", self.start_ms, self.end_ms)
    }
}

/// Consolidate an unordered list of intervals into the minimal sorted,
/// strictly disjoint cover of the same points.
///
/// Touching intervals merge: `[1000,2000]` and `[2000,3000]` become
/// `[1000,3000]`. Adjacent output intervals therefore always satisfy
/// `out[i].end_ms < out[i+1].start_ms`.
///
/// Precondition: every input interval has `start_ms <= end_ms`. Inverted
/// intervals are undefined behavior for this function; the caption-table
/// loader rejects them before they can get here.
pub fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    if intervals.is_empty() {
        return Vec::new();
    }

    intervals.sort_by_key(|iv| (iv.start_ms, iv.end_ms));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    merged.push(intervals[0]);

    for current in intervals.into_iter().skip(1) {
        // merged is never empty past the first push
        if let Some(last) = merged.last_mut() {
            // Overlapping or touching intervals extend the current run
            if current.start_ms <= last.end_ms {
                last.end_ms = last.end_ms.max(current.end_ms);
            } else {
                merged.push(current);
            }
        }
    }

    merged
}
