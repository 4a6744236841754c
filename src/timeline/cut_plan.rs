use std::fmt;

use crate::timeline::interval::Interval;

// @module: Extraction and concatenation planning

/// One extraction instruction against the source timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutSegment {
    /// Where extraction starts in the source, in ms
    pub source_start_ms: u64,

    /// Where extraction ends in the source, in ms
    pub source_end_ms: u64,
}

impl CutSegment {
    /// Length of the extracted segment in ms
    pub fn duration_ms(&self) -> u64 {
        self.source_end_ms.saturating_sub(self.source_start_ms)
    }

    /// Whether this segment extracts nothing
    pub fn is_empty(&self) -> bool {
        self.source_start_ms == self.source_end_ms
    }
}

impl fmt::Display for CutSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms..{}ms", self.source_start_ms, self.source_end_ms)
    }
}

/// Ordered list of extraction instructions. Segment order is also the
/// concatenation order for the assembled output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutPlan {
    /// Extraction instructions in output order
    pub segments: Vec<CutSegment>,
}

impl CutPlan {
    /// Derive a plan from a merged interval set, one segment per interval.
    ///
    /// Zero-length intervals are kept so the plan stays 1:1 with the merged
    /// set; the media boundary decides whether to skip them at extraction
    /// time.
    pub fn from_merged(merged: &[Interval]) -> Self {
        let segments = merged
            .iter()
            .map(|iv| CutSegment {
                source_start_ms: iv.start_ms,
                source_end_ms: iv.end_ms,
            })
            .collect();

        CutPlan { segments }
    }

    /// Number of planned segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the plan has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Duration of the assembled output: the sum of segment durations
    pub fn total_duration_ms(&self) -> u64 {
        self.segments.iter().map(|s| s.duration_ms()).sum()
    }
}

impl fmt::Display for CutPlan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Cut plan: {} segment(s), {}ms total",
            self.len(),
            self.total_duration_ms()
        )?;
        for (idx, segment) in self.segments.iter().enumerate() {
            writeln!(f, "  {}: {}", idx, segment)?;
        }
        Ok(())
    }
}
