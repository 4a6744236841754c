use crate::caption_processor::CaptionEntry;

// @module: Timeline re-basing for cut-down output

/// Remap caption timestamps from the full-length source timeline onto the
/// shorter timeline of the physically cut output, collapsing the gaps that
/// the cut removed.
///
/// The fold walks the entries sorted by `(start, end)` and maintains an
/// accumulated offset `diff`, initialized to the first entry's start so that
/// the first entry anchors at zero. An entry whose start lies at or before
/// `diff + previous original end` is treated as contiguous with the previous
/// one and shifted by the same `diff`. An entry past that point sits behind a
/// removed gap: it is anchored directly after the previous entry's new end,
/// and the size of that gap is added to `diff` for the entries that follow.
/// Both branches keep `new_end == original_end - diff`, so every entry in a
/// run between two gaps shifts uniformly.
///
/// Each output entry keeps its text and its exact original duration; only
/// gaps between entries are removed, never time inside an entry. The input
/// slice is never mutated; callers get a fresh vector.
///
/// The caller is responsible for having cut the media with a merged interval
/// set that covers the gaps collapsed here; this transform does not
/// cross-check against a cut plan.
pub fn rebase_entries(entries: &[CaptionEntry]) -> Vec<CaptionEntry> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&CaptionEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| (e.start_ms, e.end_ms));

    let first = sorted[0];
    let mut diff = first.start_ms;
    let mut prev_original_end = first.end_ms;
    let mut prev_new_end = first.end_ms - first.start_ms;

    let mut rebased = Vec::with_capacity(sorted.len());
    rebased.push(CaptionEntry::new(first.text.clone(), 0, prev_new_end));

    for entry in sorted.into_iter().skip(1) {
        // diff never exceeds the start of any later entry in sorted order,
        // so the subtractions below cannot underflow
        let (new_start, new_end) = if entry.start_ms <= diff + prev_original_end {
            (entry.start_ms - diff, entry.end_ms - diff)
        } else {
            diff += entry.start_ms - prev_original_end;
            let new_start = prev_new_end;
            (new_start, new_start + (entry.end_ms - entry.start_ms))
        };

        prev_original_end = entry.end_ms;
        prev_new_end = new_end;
        rebased.push(CaptionEntry::new(entry.text.clone(), new_start, new_end));
    }

    rebased
}
