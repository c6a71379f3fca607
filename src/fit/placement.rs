//! Span selection for the watermark policies
//!
//! Each function returns the index of the free span the policy would carve
//! for a request of `full_size` bytes (header included), or `None`.

use crate::span::SpanList;

/// First free span large enough, in address order
pub fn first_fit(list: &SpanList, full_size: usize) -> Option<usize> {
    list.iter()
        .find(|(_, span)| span.is_free() && span.size >= full_size)
        .map(|(idx, _)| idx)
}

/// Free span leaving the smallest leftover
///
/// An exact fit ends the scan at once, so the first exact fit wins. Equal
/// leftovers resolve to the lowest address.
pub fn best_fit(list: &SpanList, full_size: usize) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;

    for (idx, span) in list.iter() {
        if span.used || span.size < full_size {
            continue;
        }
        let leftover = span.size - full_size;
        if leftover == 0 {
            return Some(idx);
        }
        if best.map_or(true, |(_, hole)| leftover < hole) {
            best = Some((idx, leftover));
        }
    }

    best.map(|(idx, _)| idx)
}

/// Free span leaving the largest leftover
///
/// Always scans the whole list. Equal leftovers resolve to the lowest address.
pub fn worst_fit(list: &SpanList, full_size: usize) -> Option<usize> {
    let mut worst: Option<(usize, usize)> = None;

    for (idx, span) in list.iter() {
        if span.used || span.size < full_size {
            continue;
        }
        let leftover = span.size - full_size;
        if worst.map_or(true, |(_, hole)| leftover > hole) {
            worst = Some((idx, leftover));
        }
    }

    worst.map(|(idx, _)| idx)
}
