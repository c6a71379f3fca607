//! Watermark placement policies
//!
//! First-fit, best-fit and worst-fit share one life cycle: pick a free span
//! that is at least as large as the request, carve it to the exact size, and
//! on free coalesce it with whichever address neighbours are free.

pub mod coalesce;
pub mod placement;

pub use coalesce::merge;
pub use placement::{best_fit, first_fit, worst_fit};

#[cfg(feature = "log")]
use log::trace;

use crate::span::{Span, SpanList};

/// Shrink `node_idx` to `keep_size`, turning the rest into a free span
///
/// The remainder is inserted right after the node, which keeps the list in
/// address order. Returns the remainder's index, or `None` when there is
/// nothing left over (or `node_idx` is not in the list).
pub fn split(list: &mut SpanList, node_idx: usize, keep_size: usize) -> Option<usize> {
    let span = *list.get(node_idx)?;
    if keep_size >= span.size {
        return None;
    }

    let remainder = Span::free(span.start + keep_size, span.size - keep_size);
    list.get_mut(node_idx)?.size = keep_size;
    trace!(
        "split [{:#x}, {:#x}) at {:#x}",
        span.start,
        span.end(),
        remainder.start
    );
    list.insert_after(node_idx, remainder)
}

/// Turn a chosen free span into a used span of exactly `full_size` bytes
///
/// Returns the start address of the used span.
pub fn carve(list: &mut SpanList, node_idx: usize, full_size: usize) -> Option<usize> {
    split(list, node_idx, full_size);
    let span = list.get_mut(node_idx)?;
    span.used = true;
    Some(span.start)
}
