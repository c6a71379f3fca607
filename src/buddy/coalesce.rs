//! Buddy coalescing on free

#[cfg(feature = "log")]
use log::trace;

use super::size_class::is_buddy_pair;
use crate::span::SpanList;

/// Mark `node_idx` free and merge buddy pairs until none are left
///
/// Every merge restarts the sweep from the head, since a merged block may
/// now pair with its own buddy. Returns the number of merges.
pub fn release(list: &mut SpanList, base: usize, node_idx: usize) -> Option<usize> {
    list.get_mut(node_idx)?.used = false;

    let mut merges = 0;
    while let Some(first) = find_free_pair(list, base) {
        merge_pair(list, first)?;
        merges += 1;
    }

    Some(merges)
}

/// Absorb the span following `first` into `first`
///
/// Returns the merged size.
pub fn merge_pair(list: &mut SpanList, first: usize) -> Option<usize> {
    let second = list.next_of(first)?;
    let absorbed = list.remove(second)?;
    let span = list.get_mut(first)?;
    span.size += absorbed.size;
    trace!("buddy merge {:#x}: size {}", span.start, span.size);
    Some(span.size)
}

/// First list-adjacent pair of free buddies, scanning from the head
fn find_free_pair(list: &SpanList, base: usize) -> Option<usize> {
    list.iter()
        .zip(list.iter().skip(1))
        .find(|((_, first), (_, second))| {
            first.is_free() && second.is_free() && is_buddy_pair(base, first, second)
        })
        .map(|((idx, _), _)| idx)
}
