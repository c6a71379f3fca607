//! Buddy allocation by recursive halving

#[cfg(feature = "log")]
use log::trace;

use super::size_class::buddy_size;
use crate::span::{Span, SpanList};

/// Allocate a power-of-two span for a request of `full_size` bytes
///
/// A free span of exactly the needed class is taken as is. Otherwise the
/// smallest free span that is large enough (lowest address on ties) is
/// halved until it matches. Returns the start of the used span.
pub fn alloc_span(list: &mut SpanList, full_size: usize) -> Option<usize> {
    let class = buddy_size(full_size)?;

    let node_idx = match find_exact(list, class) {
        Some(idx) => idx,
        None => {
            let idx = find_smallest(list, class)?;
            halve_to(list, idx, class)?;
            idx
        }
    };

    let span = list.get_mut(node_idx)?;
    span.used = true;
    Some(span.start)
}

/// Halve `node_idx` until its size is `target`
///
/// Each halving inserts the upper half as a free span right after the node.
/// Returns the number of halvings performed.
pub fn halve_to(list: &mut SpanList, node_idx: usize, target: usize) -> Option<usize> {
    let mut splits = 0;

    loop {
        let span = *list.get(node_idx)?;
        if span.size <= target {
            break;
        }
        let half = span.size / 2;
        list.get_mut(node_idx)?.size = half;
        list.insert_after(node_idx, Span::free(span.start + half, half))?;
        trace!("buddy split {:#x}: {} -> 2 x {}", span.start, span.size, half);
        splits += 1;
    }

    Some(splits)
}

/// First free span whose size equals `class`
fn find_exact(list: &SpanList, class: usize) -> Option<usize> {
    list.iter()
        .find(|(_, span)| span.is_free() && span.size == class)
        .map(|(idx, _)| idx)
}

/// Smallest free span of at least `class` bytes, lowest address on ties
fn find_smallest(list: &SpanList, class: usize) -> Option<usize> {
    let mut smallest: Option<(usize, usize)> = None;

    for (idx, span) in list.iter() {
        if span.used || span.size < class {
            continue;
        }
        if smallest.map_or(true, |(_, size)| span.size < size) {
            smallest = Some((idx, span.size));
        }
    }

    smallest.map(|(idx, _)| idx)
}
