//! Coalescing for the watermark policies

#[cfg(feature = "log")]
use log::trace;

use crate::span::{Span, SpanList};

/// Free `node_idx` and fold it into its free address neighbours
///
/// Both neighbours free: the three spans become one at the previous span's
/// start (list shrinks by two). One neighbour free: the pair becomes one
/// (list shrinks by one). Neither: the span is only marked free.
///
/// Returns the index of the resulting free span.
pub fn merge(list: &mut SpanList, node_idx: usize) -> Option<usize> {
    let size = list.get(node_idx)?.size;
    let prev = list
        .prev_of(node_idx)
        .filter(|&idx| list.get(idx).is_some_and(Span::is_free));
    let next = list
        .next_of(node_idx)
        .filter(|&idx| list.get(idx).is_some_and(Span::is_free));

    match (prev, next) {
        (Some(prev), Some(next)) => {
            trace!("merge with both neighbours");
            let next_size = list.remove(next)?.size;
            list.remove(node_idx)?;
            list.get_mut(prev)?.size += size + next_size;
            Some(prev)
        }
        (None, Some(next)) => {
            trace!("merge with next neighbour");
            let next_size = list.remove(next)?.size;
            let span = list.get_mut(node_idx)?;
            span.size += next_size;
            span.used = false;
            Some(node_idx)
        }
        (Some(prev), None) => {
            trace!("merge with previous neighbour");
            list.remove(node_idx)?;
            list.get_mut(prev)?.size += size;
            Some(prev)
        }
        (None, None) => {
            list.get_mut(node_idx)?.used = false;
            Some(node_idx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn layout(list: &SpanList) -> Vec<(usize, usize, bool)> {
        list.iter()
            .map(|(_, span)| (span.start, span.size, span.used))
            .collect()
    }

    /// Three adjacent spans with the middle one used
    fn triple(prev_used: bool, next_used: bool) -> (SpanList, usize) {
        let mut list = SpanList::new();
        list.insert_tail(Span::new(0, 10, prev_used));
        let middle = list.insert_tail(Span::new(10, 20, true));
        list.insert_tail(Span::new(30, 30, next_used));
        (list, middle)
    }

    #[test]
    fn test_merge_both_neighbours() {
        let (mut list, middle) = triple(false, false);
        let merged = merge(&mut list, middle).unwrap();

        assert_eq!(layout(&list), [(0, 60, false)]);
        assert_eq!(list.head(), Some(merged));
        assert!(list.check_links());
    }

    #[test]
    fn test_merge_next_only() {
        let (mut list, middle) = triple(true, false);
        merge(&mut list, middle).unwrap();

        assert_eq!(layout(&list), [(0, 10, true), (10, 50, false)]);
        assert!(list.check_links());
    }

    #[test]
    fn test_merge_prev_only() {
        let (mut list, middle) = triple(false, true);
        merge(&mut list, middle).unwrap();

        assert_eq!(layout(&list), [(0, 30, false), (30, 30, true)]);
        assert!(list.check_links());
    }

    #[test]
    fn test_merge_no_free_neighbour() {
        let (mut list, middle) = triple(true, true);
        assert_eq!(merge(&mut list, middle), Some(middle));

        assert_eq!(layout(&list), [(0, 10, true), (10, 20, false), (30, 30, true)]);
    }

    #[test]
    fn test_merge_single_span() {
        let mut list = SpanList::with_span(Span::new(0, 64, true));
        let head = list.head().unwrap();

        merge(&mut list, head).unwrap();
        assert_eq!(layout(&list), [(0, 64, false)]);
    }

    #[test]
    fn test_merge_at_list_edges() {
        let mut list = SpanList::new();
        let first = list.insert_tail(Span::new(0, 8, true));
        list.insert_tail(Span::free(8, 8));
        let last = list.insert_tail(Span::new(16, 8, true));

        merge(&mut list, last).unwrap();
        assert_eq!(layout(&list), [(0, 8, true), (8, 16, false)]);

        merge(&mut list, first).unwrap();
        assert_eq!(layout(&list), [(0, 24, false)]);
        assert!(list.check_links());
    }
}
