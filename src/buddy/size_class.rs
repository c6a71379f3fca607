//! Buddy size classes and address arithmetic

use crate::span::Span;

/// Smallest power of two that can hold `full_size` bytes
///
/// Returns `None` if no such power of two fits in `usize`.
pub fn buddy_size(full_size: usize) -> Option<usize> {
    full_size.max(1).checked_next_power_of_two()
}

/// Whether `span` sits at an arena offset that is a multiple of its size
pub fn is_buddy_aligned(base: usize, span: &Span) -> bool {
    span.size.is_power_of_two() && span.offset_from(base) & (span.size - 1) == 0
}

/// Address of the buddy of `span`
///
/// For a span at arena offset O with size S the buddy lives at offset O ^ S.
pub fn buddy_addr(base: usize, span: &Span) -> usize {
    base + (span.offset_from(base) ^ span.size)
}

/// Whether `first` and `second` are the two halves of one parent block
pub fn is_buddy_pair(base: usize, first: &Span, second: &Span) -> bool {
    first.size == second.size
        && second.start == first.end()
        && is_buddy_aligned(base, first)
        && buddy_addr(base, first) == second.start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buddy_size() {
        assert_eq!(buddy_size(0), Some(1));
        assert_eq!(buddy_size(1), Some(1));
        assert_eq!(buddy_size(104), Some(128));
        assert_eq!(buddy_size(128), Some(128));
        assert_eq!(buddy_size(129), Some(256));
        assert_eq!(buddy_size(usize::MAX), None);
    }

    #[test]
    fn test_buddy_addr() {
        let base = 0x10000;
        assert_eq!(buddy_addr(base, &Span::free(base, 128)), base + 128);
        assert_eq!(buddy_addr(base, &Span::free(base + 128, 128)), base);
        assert_eq!(buddy_addr(base, &Span::free(base + 256, 256)), base);
        assert_eq!(buddy_addr(base, &Span::free(base + 768, 256)), base + 512);
    }

    #[test]
    fn test_buddy_alignment() {
        let base = 0x1004;
        assert!(is_buddy_aligned(base, &Span::free(base, 1024)));
        assert!(is_buddy_aligned(base, &Span::free(base + 256, 128)));
        assert!(!is_buddy_aligned(base, &Span::free(base + 128, 256)));
        assert!(!is_buddy_aligned(base, &Span::free(base, 96)));
    }

    #[test]
    fn test_buddy_pair() {
        let base = 0;
        let a = Span::free(0, 128);
        let b = Span::free(128, 128);
        let c = Span::free(256, 128);
        assert!(is_buddy_pair(base, &a, &b));
        // Adjacent and equal in size, but halves of different parents
        assert!(!is_buddy_pair(base, &b, &c));
        assert!(!is_buddy_pair(base, &a, &Span::free(128, 256)));
    }
}
