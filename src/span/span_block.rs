//! Span metadata
//!
//! Describes one contiguous piece of the arena, free or used.

use core::cmp::PartialOrd;

/// One contiguous span `[start, start + size)` of the arena.
///
/// `size` includes the allocation header; `start` is an absolute address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub size: usize,
    pub used: bool,
}

impl Span {
    pub const fn new(start: usize, size: usize, used: bool) -> Self {
        Self { start, size, used }
    }

    /// Create a free span
    pub const fn free(start: usize, size: usize) -> Self {
        Self::new(start, size, false)
    }

    /// One past the last address of the span
    pub const fn end(&self) -> usize {
        self.start + self.size
    }

    pub const fn is_free(&self) -> bool {
        !self.used
    }

    pub const fn contains(&self, addr: usize) -> bool {
        addr >= self.start && addr < self.end()
    }

    /// Offset of this span from the arena base
    pub const fn offset_from(&self, base: usize) -> usize {
        self.start - base
    }
}

impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        self.start.partial_cmp(&other.start)
    }
}
