//! Partition checks
//!
//! The allocator relies on its span list exactly tiling the arena. These
//! checks detect the first place where it does not.

use thiserror::Error;

use crate::buddy::is_buddy_aligned;
use crate::span::SpanList;

/// A broken property of the arena partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("span list links disagree with its length")]
    BrokenLinks,
    #[error("gap before span at {found:#x}, expected start {expected:#x}")]
    Gap { expected: usize, found: usize },
    #[error("span at {found:#x} overlaps its predecessor ending at {expected:#x}")]
    Overlap { expected: usize, found: usize },
    #[error("empty span at {start:#x}")]
    EmptySpan { start: usize },
    #[error("spans cover {covered} of {arena_size} bytes")]
    CoverageMismatch { covered: usize, arena_size: usize },
    #[error("buddy span at {start:#x} has non power-of-two size {size}")]
    NotPowerOfTwo { start: usize, size: usize },
    #[error("buddy span at {start:#x} is not aligned to its size {size}")]
    Misaligned { start: usize, size: usize },
}

/// Check that `list` tiles `[base, base + size)` without gaps or overlaps
///
/// With `buddy` set, every span must also be a power of two placed at an
/// offset that is a multiple of its size.
pub fn check_partition(
    list: &SpanList,
    base: usize,
    size: usize,
    buddy: bool,
) -> Result<(), InvariantViolation> {
    if !list.check_links() {
        return Err(InvariantViolation::BrokenLinks);
    }

    let mut expected = base;
    for (_, span) in list.iter() {
        if span.size == 0 {
            return Err(InvariantViolation::EmptySpan { start: span.start });
        }
        if span.start > expected {
            return Err(InvariantViolation::Gap {
                expected,
                found: span.start,
            });
        }
        if span.start < expected {
            return Err(InvariantViolation::Overlap {
                expected,
                found: span.start,
            });
        }
        if buddy {
            if !span.size.is_power_of_two() {
                return Err(InvariantViolation::NotPowerOfTwo {
                    start: span.start,
                    size: span.size,
                });
            }
            if !is_buddy_aligned(base, span) {
                return Err(InvariantViolation::Misaligned {
                    start: span.start,
                    size: span.size,
                });
            }
        }
        expected = span.end();
    }

    let covered = expected - base;
    if covered != size {
        return Err(InvariantViolation::CoverageMismatch {
            covered,
            arena_size: size,
        });
    }
    Ok(())
}
