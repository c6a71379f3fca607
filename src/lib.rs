//! Arena span allocator
//!
//! This crate manages one fixed, pre-reserved address range (the arena) and
//! hands out pieces of it the way a heap allocator would, featuring:
//! - An address-sorted span list that exactly partitions the arena
//! - First-fit, best-fit and worst-fit placement with split and coalesce
//! - A buddy system restricted to power-of-two spans
//! - Arena statistics and partition checks
//!
//! Every allocation carries a fixed-size header in front of the returned
//! address. The allocator never touches the arena bytes themselves: the
//! header value lives in the span metadata and is read back with
//! [`ArenaAllocator::header_at`].

#![no_std]

extern crate alloc;

// Logging support - conditionally import log crate
#[cfg(feature = "log")]
extern crate log;

// Stub macros when log is disabled - these become no-ops
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! info {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

use thiserror::Error;

/// Value returned by [`ArenaAllocator::allocate_raw`] when a request cannot
/// be satisfied. Equivalent to `(void*)-1`.
pub const ALLOC_FAILED: usize = usize::MAX;

/// The error type used for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// Setup parameters cannot describe a usable arena.
    #[error("invalid arena configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },
    /// Request is below the configured minimum size.
    #[error("request of {requested} bytes is below the minimum of {minimum} bytes")]
    RequestTooSmall { requested: usize, minimum: usize },
    /// No span satisfies the active policy.
    #[error("no free span can hold {requested} bytes")]
    NoFit { requested: usize },
    /// Pointer outside the arena, or not the start of a used span.
    #[error("invalid pointer {addr:#x}")]
    InvalidPointer { addr: usize },
}

/// A [`Result`] type with [`AllocError`] as the error type.
pub type AllocResult<T = ()> = Result<T, AllocError>;

/// Placement policy, fixed for the lifetime of an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Policy {
    FirstFit = 0,
    BestFit = 1,
    WorstFit = 2,
    BuddySystem = 3,
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::FirstFit,
        Policy::BestFit,
        Policy::WorstFit,
        Policy::BuddySystem,
    ];

    /// Whether this policy uses the watermark split/merge path.
    pub const fn is_watermark(self) -> bool {
        !matches!(self, Policy::BuddySystem)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Policy::FirstFit => "first-fit",
            Policy::BestFit => "best-fit",
            Policy::WorstFit => "worst-fit",
            Policy::BuddySystem => "buddy-system",
        }
    }
}

impl TryFrom<u8> for Policy {
    type Error = AllocError;

    fn try_from(code: u8) -> AllocResult<Self> {
        match code {
            0 => Ok(Policy::FirstFit),
            1 => Ok(Policy::BestFit),
            2 => Ok(Policy::WorstFit),
            3 => Ok(Policy::BuddySystem),
            _ => Err(AllocError::InvalidConfiguration {
                reason: "unknown policy code",
            }),
        }
    }
}

impl core::fmt::Display for Policy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

pub mod config;
pub use config::{
    ArenaConfig, DEFAULT_HEADER_SIZE, DEFAULT_MAX_ARENA_SIZE, DEFAULT_MIN_REQUEST_SIZE,
};

pub mod span;
pub use span::{NodePool, Span, SpanList};

pub mod fit;

pub mod buddy;

pub mod check;
pub use check::InvariantViolation;

pub mod stats;
pub use stats::ArenaStats;

pub mod allocator;
pub use allocator::ArenaAllocator;
