//! Arena configuration
//!
//! Size limits and header width for one arena, passed by value at setup.

/// Smallest request accepted by default. Zero-byte requests are rejected.
pub const DEFAULT_MIN_REQUEST_SIZE: usize = 1;

/// Largest arena accepted by default (1 MiB).
pub const DEFAULT_MAX_ARENA_SIZE: usize = 1 << 20;

/// Size of the per-allocation header placed in front of every returned address.
pub const DEFAULT_HEADER_SIZE: usize = 4;

/// Per-arena limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Requests below this many bytes fail with `RequestTooSmall`.
    pub min_request_size: usize,
    /// Setup fails with `InvalidConfiguration` above this many bytes.
    pub max_arena_size: usize,
    /// Bytes reserved in front of each allocation.
    pub header_size: usize,
}

impl ArenaConfig {
    pub const fn new() -> Self {
        Self {
            min_request_size: DEFAULT_MIN_REQUEST_SIZE,
            max_arena_size: DEFAULT_MAX_ARENA_SIZE,
            header_size: DEFAULT_HEADER_SIZE,
        }
    }

    pub const fn with_min_request_size(mut self, min_request_size: usize) -> Self {
        self.min_request_size = min_request_size;
        self
    }

    pub const fn with_max_arena_size(mut self, max_arena_size: usize) -> Self {
        self.max_arena_size = max_arena_size;
        self
    }

    pub const fn with_header_size(mut self, header_size: usize) -> Self {
        self.header_size = header_size;
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
