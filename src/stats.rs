//! Statistics and reporting for an arena
//!
//! Provides aggregate usage numbers and the failure report logged when a
//! request cannot be placed.

use crate::span::SpanList;
use crate::Policy;

/// Arena usage statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    pub total_bytes: usize,
    pub used_bytes: usize,
    pub free_bytes: usize,
    pub node_count: usize,
    pub used_nodes: usize,
    pub free_nodes: usize,
    /// Size of the largest free span (0 if none)
    pub largest_free: usize,
}

impl ArenaStats {
    pub const fn new() -> Self {
        Self {
            total_bytes: 0,
            used_bytes: 0,
            free_bytes: 0,
            node_count: 0,
            used_nodes: 0,
            free_nodes: 0,
            largest_free: 0,
        }
    }

    /// Gather statistics from a span list covering `total_bytes`
    pub fn collect(list: &SpanList, total_bytes: usize) -> Self {
        let mut stats = Self::new();
        stats.total_bytes = total_bytes;

        for (_, span) in list.iter() {
            stats.node_count += 1;
            if span.used {
                stats.used_nodes += 1;
                stats.used_bytes += span.size;
            } else {
                stats.free_nodes += 1;
                stats.free_bytes += span.size;
                stats.largest_free = stats.largest_free.max(span.size);
            }
        }

        stats
    }

    /// Share of free bytes outside the largest free span, in permille
    ///
    /// 0 means all free memory is one span; values near 1000 mean free
    /// memory is scattered over many small spans.
    pub fn fragmentation_permille(&self) -> usize {
        if self.free_bytes == 0 {
            return 0;
        }
        (self.free_bytes - self.largest_free) * 1000 / self.free_bytes
    }
}

/// Detailed memory statistics reporter
pub struct MemoryStatsReporter;

impl MemoryStatsReporter {
    /// Log why a request could not be placed
    #[allow(unused_variables)]
    pub fn print_alloc_failure_stats(
        policy: Policy,
        stats: &ArenaStats,
        request_size: usize,
        full_size: usize,
    ) {
        #[cfg(feature = "log")]
        use log::debug;
        debug!(
            "{}: no fit for {} bytes ({} with header)",
            policy, request_size, full_size
        );
        debug!(
            "  free: {} of {} bytes in {} spans, largest {}",
            stats.free_bytes, stats.total_bytes, stats.free_nodes, stats.largest_free
        );
        debug!(
            "  used: {} bytes in {} spans, fragmentation {}\u{2030}",
            stats.used_bytes,
            stats.used_nodes,
            stats.fragmentation_permille()
        );
    }
}
