//! Arena allocator
//!
//! Ties one arena, one policy and one span list together. All state lives in
//! the [`ArenaAllocator`] value, so independent arenas can coexist.

use crate::{
    buddy,
    check::{check_partition, InvariantViolation},
    config::ArenaConfig,
    fit,
    span::{Span, SpanList},
    stats::{ArenaStats, MemoryStatsReporter},
    AllocError, AllocResult, Policy, ALLOC_FAILED,
};

#[cfg(feature = "log")]
use log::{debug, error, info, warn};

/// Allocator over a single fixed arena `[base, base + size)`
///
/// Returned addresses point just past a header of `config.header_size`
/// bytes; the span backing an allocation starts at `addr - header_size`.
pub struct ArenaAllocator {
    config: ArenaConfig,
    policy: Policy,
    base: usize,
    size: usize,
    spans: SpanList,
}

impl ArenaAllocator {
    /// Set up an arena with the default [`ArenaConfig`]
    pub fn setup(policy: Policy, arena_size: usize, arena_base: usize) -> AllocResult<Self> {
        Self::with_config(ArenaConfig::default(), policy, arena_size, arena_base)
    }

    /// Set up an arena with explicit limits
    ///
    /// The arena starts out as a single free span. Fails with
    /// `InvalidConfiguration` if the arena is empty, larger than
    /// `config.max_arena_size`, wraps the address space, or (for the buddy
    /// system) is not a power of two in size. The minimum request and the
    /// header size must not both be zero.
    pub fn with_config(
        config: ArenaConfig,
        policy: Policy,
        arena_size: usize,
        arena_base: usize,
    ) -> AllocResult<Self> {
        let reason = if arena_size > config.max_arena_size {
            Some("arena exceeds the maximum size")
        } else if arena_size == 0 {
            Some("arena is empty")
        } else if arena_base.checked_add(arena_size).is_none() {
            Some("arena wraps the address space")
        } else if policy == Policy::BuddySystem && !arena_size.is_power_of_two() {
            Some("buddy arena size must be a power of two")
        } else if config.min_request_size == 0 && config.header_size == 0 {
            Some("minimum request and header size are both zero")
        } else {
            None
        };
        if let Some(reason) = reason {
            warn!(
                "setup rejected: {} (policy={}, size={:#x}, max={:#x})",
                reason, policy, arena_size, config.max_arena_size
            );
            return Err(AllocError::InvalidConfiguration { reason });
        }

        info!(
            "setup: policy={}, size={:#x}, base={:#x}",
            policy, arena_size, arena_base
        );

        Ok(Self {
            config,
            policy,
            base: arena_base,
            size: arena_size,
            spans: SpanList::with_span(Span::free(arena_base, arena_size)),
        })
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn header_size(&self) -> usize {
        self.config.header_size
    }

    /// Number of spans currently partitioning the arena
    pub fn node_count(&self) -> usize {
        self.spans.len()
    }

    /// Spans in ascending address order
    pub fn spans(&self) -> impl Iterator<Item = &Span> + '_ {
        self.spans.iter().map(|(_, span)| span)
    }

    /// Whether `addr` lies inside the arena
    pub fn contains(&self, addr: usize) -> bool {
        Span::free(self.base, self.size).contains(addr)
    }

    /// Allocate `request_size` bytes
    ///
    /// Returns the address just past the allocation header.
    pub fn allocate(&mut self, request_size: usize) -> AllocResult<usize> {
        if request_size < self.config.min_request_size {
            warn!(
                "allocate: {} bytes is below the minimum of {}",
                request_size, self.config.min_request_size
            );
            return Err(AllocError::RequestTooSmall {
                requested: request_size,
                minimum: self.config.min_request_size,
            });
        }

        let no_fit = AllocError::NoFit {
            requested: request_size,
        };
        let full_size = request_size
            .checked_add(self.config.header_size)
            .ok_or(no_fit)?;

        let start = match self.policy {
            Policy::FirstFit => fit::first_fit(&self.spans, full_size)
                .and_then(|idx| fit::carve(&mut self.spans, idx, full_size)),
            Policy::BestFit => fit::best_fit(&self.spans, full_size)
                .and_then(|idx| fit::carve(&mut self.spans, idx, full_size)),
            Policy::WorstFit => fit::worst_fit(&self.spans, full_size)
                .and_then(|idx| fit::carve(&mut self.spans, idx, full_size)),
            Policy::BuddySystem => buddy::alloc_span(&mut self.spans, full_size),
        };
        debug_assert_eq!(self.check_invariants(), Ok(()));

        match start {
            Some(start) => {
                debug!(
                    "allocate: {} bytes at offset {:#x}",
                    request_size,
                    start - self.base
                );
                Ok(start + self.config.header_size)
            }
            None => {
                MemoryStatsReporter::print_alloc_failure_stats(
                    self.policy,
                    &self.stats(),
                    request_size,
                    full_size,
                );
                Err(no_fit)
            }
        }
    }

    /// Allocate `request_size` bytes, returning [`ALLOC_FAILED`] on any failure
    pub fn allocate_raw(&mut self, request_size: usize) -> usize {
        self.allocate(request_size).unwrap_or(ALLOC_FAILED)
    }

    /// Release the allocation whose address is `ptr`
    ///
    /// `ptr` must be an address returned by [`allocate`](Self::allocate) and
    /// not yet freed; anything else is rejected with `InvalidPointer` and
    /// leaves the arena untouched.
    pub fn free(&mut self, ptr: usize) -> AllocResult {
        let invalid = AllocError::InvalidPointer { addr: ptr };

        if !self.contains(ptr) {
            warn!(
                "free: {:#x} outside arena [{:#x}, {:#x})",
                ptr,
                self.base,
                self.base + self.size
            );
            return Err(invalid);
        }

        let Some(node_idx) = self.find_used(ptr) else {
            warn!("free: {:#x} is not an allocated block", ptr);
            return Err(invalid);
        };

        if self.policy.is_watermark() {
            if self.spans.len() == 1 {
                if let Some(span) = self.spans.get_mut(node_idx) {
                    span.used = false;
                }
            } else {
                fit::merge(&mut self.spans, node_idx).ok_or(invalid)?;
            }
        } else {
            let _merges = buddy::release(&mut self.spans, self.base, node_idx).ok_or(invalid)?;
            debug!("free: {:#x} released after {} buddy merges", ptr, _merges);
        }
        debug_assert_eq!(self.check_invariants(), Ok(()));

        Ok(())
    }

    /// Read the size header stored in front of `ptr`
    ///
    /// The header is the span's size (header included). It is derived from
    /// the span metadata, so it cannot disagree with it. Returns `None`
    /// when no span starts right before `ptr`.
    pub fn header_at(&self, ptr: usize) -> Option<usize> {
        let start = ptr.checked_sub(self.config.header_size)?;
        let node_idx = self.spans.find_by_addr(start)?;
        self.spans.get(node_idx).map(|span| span.size)
    }

    /// Offset of `ptr` from the arena base, if it lies in the arena
    pub fn offset_of(&self, ptr: usize) -> Option<usize> {
        self.contains(ptr).then(|| ptr - self.base)
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats::collect(&self.spans, self.size)
    }

    /// Check that the span list still tiles the arena
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let result = check_partition(
            &self.spans,
            self.base,
            self.size,
            self.policy == Policy::BuddySystem,
        );
        if let Err(_violation) = result {
            error!("arena {:#x}: {}", self.base, _violation);
        }
        result
    }

    /// Log every span at debug level
    pub fn dump(&self) {
        debug!("[{} spans]", self.spans.len());
        for (_, span) in self.spans.iter() {
            debug!(
                "  offset={:#x} size={} used={}",
                span.start - self.base,
                span.size,
                span.used
            );
        }
    }

    /// Print arena configuration and span distribution
    pub fn print_arena_info(&self) {
        let _stats = self.stats();
        info!("========== Arena Info ==========");
        info!("Policy: {}", self.policy);
        info!(
            "Address range: [{:#x}, {:#x})",
            self.base,
            self.base + self.size
        );
        info!(
            "Header size: {}, minimum request: {}",
            self.config.header_size, self.config.min_request_size
        );
        info!(
            "Used: {} bytes in {} spans",
            _stats.used_bytes, _stats.used_nodes
        );
        info!(
            "Free: {} bytes in {} spans (largest {})",
            _stats.free_bytes, _stats.free_nodes, _stats.largest_free
        );
        info!("Node pool: {:?}", self.spans.pool_stats());
        info!("================================");
    }

    /// Find the used span whose payload starts at `ptr`
    fn find_used(&self, ptr: usize) -> Option<usize> {
        let start = ptr.checked_sub(self.config.header_size)?;
        if start < self.base {
            return None;
        }
        let node_idx = self.spans.find_by_addr(start)?;
        self.spans.get(node_idx)?.used.then_some(node_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    const BASE: usize = 0x10_0000;

    fn sizes(allocator: &ArenaAllocator) -> Vec<(usize, bool)> {
        allocator.spans().map(|span| (span.size, span.used)).collect()
    }

    #[test]
    fn test_setup() {
        let allocator = ArenaAllocator::setup(Policy::FirstFit, 4096, BASE).unwrap();
        assert_eq!(allocator.node_count(), 1);
        assert_eq!(allocator.policy(), Policy::FirstFit);
        assert_eq!(allocator.base(), BASE);
        assert_eq!(allocator.size(), 4096);
        assert_eq!(sizes(&allocator), [(4096, false)]);
    }

    #[test]
    fn test_setup_rejections() {
        let too_big = ArenaAllocator::setup(Policy::FirstFit, (1 << 20) + 1, BASE);
        assert!(matches!(too_big, Err(AllocError::InvalidConfiguration { .. })));

        let empty = ArenaAllocator::setup(Policy::BestFit, 0, BASE);
        assert!(matches!(empty, Err(AllocError::InvalidConfiguration { .. })));

        let wraps = ArenaAllocator::setup(Policy::WorstFit, 4096, usize::MAX - 100);
        assert!(matches!(wraps, Err(AllocError::InvalidConfiguration { .. })));

        let odd_buddy = ArenaAllocator::setup(Policy::BuddySystem, 3000, BASE);
        assert!(matches!(odd_buddy, Err(AllocError::InvalidConfiguration { .. })));

        // Non power-of-two arenas are fine for the watermark policies
        assert!(ArenaAllocator::setup(Policy::FirstFit, 3000, BASE).is_ok());
    }

    #[test]
    fn test_setup_rejects_zero_byte_spans() {
        let config = ArenaConfig::new()
            .with_min_request_size(0)
            .with_header_size(0);
        for policy in Policy::ALL {
            let result = ArenaAllocator::with_config(config, policy, 1024, BASE);
            assert!(matches!(result, Err(AllocError::InvalidConfiguration { .. })));
        }

        // Either limit alone keeps every span non-empty
        let no_header = ArenaConfig::new().with_header_size(0);
        let mut allocator =
            ArenaAllocator::with_config(no_header, Policy::FirstFit, 1024, BASE).unwrap();
        assert_eq!(allocator.allocate(1), Ok(BASE));
        assert_eq!(sizes(&allocator), [(1, true), (1023, false)]);

        let zero_min = ArenaConfig::new().with_min_request_size(0);
        let mut allocator =
            ArenaAllocator::with_config(zero_min, Policy::FirstFit, 1024, BASE).unwrap();
        let a = allocator.allocate(0).unwrap();
        assert_eq!(a, BASE + 4);
        assert_eq!(sizes(&allocator), [(4, true), (1020, false)]);
        assert_eq!(allocator.check_invariants(), Ok(()));
        allocator.free(a).unwrap();
        assert_eq!(sizes(&allocator), [(1024, false)]);
    }

    #[test]
    fn test_raised_maximum() {
        let config = ArenaConfig::new().with_max_arena_size(1 << 24);
        let allocator = ArenaAllocator::with_config(config, Policy::FirstFit, 1 << 22, BASE);
        assert!(allocator.is_ok());
    }

    #[test]
    fn test_request_too_small() {
        let config = ArenaConfig::new().with_min_request_size(1024);
        let mut allocator = ArenaAllocator::with_config(config, Policy::FirstFit, 4096, BASE).unwrap();

        assert_eq!(
            allocator.allocate(1023),
            Err(AllocError::RequestTooSmall {
                requested: 1023,
                minimum: 1024
            })
        );
        assert_eq!(allocator.allocate_raw(10), ALLOC_FAILED);
        assert_eq!(allocator.node_count(), 1);
        assert_eq!(allocator.allocate(1024), Ok(BASE + 4));
    }

    #[test]
    fn test_zero_byte_request_rejected_by_default() {
        let mut allocator = ArenaAllocator::setup(Policy::BuddySystem, 1024, BASE).unwrap();
        assert!(matches!(
            allocator.allocate(0),
            Err(AllocError::RequestTooSmall { minimum: 1, .. })
        ));
    }

    #[test]
    fn test_first_fit_split() {
        let mut allocator = ArenaAllocator::setup(Policy::FirstFit, 1024, BASE).unwrap();

        let a = allocator.allocate(96).unwrap();
        let b = allocator.allocate(60).unwrap();
        assert_eq!(a, BASE + 4);
        assert_eq!(b, BASE + 100 + 4);
        assert_eq!(sizes(&allocator), [(100, true), (64, true), (860, false)]);
        assert_eq!(allocator.header_at(a), Some(100));
        assert_eq!(allocator.header_at(b), Some(64));
    }

    #[test]
    fn test_exact_fit_no_split() {
        let mut allocator = ArenaAllocator::setup(Policy::FirstFit, 1024, BASE).unwrap();

        assert_eq!(allocator.allocate(1020), Ok(BASE + 4));
        assert_eq!(sizes(&allocator), [(1024, true)]);
        assert_eq!(
            allocator.allocate(1),
            Err(AllocError::NoFit { requested: 1 })
        );

        allocator.free(BASE + 4).unwrap();
        assert_eq!(sizes(&allocator), [(1024, false)]);
    }

    #[test]
    fn test_overflowing_request() {
        let mut allocator = ArenaAllocator::setup(Policy::WorstFit, 1024, BASE).unwrap();
        assert_eq!(
            allocator.allocate(usize::MAX),
            Err(AllocError::NoFit {
                requested: usize::MAX
            })
        );
        assert_eq!(allocator.node_count(), 1);
    }

    #[test]
    fn test_free_rejections() {
        let mut allocator = ArenaAllocator::setup(Policy::BestFit, 1024, BASE).unwrap();
        let a = allocator.allocate(100).unwrap();

        assert_eq!(
            allocator.free(BASE - 1),
            Err(AllocError::InvalidPointer { addr: BASE - 1 })
        );
        assert_eq!(
            allocator.free(BASE + 1024),
            Err(AllocError::InvalidPointer { addr: BASE + 1024 })
        );
        // Inside the arena but not the start of a block
        assert!(allocator.free(a + 8).is_err());
        assert!(allocator.free(BASE).is_err());
        assert_eq!(sizes(&allocator), [(104, true), (920, false)]);

        assert_eq!(allocator.free(a), Ok(()));
        // Double free
        assert!(allocator.free(a).is_err());
        assert_eq!(sizes(&allocator), [(1024, false)]);
    }

    #[test]
    fn test_offset_of() {
        let allocator = ArenaAllocator::setup(Policy::FirstFit, 1024, BASE).unwrap();
        assert_eq!(allocator.offset_of(BASE + 4), Some(4));
        assert_eq!(allocator.offset_of(BASE + 1024), None);
        assert!(allocator.contains(BASE));
        assert!(!allocator.contains(BASE - 1));
    }

    #[test]
    fn test_buddy_setup_and_release() {
        let mut allocator = ArenaAllocator::setup(Policy::BuddySystem, 1024, BASE).unwrap();

        let a = allocator.allocate(100).unwrap();
        assert_eq!(a, BASE + 4);
        assert_eq!(
            sizes(&allocator),
            [(128, true), (128, false), (256, false), (512, false)]
        );
        assert_eq!(allocator.header_at(a), Some(128));

        allocator.free(a).unwrap();
        assert_eq!(sizes(&allocator), [(1024, false)]);
    }

    #[test]
    fn test_stats() {
        let mut allocator = ArenaAllocator::setup(Policy::FirstFit, 1000, BASE).unwrap();
        allocator.allocate(96).unwrap();

        let stats = allocator.stats();
        assert_eq!(stats.total_bytes, 1000);
        assert_eq!(stats.used_bytes, 100);
        assert_eq!(stats.free_bytes, 900);
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.largest_free, 900);
    }
}
