//! Span bookkeeping
//!
//! This module provides the arena partition shared by every policy:
//! - Span metadata (start, size, used)
//! - A recycling node pool owning all list nodes
//! - A doubly linked span list kept in ascending address order

pub mod node_pool;
pub mod span_block;
pub mod span_list;

pub use node_pool::{ListNode, NodePool, PoolStats};
pub use span_block::Span;
pub use span_list::{SpanList, SpanListIter};
