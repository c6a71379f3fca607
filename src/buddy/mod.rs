//! Buddy system over the span list
//!
//! This module provides the power-of-two policy:
//! - Size classes and buddy address arithmetic
//! - Recursive halving on allocation
//! - Cascading pairwise coalescing on free
//!
//! Spans handled here always have power-of-two sizes and sit at arena
//! offsets that are multiples of their size.

pub mod coalesce;
pub mod size_class;
pub mod split;

pub use coalesce::{merge_pair, release};
pub use size_class::{buddy_addr, buddy_size, is_buddy_aligned, is_buddy_pair};
pub use split::{alloc_span, halve_to};
