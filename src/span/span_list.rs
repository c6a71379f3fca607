//! Address-ordered span list
//!
//! Doubly linked list over nodes from a [`NodePool`]. The list is the single
//! owner of the arena partition: callers that use the positional inserts
//! (`insert_head`, `insert_tail`, `insert_after`) are responsible for keeping
//! ascending start order, `insert_sorted` finds the position itself.

#[cfg(feature = "log")]
use log::warn;

use super::{node_pool::NodePool, node_pool::PoolStats, span_block::Span};

/// Span list - the list structure plus the pool holding its nodes
pub struct SpanList {
    pool: NodePool,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl SpanList {
    /// Create a new empty span list
    pub const fn new() -> Self {
        Self {
            pool: NodePool::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Create a list holding exactly one span
    pub fn with_span(span: Span) -> Self {
        let mut list = Self::new();
        list.insert_tail(span);
        list
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<usize> {
        self.head
    }

    pub fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub fn get(&self, node_idx: usize) -> Option<&Span> {
        self.pool.get_node(node_idx).map(|node| &node.data)
    }

    pub fn get_mut(&mut self, node_idx: usize) -> Option<&mut Span> {
        self.pool.get_node_mut(node_idx).map(|node| &mut node.data)
    }

    /// Index of the node following `node_idx`
    pub fn next_of(&self, node_idx: usize) -> Option<usize> {
        self.pool.get_node(node_idx).and_then(|node| node.next)
    }

    /// Index of the node preceding `node_idx`
    pub fn prev_of(&self, node_idx: usize) -> Option<usize> {
        self.pool.get_node(node_idx).and_then(|node| node.prev)
    }

    /// Insert a span in front of the current head
    pub fn insert_head(&mut self, span: Span) -> usize {
        let new_idx = self.pool.alloc_node(span);
        match self.head {
            Some(old_head) => self.link_before(new_idx, old_head),
            None => {
                self.head = Some(new_idx);
                self.tail = Some(new_idx);
                self.len += 1;
            }
        }
        new_idx
    }

    /// Insert a span after the current tail
    pub fn insert_tail(&mut self, span: Span) -> usize {
        match self.tail {
            Some(old_tail) => {
                let new_idx = self.pool.alloc_node(span);
                self.link_after(old_tail, new_idx);
                new_idx
            }
            None => self.insert_head(span),
        }
    }

    /// Insert a span immediately after `node_idx`
    ///
    /// Returns `None` if `node_idx` is not a live node.
    pub fn insert_after(&mut self, node_idx: usize, span: Span) -> Option<usize> {
        self.pool.get_node(node_idx)?;
        let new_idx = self.pool.alloc_node(span);
        self.link_after(node_idx, new_idx);
        Some(new_idx)
    }

    /// Insert a span at its position in ascending start order
    ///
    /// Returns `None` without inserting if a span with the same start is
    /// already in the list.
    pub fn insert_sorted(&mut self, span: Span) -> Option<usize> {
        let mut current_idx = self.head;
        let mut visited = 0;

        while let Some(idx) = current_idx {
            if visited > self.len {
                warn!("Potential cycle detected during insert");
                return None;
            }
            let node = self.pool.get_node(idx)?;
            if node.data.start == span.start {
                warn!("Span at {:#x} already in list", span.start);
                return None;
            }
            if node.data.start > span.start {
                let new_idx = self.pool.alloc_node(span);
                self.link_before(new_idx, idx);
                return Some(new_idx);
            }
            current_idx = node.next;
            visited += 1;
        }

        Some(self.insert_tail(span))
    }

    /// Find the node whose span starts at `start`
    pub fn find_by_addr(&self, start: usize) -> Option<usize> {
        let mut current_idx = self.head;
        let mut visited = 0;

        while let Some(idx) = current_idx {
            if visited > self.len {
                warn!("Potential cycle detected during search");
                return None;
            }
            let node = self.pool.get_node(idx)?;
            // Early termination: list is sorted by address
            if node.data.start > start {
                break;
            }
            if node.data.start == start {
                return Some(idx);
            }
            current_idx = node.next;
            visited += 1;
        }

        None
    }

    /// Unlink a node and return its slot to the pool
    pub fn remove(&mut self, node_idx: usize) -> Option<Span> {
        let node = *self.pool.get_node(node_idx)?;

        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = self.pool.get_node_mut(prev) {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(next_node) = self.pool.get_node_mut(next) {
                    next_node.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }

        self.pool.dealloc_node(node_idx);
        self.len -= 1;
        Some(node.data)
    }

    /// Get iterator over `(node index, span)` pairs in list order
    pub fn iter(&self) -> SpanListIter<'_> {
        SpanListIter {
            pool: &self.pool,
            current: self.head,
            remaining: self.len,
        }
    }

    /// Verify that forward and backward links agree with `len`
    pub fn check_links(&self) -> bool {
        let mut prev_idx = None;
        let mut current_idx = self.head;
        let mut visited = 0;

        while let Some(idx) = current_idx {
            if visited >= self.len {
                return false;
            }
            let Some(node) = self.pool.get_node(idx) else {
                return false;
            };
            if node.prev != prev_idx {
                return false;
            }
            prev_idx = current_idx;
            current_idx = node.next;
            visited += 1;
        }

        visited == self.len && self.tail == prev_idx
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.get_stats()
    }

    /// Link a detached node `new_idx` directly after `node_idx`
    fn link_after(&mut self, node_idx: usize, new_idx: usize) {
        let next_idx = self.next_of(node_idx);

        if let Some(new_node) = self.pool.get_node_mut(new_idx) {
            new_node.prev = Some(node_idx);
            new_node.next = next_idx;
        }
        if let Some(node) = self.pool.get_node_mut(node_idx) {
            node.next = Some(new_idx);
        }
        match next_idx {
            Some(next) => {
                if let Some(next_node) = self.pool.get_node_mut(next) {
                    next_node.prev = Some(new_idx);
                }
            }
            None => self.tail = Some(new_idx),
        }
        self.len += 1;
    }

    /// Link a detached node `new_idx` directly before `node_idx`
    fn link_before(&mut self, new_idx: usize, node_idx: usize) {
        let prev_idx = self.prev_of(node_idx);

        if let Some(new_node) = self.pool.get_node_mut(new_idx) {
            new_node.prev = prev_idx;
            new_node.next = Some(node_idx);
        }
        if let Some(node) = self.pool.get_node_mut(node_idx) {
            node.prev = Some(new_idx);
        }
        match prev_idx {
            Some(prev) => {
                if let Some(prev_node) = self.pool.get_node_mut(prev) {
                    prev_node.next = Some(new_idx);
                }
            }
            None => self.head = Some(new_idx),
        }
        self.len += 1;
    }
}

impl Default for SpanList {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator for SpanList
pub struct SpanListIter<'a> {
    pool: &'a NodePool,
    current: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for SpanListIter<'a> {
    type Item = (usize, &'a Span);

    fn next(&mut self) -> Option<Self::Item> {
        // Bounded by the list length so a corrupted chain cannot loop forever
        if self.remaining == 0 {
            return None;
        }
        let idx = self.current?;
        let node = self.pool.get_node(idx)?;
        self.current = node.next;
        self.remaining -= 1;
        Some((idx, &node.data))
    }
}
