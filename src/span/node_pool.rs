//! Node pool for the span list
//!
//! Owns every list node of an arena. Freed slots are chained into an
//! internal free list and handed out again before the backing vector grows,
//! so split/merge churn does not keep allocating.

use alloc::vec::Vec;

use super::span_block::Span;

/// Doubly linked list node stored in the pool
#[derive(Debug, Clone, Copy)]
pub struct ListNode {
    pub data: Span,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Occupied(ListNode),
    Vacant { next_free: Option<usize> },
}

/// Recycling pool of list nodes, addressed by slot index
pub struct NodePool {
    slots: Vec<Slot>,
    /// Free slot chain head
    free_head: Option<usize>,
    /// Number of occupied slots
    live_nodes: usize,
    /// Allocation statistics
    total_allocations: usize,
    total_deallocations: usize,
}

impl NodePool {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live_nodes: 0,
            total_allocations: 0,
            total_deallocations: 0,
        }
    }

    /// Take a slot for `data`, reusing a vacant one when available
    ///
    /// The returned node is unlinked (`prev` and `next` are `None`).
    pub fn alloc_node(&mut self, data: Span) -> usize {
        let node = Slot::Occupied(ListNode {
            data,
            prev: None,
            next: None,
        });

        self.total_allocations += 1;
        self.live_nodes += 1;

        match self.free_head {
            Some(idx) => {
                if let Slot::Vacant { next_free } = self.slots[idx] {
                    self.free_head = next_free;
                }
                self.slots[idx] = node;
                idx
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        }
    }

    /// Return a slot to the pool, yielding the node it held
    ///
    /// Returns `None` if the slot was not occupied.
    pub fn dealloc_node(&mut self, node_idx: usize) -> Option<ListNode> {
        let slot = self.slots.get_mut(node_idx)?;
        let node = match *slot {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => return None,
        };

        *slot = Slot::Vacant {
            next_free: self.free_head,
        };
        self.free_head = Some(node_idx);
        self.live_nodes -= 1;
        self.total_deallocations += 1;
        Some(node)
    }

    /// Get a reference to a node by index
    pub fn get_node(&self, node_idx: usize) -> Option<&ListNode> {
        match self.slots.get(node_idx)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    /// Get a mutable reference to a node by index
    pub fn get_node_mut(&mut self, node_idx: usize) -> Option<&mut ListNode> {
        match self.slots.get_mut(node_idx)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    /// Number of nodes currently handed out
    pub fn live_node_count(&self) -> usize {
        self.live_nodes
    }

    /// Number of vacant slots ready for reuse
    pub fn free_slot_count(&self) -> usize {
        self.slots.len() - self.live_nodes
    }

    pub fn get_stats(&self) -> PoolStats {
        PoolStats {
            total_slots: self.slots.len(),
            live_nodes: self.live_nodes,
            free_slots: self.free_slot_count(),
            total_allocations: self.total_allocations,
            total_deallocations: self.total_deallocations,
        }
    }
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new()
    }
}

/// Node pool statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub total_slots: usize,
    pub live_nodes: usize,
    pub free_slots: usize,
    pub total_allocations: usize,
    pub total_deallocations: usize,
}
