//! Indexed binary min-heap keyed by [`NodeId`].
//!
//! Each id appears at most once. A position map makes priority updates
//! O(log n) in place, which both the timestamp cache and the search
//! frontier rely on.

use std::collections::TryReserveError;
use std::mem::size_of;

use rustc_hash::FxHashMap;

use crate::graph::NodeId;

/// Binary min-heap over `(NodeId, P)` with a position index.
#[derive(Debug, Clone)]
pub struct IndexedHeap<P> {
    slots: Vec<(NodeId, P)>,
    positions: FxHashMap<NodeId, usize>,
}

impl<P: PartialOrd + Copy> Default for IndexedHeap<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PartialOrd + Copy> IndexedHeap<P> {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `id` is in the heap.
    pub fn contains(&self, id: NodeId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Current priority of `id`.
    pub fn priority(&self, id: NodeId) -> Option<P> {
        self.positions.get(&id).map(|&pos| self.slots[pos].1)
    }

    /// Smallest entry without removing it.
    pub fn peek(&self) -> Option<(NodeId, P)> {
        self.slots.first().copied()
    }

    /// Inserts `id`, or updates its priority if already present.
    pub fn push(&mut self, id: NodeId, priority: P) {
        if self.positions.contains_key(&id) {
            self.update(id, priority);
            return;
        }
        let pos = self.slots.len();
        self.slots.push((id, priority));
        self.positions.insert(id, pos);
        self.sift_up(pos);
    }

    /// Removes and returns the smallest entry.
    pub fn pop(&mut self) -> Option<(NodeId, P)> {
        if self.slots.is_empty() {
            return None;
        }
        let top = self.slots.swap_remove(0);
        self.positions.remove(&top.0);
        if let Some(&(moved, _)) = self.slots.first() {
            self.positions.insert(moved, 0);
            self.sift_down(0);
        }
        Some(top)
    }

    /// Sets a new priority for `id` and restores heap order.
    ///
    /// Returns `false` when `id` is not in the heap.
    pub fn update(&mut self, id: NodeId, priority: P) -> bool {
        let Some(&pos) = self.positions.get(&id) else {
            return false;
        };
        self.slots[pos].1 = priority;
        let pos = self.sift_up(pos);
        self.sift_down(pos);
        true
    }

    /// Removes `id` from the heap, returning its priority.
    pub fn remove(&mut self, id: NodeId) -> Option<P> {
        let pos = self.positions.remove(&id)?;
        let (_, priority) = self.slots.swap_remove(pos);
        if pos < self.slots.len() {
            let moved = self.slots[pos].0;
            self.positions.insert(moved, pos);
            let pos = self.sift_up(pos);
            self.sift_down(pos);
        }
        Some(priority)
    }

    /// Reserves room for `additional` more entries without aborting.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.slots.try_reserve(additional)?;
        self.positions.try_reserve(additional)
    }

    /// Approximate heap memory held by the slots and the position index.
    pub fn footprint_bytes(&self) -> usize {
        self.slots.capacity() * size_of::<(NodeId, P)>()
            + self.positions.capacity() * (size_of::<(NodeId, usize)>() + 1)
    }

    fn sift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.slots[pos].1 < self.slots[parent].1 {
                self.swap(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
        pos
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let smallest = if right < len && self.slots[right].1 < self.slots[left].1 {
                right
            } else {
                left
            };
            if self.slots[smallest].1 < self.slots[pos].1 {
                self.swap(pos, smallest);
                pos = smallest;
            } else {
                break;
            }
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
        self.positions.insert(self.slots[a].0, a);
        self.positions.insert(self.slots[b].0, b);
    }
}
