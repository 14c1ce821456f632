//! LRU cache over an arena-allocated doubly linked recency list.

use std::mem::size_of;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{node_bytes, CacheFootprint, GraphCache};
use crate::graph::{Edge, Node, NodeId};

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot {
    node: Option<Arc<Node>>,
    prev: usize,
    next: usize,
}

/// LRU cache with O(1) touch and eviction.
///
/// Entries live in a `Vec` arena and link to each other by index. `head`
/// is the least recently touched entry, `tail` the most recent. Freed
/// slots are recycled through a free list.
#[derive(Debug)]
pub struct LinkedLruCache {
    slots: Vec<Slot>,
    free: Vec<usize>,
    index: FxHashMap<NodeId, usize>,
    head: usize,
    tail: usize,
    capacity: usize,
    elements: usize,
    evictions: u64,
}

impl LinkedLruCache {
    /// Creates an empty cache holding at most `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: FxHashMap::default(),
            head: NIL,
            tail: NIL,
            capacity,
            elements: 0,
            evictions: 0,
        }
    }

    /// Node ids from least to most recently touched.
    pub fn recency_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while cursor != NIL {
            let slot = &self.slots[cursor];
            if let Some(node) = &slot.node {
                out.push(node.id);
            }
            cursor = slot.next;
        }
        out
    }

    fn allocate(&mut self, node: Arc<Node>) -> usize {
        let slot = Slot {
            node: Some(node),
            prev: NIL,
            next: NIL,
        };
        match self.free.pop() {
            Some(i) => {
                self.slots[i] = slot;
                i
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    fn unlink(&mut self, i: usize) {
        let (prev, next) = (self.slots[i].prev, self.slots[i].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }
        self.slots[i].prev = NIL;
        self.slots[i].next = NIL;
    }

    fn push_back(&mut self, i: usize) {
        self.slots[i].prev = self.tail;
        self.slots[i].next = NIL;
        if self.tail == NIL {
            self.head = i;
        } else {
            self.slots[self.tail].next = i;
        }
        self.tail = i;
    }

    fn touch(&mut self, i: usize) {
        if self.tail != i {
            self.unlink(i);
            self.push_back(i);
        }
    }

    fn evict_to_capacity(&mut self) {
        while self.elements > self.capacity && self.head != NIL {
            let oldest = self.head;
            self.unlink(oldest);
            if let Some(node) = self.slots[oldest].node.take() {
                self.index.remove(&node.id);
                self.elements -= node.element_count();
                self.evictions += 1;
            }
            self.free.push(oldest);
        }
    }
}

impl GraphCache for LinkedLruCache {
    fn contains(&mut self, id: NodeId) -> bool {
        match self.index.get(&id) {
            Some(&i) => {
                self.touch(i);
                true
            }
            None => false,
        }
    }

    fn get(&self, id: NodeId) -> Option<Arc<Node>> {
        self.index
            .get(&id)
            .and_then(|&i| self.slots[i].node.clone())
    }

    fn put(&mut self, node: Arc<Node>) {
        let id = node.id;
        self.elements += node.element_count();
        match self.index.get(&id) {
            Some(&i) => {
                if let Some(old) = self.slots[i].node.replace(node) {
                    self.elements -= old.element_count();
                }
                self.touch(i);
            }
            None => {
                let i = self.allocate(node);
                self.index.insert(id, i);
                self.push_back(i);
            }
        }
        self.evict_to_capacity();
    }

    fn add_edge(&mut self, id: NodeId, edge: Edge) -> bool {
        let Some(&i) = self.index.get(&id) else {
            return false;
        };
        let Some(node) = self.slots[i].node.as_mut() else {
            return false;
        };
        Arc::make_mut(node).edges.push(edge);
        self.elements += 1;
        self.evict_to_capacity();
        true
    }

    fn size(&self) -> usize {
        self.elements
    }

    fn node_count(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn limit_capacity(&mut self) {
        self.capacity = self.elements;
        debug!(capacity = self.capacity, "cache capacity limited");
    }

    fn footprint(&self) -> CacheFootprint {
        let nodes = self.index.len();
        let node_bytes: usize = self
            .slots
            .iter()
            .filter_map(|slot| slot.node.as_deref())
            .map(node_bytes)
            .sum();
        CacheFootprint {
            nodes,
            edges: self.elements - nodes,
            capacity: self.capacity,
            bytes: node_bytes
                + self.slots.capacity() * size_of::<Slot>()
                + self.free.capacity() * size_of::<usize>()
                + self.index.capacity() * (size_of::<(NodeId, usize)>() + 1),
            evictions: self.evictions,
        }
    }
}
