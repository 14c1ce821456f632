//! LRU cache ordered by logical timestamps in an indexed min-heap.

use std::mem::size_of;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{node_bytes, CacheFootprint, GraphCache};
use crate::graph::{Edge, Node, NodeId};
use crate::heap::IndexedHeap;

/// LRU cache with O(log n) touch and eviction.
///
/// Every touch stamps the node with the next value of a strictly
/// increasing clock; eviction pops the smallest stamp. Stamps only grow, so
/// a touch is a sift-down of the node's heap slot.
#[derive(Debug)]
pub struct StampLruCache {
    nodes: FxHashMap<NodeId, Arc<Node>>,
    stamps: IndexedHeap<u64>,
    clock: u64,
    capacity: usize,
    elements: usize,
    evictions: u64,
}

impl StampLruCache {
    /// Creates an empty cache holding at most `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: FxHashMap::default(),
            stamps: IndexedHeap::new(),
            clock: 0,
            capacity,
            elements: 0,
            evictions: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        let now = self.clock;
        self.clock += 1;
        now
    }

    fn evict_to_capacity(&mut self) {
        while self.elements > self.capacity {
            let Some((oldest, _)) = self.stamps.pop() else {
                break;
            };
            if let Some(node) = self.nodes.remove(&oldest) {
                self.elements -= node.element_count();
                self.evictions += 1;
            }
        }
    }
}

impl GraphCache for StampLruCache {
    fn contains(&mut self, id: NodeId) -> bool {
        if self.nodes.contains_key(&id) {
            let now = self.tick();
            self.stamps.update(id, now);
            true
        } else {
            false
        }
    }

    fn get(&self, id: NodeId) -> Option<Arc<Node>> {
        self.nodes.get(&id).cloned()
    }

    fn put(&mut self, node: Arc<Node>) {
        let id = node.id;
        self.elements += node.element_count();
        if let Some(old) = self.nodes.insert(id, node) {
            self.elements -= old.element_count();
        }
        let now = self.tick();
        self.stamps.push(id, now);
        self.evict_to_capacity();
    }

    fn add_edge(&mut self, id: NodeId, edge: Edge) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
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
        self.nodes.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn limit_capacity(&mut self) {
        self.capacity = self.elements;
        debug!(capacity = self.capacity, "cache capacity limited");
    }

    fn footprint(&self) -> CacheFootprint {
        let nodes = self.nodes.len();
        let node_bytes: usize = self.nodes.values().map(|n| node_bytes(n)).sum();
        CacheFootprint {
            nodes,
            edges: self.elements - nodes,
            capacity: self.capacity,
            bytes: node_bytes
                + self.nodes.capacity() * (size_of::<(NodeId, Arc<Node>)>() + 1)
                + self.stamps.footprint_bytes(),
            evictions: self.evictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(id: NodeId) -> Arc<Node> {
        Arc::new(Node::new(id, Vec::new()))
    }

    #[test]
    fn test_stamps_strictly_increase() {
        let mut cache = StampLruCache::new(100);
        cache.put(bare(1));
        cache.put(bare(2));
        cache.contains(1);
        assert!(cache.stamps.priority(1) > cache.stamps.priority(2));
        assert_eq!(cache.stamps.peek().map(|(id, _)| id), Some(2));
    }

    #[test]
    fn test_eviction_pops_oldest_stamp() {
        let mut cache = StampLruCache::new(3);
        for id in 1..=3 {
            cache.put(bare(id));
        }
        cache.contains(1);
        cache.contains(2);
        cache.put(bare(4));
        assert!(cache.get(3).is_none());
        assert_eq!(cache.node_count(), 3);
        assert_eq!(cache.stamps.len(), 3);
    }
}
