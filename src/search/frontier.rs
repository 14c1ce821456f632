//! Priority queues holding the discovered but unsettled nodes of a search.

use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::mem::size_of;
use std::str::FromStr;

use priority_queue::PriorityQueue;

use crate::error::ConfigError;
use crate::graph::NodeId;
use crate::heap::IndexedHeap;

/// Min-priority queue used by the search.
pub trait Frontier {
    /// Adds `node` with `priority`.
    fn enqueue(&mut self, node: NodeId, priority: f64);

    /// Removes the node with the smallest priority.
    fn extract_min(&mut self) -> Option<(NodeId, f64)>;

    /// Lowers the priority of a queued node.
    fn decrease_priority(&mut self, node: NodeId, priority: f64);

    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;

    /// Reserves room for `additional` entries. Returns `false` when the
    /// allocation fails instead of aborting.
    fn try_reserve(&mut self, additional: usize) -> bool;

    /// Approximate heap memory held.
    fn footprint_bytes(&self) -> usize;
}

/// Frontier implementation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrontierKind {
    /// Indexed binary heap with in-place decrease-key.
    #[default]
    BinaryHeap,
    /// Hash-indexed queue from the `priority-queue` crate.
    PriorityQueue,
}

impl FrontierKind {
    /// Creates an empty frontier of this kind.
    pub fn create(self) -> Box<dyn Frontier> {
        match self {
            FrontierKind::BinaryHeap => Box::new(HeapFrontier::default()),
            FrontierKind::PriorityQueue => Box::new(QueueFrontier::default()),
        }
    }
}

impl FromStr for FrontierKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::graph::config::normalize(s).as_str() {
            "binary_heap" | "binaryheap" | "heap" => Ok(FrontierKind::BinaryHeap),
            "priority_queue" | "priorityqueue" | "queue" => Ok(FrontierKind::PriorityQueue),
            _ => Err(ConfigError::Unrecognized {
                kind: "frontier",
                value: s.to_string(),
                expected: "binary_heap, priority_queue",
            }),
        }
    }
}

impl fmt::Display for FrontierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrontierKind::BinaryHeap => "binary_heap",
            FrontierKind::PriorityQueue => "priority_queue",
        })
    }
}

/// [`Frontier`] over the crate's [`IndexedHeap`].
#[derive(Debug, Default)]
pub struct HeapFrontier {
    heap: IndexedHeap<f64>,
}

impl Frontier for HeapFrontier {
    fn enqueue(&mut self, node: NodeId, priority: f64) {
        self.heap.push(node, priority);
    }

    fn extract_min(&mut self) -> Option<(NodeId, f64)> {
        self.heap.pop()
    }

    fn decrease_priority(&mut self, node: NodeId, priority: f64) {
        self.heap.update(node, priority);
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn try_reserve(&mut self, additional: usize) -> bool {
        self.heap.try_reserve(additional).is_ok()
    }

    fn footprint_bytes(&self) -> usize {
        self.heap.footprint_bytes()
    }
}

/// Total order over distances so they can key a max-queue.
#[derive(Debug, Clone, Copy)]
struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Distance {}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// [`Frontier`] over [`priority_queue::PriorityQueue`].
#[derive(Debug, Default)]
pub struct QueueFrontier {
    queue: PriorityQueue<NodeId, Reverse<Distance>>,
}

impl Frontier for QueueFrontier {
    fn enqueue(&mut self, node: NodeId, priority: f64) {
        self.queue.push(node, Reverse(Distance(priority)));
    }

    fn extract_min(&mut self) -> Option<(NodeId, f64)> {
        self.queue
            .pop()
            .map(|(node, Reverse(Distance(priority)))| (node, priority))
    }

    fn decrease_priority(&mut self, node: NodeId, priority: f64) {
        self.queue.change_priority(&node, Reverse(Distance(priority)));
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn try_reserve(&mut self, additional: usize) -> bool {
        self.queue.try_reserve(additional).is_ok()
    }

    fn footprint_bytes(&self) -> usize {
        // Item store plus the two index vectors of the queue.
        self.queue.capacity()
            * (size_of::<(NodeId, Reverse<Distance>)>() + 2 * size_of::<usize>() + 1)
    }
}
