//! Bounded node cache with least-recently-used eviction.
//!
//! Capacity is measured in elements: each cached node costs one element
//! for itself plus one per stored edge. Inserting past capacity evicts
//! whole nodes, oldest touch first, until the cache fits again.
//!
//! Two interchangeable strategies are provided:
//!
//! - [`LinkedLruCache`]: arena-backed doubly linked recency list, O(1).
//! - [`StampLruCache`]: logical timestamps in an indexed min-heap, O(log n).
//!
//! Both evict in the same order for the same sequence of touches.

mod linked;
mod stamp;

pub use linked::LinkedLruCache;
pub use stamp::StampLruCache;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::graph::{Edge, Node, NodeId};

/// Capacity value meaning "never evict".
pub const UNBOUNDED: usize = usize::MAX;

/// Operations shared by every cache strategy.
pub trait GraphCache: Send {
    /// Whether `id` is cached. A hit counts as a touch.
    fn contains(&mut self, id: NodeId) -> bool;

    /// The cached node, without touching it.
    fn get(&self, id: NodeId) -> Option<Arc<Node>>;

    /// Inserts or replaces a node, touches it and evicts down to capacity.
    ///
    /// A node larger than the whole capacity is evicted right away.
    fn put(&mut self, node: Arc<Node>);

    /// Appends an edge to a cached node and evicts down to capacity.
    ///
    /// Returns `false` when `id` is not cached.
    fn add_edge(&mut self, id: NodeId, edge: Edge) -> bool;

    /// Elements held: nodes plus their edges.
    fn size(&self) -> usize;

    /// Number of cached nodes.
    fn node_count(&self) -> usize;

    /// Current capacity in elements.
    fn capacity(&self) -> usize;

    /// Freezes capacity at the current size.
    fn limit_capacity(&mut self);

    /// Memory diagnostics.
    fn footprint(&self) -> CacheFootprint;
}

/// Cache strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CacheKind {
    /// Doubly linked recency list.
    #[default]
    Linked,
    /// Timestamp min-heap.
    Stamp,
}

impl CacheKind {
    /// Creates an empty cache of this kind.
    pub fn create(self, capacity: usize) -> Box<dyn GraphCache> {
        match self {
            CacheKind::Linked => Box::new(LinkedLruCache::new(capacity)),
            CacheKind::Stamp => Box::new(StampLruCache::new(capacity)),
        }
    }
}

impl FromStr for CacheKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::graph::config::normalize(s).as_str() {
            "linked" | "fast" => Ok(CacheKind::Linked),
            "stamp" | "slow" => Ok(CacheKind::Stamp),
            _ => Err(ConfigError::Unrecognized {
                kind: "cache",
                value: s.to_string(),
                expected: "linked, stamp",
            }),
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheKind::Linked => "linked",
            CacheKind::Stamp => "stamp",
        })
    }
}

/// Snapshot of what a cache holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheFootprint {
    /// Cached nodes.
    pub nodes: usize,
    /// Cached edges.
    pub edges: usize,
    /// Capacity in elements.
    pub capacity: usize,
    /// Approximate heap bytes, including bookkeeping.
    pub bytes: usize,
    /// Nodes evicted since creation.
    pub evictions: u64,
}

impl fmt::Display for CacheFootprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cache: {} nodes, {} edges, capacity ",
            self.nodes, self.edges
        )?;
        if self.capacity == UNBOUNDED {
            f.write_str("unbounded")?;
        } else {
            write!(f, "{}", self.capacity)?;
        }
        write!(f, ", ~{} bytes, {} evictions", self.bytes, self.evictions)
    }
}

pub(crate) fn node_bytes(node: &Node) -> usize {
    std::mem::size_of::<Node>() + node.edges.capacity() * std::mem::size_of::<Edge>()
}
