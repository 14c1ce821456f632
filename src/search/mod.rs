//! Shortest-path search over a cached graph.
//!
//! [`one_to_many`] runs a label-setting search from one source until every
//! requested target is settled. The priority queue is pluggable through
//! [`Frontier`]; per-search node state lives in a map owned by the call, so
//! cached nodes stay immutable and shareable between searches.

mod dijkstra;
mod frontier;

pub use dijkstra::{one_to_many, SearchConfig};
pub use frontier::{Frontier, FrontierKind, HeapFrontier, QueueFrontier};

use std::fmt;

/// Memory held by a search, reported when it runs out of room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchFootprint {
    /// Nodes waiting in the frontier.
    pub frontier_len: usize,
    /// Approximate bytes held by the frontier.
    pub frontier_bytes: usize,
    /// Nodes discovered so far.
    pub discovered: usize,
    /// Approximate bytes held by the discovered-node map.
    pub discovered_bytes: usize,
    /// Elements in the graph cache at the time.
    pub cache_size: usize,
}

impl SearchFootprint {
    /// Frontier plus discovered-node bytes.
    pub fn total_bytes(&self) -> usize {
        self.frontier_bytes + self.discovered_bytes
    }
}

impl fmt::Display for SearchFootprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frontier {} nodes (~{} bytes), discovered {} nodes (~{} bytes), cache {} elements",
            self.frontier_len,
            self.frontier_bytes,
            self.discovered,
            self.discovered_bytes,
            self.cache_size
        )
    }
}
