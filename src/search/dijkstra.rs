//! Label-setting one-to-many search.

use std::mem::size_of;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use super::frontier::{Frontier, FrontierKind};
use super::SearchFootprint;
use crate::error::{ConfigError, SearchError};
use crate::graph::{GraphAccess, NodeId};

/// Configuration of a one-to-many search.
///
/// # Examples
///
/// ```
/// use u_tour::search::{FrontierKind, SearchConfig};
///
/// let config = SearchConfig::default()
///     .with_frontier(FrontierKind::PriorityQueue)
///     .with_memory_budget(64 << 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Frontier implementation.
    pub frontier: FrontierKind,

    /// Upper bound in bytes on frontier plus discovered-node map.
    ///
    /// Exceeding it fails the search as out of memory. `None` leaves only
    /// real allocation failures.
    pub memory_budget: Option<usize>,
}

impl SearchConfig {
    pub fn with_frontier(mut self, frontier: FrontierKind) -> Self {
        self.frontier = frontier;
        self
    }

    pub fn with_memory_budget(mut self, bytes: usize) -> Self {
        self.memory_budget = Some(bytes);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_budget == Some(0) {
            return Err(ConfigError::invalid("memory_budget", "must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Frontier,
    Finalized,
}

/// Per-search state of a discovered node. Undiscovered nodes have none.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    distance: f64,
    color: Color,
}

struct Search {
    source: NodeId,
    frontier: Box<dyn Frontier>,
    nodes: FxHashMap<NodeId, SearchNode>,
    budget: Option<usize>,
}

impl Search {
    fn footprint(&self, cache_size: usize) -> SearchFootprint {
        SearchFootprint {
            frontier_len: self.frontier.len(),
            frontier_bytes: self.frontier.footprint_bytes(),
            discovered: self.nodes.len(),
            discovered_bytes: self.nodes.capacity() * (size_of::<(NodeId, SearchNode)>() + 1),
            cache_size,
        }
    }

    /// Records a newly discovered node and queues it.
    fn discover(&mut self, id: NodeId, distance: f64, cache_size: usize) -> Result<(), SearchError> {
        let reserved = self.frontier.try_reserve(1) && self.nodes.try_reserve(1).is_ok();
        let over_budget = self
            .budget
            .is_some_and(|budget| self.footprint(cache_size).total_bytes() > budget);
        if !reserved || over_budget {
            let footprint = self.footprint(cache_size);
            warn!(source = self.source, %footprint, "search ran out of memory");
            return Err(SearchError::OutOfMemory {
                source_id: self.source,
                footprint,
            });
        }
        self.nodes.insert(
            id,
            SearchNode {
                distance,
                color: Color::Frontier,
            },
        );
        self.frontier.enqueue(id, distance);
        Ok(())
    }
}

/// Shortest distances from `source` to each of `targets`, in the given order.
///
/// Nodes are fetched from `graph` only when settled, and the search stops
/// as soon as every distinct target is settled. Edge costs are assumed
/// non-negative, which every [`EdgeStore`](crate::graph::EdgeStore)
/// guarantees.
///
/// # Errors
///
/// - [`SearchError::Unreachable`] if the frontier empties first.
/// - [`SearchError::OutOfMemory`] if the search state cannot grow or
///   exceeds [`SearchConfig::memory_budget`].
/// - [`SearchError::Graph`] if the accessor fails.
pub fn one_to_many<G>(
    graph: &mut G,
    source: NodeId,
    targets: &[NodeId],
    config: &SearchConfig,
) -> Result<Vec<f64>, SearchError>
where
    G: GraphAccess + ?Sized,
{
    config.validate()?;
    if targets.is_empty() {
        return Err(SearchError::EmptyTargets(source));
    }

    let mut pending: FxHashSet<NodeId> = targets.iter().copied().collect();
    let mut search = Search {
        source,
        frontier: config.frontier.create(),
        nodes: FxHashMap::default(),
        budget: config.memory_budget,
    };
    search.discover(source, 0.0, graph.cache_size())?;

    let mut settled = 0usize;
    while let Some((id, distance)) = search.frontier.extract_min() {
        if let Some(state) = search.nodes.get_mut(&id) {
            state.color = Color::Finalized;
        }
        settled += 1;
        pending.remove(&id);
        if pending.is_empty() {
            break;
        }

        let node = graph.get_node(id)?;
        for edge in &node.edges {
            let candidate = distance + edge.cost;
            match search.nodes.get_mut(&edge.target) {
                None => search.discover(edge.target, candidate, graph.cache_size())?,
                Some(state) if state.color == Color::Frontier && candidate < state.distance => {
                    state.distance = candidate;
                    search.frontier.decrease_priority(edge.target, candidate);
                }
                Some(_) => {}
            }
        }
    }

    debug!(
        source,
        settled,
        discovered = search.nodes.len(),
        cache_size = graph.cache_size(),
        "search finished"
    );

    if !pending.is_empty() {
        let mut seen = FxHashSet::default();
        let missing = targets
            .iter()
            .copied()
            .filter(|t| pending.contains(t) && seen.insert(*t))
            .collect();
        return Err(SearchError::Unreachable {
            source_id: source,
            missing,
        });
    }

    Ok(targets
        .iter()
        .filter_map(|t| search.nodes.get(t).map(|state| state.distance))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CachedGraph, GraphConfig, MemoryStore};
    use proptest::prelude::*;

    fn graph(edges: &[(NodeId, NodeId, f64)]) -> CachedGraph {
        let store = MemoryStore::from_edges(edges.iter().copied()).unwrap();
        CachedGraph::open(Box::new(store), &GraphConfig::default().with_capacity(1_000)).unwrap()
    }

    fn configs() -> [SearchConfig; 2] {
        [
            SearchConfig::default(),
            SearchConfig::default().with_frontier(FrontierKind::PriorityQueue),
        ]
    }

    #[test]
    fn test_distances_in_target_order() {
        let edges = [
            (1, 2, 7.0),
            (1, 3, 9.0),
            (1, 6, 14.0),
            (2, 3, 10.0),
            (2, 4, 15.0),
            (3, 4, 11.0),
            (3, 6, 2.0),
            (4, 5, 6.0),
            (6, 5, 9.0),
        ];
        for config in configs() {
            let mut g = graph(&edges);
            let d = one_to_many(&mut g, 1, &[5, 1, 4, 6], &config).unwrap();
            assert_eq!(d, vec![20.0, 0.0, 20.0, 11.0]);
        }
    }

    #[test]
    fn test_duplicate_targets() {
        let mut g = graph(&[(1, 2, 1.0), (2, 3, 1.0)]);
        let d = one_to_many(&mut g, 1, &[3, 3, 2], &SearchConfig::default()).unwrap();
        assert_eq!(d, vec![2.0, 2.0, 1.0]);
    }

    #[test]
    fn test_stops_once_targets_settled() {
        let mut g = graph(&[(1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 5, 1.0)]);
        one_to_many(&mut g, 1, &[2], &SearchConfig::default()).unwrap();
        // Only the source was expanded; the target itself is never fetched.
        assert_eq!(g.fetch_count(), 1);
    }

    #[test]
    fn test_unreachable_target() {
        let mut g = graph(&[(1, 2, 1.0), (3, 4, 1.0)]);
        let err = one_to_many(&mut g, 1, &[2, 99, 4, 99], &SearchConfig::default()).unwrap_err();
        match err {
            SearchError::Unreachable { source_id, missing } => {
                assert_eq!(source_id, 1);
                assert_eq!(missing, vec![99, 4]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_targets() {
        let mut g = graph(&[(1, 2, 1.0)]);
        assert!(matches!(
            one_to_many(&mut g, 1, &[], &SearchConfig::default()),
            Err(SearchError::EmptyTargets(1))
        ));
    }

    #[test]
    fn test_memory_budget_reports_footprint() {
        let edges: Vec<_> = (0..500u64).map(|i| (0, i + 1, 1.0 + i as f64)).collect();
        let mut g = graph(&edges);
        let config = SearchConfig::default().with_memory_budget(256);
        let err = one_to_many(&mut g, 0, &[500], &config).unwrap_err();
        assert!(err.is_out_of_memory());
        match err {
            SearchError::OutOfMemory { source_id, footprint } => {
                assert_eq!(source_id, 0);
                assert!(footprint.discovered >= 1);
                assert!(footprint.to_string().contains("frontier"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_closed_graph_propagates() {
        let mut g = graph(&[(1, 2, 1.0)]);
        g.close().unwrap();
        assert!(matches!(
            one_to_many(&mut g, 1, &[2], &SearchConfig::default()),
            Err(SearchError::Graph(_))
        ));
    }

    fn bellman_ford(n: u64, edges: &[(NodeId, NodeId, f64)], source: NodeId) -> Vec<f64> {
        let mut dist = vec![f64::INFINITY; n as usize];
        dist[source as usize] = 0.0;
        loop {
            let mut changed = false;
            for &(u, v, w) in edges {
                if u != v && dist[u as usize] + w < dist[v as usize] {
                    dist[v as usize] = dist[u as usize] + w;
                    changed = true;
                }
            }
            if !changed {
                return dist;
            }
        }
    }

    proptest! {
        #[test]
        fn prop_matches_bellman_ford(
            n in 2u64..24,
            raw in proptest::collection::vec((0u64..24, 0u64..24, 0u32..50), 0..120),
            source in 0u64..24,
        ) {
            let source = source % n;
            let edges: Vec<_> = raw
                .into_iter()
                .map(|(u, v, w)| (u % n, v % n, w as f64))
                .collect();
            let expected = bellman_ford(n, &edges, source);
            let reachable: Vec<NodeId> =
                (0..n).filter(|&v| expected[v as usize].is_finite()).collect();

            for config in configs() {
                let mut g = graph(&edges);
                let got = one_to_many(&mut g, source, &reachable, &config).unwrap();
                for (target, d) in reachable.iter().zip(got) {
                    prop_assert_eq!(d, expected[*target as usize]);
                }

                if let Some(unreachable) = (0..n).find(|&v| expected[v as usize].is_infinite()) {
                    let mut g = graph(&edges);
                    let err = one_to_many(&mut g, source, &[unreachable], &config).unwrap_err();
                    let is_unreachable = matches!(err, SearchError::Unreachable { .. });
                    prop_assert!(is_unreachable);
                }
            }
        }
    }
}
