//! Cache-backed graph accessor.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::config::{AccessMode, GraphConfig};
use super::store::EdgeStore;
use super::types::{Node, NodeId};
use crate::cache::{CacheFootprint, GraphCache, UNBOUNDED};
use crate::error::GraphError;

/// What a search needs from a graph.
pub trait GraphAccess {
    /// The node `id` with its full outgoing edge list.
    ///
    /// Ids unknown to the store yield a node without edges.
    fn get_node(&mut self, id: NodeId) -> Result<Arc<Node>, GraphError>;

    /// Releases the backing store. Later calls fail with
    /// [`GraphError::Closed`].
    fn close(&mut self) -> Result<(), GraphError>;

    /// Elements currently cached.
    fn cache_size(&self) -> usize;

    /// Human-readable memory diagnostics.
    fn cache_footprint(&self) -> String;
}

/// [`GraphAccess`] over an [`EdgeStore`] with a bounded node cache.
pub struct CachedGraph {
    store: Box<dyn EdgeStore>,
    cache: Box<dyn GraphCache>,
    mode: AccessMode,
    fetches: u64,
    closed: bool,
}

impl CachedGraph {
    /// Opens an accessor over `store`.
    ///
    /// In [`AccessMode::All`] the store is scanned into an unbounded cache
    /// (up to `preload_ratio` of the size class, rounded up to whole nodes)
    /// whose capacity is then frozen. In [`AccessMode::OnDemand`] the cache starts empty with
    /// `capacity` elements.
    pub fn open(store: Box<dyn EdgeStore>, config: &GraphConfig) -> Result<Self, GraphError> {
        config.validate()?;
        let capacity = match config.access_mode {
            AccessMode::All => UNBOUNDED,
            AccessMode::OnDemand => config.capacity,
        };
        let mut graph = Self {
            store,
            cache: config.cache.create(capacity),
            mode: config.access_mode,
            fetches: 0,
            closed: false,
        };
        if graph.mode == AccessMode::All {
            graph.preload(config)?;
        }
        Ok(graph)
    }

    fn preload(&mut self, config: &GraphConfig) -> Result<(), GraphError> {
        let started = Instant::now();
        let (edge_limit, element_limit) = if config.preload_ratio < 1.0 {
            (
                (config.size.relationships() as f64 * config.preload_ratio) as usize,
                (config.size.elements() as f64 * config.preload_ratio) as usize,
            )
        } else {
            (usize::MAX, usize::MAX)
        };

        // Nodes are committed whole, so the scan only stops between sources.
        let cache = &mut self.cache;
        let mut loaded = 0usize;
        let mut pending: Option<Node> = None;
        self.store.scan(&mut |source, edge| {
            if let Some(node) = pending.as_mut().filter(|node| node.id == source) {
                node.edges.push(edge);
                return true;
            }
            if let Some(node) = pending.take() {
                loaded += node.edges.len();
                cache.put(Arc::new(node));
            }
            if loaded >= edge_limit || cache.size() >= element_limit {
                return false;
            }
            pending = Some(Node::with_edge(source, edge));
            true
        })?;
        if let Some(node) = pending.take() {
            loaded += node.edges.len();
            self.cache.put(Arc::new(node));
        }
        self.cache.limit_capacity();

        info!(
            store = self.store.name(),
            edges = loaded,
            nodes = self.cache.node_count(),
            capacity = self.cache.capacity(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "preloaded graph"
        );
        Ok(())
    }

    /// Access mode chosen at open time.
    pub fn access_mode(&self) -> AccessMode {
        self.mode
    }

    /// Number of store fetches caused by cache misses.
    pub fn fetch_count(&self) -> u64 {
        self.fetches
    }

    /// Structured cache diagnostics.
    pub fn footprint(&self) -> CacheFootprint {
        self.cache.footprint()
    }
}

impl GraphAccess for CachedGraph {
    fn get_node(&mut self, id: NodeId) -> Result<Arc<Node>, GraphError> {
        if self.closed {
            return Err(GraphError::Closed);
        }
        if self.cache.contains(id) {
            if let Some(node) = self.cache.get(id) {
                return Ok(node);
            }
        }
        let edges = self.store.fetch(id)?;
        self.fetches += 1;
        let node = Arc::new(Node::new(id, edges));
        self.cache.put(Arc::clone(&node));
        Ok(node)
    }

    fn close(&mut self) -> Result<(), GraphError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!(store = self.store.name(), fetches = self.fetches, "closing graph");
        self.store.close()
    }

    fn cache_size(&self) -> usize {
        self.cache.size()
    }

    fn cache_footprint(&self) -> String {
        format!(
            "{} ({} store, {}, {} fetches)",
            self.cache.footprint(),
            self.store.name(),
            self.mode,
            self.fetches
        )
    }
}
