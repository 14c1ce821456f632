//! Backing stores that supply node adjacency to the accessor.

use std::collections::BTreeMap;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

use super::config::{GraphSize, StoreKind};
use super::csv_store::CsvStore;
use super::types::{Edge, NodeId};
use crate::error::GraphError;

/// Source of node adjacency.
///
/// Stores never hand out a partial node: `fetch` either returns every
/// outgoing edge of the node or an error.
pub trait EdgeStore: Send {
    /// Outgoing edges of `id`, without self-loops or duplicates, ordered by
    /// target. Unknown ids have no edges.
    fn fetch(&mut self, id: NodeId) -> Result<Vec<Edge>, GraphError>;

    /// Visits every `(source, edge)` in source order until `sink` returns
    /// `false`. Self-loops and repeated edges of a source are skipped.
    fn scan(&mut self, sink: &mut dyn FnMut(NodeId, Edge) -> bool) -> Result<(), GraphError>;

    /// Releases underlying resources.
    fn close(&mut self) -> Result<(), GraphError> {
        Ok(())
    }

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Opens the store selected by `kind`.
///
/// `Csv` needs `data`; `Grid` is generated from `size`.
pub fn open_store(
    kind: StoreKind,
    size: GraphSize,
    data: Option<&Path>,
) -> Result<Box<dyn EdgeStore>, GraphError> {
    match kind {
        StoreKind::Csv => {
            let path = data.ok_or(GraphError::MissingDataPath("csv"))?;
            Ok(Box::new(CsvStore::open(path)?))
        }
        StoreKind::Grid => Ok(Box::new(GridStore::for_size(size))),
    }
}

/// Validates costs, drops self-loops and duplicates, and orders by target.
pub(crate) fn tidy_edges(source: NodeId, edges: Vec<Edge>) -> Result<Vec<Edge>, GraphError> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::with_capacity(edges.len());
    for edge in edges {
        check_cost(source, &edge)?;
        if edge.target != source && seen.insert(edge) {
            out.push(edge);
        }
    }
    out.sort_by(|a, b| a.target.cmp(&b.target).then(a.cost.total_cmp(&b.cost)));
    Ok(out)
}

pub(crate) fn check_cost(source: NodeId, edge: &Edge) -> Result<(), GraphError> {
    if edge.has_valid_cost() {
        Ok(())
    } else {
        Err(GraphError::InvalidCost {
            source_id: source,
            target: edge.target,
            cost: edge.cost,
        })
    }
}

/// Adjacency held fully in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    adjacency: BTreeMap<NodeId, Vec<Edge>>,
}

impl MemoryStore {
    /// Builds a store from `(source, target, cost)` triples.
    pub fn from_edges<I>(edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (NodeId, NodeId, f64)>,
    {
        let mut raw: BTreeMap<NodeId, Vec<Edge>> = BTreeMap::new();
        for (source, target, cost) in edges {
            raw.entry(source).or_default().push(Edge::new(cost, target));
        }
        let mut adjacency = BTreeMap::new();
        for (source, edges) in raw {
            let edges = tidy_edges(source, edges)?;
            if !edges.is_empty() {
                adjacency.insert(source, edges);
            }
        }
        Ok(Self { adjacency })
    }

    /// Number of nodes with at least one outgoing edge.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}

impl EdgeStore for MemoryStore {
    fn fetch(&mut self, id: NodeId) -> Result<Vec<Edge>, GraphError> {
        Ok(self.adjacency.get(&id).cloned().unwrap_or_default())
    }

    fn scan(&mut self, sink: &mut dyn FnMut(NodeId, Edge) -> bool) -> Result<(), GraphError> {
        for (&source, edges) in &self.adjacency {
            for &edge in edges {
                if !sink(source, edge) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Square 4-connected lattice computed on the fly.
///
/// Node `r * side + c` links to its horizontal and vertical neighbours in
/// both directions. Each undirected pair gets one cost in `[1, 10)` drawn
/// from an RNG seeded by the pair, so the graph is symmetric and
/// reproducible without being stored.
#[derive(Debug, Clone, Copy)]
pub struct GridStore {
    side: u64,
    seed: u64,
}

impl GridStore {
    /// Default cost seed.
    pub const DEFAULT_SEED: u64 = 0x5EED_7001;

    /// Creates a `side × side` lattice.
    pub fn new(side: u64, seed: u64) -> Self {
        Self { side, seed }
    }

    /// Largest lattice that fits in the node count of `size`.
    pub fn for_size(size: GraphSize) -> Self {
        let side = (size.nodes() as f64).sqrt().floor() as u64;
        Self::new(side, Self::DEFAULT_SEED)
    }

    /// Lattice side length.
    pub fn side(&self) -> u64 {
        self.side
    }

    /// Number of nodes.
    pub fn node_count(&self) -> u64 {
        self.side * self.side
    }

    /// Cost of the undirected pair `{a, b}`.
    pub fn pair_cost(&self, a: NodeId, b: NodeId) -> f64 {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let key = lo
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .rotate_left(17)
            ^ hi.wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        let mut rng = StdRng::seed_from_u64(self.seed ^ key);
        rng.random_range(1.0..10.0)
    }

    fn neighbours(&self, id: NodeId) -> Vec<NodeId> {
        if id >= self.node_count() {
            return Vec::new();
        }
        let (row, col) = (id / self.side, id % self.side);
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.push(id - self.side);
        }
        if col > 0 {
            out.push(id - 1);
        }
        if col + 1 < self.side {
            out.push(id + 1);
        }
        if row + 1 < self.side {
            out.push(id + self.side);
        }
        out
    }
}

impl EdgeStore for GridStore {
    fn fetch(&mut self, id: NodeId) -> Result<Vec<Edge>, GraphError> {
        Ok(self
            .neighbours(id)
            .into_iter()
            .map(|target| Edge::new(self.pair_cost(id, target), target))
            .collect())
    }

    fn scan(&mut self, sink: &mut dyn FnMut(NodeId, Edge) -> bool) -> Result<(), GraphError> {
        for source in 0..self.node_count() {
            for target in self.neighbours(source) {
                if !sink(source, Edge::new(self.pair_cost(source, target), target)) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}
