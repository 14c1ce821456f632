//! Pairwise cost matrix from one search per waypoint.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::types::CostMatrix;
use crate::error::{ConfigError, SearchError};
use crate::graph::{GraphAccess, NodeId};
use crate::search::{one_to_many, SearchConfig};

/// What the builder does with a row whose search hit an unreachable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowFailure {
    /// Leave the row zero-filled, log it and keep building.
    #[default]
    Degrade,
    /// Fail the whole build.
    Abort,
}

impl FromStr for RowFailure {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::graph::config::normalize(s).as_str() {
            "degrade" => Ok(RowFailure::Degrade),
            "abort" => Ok(RowFailure::Abort),
            _ => Err(ConfigError::Unrecognized {
                kind: "row failure policy",
                value: s.to_string(),
                expected: "degrade, abort",
            }),
        }
    }
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RowFailure::Degrade => "degrade",
            RowFailure::Abort => "abort",
        })
    }
}

/// Configuration of a [`CostMatrixBuilder`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixConfig {
    /// Symmetrize the matrix after all rows are built.
    pub symmetric: bool,

    /// Settings for every row search.
    pub search: SearchConfig,

    /// Policy for rows with an unreachable target.
    pub on_unreachable: RowFailure,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            symmetric: true,
            search: SearchConfig::default(),
            on_unreachable: RowFailure::default(),
        }
    }
}

impl MatrixConfig {
    pub fn with_symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_on_unreachable(mut self, policy: RowFailure) -> Self {
        self.on_unreachable = policy;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()
    }
}

/// A built matrix and how it was obtained.
#[derive(Debug, Clone)]
pub struct BuiltMatrix {
    /// Pairwise costs, row `i` searched from waypoint `i`.
    pub matrix: CostMatrix,

    /// Rows left zero-filled because a target was unreachable.
    pub degraded_rows: Vec<usize>,

    /// Wall time spent searching.
    pub elapsed: Duration,
}

/// Builds waypoint cost matrices over a graph.
#[derive(Debug, Clone, Default)]
pub struct CostMatrixBuilder {
    config: MatrixConfig,
}

impl CostMatrixBuilder {
    pub fn new(config: MatrixConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    /// Runs one search per waypoint against all waypoints.
    ///
    /// # Errors
    ///
    /// Out-of-memory and graph failures always abort the build. Unreachable
    /// targets abort it only under [`RowFailure::Abort`].
    pub fn build<G>(&self, graph: &mut G, waypoints: &[NodeId]) -> Result<BuiltMatrix, SearchError>
    where
        G: GraphAccess + ?Sized,
    {
        self.config.validate()?;
        let started = Instant::now();
        let mut matrix = CostMatrix::zeros(waypoints.len());
        let mut degraded_rows = Vec::new();

        for (i, &source) in waypoints.iter().enumerate() {
            match one_to_many(graph, source, waypoints, &self.config.search) {
                Ok(row) => matrix.set_row(i, &row),
                Err(err @ SearchError::Unreachable { .. })
                    if self.config.on_unreachable == RowFailure::Degrade =>
                {
                    warn!(row = i, source, error = %err, "cost matrix row left zero-filled");
                    degraded_rows.push(i);
                }
                Err(err) => return Err(err),
            }
        }
        let elapsed = started.elapsed();
        info!(
            waypoints = waypoints.len(),
            degraded = degraded_rows.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "built cost matrix"
        );

        if self.config.symmetric {
            let started = Instant::now();
            matrix.symmetrize();
            info!(
                elapsed_us = started.elapsed().as_micros() as u64,
                "made cost matrix symmetric"
            );
        }

        Ok(BuiltMatrix {
            matrix,
            degraded_rows,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CachedGraph, GraphConfig, MemoryStore};

    fn graph(edges: &[(NodeId, NodeId, f64)]) -> CachedGraph {
        let store = MemoryStore::from_edges(edges.iter().copied()).unwrap();
        CachedGraph::open(Box::new(store), &GraphConfig::default()).unwrap()
    }

    fn one_way_ring() -> CachedGraph {
        graph(&[(1, 2, 1.0), (2, 3, 2.0), (3, 1, 3.0)])
    }

    #[test]
    fn test_asymmetric_rows() {
        let builder = CostMatrixBuilder::new(MatrixConfig::default().with_symmetric(false));
        let built = builder.build(&mut one_way_ring(), &[1, 2, 3]).unwrap();
        assert_eq!(
            built.matrix.to_rows(),
            vec![vec![0.0, 1.0, 3.0], vec![5.0, 0.0, 2.0], vec![3.0, 4.0, 0.0]]
        );
        assert!(built.degraded_rows.is_empty());
    }

    #[test]
    fn test_symmetric_means() {
        let built = CostMatrixBuilder::default()
            .build(&mut one_way_ring(), &[1, 2, 3])
            .unwrap();
        assert!(built.matrix.is_symmetric());
        assert_eq!(built.matrix[(0, 1)], 3.0);
        assert_eq!(built.matrix[(1, 2)], 3.0);
        assert_eq!(built.matrix[(0, 2)], 3.0);
    }

    #[test]
    fn test_unreachable_row_degrades() {
        // Node 3 is a sink, so its row cannot be built.
        let mut g = graph(&[(1, 2, 1.0), (2, 1, 1.0), (2, 3, 4.0)]);
        let builder = CostMatrixBuilder::new(MatrixConfig::default().with_symmetric(false));
        let built = builder.build(&mut g, &[1, 2, 3]).unwrap();
        assert_eq!(built.degraded_rows, vec![2]);
        assert_eq!(built.matrix.row(2), &[0.0, 0.0, 0.0]);
        assert_eq!(built.matrix.row(0), &[0.0, 1.0, 5.0]);
    }

    #[test]
    fn test_unreachable_row_aborts() {
        let mut g = graph(&[(1, 2, 1.0), (2, 1, 1.0), (2, 3, 4.0)]);
        let builder = CostMatrixBuilder::new(
            MatrixConfig::default().with_on_unreachable(RowFailure::Abort),
        );
        assert!(matches!(
            builder.build(&mut g, &[1, 2, 3]),
            Err(SearchError::Unreachable { source_id: 3, .. })
        ));
    }

    #[test]
    fn test_out_of_memory_always_propagates() {
        let mut g = one_way_ring();
        let config = MatrixConfig::default()
            .with_search(SearchConfig::default().with_memory_budget(1));
        let err = CostMatrixBuilder::new(config)
            .build(&mut g, &[1, 2, 3])
            .unwrap_err();
        assert!(err.is_out_of_memory());
    }

    #[test]
    fn test_parse_row_failure() {
        assert_eq!("ABORT".parse::<RowFailure>(), Ok(RowFailure::Abort));
        assert!("retry".parse::<RowFailure>().is_err());
    }
}
