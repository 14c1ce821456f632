//! Error types for every layer of the pipeline.
//!
//! Each layer owns one enum. Lower-layer errors convert upward with `#[from]`
//! so `?` works across the graph, search, matrix and experiment boundaries.

use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;
use crate::search::SearchFootprint;

/// An unrecognized or inconsistent configuration value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A selector string did not match any known variant.
    #[error("unrecognized {kind} `{value}` (expected one of: {expected})")]
    Unrecognized {
        /// Which selector was being parsed (e.g. "access mode").
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Comma-separated list of accepted names.
        expected: &'static str,
    },
    /// A numeric or structural setting is out of range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures of the backing store or the graph accessor.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The accessor was used after `close()`.
    #[error("graph accessor is closed")]
    Closed,
    /// An edge with a negative, NaN or infinite cost was read.
    #[error("invalid cost {cost} on edge {source_id} -> {target}")]
    InvalidCost {
        /// Edge source.
        source_id: NodeId,
        /// Edge target.
        target: NodeId,
        /// The rejected cost.
        cost: f64,
    },
    /// A CSV edge file is not ordered by source id.
    #[error("{path}: rows must be sorted by source (source {found} follows {previous})")]
    Unsorted {
        /// The file being indexed.
        path: PathBuf,
        /// Source id of the earlier row.
        previous: NodeId,
        /// Source id that broke the order.
        found: NodeId,
    },
    /// A row could not be parsed.
    #[error("{path}: malformed row {line}: {reason}")]
    Malformed {
        /// The file being read.
        path: PathBuf,
        /// 1-based line number.
        line: u64,
        /// What went wrong.
        reason: String,
    },
    /// The selected store needs a data file and none was given.
    #[error("store `{0}` requires a data path")]
    MissingDataPath(&'static str),
    /// Configuration rejected while opening the graph.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// CSV decoding error.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Failures of a single one-to-many search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search was called with no targets.
    #[error("search from {0} has no targets")]
    EmptyTargets(NodeId),
    /// The frontier was exhausted before these targets were finalized.
    #[error("targets {missing:?} are unreachable from {source_id}")]
    Unreachable {
        /// Search source.
        source_id: NodeId,
        /// Targets that were never finalized, in request order.
        missing: Vec<NodeId>,
    },
    /// The frontier or the discovered-node map could not grow.
    #[error("out of memory searching from {source_id}: {footprint}")]
    OutOfMemory {
        /// Search source.
        source_id: NodeId,
        /// Memory held by the search when it gave up.
        footprint: SearchFootprint,
    },
    /// The graph accessor failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Invalid search parameters.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SearchError {
    /// Whether this is the resource-exhaustion failure.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, SearchError::OutOfMemory { .. })
    }
}

/// Failures constructing a [`CostMatrix`](crate::matrix::CostMatrix).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatrixError {
    /// Rows of differing length.
    #[error("row {row} has {len} entries, expected {expected}")]
    NotSquare {
        /// Offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// The row count.
        expected: usize,
    },
    /// A NaN entry.
    #[error("entry ({0}, {1}) is NaN")]
    NotANumber(usize, usize),
}

/// Failures of the tour optimizer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TourError {
    /// Fewer than four waypoints.
    #[error("tour optimization requires four or more locations, only {0} supplied")]
    TooFewWaypoints(usize),
    /// `start` or `end` is not a valid position.
    #[error("waypoint position {position} out of range for {n} waypoints")]
    PositionOutOfRange {
        /// The rejected position.
        position: usize,
        /// Number of waypoints.
        n: usize,
    },
    /// The matrix still holds an unreachable sentinel.
    #[error("no known cost between waypoints {0} and {1}")]
    Unreachable(usize, usize),
    /// Invalid annealing parameters.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures that stop an experiment before or between runs.
#[derive(Debug, Error)]
pub enum ExperimentError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A waypoint set cannot be optimized.
    #[error("waypoint set {set} has {len} waypoints, at least 4 are required")]
    TooFewWaypoints {
        /// Index of the set in the input.
        set: usize,
        /// Its size.
        len: usize,
    },
    /// No waypoint sets were supplied.
    #[error("no waypoint sets to run")]
    NoInputs,
    /// Reading or parsing the waypoint file failed.
    #[error("{path}: line {line}: {reason}")]
    Input {
        /// The input file.
        path: PathBuf,
        /// 1-based line number.
        line: u64,
        /// What went wrong.
        reason: String,
    },
    /// The graph could not be opened before the first run.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// CSV decoding error in the waypoint file.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
