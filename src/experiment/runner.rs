//! Experiment loop: graph, matrix and tour per waypoint set.

use std::time::Instant;

use tracing::{error, info, warn};

use super::config::ExperimentConfig;
use crate::error::{ExperimentError, GraphError, SearchError};
use crate::graph::{open_store, CachedGraph, GraphAccess, NodeId};
use crate::matrix::CostMatrixBuilder;
use crate::search::SearchFootprint;
use crate::tour::{AnnealingStats, TourSolver, MIN_WAYPOINTS};

/// One successful run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunRecord {
    /// Index of the waypoint set.
    pub set: usize,
    /// Repetition within the set.
    pub repetition: usize,
    /// Waypoint node ids as given.
    pub waypoints: Vec<NodeId>,
    /// Node ids in visiting order.
    pub sequence: Vec<NodeId>,
    /// Waypoint positions in visiting order.
    pub order: Vec<usize>,
    /// Tour length.
    pub length: f64,
    /// Seconds to open (and preload) the graph.
    pub load_secs: f64,
    /// Seconds to build the cost matrix.
    pub matrix_secs: f64,
    /// Seconds for matrix plus tour.
    pub solve_secs: f64,
    /// Cache elements after the run.
    pub cache_size: usize,
    /// Cache diagnostics after the run.
    pub cache_footprint: String,
    /// Store fetches caused by cache misses.
    pub fetches: u64,
    /// Matrix rows left zero-filled.
    pub degraded_rows: Vec<usize>,
    /// Annealing counters.
    pub annealing: AnnealingStats,
}

/// A run that failed without stopping the experiment.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunFailure {
    pub set: usize,
    pub repetition: usize,
    pub error: String,
}

/// Diagnostics of the run that exhausted memory and stopped the experiment.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Halt {
    pub set: usize,
    pub repetition: usize,
    /// Cache size when the search gave up.
    pub cache_size: usize,
    /// Cache diagnostics when the search gave up.
    pub cache_footprint: String,
    /// Search state when it gave up.
    pub search: SearchFootprint,
}

/// Everything an experiment produced.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentReport {
    pub runs: Vec<RunRecord>,
    pub failures: Vec<RunFailure>,
    /// Set when a run ran out of memory; nothing after it was attempted.
    pub halt: Option<Halt>,
    /// Wall time of the whole experiment in seconds.
    pub total_secs: f64,
}

impl ExperimentReport {
    /// Whether every attempted run succeeded and none halted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.halt.is_none()
    }
}

enum RunOutcome {
    Done(Box<RunRecord>),
    Failed(String),
    Halted(Halt),
}

/// Runs waypoint sets end to end.
#[derive(Debug, Clone, Default)]
pub struct ExperimentRunner {
    config: ExperimentConfig,
}

impl ExperimentRunner {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Runs every set with graphs opened from the configured store.
    pub fn run(&self, sets: &[Vec<NodeId>]) -> Result<ExperimentReport, ExperimentError> {
        let config = &self.config;
        self.run_with(sets, || {
            let store = open_store(config.store, config.graph.size, config.data_path.as_deref())?;
            CachedGraph::open(store, &config.graph)
        })
    }

    /// Runs every set, opening a fresh graph per repetition with `open`.
    ///
    /// # Errors
    ///
    /// Invalid configuration, an empty or undersized set, or a graph that
    /// fails to open before any run has completed. Later failures are
    /// recorded in the report instead; running out of memory stops the
    /// experiment with [`ExperimentReport::halt`] set.
    pub fn run_with<F>(
        &self,
        sets: &[Vec<NodeId>],
        mut open: F,
    ) -> Result<ExperimentReport, ExperimentError>
    where
        F: FnMut() -> Result<CachedGraph, GraphError>,
    {
        self.validate(sets)?;
        let started = Instant::now();
        let mut report = ExperimentReport::default();

        'sets: for (set, waypoints) in sets.iter().enumerate() {
            info!(set, ?waypoints, "input");
            for repetition in 0..self.config.repetitions {
                let loading = Instant::now();
                let mut graph = match open() {
                    Ok(graph) => graph,
                    Err(err) if report.runs.is_empty() && report.failures.is_empty() => {
                        return Err(err.into());
                    }
                    Err(err) => {
                        warn!(set, repetition, error = %err, "failed to open graph");
                        report.failures.push(RunFailure {
                            set,
                            repetition,
                            error: err.to_string(),
                        });
                        continue;
                    }
                };
                let load_secs = loading.elapsed().as_secs_f64();
                info!(set, repetition, load_secs, "loaded graph");

                let outcome = self.run_once(&mut graph, set, repetition, waypoints, load_secs);
                if let Err(err) = graph.close() {
                    warn!(error = %err, "failed to close graph");
                }

                match outcome {
                    RunOutcome::Done(record) => report.runs.push(*record),
                    RunOutcome::Failed(error) => report.failures.push(RunFailure {
                        set,
                        repetition,
                        error,
                    }),
                    RunOutcome::Halted(halt) => {
                        report.halt = Some(halt);
                        break 'sets;
                    }
                }
            }
        }

        report.total_secs = started.elapsed().as_secs_f64();
        info!(
            runs = report.runs.len(),
            failures = report.failures.len(),
            halted = report.halt.is_some(),
            total_secs = report.total_secs,
            "experiment finished"
        );
        Ok(report)
    }

    fn validate(&self, sets: &[Vec<NodeId>]) -> Result<(), ExperimentError> {
        self.config.validate()?;
        if sets.is_empty() {
            return Err(ExperimentError::NoInputs);
        }
        for (set, waypoints) in sets.iter().enumerate() {
            if waypoints.len() < MIN_WAYPOINTS {
                return Err(ExperimentError::TooFewWaypoints {
                    set,
                    len: waypoints.len(),
                });
            }
            for position in std::iter::once(self.config.start).chain(self.config.end) {
                if position >= waypoints.len() {
                    return Err(crate::error::ConfigError::invalid(
                        "start/end",
                        format!("position {position} out of range for set {set}"),
                    )
                    .into());
                }
            }
        }
        Ok(())
    }

    fn run_once(
        &self,
        graph: &mut CachedGraph,
        set: usize,
        repetition: usize,
        waypoints: &[NodeId],
        load_secs: f64,
    ) -> RunOutcome {
        let solving = Instant::now();
        let builder = CostMatrixBuilder::new(self.config.matrix.clone());
        let built = match builder.build(graph, waypoints) {
            Ok(built) => built,
            Err(SearchError::OutOfMemory { footprint, .. }) => {
                let halt = Halt {
                    set,
                    repetition,
                    cache_size: graph.cache_size(),
                    cache_footprint: graph.cache_footprint(),
                    search: footprint,
                };
                error!(
                    set,
                    repetition,
                    cache_size = halt.cache_size,
                    cache = %halt.cache_footprint,
                    search = %halt.search,
                    "out of memory, stopping experiment"
                );
                return RunOutcome::Halted(halt);
            }
            Err(err) => {
                warn!(set, repetition, error = %err, "cost matrix failed");
                return RunOutcome::Failed(err.to_string());
            }
        };

        let solver = TourSolver::new(self.config.annealing.clone());
        let tour = match solver.solve(&built.matrix, self.config.start, self.config.end) {
            Ok(tour) => tour,
            Err(err) => {
                warn!(set, repetition, error = %err, "tour failed");
                return RunOutcome::Failed(err.to_string());
            }
        };

        let record = RunRecord {
            set,
            repetition,
            waypoints: waypoints.to_vec(),
            sequence: tour.order.iter().map(|&p| waypoints[p]).collect(),
            order: tour.order,
            length: tour.length,
            load_secs,
            matrix_secs: built.elapsed.as_secs_f64(),
            solve_secs: solving.elapsed().as_secs_f64(),
            cache_size: graph.cache_size(),
            cache_footprint: graph.cache_footprint(),
            fetches: graph.fetch_count(),
            degraded_rows: built.degraded_rows,
            annealing: tour.stats,
        };
        info!(
            set,
            repetition,
            solve_secs = record.solve_secs,
            length = record.length,
            sequence = ?record.sequence,
            "solved"
        );
        RunOutcome::Done(Box::new(record))
    }
}
