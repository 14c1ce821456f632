//! Experiment driver.
//!
//! For every waypoint set and repetition the runner opens a fresh graph,
//! builds the cost matrix, solves the tour and records timings and cache
//! statistics. A search that runs out of memory stops the whole experiment
//! and leaves its diagnostics in the report.

mod config;
mod inputs;
mod runner;

pub use config::ExperimentConfig;
pub use inputs::{default_input, parse_waypoint_sets, random_input, read_waypoint_sets};
pub use runner::{ExperimentReport, ExperimentRunner, Halt, RunFailure, RunRecord};
