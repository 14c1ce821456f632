//! Experiment configuration.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::graph::{GraphConfig, StoreKind};
use crate::matrix::MatrixConfig;
use crate::tour::AnnealingConfig;

/// Configuration of an [`ExperimentRunner`](super::ExperimentRunner).
///
/// # Examples
///
/// ```
/// use u_tour::experiment::ExperimentConfig;
/// use u_tour::graph::{AccessMode, GraphConfig, StoreKind};
///
/// let config = ExperimentConfig::default()
///     .with_store(StoreKind::Grid)
///     .with_graph(GraphConfig::default().with_access_mode(AccessMode::All))
///     .with_repetitions(1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentConfig {
    /// Backing store.
    pub store: StoreKind,

    /// Edge file for [`StoreKind::Csv`].
    pub data_path: Option<PathBuf>,

    /// Accessor and cache settings.
    pub graph: GraphConfig,

    /// Matrix construction settings.
    pub matrix: MatrixConfig,

    /// Annealing schedule.
    pub annealing: AnnealingConfig,

    /// Runs per waypoint set, each on a freshly opened graph.
    pub repetitions: usize,

    /// Position of the start waypoint within each set.
    pub start: usize,

    /// Position of the end waypoint, for open tours.
    pub end: Option<usize>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            data_path: None,
            graph: GraphConfig::default(),
            matrix: MatrixConfig::default(),
            annealing: AnnealingConfig::default(),
            repetitions: 3,
            start: 0,
            end: None,
        }
    }
}

impl ExperimentConfig {
    pub fn with_store(mut self, store: StoreKind) -> Self {
        self.store = store;
        self
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn with_graph(mut self, graph: GraphConfig) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_matrix(mut self, matrix: MatrixConfig) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn with_annealing(mut self, annealing: AnnealingConfig) -> Self {
        self.annealing = annealing;
        self
    }

    pub fn with_repetitions(mut self, n: usize) -> Self {
        self.repetitions = n;
        self
    }

    pub fn with_start(mut self, position: usize) -> Self {
        self.start = position;
        self
    }

    pub fn with_end(mut self, position: usize) -> Self {
        self.end = Some(position);
        self
    }

    /// Validates this configuration and every nested one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repetitions == 0 {
            return Err(ConfigError::invalid("repetitions", "must be positive"));
        }
        if self.store == StoreKind::Csv && self.data_path.is_none() {
            return Err(ConfigError::invalid(
                "data_path",
                "the csv store needs an edge file",
            ));
        }
        self.graph.validate()?;
        self.matrix.validate()?;
        self.annealing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExperimentConfig::default();
        assert_eq!(config.repetitions, 3);
        assert_eq!(config.store, StoreKind::Grid);
        assert!(config.matrix.symmetric);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_csv_needs_data_path() {
        let config = ExperimentConfig::default().with_store(StoreKind::Csv);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "data_path", .. })
        ));
        assert!(config.with_data_path("edges.csv").validate().is_ok());
    }

    #[test]
    fn test_nested_validation() {
        let config = ExperimentConfig::default()
            .with_graph(GraphConfig::default().with_capacity(0));
        assert!(config.validate().is_err());
        assert!(ExperimentConfig::default()
            .with_repetitions(0)
            .validate()
            .is_err());
    }
}
