//! Graph access configuration and selectors.

use std::fmt;
use std::str::FromStr;

use crate::cache::CacheKind;
use crate::error::ConfigError;

/// How the accessor obtains node data from its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessMode {
    /// Preload the store (or a fraction of it), then freeze the cache size.
    All,
    /// Fetch one node per cache miss under a fixed capacity.
    #[default]
    OnDemand,
}

impl FromStr for AccessMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "all" | "eager" => Ok(AccessMode::All),
            "on_demand" | "ondemand" | "lazy" => Ok(AccessMode::OnDemand),
            _ => Err(ConfigError::Unrecognized {
                kind: "access mode",
                value: s.to_string(),
                expected: "all, on_demand",
            }),
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessMode::All => "all",
            AccessMode::OnDemand => "on_demand",
        })
    }
}

/// Size class of a road-network data set.
///
/// Counts are those of the extracts the tool was tuned against; they bound
/// partial preloads and size the synthetic grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphSize {
    /// Andorra.
    #[default]
    Tiny,
    /// Austria.
    Small,
    /// Germany.
    Medium,
    /// Europe.
    Large,
    /// Europe, alternative label.
    Eu,
}

impl GraphSize {
    /// Number of nodes.
    pub fn nodes(self) -> usize {
        match self {
            GraphSize::Tiny => 2_033,
            GraphSize::Small => 553_195,
            GraphSize::Medium => 3_708_085,
            GraphSize::Large | GraphSize::Eu => 28_692_913,
        }
    }

    /// Number of directed relationships.
    pub fn relationships(self) -> usize {
        match self {
            GraphSize::Tiny => 4_830,
            GraphSize::Small => 1_315_041,
            GraphSize::Medium => 9_046_415,
            GraphSize::Large | GraphSize::Eu => 72_358_819,
        }
    }

    /// Cache elements needed to hold the whole graph.
    pub fn elements(self) -> usize {
        self.nodes() + self.relationships()
    }
}

impl FromStr for GraphSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "tiny" => Ok(GraphSize::Tiny),
            "small" => Ok(GraphSize::Small),
            "medium" => Ok(GraphSize::Medium),
            "large" => Ok(GraphSize::Large),
            "eu" => Ok(GraphSize::Eu),
            _ => Err(ConfigError::Unrecognized {
                kind: "graph size",
                value: s.to_string(),
                expected: "tiny, small, medium, large, eu",
            }),
        }
    }
}

impl fmt::Display for GraphSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GraphSize::Tiny => "tiny",
            GraphSize::Small => "small",
            GraphSize::Medium => "medium",
            GraphSize::Large => "large",
            GraphSize::Eu => "eu",
        })
    }
}

/// Backing store selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StoreKind {
    /// `source,target,cost` CSV file sorted by source.
    Csv,
    /// Procedural lattice sized from the [`GraphSize`].
    #[default]
    Grid,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "csv" | "file" => Ok(StoreKind::Csv),
            "grid" => Ok(StoreKind::Grid),
            _ => Err(ConfigError::Unrecognized {
                kind: "store",
                value: s.to_string(),
                expected: "csv, grid",
            }),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreKind::Csv => "csv",
            StoreKind::Grid => "grid",
        })
    }
}

/// Configuration for a [`CachedGraph`](super::CachedGraph).
///
/// # Examples
///
/// ```
/// use u_tour::graph::{AccessMode, GraphConfig, GraphSize};
/// use u_tour::cache::CacheKind;
///
/// let config = GraphConfig::default()
///     .with_access_mode(AccessMode::All)
///     .with_size(GraphSize::Small)
///     .with_cache(CacheKind::Stamp)
///     .with_preload_ratio(0.5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphConfig {
    /// Eager preload or on-demand fetching.
    pub access_mode: AccessMode,

    /// Size class of the data set.
    pub size: GraphSize,

    /// Eviction strategy of the node cache.
    pub cache: CacheKind,

    /// Cache capacity in elements for on-demand access.
    pub capacity: usize,

    /// Fraction of the graph preloaded in eager mode, in (0, 1].
    ///
    /// Below 1 the preload stops after `relationships * ratio` edges or
    /// `elements * ratio` cache elements, whichever comes first.
    pub preload_ratio: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            access_mode: AccessMode::default(),
            size: GraphSize::default(),
            cache: CacheKind::default(),
            capacity: 500,
            preload_ratio: 1.0,
        }
    }
}

impl GraphConfig {
    pub fn with_access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    pub fn with_size(mut self, size: GraphSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_cache(mut self, cache: CacheKind) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_preload_ratio(mut self, ratio: f64) -> Self {
        self.preload_ratio = ratio;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::invalid("capacity", "must be positive"));
        }
        if !(self.preload_ratio > 0.0 && self.preload_ratio <= 1.0) {
            return Err(ConfigError::invalid(
                "preload_ratio",
                format!("must be in (0, 1], got {}", self.preload_ratio),
            ));
        }
        Ok(())
    }
}

pub(crate) fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selectors_case_insensitive() {
        assert_eq!("ALL".parse::<AccessMode>(), Ok(AccessMode::All));
        assert_eq!("ON_DEMAND".parse::<AccessMode>(), Ok(AccessMode::OnDemand));
        assert_eq!("on-demand".parse::<AccessMode>(), Ok(AccessMode::OnDemand));
        assert_eq!("Tiny".parse::<GraphSize>(), Ok(GraphSize::Tiny));
        assert_eq!("EU".parse::<GraphSize>(), Ok(GraphSize::Eu));
        assert_eq!("csv".parse::<StoreKind>(), Ok(StoreKind::Csv));
    }

    #[test]
    fn test_parse_unrecognized_selector() {
        let err = "postgres".parse::<StoreKind>().unwrap_err();
        assert!(matches!(err, ConfigError::Unrecognized { kind: "store", .. }));
        assert!("huge".parse::<GraphSize>().is_err());
        assert!("sometimes".parse::<AccessMode>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for mode in [AccessMode::All, AccessMode::OnDemand] {
            assert_eq!(mode.to_string().parse::<AccessMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_size_counts() {
        assert_eq!(GraphSize::Tiny.elements(), 2_033 + 4_830);
        assert_eq!(GraphSize::Large.nodes(), GraphSize::Eu.nodes());
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        assert!(GraphConfig::default().validate().is_ok());
        assert!(GraphConfig::default().with_preload_ratio(0.0).validate().is_err());
        assert!(GraphConfig::default().with_preload_ratio(1.5).validate().is_err());
        assert!(GraphConfig::default().with_capacity(0).validate().is_err());
    }
}
