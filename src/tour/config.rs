//! Annealing schedule configuration.

use super::rng::TourRng;
use crate::error::ConfigError;

/// Configuration of the tour annealer.
///
/// Rounds run at `initial_temperature`, cooling by `cooling_factor` while
/// the temperature stays above `final_temperature`. A round attempts
/// `tries_per_city · N` moves and ends early once more than
/// `accepts_per_city · N` were accepted.
///
/// # Examples
///
/// ```
/// use u_tour::tour::AnnealingConfig;
///
/// let config = AnnealingConfig::default()
///     .with_cooling_factor(0.95)
///     .with_tries_per_city(200)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealingConfig {
    /// Starting temperature.
    pub initial_temperature: f64,

    /// Annealing stops once the temperature is at or below this.
    pub final_temperature: f64,

    /// Geometric cooling factor in (0, 1).
    pub cooling_factor: f64,

    /// Attempted moves per waypoint and round.
    pub tries_per_city: usize,

    /// Accepted moves per waypoint after which a round ends.
    pub accepts_per_city: usize,

    /// Seed of the [`TourRng`].
    pub seed: i64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            final_temperature: 0.1,
            cooling_factor: 0.9,
            tries_per_city: 500,
            accepts_per_city: 60,
            seed: TourRng::DEFAULT_SEED,
        }
    }
}

impl AnnealingConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_final_temperature(mut self, t: f64) -> Self {
        self.final_temperature = t;
        self
    }

    pub fn with_cooling_factor(mut self, factor: f64) -> Self {
        self.cooling_factor = factor;
        self
    }

    pub fn with_tries_per_city(mut self, n: usize) -> Self {
        self.tries_per_city = n;
        self
    }

    pub fn with_accepts_per_city(mut self, n: usize) -> Self {
        self.accepts_per_city = n;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_temperature > 0.0) {
            return Err(ConfigError::invalid(
                "initial_temperature",
                "must be positive",
            ));
        }
        if !(self.final_temperature > 0.0) {
            return Err(ConfigError::invalid("final_temperature", "must be positive"));
        }
        if self.final_temperature >= self.initial_temperature {
            return Err(ConfigError::invalid(
                "final_temperature",
                "must be less than initial_temperature",
            ));
        }
        if !(self.cooling_factor > 0.0 && self.cooling_factor < 1.0) {
            return Err(ConfigError::invalid(
                "cooling_factor",
                format!("must be in (0, 1), got {}", self.cooling_factor),
            ));
        }
        if self.tries_per_city == 0 {
            return Err(ConfigError::invalid("tries_per_city", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let config = AnnealingConfig::default();
        assert!((config.initial_temperature - 100.0).abs() < 1e-10);
        assert!((config.final_temperature - 0.1).abs() < 1e-10);
        assert_eq!(config.tries_per_city, 500);
        assert_eq!(config.accepts_per_city, 60);
        assert_eq!(config.seed, -314_159);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_temperatures() {
        assert!(AnnealingConfig::default()
            .with_initial_temperature(-1.0)
            .validate()
            .is_err());
        assert!(AnnealingConfig::default()
            .with_final_temperature(200.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_cooling_and_tries() {
        assert!(AnnealingConfig::default()
            .with_cooling_factor(1.0)
            .validate()
            .is_err());
        assert!(AnnealingConfig::default()
            .with_tries_per_city(0)
            .validate()
            .is_err());
    }
}
