//! Annealing loop and tour output.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::config::AnnealingConfig;
use super::moves::{
    apply_reverse, apply_three_way, reverse_delta, sample_insertion, sample_segment,
    three_way_delta, tour_length,
};
use super::rng::TourRng;
use super::spanning::seed_tour;
use crate::error::TourError;
use crate::matrix::CostMatrix;

/// Smallest instance the move set can change.
pub const MIN_WAYPOINTS: usize = 4;

/// Counters of one annealing run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealingStats {
    /// Moves attempted.
    pub iterations: usize,

    /// Moves accepted, including improvements.
    pub accepted_moves: usize,

    /// Accepted moves with a negative delta.
    pub improving_moves: usize,

    /// Temperature rounds run.
    pub rounds: usize,

    /// Temperature when annealing stopped.
    pub final_temperature: f64,

    /// Length of the spanning-tree seed tour.
    pub initial_length: f64,

    /// Largest entry of the working matrix.
    pub max_cost: f64,
}

/// Result of [`TourSolver::solve`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TourResult {
    /// Waypoint positions, beginning at the start (and ending at the end,
    /// when one was requested and lands next to the start).
    pub order: Vec<usize>,

    /// Closed-tour length of the best order.
    ///
    /// With an end waypoint the start/end edge costs nothing, so this is
    /// the open path length.
    pub length: f64,

    /// Run counters.
    pub stats: AnnealingStats,
}

/// Solves waypoint tours by simulated annealing from a spanning-tree seed.
///
/// # Examples
///
/// ```
/// use u_tour::matrix::CostMatrix;
/// use u_tour::tour::{AnnealingConfig, TourSolver};
///
/// let d = std::f64::consts::SQRT_2;
/// let square = CostMatrix::from_rows(vec![
///     vec![0.0, 1.0, d, 1.0],
///     vec![1.0, 0.0, 1.0, d],
///     vec![d, 1.0, 0.0, 1.0],
///     vec![1.0, d, 1.0, 0.0],
/// ])
/// .unwrap();
///
/// let result = TourSolver::new(AnnealingConfig::default())
///     .solve(&square, 0, None)
///     .unwrap();
/// assert!((result.length - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TourSolver {
    config: AnnealingConfig,
}

impl TourSolver {
    pub fn new(config: AnnealingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    /// Finds a short tour over all waypoints of `matrix`.
    ///
    /// `end == Some(start)` is the same as `None`: a closed tour.
    ///
    /// # Errors
    ///
    /// - [`TourError::TooFewWaypoints`] below [`MIN_WAYPOINTS`].
    /// - [`TourError::PositionOutOfRange`] for a bad `start` or `end`.
    /// - [`TourError::Unreachable`] if a pair has a negative cost.
    /// - [`TourError::Config`] if the schedule is invalid.
    pub fn solve(
        &self,
        matrix: &CostMatrix,
        start: usize,
        end: Option<usize>,
    ) -> Result<TourResult, TourError> {
        self.config.validate()?;
        let n = matrix.len();
        if n < MIN_WAYPOINTS {
            return Err(TourError::TooFewWaypoints(n));
        }
        for position in std::iter::once(start).chain(end) {
            if position >= n {
                return Err(TourError::PositionOutOfRange { position, n });
            }
        }
        let end = end.filter(|&e| e != start);

        let started = Instant::now();
        let mut working = matrix.clone();
        if let Some(end) = end {
            working[(start, end)] = 0.0;
            working[(end, start)] = 0.0;
        }
        if let Some((i, j)) = working.first_unknown() {
            return Err(TourError::Unreachable(i, j));
        }

        let order = seed_tour(&working);
        let initial_length = tour_length(&working, &order);
        let mut stats = AnnealingStats {
            initial_length,
            max_cost: working.max(),
            ..AnnealingStats::default()
        };
        debug!(n, start, ?end, initial_length, "seeded tour from spanning tree");

        let best = self.anneal(&working, order, &mut stats);
        let length = tour_length(&working, &best);
        let order = arrange(best, start, end);

        info!(
            n,
            length,
            rounds = stats.rounds,
            iterations = stats.iterations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solved tour"
        );
        Ok(TourResult {
            order,
            length,
            stats,
        })
    }

    /// Runs the schedule from `order` and returns the best order seen.
    fn anneal(&self, matrix: &CostMatrix, mut order: Vec<usize>, stats: &mut AnnealingStats) -> Vec<usize> {
        let n = order.len();
        let config = &self.config;
        let mut rng = TourRng::new(config.seed);
        let mut scratch = Vec::with_capacity(n);

        let mut running = stats.initial_length;
        let mut best = order.clone();
        let mut best_length = running;

        let tries = config.tries_per_city * n;
        let enough = config.accepts_per_city * n;
        let mut temperature = config.initial_temperature;

        while temperature > config.final_temperature {
            stats.rounds += 1;
            let mut accepted = 0usize;

            for _ in 0..tries {
                stats.iterations += 1;
                let segment = sample_segment(&mut rng, n);

                if rng.next_u32() % 2 == 1 {
                    let e = sample_insertion(&mut rng, segment, n);
                    let delta = three_way_delta(matrix, &order, segment, e);
                    if metropolis(&mut rng, delta, temperature) {
                        apply_three_way(&mut order, segment, e, &mut scratch);
                        running += delta;
                        accepted += 1;
                        stats.improving_moves += usize::from(delta < 0.0);
                    }
                } else {
                    let delta = reverse_delta(matrix, &order, segment);
                    if metropolis(&mut rng, delta, temperature) {
                        apply_reverse(&mut order, segment);
                        running += delta;
                        accepted += 1;
                        stats.improving_moves += usize::from(delta < 0.0);
                    }
                }

                if running < best_length {
                    best_length = running;
                    best.copy_from_slice(&order);
                }
                if accepted > enough {
                    break;
                }
            }

            stats.accepted_moves += accepted;
            debug!(
                round = stats.rounds,
                temperature, accepted, best_length, "annealing round"
            );
            if accepted == 0 {
                break;
            }
            temperature *= config.cooling_factor;
        }

        stats.final_temperature = temperature;
        best
    }
}

/// Metropolis acceptance. Draws from `rng` only for non-improving moves.
fn metropolis(rng: &mut TourRng, delta: f64, temperature: f64) -> bool {
    delta < 0.0 || rng.real() < (-delta / temperature).exp()
}

/// Rotates `order` to begin at `start`; with an end that directly follows
/// the start, reflects the rest so the sequence ends there.
fn arrange(mut order: Vec<usize>, start: usize, end: Option<usize>) -> Vec<usize> {
    if let Some(k) = order.iter().position(|&p| p == start) {
        order.rotate_left(k);
    }
    if let Some(end) = end {
        if order.get(1) == Some(&end) {
            order[1..].reverse();
        } else if order.last() != Some(&end) {
            warn!(start, end, "end waypoint is not adjacent to start in the best tour");
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> CostMatrix {
        let d = std::f64::consts::SQRT_2;
        CostMatrix::from_rows(vec![
            vec![0.0, 1.0, d, 1.0],
            vec![1.0, 0.0, 1.0, d],
            vec![d, 1.0, 0.0, 1.0],
            vec![1.0, d, 1.0, 0.0],
        ])
        .unwrap()
    }

    /// Ten points on the unit circle, labelled out of angular order.
    fn scrambled_decagon() -> CostMatrix {
        let slot = [3, 7, 0, 9, 5, 1, 8, 2, 6, 4];
        let points: Vec<(f64, f64)> = slot
            .iter()
            .map(|&k| {
                let angle = std::f64::consts::TAU * k as f64 / 10.0;
                (angle.cos(), angle.sin())
            })
            .collect();
        let rows = points
            .iter()
            .map(|p| {
                points
                    .iter()
                    .map(|q| ((p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)).sqrt())
                    .collect()
            })
            .collect();
        CostMatrix::from_rows(rows).unwrap()
    }

    /// Six points on a line at these offsets.
    fn scrambled_line() -> CostMatrix {
        let x = [0.0f64, 5.0, 2.0, 4.0, 1.0, 3.0];
        let rows = x
            .iter()
            .map(|a| x.iter().map(|b| (a - b).abs()).collect())
            .collect();
        CostMatrix::from_rows(rows).unwrap()
    }

    fn is_permutation(order: &[usize], n: usize) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        sorted == (0..n).collect::<Vec<_>>()
    }

    #[test]
    fn test_unit_square_takes_perimeter() {
        let result = TourSolver::default().solve(&unit_square(), 0, None).unwrap();
        assert!((result.length - 4.0).abs() < 1e-9, "length {}", result.length);
        assert_eq!(result.order, vec![0, 3, 2, 1]);
        assert!(result.stats.initial_length > 4.0);
        assert!(result.stats.improving_moves >= 1);
    }

    #[test]
    fn test_rotates_to_start() {
        let result = TourSolver::default().solve(&unit_square(), 2, Some(2)).unwrap();
        assert_eq!(result.order[0], 2);
        assert!((result.length - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_decagon_perimeter() {
        let matrix = scrambled_decagon();
        let result = TourSolver::default().solve(&matrix, 0, None).unwrap();
        let perimeter = 20.0 * (std::f64::consts::PI / 10.0).sin();
        assert!((result.length - perimeter).abs() < 1e-9);
        assert!(is_permutation(&result.order, 10));
        assert!((tour_length(&matrix, &result.order) - result.length).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let matrix = scrambled_decagon();
        let solver = TourSolver::default();
        let first = solver.solve(&matrix, 3, Some(7)).unwrap();
        let second = solver.solve(&matrix, 3, Some(7)).unwrap();
        assert_eq!(first.order, second.order);
        assert_eq!(first.length.to_bits(), second.length.to_bits());
        assert_eq!(first.stats, second.stats);
    }

    #[test]
    fn test_end_constraint_on_line() {
        let matrix = scrambled_line();
        let solver = TourSolver::default();
        let result = solver.solve(&matrix, 0, Some(1)).unwrap();
        assert_eq!(result.order, vec![0, 4, 2, 5, 3, 1]);
        assert!((result.length - 5.0).abs() < 1e-9);

        for end in 2..6 {
            let result = solver.solve(&matrix, 0, Some(end)).unwrap();
            assert_eq!(result.order.first(), Some(&0));
            assert_eq!(result.order.last(), Some(&end), "end {end}");
            assert!(is_permutation(&result.order, 6));
        }
    }

    #[test]
    fn test_too_few_waypoints() {
        let matrix = CostMatrix::from_rows(vec![vec![0.0; 3]; 3]).unwrap();
        assert_eq!(
            TourSolver::default().solve(&matrix, 0, None),
            Err(TourError::TooFewWaypoints(3))
        );
    }

    #[test]
    fn test_rejects_bad_positions_and_unknown_costs() {
        let solver = TourSolver::default();
        assert_eq!(
            solver.solve(&unit_square(), 4, None),
            Err(TourError::PositionOutOfRange { position: 4, n: 4 })
        );
        assert_eq!(
            solver.solve(&unit_square(), 0, Some(9)),
            Err(TourError::PositionOutOfRange { position: 9, n: 4 })
        );

        let mut matrix = unit_square();
        matrix[(1, 3)] = -1.0;
        assert_eq!(solver.solve(&matrix, 0, None), Err(TourError::Unreachable(1, 3)));
        // The forced start/end edge may be unknown.
        assert!(solver.solve(&matrix, 1, Some(3)).is_ok());
    }

    #[test]
    fn test_input_matrix_untouched() {
        let matrix = scrambled_line();
        let copy = matrix.clone();
        TourSolver::default().solve(&matrix, 0, Some(1)).unwrap();
        assert_eq!(matrix, copy);
    }
}
