//! Waypoint tour optimization.
//!
//! A dense minimum spanning tree over the cost matrix gives the seed tour
//! through a preorder walk. Simulated annealing then refines it with two
//! moves: moving a segment to another place in the tour, and reversing a
//! segment. All randomness comes from a seeded [`TourRng`] owned by the
//! solve call, so equal inputs give bit-identical tours.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Prim (1957), "Shortest connection networks and some generalizations"

mod config;
mod moves;
mod rng;
mod solver;
mod spanning;

pub use config::AnnealingConfig;
pub use rng::TourRng;
pub use solver::{AnnealingStats, TourResult, TourSolver, MIN_WAYPOINTS};
