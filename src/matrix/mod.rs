//! Waypoint cost matrices.
//!
//! [`CostMatrixBuilder`] fills one row per waypoint with a one-to-many
//! search and can symmetrize the result for the tour optimizer. Rows whose
//! search cannot reach every waypoint are handled by [`RowFailure`].

mod builder;
mod types;

pub use builder::{BuiltMatrix, CostMatrixBuilder, MatrixConfig, RowFailure};
pub use types::{CostMatrix, UNREACHABLE};
