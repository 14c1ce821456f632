//! Dense square cost matrix.

use std::ops::{Index, IndexMut};

use crate::error::MatrixError;

/// Sentinel for a pair with no known cost.
pub const UNREACHABLE: f64 = -1.0;

/// Row-major `n × n` matrix of pairwise costs.
///
/// Negative entries mean "unknown"; [`UNREACHABLE`] is the canonical one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostMatrix {
    n: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// An `n × n` matrix of zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Builds a matrix from rows, which must form a square without NaN.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(MatrixError::NotSquare {
                    row: i,
                    len: row.len(),
                    expected: n,
                });
            }
            if let Some(j) = row.iter().position(|v| v.is_nan()) {
                return Err(MatrixError::NotANumber(i, j));
            }
            data.extend(row);
        }
        Ok(Self { n, data })
    }

    /// Number of rows (and columns).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Overwrites row `i`. `values` must have `len()` entries.
    pub fn set_row(&mut self, i: usize, values: &[f64]) {
        self.data[i * self.n..(i + 1) * self.n].copy_from_slice(values);
    }

    /// Copies the matrix out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.n.max(1)).map(<[f64]>::to_vec).collect()
    }

    /// Largest entry, or 0 for an empty matrix.
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    /// First pair `(i, j)` with a negative (unknown) cost.
    pub fn first_unknown(&self) -> Option<(usize, usize)> {
        self.data
            .iter()
            .position(|&v| v < 0.0)
            .map(|k| (k / self.n, k % self.n))
    }

    /// Whether `m[i][j] == m[j][i]` for every pair.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Makes the matrix symmetric in place.
    ///
    /// For each pair `i < j`, two known directions (non-negative) are
    /// replaced by their mean, a single known direction is copied over the
    /// unknown one, and two unknown directions both become [`UNREACHABLE`].
    /// The diagonal is set to zero.
    pub fn symmetrize(&mut self) {
        for i in 0..self.n {
            self.set(i, i, 0.0);
            for j in i + 1..self.n {
                let (forward, backward) = (self.get(i, j), self.get(j, i));
                let value = match (forward >= 0.0, backward >= 0.0) {
                    (true, true) => (forward + backward) / 2.0,
                    (true, false) => forward,
                    (false, true) => backward,
                    (false, false) => UNREACHABLE,
                };
                self.set(i, j, value);
                self.set(j, i, value);
            }
        }
    }
}

impl Index<(usize, usize)> for CostMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.n + j]
    }
}

impl IndexMut<(usize, usize)> for CostMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.n + j]
    }
}
