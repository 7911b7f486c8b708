//! Typed travel-time matrix.
//!
//! Durations are seconds, indexed positionally by the caller's stop order.
//! Unreachable pairs are kept as `f64::INFINITY` and only turned into a
//! finite penalty when a cost is requested.

use crate::blocks::Block;
use crate::error::{PlannerError, Result};

/// Finite stand-in for an unreachable pair so path costs stay comparable.
pub const UNREACHABLE_PENALTY: f64 = 1e9;

#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimeMatrix {
    durations: Vec<Vec<f64>>,
}

impl TravelTimeMatrix {
    /// Build a matrix from raw rows of seconds.
    ///
    /// Rows must form a square. Negative values clamp to zero; NaN and
    /// infinities become unreachable.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != n) {
            let uniform = rows.iter().all(|row| row.len() == bad.len());
            return Err(PlannerError::shape(n, n, uniform.then_some(bad.len())));
        }

        let durations = rows
            .into_iter()
            .map(|row| row.into_iter().map(normalize_seconds).collect())
            .collect();

        Ok(Self { durations })
    }

    /// Build a matrix from rows where `None` marks a routing gap.
    pub fn from_optional_rows(rows: Vec<Vec<Option<f64>>>) -> Result<Self> {
        Self::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::INFINITY)).collect())
                .collect(),
        )
    }

    /// Uniform matrix: `seconds` everywhere off the diagonal, zero on it.
    pub fn uniform(n: usize, seconds: f64) -> Self {
        let durations = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 0.0 } else { normalize_seconds(seconds) }).collect())
            .collect();
        Self { durations }
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Fails with `ShapeMismatch` unless the matrix covers exactly `expected` stops.
    pub fn ensure_len(&self, expected: usize) -> Result<()> {
        if self.len() == expected {
            Ok(())
        } else {
            Err(PlannerError::shape(expected, self.len(), Some(self.len())))
        }
    }

    /// Travel time in seconds, `None` when unreachable.
    ///
    /// # Panics
    ///
    /// Panics if `from` or `to` is not below [`len`](Self::len). The same
    /// holds for `minutes`, `cost` and `is_reachable`.
    pub fn seconds(&self, from: usize, to: usize) -> Option<f64> {
        let value = self.durations[from][to];
        value.is_finite().then_some(value)
    }

    /// Travel time in minutes, `None` when unreachable.
    pub fn minutes(&self, from: usize, to: usize) -> Option<f64> {
        self.seconds(from, to).map(|s| s / 60.0)
    }

    /// Travel cost for optimization: seconds, or [`UNREACHABLE_PENALTY`].
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.seconds(from, to).unwrap_or(UNREACHABLE_PENALTY)
    }

    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.durations[from][to].is_finite()
    }

    /// Square sub-matrix over `indices`, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(PlannerError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }

        let durations = indices
            .iter()
            .map(|&i| indices.iter().map(|&j| self.durations[i][j]).collect())
            .collect();

        Ok(Self { durations })
    }

    /// Inter-block matrix: the cost from block A to block B is the travel
    /// time from A's last member to B's first member.
    pub fn block_matrix<I>(&self, blocks: &[Block<I>]) -> Result<Self> {
        if let Some(block) = blocks.iter().find(|b| b.last() >= self.len()) {
            return Err(PlannerError::IndexOutOfRange {
                index: block.last(),
                len: self.len(),
            });
        }

        let durations = blocks
            .iter()
            .map(|a| blocks.iter().map(|b| self.durations[a.last()][b.first()]).collect())
            .collect();

        Ok(Self { durations })
    }
}

fn normalize_seconds(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        f64::INFINITY
    }
}
