//! # Jacobian Matrix
//!
//! [`JacobianMatrix`] — an m×n matrix of partial derivatives
//! ∂reward_i/∂state_j, tagged with the layer it differentiates and the
//! cycle timestamp.
//!
//! ## Immutability & Caching
//!
//! Entries are fixed at construction; there is no mutating API. Derived
//! invariants are computed on first access through a `OnceLock` and reused
//! afterwards — because the entries cannot change, cached invariants can
//! never diverge from the matrix.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use argus_core::Layer;

use crate::analyze::{self, MatrixInvariants};

/// Construction errors for [`JacobianMatrix`].
///
/// These indicate programming errors in the caller (the estimator always
/// produces rectangular data), not runtime degeneracy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    /// The entry buffer does not hold `rows × cols` values.
    #[error("expected {rows}x{cols} = {expected} entries, got {actual}")]
    ShapeMismatch {
        /// Declared row count.
        rows: usize,
        /// Declared column count.
        cols: usize,
        /// `rows * cols`.
        expected: usize,
        /// Observed buffer length.
        actual: usize,
    },

    /// Row-of-rows input had rows of unequal length.
    #[error("row {row} has {actual} entries, expected {expected}")]
    RaggedRows {
        /// Index of the offending row.
        row: usize,
        /// Expected row length.
        expected: usize,
        /// Observed row length.
        actual: usize,
    },
}

/// An immutable m×n Jacobian with lazily cached derived invariants.
#[derive(Debug, Serialize, Deserialize)]
#[serde(from = "RawJacobian", into = "RawJacobian")]
pub struct JacobianMatrix {
    layer: Layer,
    timestamp: DateTime<Utc>,
    rows: usize,
    cols: usize,
    /// Row-major entries, length `rows * cols`.
    data: Vec<f64>,
    /// Derived invariants, computed at most once.
    invariants: OnceLock<MatrixInvariants>,
}

/// Serde shape for [`JacobianMatrix`] — the invariant cache is derived
/// state and never travels on the wire.
#[derive(Serialize, Deserialize, Clone)]
struct RawJacobian {
    layer: Layer,
    timestamp: DateTime<Utc>,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl From<RawJacobian> for JacobianMatrix {
    fn from(raw: RawJacobian) -> Self {
        Self {
            layer: raw.layer,
            timestamp: raw.timestamp,
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
            invariants: OnceLock::new(),
        }
    }
}

impl From<JacobianMatrix> for RawJacobian {
    fn from(m: JacobianMatrix) -> Self {
        Self {
            layer: m.layer,
            timestamp: m.timestamp,
            rows: m.rows,
            cols: m.cols,
            data: m.data,
        }
    }
}

impl Clone for JacobianMatrix {
    fn clone(&self) -> Self {
        let invariants = OnceLock::new();
        // Carry an already-computed cache across the clone; recomputing
        // would produce the identical value.
        if let Some(inv) = self.invariants.get() {
            let _ = invariants.set(inv.clone());
        }
        Self {
            layer: self.layer,
            timestamp: self.timestamp,
            rows: self.rows,
            cols: self.cols,
            data: self.data.clone(),
            invariants,
        }
    }
}

impl PartialEq for JacobianMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.layer == other.layer
            && self.timestamp == other.timestamp
            && self.rows == other.rows
            && self.cols == other.cols
            && self.data == other.data
    }
}

impl JacobianMatrix {
    /// Construct from a row-major entry buffer.
    pub fn new(
        layer: Layer,
        timestamp: DateTime<Utc>,
        rows: usize,
        cols: usize,
        data: Vec<f64>,
    ) -> Result<Self, MatrixError> {
        if data.len() != rows * cols {
            return Err(MatrixError::ShapeMismatch {
                rows,
                cols,
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self {
            layer,
            timestamp,
            rows,
            cols,
            data,
            invariants: OnceLock::new(),
        })
    }

    /// Construct from a vector of equal-length rows.
    pub fn from_rows(
        layer: Layer,
        timestamp: DateTime<Utc>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, MatrixError> {
        let m = rows.len();
        let n = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(m * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(MatrixError::RaggedRows {
                    row: i,
                    expected: n,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Self::new(layer, timestamp, m, n, data)
    }

    /// An empty (0×0) Jacobian for a zero-component layer.
    pub fn empty(layer: Layer, timestamp: DateTime<Utc>) -> Self {
        Self {
            layer,
            timestamp,
            rows: 0,
            cols: 0,
            data: Vec::new(),
            invariants: OnceLock::new(),
        }
    }

    /// The layer this Jacobian differentiates with respect to.
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// The cycle timestamp this Jacobian was estimated at.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Row count (reward-vector length `m`).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count (layer component count `n`).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the matrix is square (`m == n`).
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// The row-major entry buffer.
    pub fn entries(&self) -> &[f64] {
        &self.data
    }

    /// Entry at (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// The derived invariants, computed on first access.
    pub fn invariants(&self) -> &MatrixInvariants {
        self.invariants
            .get_or_init(|| analyze::compute_invariants(self))
    }

    /// Determinant — `None` for non-square or zero-dimension matrices.
    pub fn determinant(&self) -> Option<f64> {
        self.invariants().determinant
    }

    /// Eigenvalue approximations — empty for non-square matrices. See
    /// [`analyze::general_eigenvalues`] for exactness per dimension.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.invariants().eigenvalues
    }

    /// Singular values, non-negative, descending.
    pub fn singular_values(&self) -> &[f64] {
        &self.invariants().singular_values
    }

    /// Condition number — `None` for zero-dimension matrices, `+∞` when
    /// every singular value is negligible.
    pub fn condition_number(&self) -> Option<f64> {
        self.invariants().condition_number
    }

    /// Frobenius norm.
    pub fn frobenius_norm(&self) -> f64 {
        self.invariants().frobenius_norm
    }
}
