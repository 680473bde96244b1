//! # argus-matrix — Jacobian Estimation & Matrix Analysis
//!
//! The only subsystem in the stack doing non-trivial numerics:
//!
//! - **Estimation** ([`estimator`]): [`JacobianEstimator`] builds an m×n
//!   matrix of partial derivatives ∂reward_i/∂state_j by forward
//!   differences — `n + 1` objective evaluations per layer per cycle.
//!
//! - **Representation** ([`matrix`]): [`JacobianMatrix`] is immutable once
//!   constructed; its derived invariants (determinant, eigenvalues,
//!   singular values, condition number, Frobenius norm) are computed
//!   lazily on first access and cached. Entries never change, so the cache
//!   can never go stale.
//!
//! - **Analysis** ([`analyze`]): the numeric routines themselves. Cofactor
//!   determinant (exact, O(n!) — see the dimension cap in `argus-core`),
//!   2×2 characteristic roots, power iteration for the dominant eigenvalue,
//!   and a cyclic Jacobi eigensolver for the symmetric AᵗA used to derive
//!   singular values.
//!
//! Numerical degeneracy never raises here: zero-dimension matrices yield
//! empty invariants, and an all-negligible singular spectrum yields an
//! infinite condition number, both judged downstream by the threshold
//! gates.

pub mod analyze;
pub mod estimator;
pub mod matrix;

pub use analyze::{MatrixInvariants, NEGLIGIBILITY_FLOOR, POWER_ITERATIONS};
pub use estimator::JacobianEstimator;
pub use matrix::JacobianMatrix;
