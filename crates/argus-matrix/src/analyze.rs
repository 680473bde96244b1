//! # Matrix Invariant Analysis
//!
//! The numeric routines behind [`JacobianMatrix`](crate::JacobianMatrix)'s
//! derived fields. All functions operate on row-major `&[f64]` slices and
//! return data, never errors — degeneracy is represented as `None`, empty
//! vectors, or `+∞`.
//!
//! ## Method notes
//!
//! - **Determinant**: recursive cofactor (Laplace) expansion. Exact, but
//!   O(n!) — tractable only because layer dimensionality is capped at 10
//!   (`argus_core::state::LAYER_DIMENSION_CAP`).
//! - **Eigenvalues (general matrix)**: 2×2 solves the characteristic
//!   quadratic exactly; a negative discriminant (complex pair) is reported
//!   via the shared real part only — the stack does not track complex
//!   spectra. Above 2×2, power iteration with a Rayleigh-quotient readout
//!   yields the dominant eigenvalue only; no threshold gate needs the full
//!   spectrum of a non-symmetric matrix.
//! - **Eigenvalues (symmetric)**: cyclic Jacobi rotations. Used for AᵗA,
//!   which is symmetric positive-semidefinite, so the full spectrum — and
//!   therefore every singular value — is available and correctly signed.

use crate::matrix::JacobianMatrix;

/// Fixed iteration count for power iteration.
pub const POWER_ITERATIONS: usize = 100;

/// Singular values at or below this floor are treated as numerically zero
/// when forming the condition number.
pub const NEGLIGIBILITY_FLOOR: f64 = 1e-10;

/// Maximum cyclic Jacobi sweeps before accepting the current diagonal.
const JACOBI_MAX_SWEEPS: usize = 64;

/// The derived invariants of one Jacobian.
///
/// Computed once per matrix and cached by [`JacobianMatrix`]; the matrix
/// is immutable, so these can never go stale.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixInvariants {
    /// Determinant — defined only for square matrices.
    pub determinant: Option<f64>,
    /// Eigenvalue approximations — defined only for square matrices.
    /// Exact for 1×1 and 2×2 (real parts for complex pairs); dominant
    /// eigenvalue only above 2×2.
    pub eigenvalues: Vec<f64>,
    /// Singular values, non-negative, sorted descending. Defined for any
    /// shape with at least one row and column.
    pub singular_values: Vec<f64>,
    /// max(σ) / min(σ > floor); `+∞` when every σ is negligible; `None`
    /// for zero-dimension matrices.
    pub condition_number: Option<f64>,
    /// Frobenius norm. Always defined (0.0 for zero-dimension matrices).
    pub frobenius_norm: f64,
}

impl MatrixInvariants {
    /// Invariants of a matrix with zero rows or columns: everything absent
    /// or zero, never an error.
    fn degenerate() -> Self {
        Self {
            determinant: None,
            eigenvalues: Vec::new(),
            singular_values: Vec::new(),
            condition_number: None,
            frobenius_norm: 0.0,
        }
    }
}

/// Compute every derived invariant for a Jacobian.
pub fn compute_invariants(matrix: &JacobianMatrix) -> MatrixInvariants {
    let (m, n) = (matrix.rows(), matrix.cols());
    if m == 0 || n == 0 {
        return MatrixInvariants::degenerate();
    }
    let data = matrix.entries();

    let (determinant, eigenvalues) = if m == n {
        (
            Some(determinant(data, n)),
            general_eigenvalues(data, n),
        )
    } else {
        (None, Vec::new())
    };

    let singular_values = singular_values(data, m, n);
    let condition_number = Some(condition_number(&singular_values));

    MatrixInvariants {
        determinant,
        eigenvalues,
        singular_values,
        condition_number,
        frobenius_norm: frobenius_norm(data),
    }
}

/// Frobenius norm: √(Σ aᵢⱼ²).
pub fn frobenius_norm(data: &[f64]) -> f64 {
    data.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Exact determinant of an n×n row-major matrix by cofactor expansion
/// along the first row.
///
/// O(n!) — callers rely on the layer dimension cap to keep n ≤ 10.
pub fn determinant(data: &[f64], n: usize) -> f64 {
    debug_assert_eq!(data.len(), n * n);
    match n {
        0 => 1.0,
        1 => data[0],
        2 => data[0] * data[3] - data[1] * data[2],
        _ => {
            let mut sum = 0.0;
            let mut minor = vec![0.0; (n - 1) * (n - 1)];
            for col in 0..n {
                // Build the minor that deletes row 0 and `col`.
                let mut idx = 0;
                for i in 1..n {
                    for j in 0..n {
                        if j != col {
                            minor[idx] = data[i * n + j];
                            idx += 1;
                        }
                    }
                }
                let sign = if col % 2 == 0 { 1.0 } else { -1.0 };
                sum += sign * data[col] * determinant(&minor, n - 1);
            }
            sum
        }
    }
}

/// Eigenvalue approximations for a general (not necessarily symmetric)
/// square matrix.
///
/// - n = 1: the single entry.
/// - n = 2: characteristic-quadratic roots. A complex conjugate pair
///   (negative discriminant) is reported as the shared real part,
///   duplicated; the imaginary component is not tracked.
/// - n > 2: the dominant eigenvalue from power iteration, alone.
pub fn general_eigenvalues(data: &[f64], n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![data[0]],
        2 => eigenvalues_2x2(data[0], data[1], data[2], data[3]),
        _ => vec![power_iteration(data, n)],
    }
}

/// Roots of λ² − trace·λ + det for a 2×2 matrix.
fn eigenvalues_2x2(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    let trace = a + d;
    let det = a * d - b * c;
    let discriminant = trace * trace - 4.0 * det;
    if discriminant >= 0.0 {
        let root = discriminant.sqrt();
        vec![(trace + root) / 2.0, (trace - root) / 2.0]
    } else {
        // Complex pair λ = trace/2 ± i·√(-disc)/2: real part only.
        vec![trace / 2.0, trace / 2.0]
    }
}

/// Dominant eigenvalue of an n×n matrix by power iteration.
///
/// Fixed [`POWER_ITERATIONS`] iterations from a uniform start vector, with
/// a Rayleigh-quotient readout. Returns 0.0 if the iterate collapses (the
/// matrix annihilates the current vector).
pub fn power_iteration(data: &[f64], n: usize) -> f64 {
    debug_assert_eq!(data.len(), n * n);
    if n == 0 {
        return 0.0;
    }
    let mut v = vec![1.0 / (n as f64).sqrt(); n];
    let mut w = vec![0.0; n];

    for _ in 0..POWER_ITERATIONS {
        mat_vec(data, n, &v, &mut w);
        let norm = w.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm <= NEGLIGIBILITY_FLOOR {
            return 0.0;
        }
        for (vi, wi) in v.iter_mut().zip(&w) {
            *vi = wi / norm;
        }
    }

    // Rayleigh quotient vᵗAv with v unit-normalized.
    mat_vec(data, n, &v, &mut w);
    v.iter().zip(&w).map(|(vi, wi)| vi * wi).sum()
}

fn mat_vec(data: &[f64], n: usize, v: &[f64], out: &mut [f64]) {
    for (i, out_i) in out.iter_mut().enumerate() {
        *out_i = data[i * n..(i + 1) * n]
            .iter()
            .zip(v)
            .map(|(a, x)| a * x)
            .sum();
    }
}

/// Full spectrum of a symmetric n×n matrix by cyclic Jacobi rotations,
/// sorted descending.
///
/// Converges quadratically for the small symmetric matrices this stack
/// produces (AᵗA with n ≤ 10); sweeps are capped at [`JACOBI_MAX_SWEEPS`].
pub fn symmetric_eigenvalues(data: &[f64], n: usize) -> Vec<f64> {
    debug_assert_eq!(data.len(), n * n);
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![data[0]];
    }

    let mut a = data.to_vec();
    let scale = frobenius_norm(&a).max(1.0);
    let tolerance = 1e-14 * scale;

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p * n + q] * a[p * n + q])
            .sum::<f64>()
            .sqrt();
        if off <= tolerance {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p * n + q];
                if apq.abs() <= tolerance / (n * n) as f64 {
                    continue;
                }
                let app = a[p * n + p];
                let aqq = a[q * n + q];
                let theta = (aqq - app) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // Rotate rows and columns p and q.
                for k in 0..n {
                    let akp = a[k * n + p];
                    let akq = a[k * n + q];
                    a[k * n + p] = c * akp - s * akq;
                    a[k * n + q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p * n + k];
                    let aqk = a[q * n + k];
                    a[p * n + k] = c * apk - s * aqk;
                    a[q * n + k] = s * apk + c * aqk;
                }
            }
        }
    }

    let mut eigenvalues: Vec<f64> = (0..n).map(|i| a[i * n + i]).collect();
    eigenvalues.sort_by(|x, y| y.partial_cmp(x).unwrap_or(std::cmp::Ordering::Equal));
    eigenvalues
}

/// Singular values of an m×n matrix: square roots of the eigenvalues of
/// the symmetric Gram matrix AᵗA, sorted descending.
///
/// Eigenvalues of AᵗA are mathematically non-negative; tiny negative
/// values from floating-point rotation error are clamped to zero so the
/// result is non-negative by construction.
pub fn singular_values(data: &[f64], m: usize, n: usize) -> Vec<f64> {
    if m == 0 || n == 0 {
        return Vec::new();
    }
    let mut gram = vec![0.0; n * n];
    for i in 0..n {
        for j in i..n {
            let mut sum = 0.0;
            for k in 0..m {
                sum += data[k * n + i] * data[k * n + j];
            }
            gram[i * n + j] = sum;
            gram[j * n + i] = sum;
        }
    }
    symmetric_eigenvalues(&gram, n)
        .into_iter()
        .map(|e| e.max(0.0).sqrt())
        .collect()
}

/// Condition number from a descending singular spectrum.
///
/// Ratio of the largest singular value to the smallest one exceeding
/// [`NEGLIGIBILITY_FLOOR`]; `+∞` when none does. The spectrum must be
/// non-empty (zero-dimension matrices are handled by the caller).
pub fn condition_number(singular_values: &[f64]) -> f64 {
    let max = singular_values.first().copied().unwrap_or(0.0);
    let min_significant = singular_values
        .iter()
        .rev()
        .find(|s| **s > NEGLIGIBILITY_FLOOR);
    match min_significant {
        Some(min) => max / min,
        None => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn determinant_of_known_matrices() {
        assert!((determinant(&[3.0], 1) - 3.0).abs() < TOL);
        assert!((determinant(&[1.0, 2.0, 3.0, 4.0], 2) + 2.0).abs() < TOL);
        // det of an upper-triangular 3×3 is the diagonal product.
        let upper = [2.0, 5.0, 7.0, 0.0, 3.0, 1.0, 0.0, 0.0, 4.0];
        assert!((determinant(&upper, 3) - 24.0).abs() < TOL);
    }

    #[test]
    fn determinant_of_singular_matrix_is_zero() {
        // Second row is 2× the first.
        let singular = [1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0];
        assert!(determinant(&singular, 3).abs() < TOL);
    }

    #[test]
    fn eigenvalues_2x2_real_pair() {
        // diag(3, 1) rotated by nothing: eigenvalues 3 and 1.
        let eig = general_eigenvalues(&[3.0, 0.0, 0.0, 1.0], 2);
        assert!((eig[0] - 3.0).abs() < TOL);
        assert!((eig[1] - 1.0).abs() < TOL);
    }

    #[test]
    fn eigenvalues_2x2_complex_pair_reports_real_part() {
        // Rotation-like matrix: λ = 1 ± 2i → reported as [1, 1].
        let eig = general_eigenvalues(&[1.0, -2.0, 2.0, 1.0], 2);
        assert!((eig[0] - 1.0).abs() < TOL);
        assert!((eig[1] - 1.0).abs() < TOL);
    }

    #[test]
    fn power_iteration_finds_dominant_eigenvalue() {
        let diag = [5.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0];
        assert!((power_iteration(&diag, 3) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn power_iteration_of_zero_matrix_is_zero() {
        assert_eq!(power_iteration(&[0.0; 9], 3), 0.0);
    }

    #[test]
    fn jacobi_recovers_symmetric_spectrum() {
        // Symmetric with known eigenvalues 3 and 1:
        // [[2, 1], [1, 2]] → λ = 3, 1.
        let eig = symmetric_eigenvalues(&[2.0, 1.0, 1.0, 2.0], 2);
        assert!((eig[0] - 3.0).abs() < 1e-9);
        assert!((eig[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn jacobi_handles_larger_symmetric_matrices() {
        // diag(4, 9, 16) rotated by a permutation stays {16, 9, 4}.
        let a = [9.0, 0.0, 0.0, 0.0, 16.0, 0.0, 0.0, 0.0, 4.0];
        let eig = symmetric_eigenvalues(&a, 3);
        assert!((eig[0] - 16.0).abs() < 1e-9);
        assert!((eig[1] - 9.0).abs() < 1e-9);
        assert!((eig[2] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn singular_values_of_rectangular_matrix() {
        // 3×2 matrix [[1,0],[0,2],[0,0]] has singular values {2, 1}.
        let a = [1.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        let sv = singular_values(&a, 3, 2);
        assert_eq!(sv.len(), 2);
        assert!((sv[0] - 2.0).abs() < 1e-9);
        assert!((sv[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn singular_values_are_non_negative() {
        let a = [-3.0, 1.0, 4.0, -1.0, -5.0, 9.0];
        for s in singular_values(&a, 2, 3) {
            assert!(s >= 0.0);
        }
    }

    #[test]
    fn condition_number_of_identity_is_one() {
        let sv = singular_values(&[1.0, 0.0, 0.0, 1.0], 2, 2);
        assert!((condition_number(&sv) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn condition_number_of_negligible_spectrum_is_infinite() {
        let sv = singular_values(&[0.0; 4], 2, 2);
        assert!(condition_number(&sv).is_infinite());
    }

    #[test]
    fn condition_number_ignores_negligible_directions() {
        // σ = {2, 1e-15}: the tiny value is below the floor, so the
        // ratio is taken against the only significant value.
        let cond = condition_number(&[2.0, 1e-15]);
        assert!((cond - 1.0).abs() < 1e-9);
    }

    #[test]
    fn frobenius_norm_matches_hand_computation() {
        assert!((frobenius_norm(&[3.0, 4.0]) - 5.0).abs() < TOL);
        assert_eq!(frobenius_norm(&[]), 0.0);
    }
}
