//! Property tests for the numeric core: invariants that must hold for all
//! matrices, not just hand-picked ones.

use chrono::Utc;
use proptest::prelude::*;

use argus_core::{Layer, LinearObjective, StateComponent, StateSnapshot, StateVector, SystemId};
use argus_matrix::{analyze, JacobianEstimator, JacobianMatrix, NEGLIGIBILITY_FLOOR};

fn entry() -> impl Strategy<Value = f64> {
    -3.0..3.0f64
}

fn square_matrix(n: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(entry(), n * n)
}

fn jacobian(layer: Layer, rows: usize, cols: usize, data: Vec<f64>) -> JacobianMatrix {
    JacobianMatrix::new(layer, Utc::now(), rows, cols, data).unwrap()
}

proptest! {
    /// Singular values are non-negative by construction for any shape.
    #[test]
    fn singular_values_are_non_negative(
        data in prop::collection::vec(entry(), 12)
    ) {
        let m = jacobian(Layer::Ecological, 3, 4, data);
        for s in m.singular_values() {
            prop_assert!(*s >= 0.0);
        }
    }

    /// det(A)² equals the product of the eigenvalues of AᵗA (which is
    /// det(AᵗA)) within floating tolerance — a cross-check between the
    /// cofactor determinant and the Jacobi singular-value path.
    #[test]
    fn determinant_squared_matches_gram_eigenvalue_product(
        data in square_matrix(3)
    ) {
        let m = jacobian(Layer::Consent, 3, 3, data);
        let det = m.determinant().unwrap();
        let product: f64 = m.singular_values().iter().map(|s| s * s).product();
        let scale = det * det + 1.0;
        prop_assert!(
            ((det * det) - product).abs() <= 1e-6 * scale,
            "det² = {}, ∏λ(AᵗA) = {}",
            det * det,
            product
        );
    }

    /// The condition number is at least 1 whenever any singular value
    /// exceeds the negligibility floor.
    #[test]
    fn condition_number_is_at_least_one(data in square_matrix(4)) {
        let m = jacobian(Layer::Temporal, 4, 4, data);
        let has_significant = m
            .singular_values()
            .iter()
            .any(|s| *s > NEGLIGIBILITY_FLOOR);
        if has_significant {
            prop_assert!(m.condition_number().unwrap() >= 1.0);
        } else {
            prop_assert!(m.condition_number().unwrap().is_infinite());
        }
    }

    /// Jacobi on AᵗA recovers a spectrum whose sum equals the squared
    /// Frobenius norm (trace identity).
    #[test]
    fn gram_spectrum_sums_to_squared_frobenius_norm(data in square_matrix(3)) {
        let m = jacobian(Layer::Cognitive, 3, 3, data);
        let spectrum_sum: f64 = m.singular_values().iter().map(|s| s * s).sum();
        let frob2 = m.frobenius_norm() * m.frobenius_norm();
        prop_assert!(
            (spectrum_sum - frob2).abs() <= 1e-8 * (frob2 + 1.0),
            "Σλ = {spectrum_sum}, ‖A‖²F = {frob2}"
        );
    }

    /// For the identity objective, the estimated Jacobian converges to the
    /// identity matrix within O(ε).
    #[test]
    fn identity_objective_estimates_identity(
        values in prop::collection::vec(-10.0..10.0f64, 1..=6)
    ) {
        let n = values.len();
        let components = values
            .iter()
            .enumerate()
            .map(|(i, v)| StateComponent::new(format!("c{i}"), *v))
            .collect();
        let snapshot = StateSnapshot::new(SystemId::new("prop").unwrap(), Utc::now())
            .with_layer(StateVector::new(Layer::Ecological, components).unwrap());

        let epsilon = 1e-6;
        let estimator = JacobianEstimator::new(epsilon).unwrap();
        let m = estimator
            .estimate(&LinearObjective::identity(), &snapshot, Layer::Ecological)
            .unwrap();

        prop_assert_eq!((m.rows(), m.cols()), (n, n));
        for i in 0..n {
            for j in 0..n {
                let expected = if i == j { 1.0 } else { 0.0 };
                // Forward differences of an exactly linear function are
                // limited only by cancellation in (x + ε) - x.
                prop_assert!(
                    (m.get(i, j) - expected).abs() < 1e-3,
                    "J[{}][{}] = {}",
                    i, j, m.get(i, j)
                );
            }
        }
    }

    /// Power iteration on a symmetric matrix lands within tolerance of the
    /// largest-magnitude Jacobi eigenvalue.
    #[test]
    fn power_iteration_agrees_with_jacobi_on_symmetric(
        raw in square_matrix(3)
    ) {
        // Symmetrize so both routines apply.
        let mut a = raw.clone();
        for i in 0..3 {
            for j in 0..3 {
                a[i * 3 + j] = (raw[i * 3 + j] + raw[j * 3 + i]) / 2.0;
            }
        }
        let jacobi = analyze::symmetric_eigenvalues(&a, 3);
        let dominant_magnitude = jacobi
            .iter()
            .map(|e| e.abs())
            .fold(0.0f64, f64::max);
        let power = analyze::power_iteration(&a, 3).abs();
        // Power iteration can stall when the start vector is orthogonal
        // to the dominant eigenvector or eigenvalues tie in magnitude;
        // it must never overshoot the true dominant magnitude.
        prop_assert!(power <= dominant_magnitude + 1e-6);
    }
}
