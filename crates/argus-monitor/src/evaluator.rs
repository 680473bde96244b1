//! # Layer Sensitivity Evaluation
//!
//! Applies each layer's fixed gate set to the analyzed Jacobian and the
//! raw coherence telemetry, producing typed violations and a health score.
//!
//! ## Gate assignment
//!
//! The match on [`Layer`] below is **exhaustive** — declaring a fifth
//! layer will not compile until its gates are chosen here:
//!
//! | Layer      | Gates                                            |
//! |------------|--------------------------------------------------|
//! | Ecological | sensitivity (critical, pause)                    |
//! | Consent    | stability (critical, pause), balance (high)      |
//! | Temporal   | stability (critical, pause), spectrum (high)     |
//! | Cognitive  | spectrum (high), coherence (critical, pause)     |
//!
//! ## Gate rationale
//!
//! A collapsing Frobenius norm means the objective has gone numerically
//! insensitive to the layer — a decoupled or ignored input. A near-zero
//! determinant means the mapping is near-singular: small input changes are
//! indistinguishable from noise. A wide singular-value spread means one
//! direction dominates the response. A small eigenvalue magnitude marks a
//! direction in which the system is brittle to perturbation.
//!
//! ## Boundary semantics
//!
//! Floor gates are `>=` and the ceiling gate is `<=`: a metric exactly at
//! its threshold passes.

use argus_core::{Layer, LayerThresholds, Severity, Violation, ViolationKind};
use argus_matrix::{JacobianMatrix, NEGLIGIBILITY_FLOOR};

/// One layer's evaluation outcome: a score in [0, 1] and the violations
/// behind any degradation.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEvaluation {
    /// The evaluated layer.
    pub layer: Layer,
    /// 1.0 with no failing gate; otherwise the worst failing gate's
    /// actual/threshold ratio, clamped to [0, 1].
    pub score: f64,
    /// Violations emitted by this layer's gates, in gate order.
    pub violations: Vec<Violation>,
}

impl LayerEvaluation {
    /// An evaluation representing a failed layer pipeline: score 0 with a
    /// single critical violation.
    pub fn fault(layer: Layer, violation: Violation) -> Self {
        Self {
            layer,
            score: 0.0,
            violations: vec![violation],
        }
    }
}

/// Outcome of a single gate: a violation plus the degraded score ratio.
struct GateFailure {
    violation: Violation,
    ratio: f64,
}

/// Applies the per-layer gate set to analyzed Jacobians.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerSensitivityEvaluator;

impl LayerSensitivityEvaluator {
    /// Create an evaluator. Stateless; the gate set is fixed by [`Layer`].
    pub fn new() -> Self {
        Self
    }

    /// Evaluate one layer's gates against its Jacobian, its externally
    /// supplied coherence signal, and its thresholds.
    ///
    /// A zero-dimension Jacobian (the layer declared no components) skips
    /// the matrix-derived gates entirely — there is nothing to assess —
    /// but the coherence gate still applies where the layer carries one.
    pub fn evaluate(
        &self,
        jacobian: &JacobianMatrix,
        coherence_signal: Option<f64>,
        thresholds: &LayerThresholds,
    ) -> LayerEvaluation {
        let layer = jacobian.layer();
        let degenerate = jacobian.rows() == 0 || jacobian.cols() == 0;

        let mut failures: Vec<GateFailure> = Vec::new();

        // EXHAUSTIVE gate assignment — every layer variant listed.
        match layer {
            Layer::Ecological => {
                if !degenerate {
                    failures.extend(sensitivity_gate(layer, jacobian, thresholds));
                }
            }
            Layer::Consent => {
                if !degenerate {
                    failures.extend(stability_gate(layer, jacobian, thresholds));
                    failures.extend(balance_gate(layer, jacobian, thresholds));
                }
            }
            Layer::Temporal => {
                if !degenerate {
                    failures.extend(stability_gate(layer, jacobian, thresholds));
                    failures.extend(spectrum_gate(layer, jacobian, thresholds));
                }
            }
            Layer::Cognitive => {
                if !degenerate {
                    failures.extend(spectrum_gate(layer, jacobian, thresholds));
                }
                failures.extend(coherence_gate(layer, coherence_signal, thresholds));
            }
        }

        let score = failures
            .iter()
            .map(|f| f.ratio)
            .fold(1.0f64, f64::min)
            .clamp(0.0, 1.0);
        let violations: Vec<Violation> = failures.into_iter().map(|f| f.violation).collect();

        if !violations.is_empty() {
            tracing::debug!(
                %layer,
                score,
                violation_count = violations.len(),
                "layer gates failed"
            );
        }

        LayerEvaluation {
            layer,
            score,
            violations,
        }
    }
}

/// Degradation ratio for a floor gate (`actual >= threshold`).
fn floor_ratio(actual: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        1.0
    } else {
        (actual / threshold).clamp(0.0, 1.0)
    }
}

/// Frobenius norm ≥ `min_sensitivity`.
fn sensitivity_gate(
    layer: Layer,
    jacobian: &JacobianMatrix,
    thresholds: &LayerThresholds,
) -> Option<GateFailure> {
    let norm = jacobian.frobenius_norm();
    if norm >= thresholds.min_sensitivity {
        return None;
    }
    Some(GateFailure {
        violation: Violation::gate(
            layer,
            ViolationKind::InsufficientSensitivity,
            Severity::Critical,
            "frobenius_norm",
            norm,
            thresholds.min_sensitivity,
            true,
            format!(
                "objective sensitivity to {layer} has collapsed: \
                 ‖J‖F = {norm:.6e} < {:.6e}",
                thresholds.min_sensitivity
            ),
        ),
        ratio: floor_ratio(norm, thresholds.min_sensitivity),
    })
}

/// |determinant| ≥ `stability_floor`. Fails closed when the Jacobian is
/// not square: a layer whose stability cannot be assessed is not assumed
/// stable.
fn stability_gate(
    layer: Layer,
    jacobian: &JacobianMatrix,
    thresholds: &LayerThresholds,
) -> Option<GateFailure> {
    match jacobian.determinant() {
        Some(det) if det.abs() >= thresholds.stability_floor => None,
        Some(det) => Some(GateFailure {
            violation: Violation::gate(
                layer,
                ViolationKind::StabilityFloorBreach,
                Severity::Critical,
                "determinant_magnitude",
                det.abs(),
                thresholds.stability_floor,
                true,
                format!(
                    "{layer} mapping is near-singular: |det J| = {:.6e} < {:.6e}",
                    det.abs(),
                    thresholds.stability_floor
                ),
            ),
            ratio: floor_ratio(det.abs(), thresholds.stability_floor),
        }),
        None => Some(GateFailure {
            violation: Violation::gate(
                layer,
                ViolationKind::StabilityFloorBreach,
                Severity::Critical,
                "determinant_magnitude",
                f64::NAN,
                thresholds.stability_floor,
                true,
                format!(
                    "{layer} stability cannot be assessed: determinant undefined for a \
                     {}x{} Jacobian",
                    jacobian.rows(),
                    jacobian.cols()
                ),
            ),
            ratio: 0.0,
        }),
    }
}

/// max(σ)/min(σ) ≤ `max_imbalance_ratio`.
///
/// Skipped when the whole spectrum is negligible — an effectively zero
/// matrix has no dominant direction, and the sensitivity or stability
/// gates are the ones that flag it.
fn balance_gate(
    layer: Layer,
    jacobian: &JacobianMatrix,
    thresholds: &LayerThresholds,
) -> Option<GateFailure> {
    let singular_values = jacobian.singular_values();
    let max = *singular_values.first()?;
    let min = *singular_values.last()?;
    if max <= NEGLIGIBILITY_FLOOR {
        return None;
    }
    let ratio = if min <= NEGLIGIBILITY_FLOOR {
        f64::INFINITY
    } else {
        max / min
    };
    if ratio <= thresholds.max_imbalance_ratio {
        return None;
    }
    Some(GateFailure {
        violation: Violation::gate(
            layer,
            ViolationKind::AuthorityImbalance,
            Severity::High,
            "singular_value_ratio",
            ratio,
            thresholds.max_imbalance_ratio,
            false,
            format!(
                "one direction dominates the {layer} response: σmax/σmin = {ratio:.3e} \
                 > {:.3e}",
                thresholds.max_imbalance_ratio
            ),
        ),
        ratio: if ratio.is_finite() && ratio > 0.0 {
            (thresholds.max_imbalance_ratio / ratio).clamp(0.0, 1.0)
        } else {
            0.0
        },
    })
}

/// min(|eigenvalue|) ≥ `min_eigenvalue`. Fails closed when no eigenvalue
/// approximation is available (non-square Jacobian).
fn spectrum_gate(
    layer: Layer,
    jacobian: &JacobianMatrix,
    thresholds: &LayerThresholds,
) -> Option<GateFailure> {
    let eigenvalues = jacobian.eigenvalues();
    if eigenvalues.is_empty() {
        return Some(GateFailure {
            violation: Violation::gate(
                layer,
                ViolationKind::SpectralBrittleness,
                Severity::High,
                "min_eigenvalue_magnitude",
                f64::NAN,
                thresholds.min_eigenvalue,
                false,
                format!(
                    "{layer} spectrum cannot be assessed: eigenvalues undefined for a \
                     {}x{} Jacobian",
                    jacobian.rows(),
                    jacobian.cols()
                ),
            ),
            ratio: 0.0,
        });
    }
    let min_magnitude = eigenvalues
        .iter()
        .map(|e| e.abs())
        .fold(f64::INFINITY, f64::min);
    if min_magnitude >= thresholds.min_eigenvalue {
        return None;
    }
    Some(GateFailure {
        violation: Violation::gate(
            layer,
            ViolationKind::SpectralBrittleness,
            Severity::High,
            "min_eigenvalue_magnitude",
            min_magnitude,
            thresholds.min_eigenvalue,
            false,
            format!(
                "{layer} has a perturbation-brittle direction: min |λ| = \
                 {min_magnitude:.6e} < {:.6e}",
                thresholds.min_eigenvalue
            ),
        ),
        ratio: floor_ratio(min_magnitude, thresholds.min_eigenvalue),
    })
}

/// Externally supplied coherence signal ≥ `min_coherence`.
///
/// The signal is optional telemetry, not a Jacobian derivative; a layer
/// without one this cycle is simply not coherence-gated this cycle.
fn coherence_gate(
    layer: Layer,
    signal: Option<f64>,
    thresholds: &LayerThresholds,
) -> Option<GateFailure> {
    let value = signal?;
    if value >= thresholds.min_coherence {
        return None;
    }
    Some(GateFailure {
        violation: Violation::gate(
            layer,
            ViolationKind::InsufficientCoherence,
            Severity::Critical,
            "coherence_signal",
            value,
            thresholds.min_coherence,
            true,
            format!(
                "reported {layer} coherence {value:.4} is below the floor {:.4}",
                thresholds.min_coherence
            ),
        ),
        ratio: floor_ratio(value, thresholds.min_coherence),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn jacobian(layer: Layer, n: usize, data: Vec<f64>) -> JacobianMatrix {
        JacobianMatrix::new(layer, Utc::now(), n, n, data).unwrap()
    }

    fn identity(layer: Layer, n: usize) -> JacobianMatrix {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        jacobian(layer, n, data)
    }

    #[test]
    fn healthy_layers_score_one_with_no_violations() {
        let evaluator = LayerSensitivityEvaluator::new();
        let thresholds = LayerThresholds::default();
        for layer in Layer::ALL {
            let eval = evaluator.evaluate(&identity(layer, 3), Some(0.9), &thresholds);
            assert_eq!(eval.score, 1.0, "{layer} should be healthy");
            assert!(eval.violations.is_empty(), "{layer} produced violations");
        }
    }

    #[test]
    fn frobenius_norm_at_exact_threshold_passes() {
        // A 1×1 matrix [x] has ‖J‖F = |x|; pin min_sensitivity to it.
        let evaluator = LayerSensitivityEvaluator::new();
        let thresholds = LayerThresholds {
            min_sensitivity: 0.25,
            ..LayerThresholds::default()
        };
        let at = evaluator.evaluate(
            &jacobian(Layer::Ecological, 1, vec![0.25]),
            None,
            &thresholds,
        );
        assert!(at.violations.is_empty(), "rule is >=, boundary must pass");

        let below = evaluator.evaluate(
            &jacobian(Layer::Ecological, 1, vec![0.25 - 1e-6]),
            None,
            &thresholds,
        );
        assert_eq!(below.violations.len(), 1);
        assert_eq!(
            below.violations[0].kind,
            ViolationKind::InsufficientSensitivity
        );
        assert!(below.violations[0].requires_pause);
    }

    #[test]
    fn zero_jacobian_fails_sensitivity_critically() {
        let evaluator = LayerSensitivityEvaluator::new();
        let eval = evaluator.evaluate(
            &jacobian(Layer::Ecological, 2, vec![0.0; 4]),
            None,
            &LayerThresholds::default(),
        );
        assert_eq!(eval.score, 0.0);
        assert_eq!(eval.violations.len(), 1);
        assert_eq!(eval.violations[0].severity, Severity::Critical);
        assert!(eval.violations[0].requires_pause);
    }

    #[test]
    fn near_singular_consent_breaches_stability_floor() {
        let evaluator = LayerSensitivityEvaluator::new();
        // Rank-1 2×2: det = 0.
        let eval = evaluator.evaluate(
            &jacobian(Layer::Consent, 2, vec![1.0, 2.0, 2.0, 4.0]),
            None,
            &LayerThresholds::default(),
        );
        let kinds: Vec<_> = eval.violations.iter().map(|v| v.kind).collect();
        assert!(kinds.contains(&ViolationKind::StabilityFloorBreach));
        // Rank deficiency also blows up the singular-value spread.
        assert!(kinds.contains(&ViolationKind::AuthorityImbalance));
        assert_eq!(eval.score, 0.0);
    }

    #[test]
    fn imbalanced_consent_is_high_severity_without_pause() {
        let evaluator = LayerSensitivityEvaluator::new();
        let thresholds = LayerThresholds {
            max_imbalance_ratio: 10.0,
            ..LayerThresholds::default()
        };
        // diag(100, 1): ratio 100 > 10, det 100 passes the floor.
        let eval = evaluator.evaluate(
            &jacobian(Layer::Consent, 2, vec![100.0, 0.0, 0.0, 1.0]),
            None,
            &thresholds,
        );
        assert_eq!(eval.violations.len(), 1);
        let v = &eval.violations[0];
        assert_eq!(v.kind, ViolationKind::AuthorityImbalance);
        assert_eq!(v.severity, Severity::High);
        assert!(!v.requires_pause);
        assert!((eval.score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn brittle_temporal_spectrum_is_flagged() {
        let evaluator = LayerSensitivityEvaluator::new();
        let thresholds = LayerThresholds {
            min_eigenvalue: 0.5,
            stability_floor: 1e-9,
            ..LayerThresholds::default()
        };
        // Eigenvalues 1 and 0.01: min |λ| below 0.5.
        let eval = evaluator.evaluate(
            &jacobian(Layer::Temporal, 2, vec![1.0, 0.0, 0.0, 0.01]),
            None,
            &thresholds,
        );
        assert_eq!(eval.violations.len(), 1);
        assert_eq!(eval.violations[0].kind, ViolationKind::SpectralBrittleness);
    }

    #[test]
    fn cognitive_coherence_gate_reads_the_signal() {
        let evaluator = LayerSensitivityEvaluator::new();
        let thresholds = LayerThresholds::default();

        let low = evaluator.evaluate(&identity(Layer::Cognitive, 2), Some(0.2), &thresholds);
        assert_eq!(low.violations.len(), 1);
        assert_eq!(low.violations[0].kind, ViolationKind::InsufficientCoherence);
        assert!(low.violations[0].requires_pause);
        assert!((low.score - 0.4).abs() < 1e-9);

        // No signal, no coherence gate.
        let absent = evaluator.evaluate(&identity(Layer::Cognitive, 2), None, &thresholds);
        assert!(absent.violations.is_empty());
    }

    #[test]
    fn coherence_gate_ignores_other_layers() {
        let evaluator = LayerSensitivityEvaluator::new();
        // A terrible signal on a non-cognitive layer changes nothing.
        let eval = evaluator.evaluate(
            &identity(Layer::Ecological, 2),
            Some(0.0),
            &LayerThresholds::default(),
        );
        assert!(eval.violations.is_empty());
    }

    #[test]
    fn empty_jacobian_skips_matrix_gates() {
        let evaluator = LayerSensitivityEvaluator::new();
        let empty = JacobianMatrix::empty(Layer::Ecological, Utc::now());
        let eval = evaluator.evaluate(&empty, None, &LayerThresholds::default());
        assert_eq!(eval.score, 1.0);
        assert!(eval.violations.is_empty());
    }

    #[test]
    fn non_square_stability_gate_fails_closed() {
        let evaluator = LayerSensitivityEvaluator::new();
        let wide = JacobianMatrix::new(
            Layer::Consent,
            Utc::now(),
            2,
            3,
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        )
        .unwrap();
        let eval = evaluator.evaluate(&wide, None, &LayerThresholds::default());
        assert!(eval
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::StabilityFloorBreach && v.actual.is_none()));
        assert_eq!(eval.score, 0.0);
    }
}
