//! # Finite-Difference Jacobian Estimation
//!
//! [`JacobianEstimator`] numerically differentiates the objective function
//! with respect to one layer's components using forward differences:
//!
//! ```text
//! J[i][j] = (f(x + ε·e_j)[i] - f(x)[i]) / ε
//! ```
//!
//! Cost per layer per cycle: `n + 1` objective evaluations, each recording
//! `m` reward components.
//!
//! The step size is validated at construction — a non-positive epsilon is
//! a configuration error and never reaches call time.

use argus_core::config::DEFAULT_EPSILON;
use argus_core::{ConfigError, ContractViolation, Layer, ObjectiveFn, StateSnapshot};

use crate::matrix::JacobianMatrix;

/// Forward-difference Jacobian estimator with a fixed step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobianEstimator {
    epsilon: f64,
}

impl JacobianEstimator {
    /// Create an estimator with the given step size.
    ///
    /// Rejects `epsilon <= 0` (and NaN) eagerly: a bad step size is a
    /// configuration failure, caught at construction rather than mid-cycle.
    pub fn new(epsilon: f64) -> Result<Self, ConfigError> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(ConfigError::NonPositiveEpsilon { epsilon });
        }
        Ok(Self { epsilon })
    }

    /// An estimator with the default step size (1e-6).
    pub fn with_default_epsilon() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// The configured step size.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Estimate the Jacobian of `objective` with respect to `layer`'s
    /// components at `snapshot`.
    ///
    /// The returned matrix is tagged with the layer and the snapshot's
    /// timestamp. A zero-component layer yields an empty matrix — that is
    /// not a violation. Contract breaches (non-finite state, objective
    /// failure, non-finite reward components, or a reward length that
    /// contradicts [`ObjectiveFn::output_len`] or drifts between calls)
    /// are returned as [`ContractViolation`]s for the controller to
    /// convert into critical violations.
    pub fn estimate(
        &self,
        objective: &dyn ObjectiveFn,
        snapshot: &StateSnapshot,
        layer: Layer,
    ) -> Result<JacobianMatrix, ContractViolation> {
        let vector = snapshot.layer(layer)?;
        if let Some(bad) = vector.first_non_finite() {
            return Err(ContractViolation::NonFiniteComponent {
                layer,
                component: bad.name.clone(),
            });
        }

        let n = vector.len();
        if n == 0 {
            return Ok(JacobianMatrix::empty(layer, snapshot.timestamp));
        }

        let base = self.evaluate(objective, snapshot, layer)?;
        let m = base.len();
        let declared = objective.output_len(layer, n);
        if m != declared {
            return Err(ContractViolation::ObjectiveFailed {
                layer,
                source: argus_core::ObjectiveError::OutputArity {
                    expected: declared,
                    actual: m,
                },
            });
        }
        tracing::trace!(%layer, m, n, epsilon = self.epsilon, "estimating jacobian");

        // Column-by-column forward differences, assembled row-major.
        let mut data = vec![0.0; m * n];
        for j in 0..n {
            let perturbed = snapshot.with_perturbed_component(layer, j, self.epsilon)?;
            let f_j = self.evaluate(objective, &perturbed, layer)?;
            if f_j.len() != m {
                return Err(ContractViolation::ObjectiveFailed {
                    layer,
                    source: argus_core::ObjectiveError::OutputArity {
                        expected: m,
                        actual: f_j.len(),
                    },
                });
            }
            for i in 0..m {
                data[i * n + j] = (f_j[i] - base[i]) / self.epsilon;
            }
        }

        JacobianMatrix::new(layer, snapshot.timestamp, m, n, data).map_err(|e| {
            // Unreachable with the length bookkeeping above; surfaced as a
            // contract breach rather than a panic if it ever happens.
            ContractViolation::ObjectiveFailed {
                layer,
                source: argus_core::ObjectiveError::Evaluation {
                    reason: e.to_string(),
                },
            }
        })
    }

    /// Evaluate the objective for one (possibly perturbed) snapshot and
    /// verify the reward vector is finite.
    fn evaluate(
        &self,
        objective: &dyn ObjectiveFn,
        snapshot: &StateSnapshot,
        layer: Layer,
    ) -> Result<Vec<f64>, ContractViolation> {
        let values = snapshot.layer(layer)?.values();
        let reward = objective
            .reward(layer, &values, snapshot)
            .map_err(|source| ContractViolation::ObjectiveFailed { layer, source })?;
        if let Some(index) = reward.iter().position(|r| !r.is_finite()) {
            return Err(ContractViolation::NonFiniteReward { layer, index });
        }
        Ok(reward)
    }
}
