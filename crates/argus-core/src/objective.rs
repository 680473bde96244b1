//! # Objective Function Interface
//!
//! The monitor consumes, never implements, the objective ("reward")
//! function: a pure mapping from one layer's component vector to a reward
//! vector. The finite-difference estimator calls it repeatedly with
//! perturbed inputs and assumes identical context produces identical
//! output, so implementations must be deterministic and side-effect free.
//!
//! [`LinearObjective`] is a deterministic reference implementation — a
//! per-layer weight matrix plus bias — used by the CLI and the test suites
//! to exercise the full pipeline without external collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ObjectiveError;
use crate::layer::Layer;
use crate::state::StateSnapshot;

/// A vector of reward components (fixed length `m` per layer).
pub type RewardVector = Vec<f64>;

/// A pure reward function over one layer's state.
///
/// ## Contract
///
/// - Given a layer vector of the declared length, return a reward vector
///   of the declared length for that layer.
/// - Deterministic: identical `(layer, values, context)` inputs produce
///   identical output.
/// - Side-effect free: called `n + 1` times per layer per cycle.
///
/// Failures are returned, not panicked: the estimator converts any
/// [`ObjectiveError`] (or non-finite output) into a critical
/// `invalid_input` violation for the layer rather than propagating it.
pub trait ObjectiveFn: Send + Sync {
    /// Declared reward-vector length for the given layer.
    ///
    /// `input_len` is the layer's component count, so objectives whose
    /// output dimension follows their input can declare it without
    /// per-layer state. The estimator checks every evaluation against
    /// this declaration and reports a mismatch as a contract violation.
    fn output_len(&self, layer: Layer, input_len: usize) -> usize;

    /// Evaluate the reward vector for one layer.
    ///
    /// `context` is the rest of the system state, read-only; `values` is
    /// the (possibly perturbed) component vector of `layer`.
    fn reward(
        &self,
        layer: Layer,
        values: &[f64],
        context: &StateSnapshot,
    ) -> Result<RewardVector, ObjectiveError>;
}

// ---------------------------------------------------------------------------
// LinearObjective
// ---------------------------------------------------------------------------

/// One layer's linear reward map: `reward = W · x + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLinearLayer")]
pub struct LinearLayerObjective {
    /// Row-per-reward weight matrix (`m` rows of `n` entries).
    weights: Vec<Vec<f64>>,
    /// Bias vector of length `m`.
    bias: Vec<f64>,
}

#[derive(Deserialize)]
struct RawLinearLayer {
    weights: Vec<Vec<f64>>,
    #[serde(default)]
    bias: Option<Vec<f64>>,
}

impl TryFrom<RawLinearLayer> for LinearLayerObjective {
    type Error = ObjectiveError;

    fn try_from(raw: RawLinearLayer) -> Result<Self, Self::Error> {
        let bias = raw
            .bias
            .unwrap_or_else(|| vec![0.0; raw.weights.len()]);
        LinearLayerObjective::new(raw.weights, bias)
    }
}

impl LinearLayerObjective {
    /// Construct a linear layer map, validating rectangular weights and a
    /// matching bias length.
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Result<Self, ObjectiveError> {
        if bias.len() != weights.len() {
            return Err(ObjectiveError::Evaluation {
                reason: format!(
                    "bias length {} does not match weight row count {}",
                    bias.len(),
                    weights.len()
                ),
            });
        }
        if let Some(first) = weights.first() {
            let n = first.len();
            if weights.iter().any(|row| row.len() != n) {
                return Err(ObjectiveError::Evaluation {
                    reason: "weight matrix rows have unequal lengths".into(),
                });
            }
        }
        Ok(Self { weights, bias })
    }

    /// Declared input length (`n`), zero for an empty matrix.
    pub fn input_len(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    /// Declared output length (`m`).
    pub fn output_len(&self) -> usize {
        self.weights.len()
    }

    fn apply(&self, values: &[f64]) -> Result<RewardVector, ObjectiveError> {
        if values.len() != self.input_len() {
            return Err(ObjectiveError::InputArity {
                expected: self.input_len(),
                actual: values.len(),
            });
        }
        Ok(self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| b + row.iter().zip(values).map(|(w, x)| w * x).sum::<f64>())
            .collect())
    }
}

/// A deterministic, serde-loadable objective: one linear map per layer.
///
/// Layers without an entry fall back to the identity map over their input,
/// which makes a bare `LinearObjective::default()` a well-conditioned
/// objective for every layer — convenient for smoke tests and demos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearObjective {
    /// Per-layer linear maps.
    #[serde(default)]
    layers: BTreeMap<Layer, LinearLayerObjective>,
}

impl LinearObjective {
    /// Create an objective with no per-layer maps (identity everywhere).
    pub fn identity() -> Self {
        Self::default()
    }

    /// Set the linear map for one layer (builder style).
    pub fn with_layer(mut self, layer: Layer, map: LinearLayerObjective) -> Self {
        self.layers.insert(layer, map);
        self
    }
}

impl ObjectiveFn for LinearObjective {
    fn output_len(&self, layer: Layer, input_len: usize) -> usize {
        // The identity fallback echoes its input.
        self.layers
            .get(&layer)
            .map_or(input_len, LinearLayerObjective::output_len)
    }

    fn reward(
        &self,
        layer: Layer,
        values: &[f64],
        _context: &StateSnapshot,
    ) -> Result<RewardVector, ObjectiveError> {
        match self.layers.get(&layer) {
            Some(map) => map.apply(values),
            None => Ok(values.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SystemId;
    use chrono::Utc;

    fn ctx() -> StateSnapshot {
        StateSnapshot::new(SystemId::new("test").unwrap(), Utc::now())
    }

    #[test]
    fn identity_fallback_echoes_input() {
        let obj = LinearObjective::identity();
        let out = obj
            .reward(Layer::Ecological, &[1.0, -2.0, 3.5], &ctx())
            .unwrap();
        assert_eq!(out, vec![1.0, -2.0, 3.5]);
    }

    #[test]
    fn declared_output_length_matches_the_reward() {
        let obj = LinearObjective::identity();
        assert_eq!(obj.output_len(Layer::Ecological, 4), 4);

        let map = LinearLayerObjective::new(vec![vec![1.0, 0.0]], vec![0.0]).unwrap();
        let obj = obj.with_layer(Layer::Consent, map);
        assert_eq!(obj.output_len(Layer::Consent, 2), 1);
        let out = obj.reward(Layer::Consent, &[3.0, 4.0], &ctx()).unwrap();
        assert_eq!(out.len(), obj.output_len(Layer::Consent, 2));
    }

    #[test]
    fn linear_map_applies_weights_and_bias() {
        let map =
            LinearLayerObjective::new(vec![vec![1.0, 2.0], vec![0.0, -1.0]], vec![0.5, 0.0])
                .unwrap();
        let obj = LinearObjective::identity().with_layer(Layer::Consent, map);
        let out = obj.reward(Layer::Consent, &[3.0, 4.0], &ctx()).unwrap();
        assert_eq!(out, vec![0.5 + 3.0 + 8.0, -4.0]);
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let map = LinearLayerObjective::new(vec![vec![1.0, 0.0]], vec![0.0]).unwrap();
        let obj = LinearObjective::identity().with_layer(Layer::Temporal, map);
        let err = obj.reward(Layer::Temporal, &[1.0], &ctx()).unwrap_err();
        assert_eq!(
            err,
            ObjectiveError::InputArity {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn ragged_weight_matrix_is_rejected() {
        let err = LinearLayerObjective::new(vec![vec![1.0, 2.0], vec![3.0]], vec![0.0, 0.0]);
        assert!(err.is_err());
    }

    #[test]
    fn deserialization_fills_default_bias() {
        let yaml = "weights:\n  - [1.0, 0.0]\n  - [0.0, 1.0]\n";
        let map: LinearLayerObjective = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(map.output_len(), 2);
        assert_eq!(map.apply(&[2.0, 3.0]).unwrap(), vec![2.0, 3.0]);
    }
}
