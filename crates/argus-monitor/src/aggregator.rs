//! # Coherence Aggregation
//!
//! Folds the four per-layer scores into one operational coherence value:
//!
//! ```text
//! overall = Σ(score_i × weight_i) / Σ(weight_i)
//! ```
//!
//! Weights come from the layer thresholds and are validated at
//! construction — non-negative, with a strictly positive sum — so the
//! weighted mean is always well defined and always lands in [0, 1].
//!
//! The authorization threshold is itself a gate: an aggregate below it
//! emits one additional critical, pause-requiring violation independent of
//! the per-layer gates.

use std::collections::BTreeMap;

use argus_core::{
    ConfigError, Layer, MonitorConfig, Severity, Violation, ViolationKind,
};

use crate::evaluator::LayerEvaluation;

/// The aggregate outcome of one cycle's layer evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOutcome {
    /// Weighted mean of the layer scores, in [0, 1].
    pub overall_coherence: f64,
    /// The aggregate gate violation, present when `overall_coherence`
    /// fell below the authorization threshold.
    pub violation: Option<Violation>,
}

/// Weight-validated aggregator for per-layer scores.
#[derive(Debug, Clone, PartialEq)]
pub struct CoherenceAggregator {
    authorization_threshold: f64,
    weights: BTreeMap<Layer, f64>,
    weight_sum: f64,
}

impl CoherenceAggregator {
    /// Build an aggregator from a monitor configuration.
    ///
    /// Re-runs the weight checks even if the caller already validated the
    /// config: a zero weight sum must be impossible by the time
    /// [`aggregate`](Self::aggregate) divides by it.
    pub fn new(config: &MonitorConfig) -> Result<Self, ConfigError> {
        let mut weights = BTreeMap::new();
        let mut weight_sum = 0.0;
        for layer in Layer::ALL {
            let weight = config.thresholds_for(layer).weight;
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::NegativeWeight { layer, weight });
            }
            weights.insert(layer, weight);
            weight_sum += weight;
        }
        if weight_sum <= 0.0 {
            return Err(ConfigError::ZeroWeightSum);
        }
        if !config.authorization_threshold.is_finite()
            || !(0.0..=1.0).contains(&config.authorization_threshold)
        {
            return Err(ConfigError::AuthorizationThresholdOutOfRange {
                value: config.authorization_threshold,
            });
        }
        Ok(Self {
            authorization_threshold: config.authorization_threshold,
            weights,
            weight_sum,
        })
    }

    /// The configured authorization threshold.
    pub fn authorization_threshold(&self) -> f64 {
        self.authorization_threshold
    }

    /// Aggregate the per-layer evaluations.
    ///
    /// Layers missing from `evaluations` contribute a score of zero at
    /// their configured weight — an unevaluated layer must never raise the
    /// aggregate.
    pub fn aggregate(&self, evaluations: &[LayerEvaluation]) -> AggregateOutcome {
        let weighted_sum: f64 = self
            .weights
            .iter()
            .map(|(layer, weight)| {
                let score = evaluations
                    .iter()
                    .find(|e| e.layer == *layer)
                    .map_or(0.0, |e| e.score.clamp(0.0, 1.0));
                score * weight
            })
            .sum();
        let overall_coherence = (weighted_sum / self.weight_sum).clamp(0.0, 1.0);

        let violation = if overall_coherence < self.authorization_threshold {
            Some(Violation {
                layer: None,
                kind: ViolationKind::InsufficientOverallCoherence,
                severity: Severity::Critical,
                message: format!(
                    "overall coherence {overall_coherence:.4} is below the operational \
                     authorization threshold {:.4}",
                    self.authorization_threshold
                ),
                metric: "overall_coherence".into(),
                actual: Some(overall_coherence),
                threshold: Some(self.authorization_threshold),
                requires_pause: true,
            })
        } else {
            None
        };

        AggregateOutcome {
            overall_coherence,
            violation,
        }
    }
}
