//! # Monitored Layers
//!
//! The closed set of layers the monitor evaluates. Partial derivatives,
//! threshold gates and aggregation weights are all keyed by this enum, so
//! adding a fifth layer is a compile error at every exhaustive `match` in
//! the evaluator until the new layer's gates are declared.

use serde::{Deserialize, Serialize};

/// A named, fixed-length numeric sub-vector of the overall system state.
///
/// Each layer carries its own threshold configuration and its own gate set
/// (see `argus-monitor`). The variants are ordered; that ordering is used
/// for deterministic iteration, not for any semantic ranking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Environmental state variables. Sensitivity-gated: the objective must
    /// remain numerically responsive to this layer.
    Ecological,
    /// Cognitive-load state variables. Spectrum- and coherence-gated.
    Cognitive,
    /// Consent/authority state variables. Stability- and balance-gated.
    Consent,
    /// Temporal-rhythm state variables. Stability- and spectrum-gated.
    Temporal,
}

impl Layer {
    /// All layers, in canonical iteration order.
    pub const ALL: [Layer; 4] = [
        Layer::Ecological,
        Layer::Cognitive,
        Layer::Consent,
        Layer::Temporal,
    ];

    /// The canonical string name of this layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ecological => "ecological",
            Self::Cognitive => "cognitive",
            Self::Consent => "consent",
            Self::Temporal => "temporal",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Layer {
    type Err = crate::error::ContractViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ecological" => Ok(Self::Ecological),
            "cognitive" => Ok(Self::Cognitive),
            "consent" => Ok(Self::Consent),
            "temporal" => Ok(Self::Temporal),
            other => Err(crate::error::ContractViolation::UnknownLayer {
                name: other.to_string(),
            }),
        }
    }
}
