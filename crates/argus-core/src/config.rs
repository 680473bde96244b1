//! # Monitor Configuration
//!
//! [`LayerThresholds`] (per-layer gate values and aggregation weight) and
//! [`MonitorConfig`] (epsilon, authorization threshold, history capacity,
//! the four layers' thresholds).
//!
//! ## Lifecycle
//!
//! Loaded once, validated eagerly, then immutable for the monitor's
//! lifetime. Changing thresholds means constructing a new monitor — there
//! is no hot reload, and there are no module-level defaults consulted at
//! runtime: defaults exist only as explicit construction-time values.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layer::Layer;

/// Default finite-difference step size.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Default operational authorization threshold for the aggregate score.
pub const DEFAULT_AUTHORIZATION_THRESHOLD: f64 = 0.95;

/// Default report history ring-buffer capacity.
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// LayerThresholds
// ---------------------------------------------------------------------------

/// Per-layer gate thresholds and aggregation weight.
///
/// Not every field is consulted for every layer — the evaluator's
/// exhaustive match on [`Layer`] decides which gates apply — but every
/// field is validated regardless, so a typo in an unused field still fails
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerThresholds {
    /// Minimum Frobenius norm of the layer's Jacobian (sensitivity gate).
    pub min_sensitivity: f64,
    /// Minimum |determinant| (stability gate).
    pub stability_floor: f64,
    /// Minimum eigenvalue magnitude (spectrum gate).
    pub min_eigenvalue: f64,
    /// Maximum singular-value spread (authority-imbalance gate).
    pub max_imbalance_ratio: f64,
    /// Minimum externally supplied coherence signal (coherence gate).
    pub min_coherence: f64,
    /// Aggregation weight for this layer's score.
    pub weight: f64,
}

impl Default for LayerThresholds {
    fn default() -> Self {
        Self {
            min_sensitivity: 1e-3,
            stability_floor: 1e-6,
            min_eigenvalue: 1e-6,
            max_imbalance_ratio: 100.0,
            min_coherence: 0.5,
            weight: 1.0,
        }
    }
}

impl LayerThresholds {
    /// Validate every threshold field for one layer.
    fn validate(&self, layer: Layer) -> Result<(), ConfigError> {
        let fields: [(&'static str, f64); 5] = [
            ("min_sensitivity", self.min_sensitivity),
            ("stability_floor", self.stability_floor),
            ("min_eigenvalue", self.min_eigenvalue),
            ("max_imbalance_ratio", self.max_imbalance_ratio),
            ("min_coherence", self.min_coherence),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { layer, name, value });
            }
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(ConfigError::NegativeWeight {
                layer,
                weight: self.weight,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MonitorConfig
// ---------------------------------------------------------------------------

/// Complete monitor configuration.
///
/// Construct via [`Default`] and adjust fields, or load from YAML with
/// [`MonitorConfig::from_yaml_str`] / [`MonitorConfig::from_yaml_file`].
/// Either way, [`MonitorConfig::validate`] runs before the first cycle —
/// the monitor constructor fails fast on a bad configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Finite-difference step size. Must be strictly positive.
    pub epsilon: f64,
    /// Operational authorization threshold for the aggregate coherence
    /// score, in [0, 1].
    pub authorization_threshold: f64,
    /// Capacity of the per-controller report history ring buffer.
    pub history_capacity: usize,
    /// Per-layer thresholds. Layers absent from the map use
    /// [`LayerThresholds::default`].
    pub thresholds: BTreeMap<Layer, LayerThresholds>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            authorization_threshold: DEFAULT_AUTHORIZATION_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            thresholds: Layer::ALL
                .into_iter()
                .map(|layer| (layer, LayerThresholds::default()))
                .collect(),
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a YAML configuration string.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_yaml_str(&raw)
    }

    /// The thresholds for a layer (explicit entry or the default).
    pub fn thresholds_for(&self, layer: Layer) -> LayerThresholds {
        self.thresholds.get(&layer).cloned().unwrap_or_default()
    }

    /// Eager validation of the whole configuration.
    ///
    /// Checks: positive epsilon, authorization threshold in [0, 1],
    /// non-zero history capacity, per-layer threshold validity, and a
    /// positive weight sum across all four layers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ConfigError::NonPositiveEpsilon {
                epsilon: self.epsilon,
            });
        }
        if !self.authorization_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.authorization_threshold)
        {
            return Err(ConfigError::AuthorizationThresholdOutOfRange {
                value: self.authorization_threshold,
            });
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }

        let mut weight_sum = 0.0;
        for layer in Layer::ALL {
            let thresholds = self.thresholds_for(layer);
            thresholds.validate(layer)?;
            weight_sum += thresholds.weight;
        }
        if weight_sum <= 0.0 {
            return Err(ConfigError::ZeroWeightSum);
        }
        Ok(())
    }
}
