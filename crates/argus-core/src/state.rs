//! # State-Vector Model
//!
//! Typed containers for one observation of the monitored system:
//! [`StateVector`] holds a single layer's ordered, named components;
//! [`StateSnapshot`] holds all four layers plus any externally supplied
//! coherence signals.
//!
//! ## Invariants
//!
//! - Component order is semantically meaningful: it defines Jacobian column
//!   identity. A [`StateVector`] never reorders its components.
//! - A layer's component count is fixed at construction and capped at
//!   [`LAYER_DIMENSION_CAP`] — the cofactor determinant in `argus-matrix`
//!   is O(n!) and the cap keeps that tractable.
//! - Finiteness of component values is **not** enforced here. A NaN in a
//!   snapshot is a contract violation detected at cycle time, where it
//!   becomes a critical `invalid_input` violation for that layer rather
//!   than a construction failure.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ContractViolation;
use crate::layer::Layer;

/// Hard cap on a layer's component count.
///
/// The determinant routine is a recursive cofactor expansion — exact but
/// factorial in the dimension. Ten keeps the worst case around 3.6M
/// multiplications, which is tolerable for a per-cycle computation.
pub const LAYER_DIMENSION_CAP: usize = 10;

// ---------------------------------------------------------------------------
// SystemId
// ---------------------------------------------------------------------------

/// Identifier of a monitored system.
///
/// A distinct type rather than a bare `String` so a system id cannot be
/// confused with a component name or a report field. Validated non-empty at
/// construction and at deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SystemId(String);

impl SystemId {
    /// Create a system identifier. Rejects empty/whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Result<Self, ContractViolation> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ContractViolation::EmptySystemId);
        }
        Ok(Self(raw))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SystemId {
    type Err = ContractViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// Deserializes as a plain String, then routes through `new()` so invalid
// identifiers are rejected at deserialization time, not silently accepted.
impl<'de> Deserialize<'de> for SystemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// StateVector
// ---------------------------------------------------------------------------

/// One named component of a layer's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateComponent {
    /// Component name (e.g. `"biodiversity_index"`).
    pub name: String,
    /// Current numeric value.
    pub value: f64,
}

impl StateComponent {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A layer's state: an ordered sequence of named numeric components.
///
/// Insertion order defines Jacobian column identity and is preserved
/// exactly. The component count is fixed once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStateVector")]
pub struct StateVector {
    /// The layer these components belong to.
    layer: Layer,
    /// Ordered components. Never reordered or resized after construction.
    components: Vec<StateComponent>,
}

/// Serde shape for [`StateVector`] — deserialization re-validates the
/// dimension cap via `StateVector::new`.
#[derive(Deserialize)]
struct RawStateVector {
    layer: Layer,
    components: Vec<StateComponent>,
}

impl TryFrom<RawStateVector> for StateVector {
    type Error = ContractViolation;

    fn try_from(raw: RawStateVector) -> Result<Self, Self::Error> {
        StateVector::new(raw.layer, raw.components)
    }
}

impl StateVector {
    /// Construct a layer state vector, enforcing [`LAYER_DIMENSION_CAP`].
    pub fn new(
        layer: Layer,
        components: Vec<StateComponent>,
    ) -> Result<Self, ContractViolation> {
        if components.len() > LAYER_DIMENSION_CAP {
            return Err(ContractViolation::DimensionCapExceeded {
                layer,
                len: components.len(),
                cap: LAYER_DIMENSION_CAP,
            });
        }
        Ok(Self { layer, components })
    }

    /// The layer these components belong to.
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Number of components (the Jacobian column count for this layer).
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the layer has zero components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The components, in declaration order.
    pub fn components(&self) -> &[StateComponent] {
        &self.components
    }

    /// The component values, in declaration order.
    pub fn values(&self) -> Vec<f64> {
        self.components.iter().map(|c| c.value).collect()
    }

    /// The first non-finite component, if any.
    ///
    /// Used at the head of each layer pipeline to detect the state
    /// provider's contract violation before any objective evaluation.
    pub fn first_non_finite(&self) -> Option<&StateComponent> {
        self.components.iter().find(|c| !c.value.is_finite())
    }

    /// A copy of this vector with component `index` incremented by `delta`.
    ///
    /// The finite-difference estimator perturbs one component at a time;
    /// all other components and the component order are untouched.
    pub fn perturbed(&self, index: usize, delta: f64) -> Self {
        let mut components = self.components.clone();
        if let Some(c) = components.get_mut(index) {
            c.value += delta;
        }
        Self {
            layer: self.layer,
            components,
        }
    }
}

// ---------------------------------------------------------------------------
// StateSnapshot
// ---------------------------------------------------------------------------

/// One complete observation of a monitored system.
///
/// Immutable once handed to the monitor: every cycle operates on its own
/// snapshot and never writes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// The system this snapshot describes.
    pub system_id: SystemId,
    /// Observation time.
    pub timestamp: DateTime<Utc>,
    /// Per-layer state vectors. A complete snapshot has all four layers.
    layers: BTreeMap<Layer, StateVector>,
    /// Externally supplied per-layer coherence signals (not derived from
    /// any Jacobian). Optional telemetry; absent layers are not
    /// coherence-gated this cycle.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    coherence_signals: BTreeMap<Layer, f64>,
}

impl StateSnapshot {
    /// Create an empty snapshot for a system at the given time.
    pub fn new(system_id: SystemId, timestamp: DateTime<Utc>) -> Self {
        Self {
            system_id,
            timestamp,
            layers: BTreeMap::new(),
            coherence_signals: BTreeMap::new(),
        }
    }

    /// Insert a layer's state vector (builder style).
    pub fn with_layer(mut self, vector: StateVector) -> Self {
        self.layers.insert(vector.layer(), vector);
        self
    }

    /// Attach an externally supplied coherence signal for a layer
    /// (builder style).
    pub fn with_coherence_signal(mut self, layer: Layer, value: f64) -> Self {
        self.coherence_signals.insert(layer, value);
        self
    }

    /// The state vector for a layer, or a `MissingLayer` contract violation.
    pub fn layer(&self, layer: Layer) -> Result<&StateVector, ContractViolation> {
        self.layers
            .get(&layer)
            .ok_or(ContractViolation::MissingLayer { layer })
    }

    /// The externally supplied coherence signal for a layer, if present.
    pub fn coherence_signal(&self, layer: Layer) -> Option<f64> {
        self.coherence_signals.get(&layer).copied()
    }

    /// A copy of this snapshot with one component of one layer perturbed.
    ///
    /// Everything else — other layers, signals, timestamp — is identical,
    /// preserving the estimator's "identical context" assumption.
    pub fn with_perturbed_component(
        &self,
        layer: Layer,
        index: usize,
        delta: f64,
    ) -> Result<Self, ContractViolation> {
        let vector = self.layer(layer)?.perturbed(index, delta);
        let mut out = self.clone();
        out.layers.insert(layer, vector);
        Ok(out)
    }
}
