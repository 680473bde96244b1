//! # Violations & Coherence Reports
//!
//! The monitor's only output surface. A [`Violation`] records one failed
//! gate (or contract breach); a [`CoherenceReport`] records one complete
//! evaluation cycle. Both are immutable once created — sinks receive the
//! same values the history buffer stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layer::Layer;
use crate::state::SystemId;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Unique identifier for one coherence report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Create a new random report identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Severity & ViolationKind
// ---------------------------------------------------------------------------

/// Violation severity, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Advisory — worth logging, no action expected.
    Medium,
    /// Degraded — the layer's health score suffers.
    High,
    /// Gate breach — contributes to the intervention decision.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// The closed set of violation types the monitor can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Non-finite state or objective output: an external collaborator
    /// broke the input contract.
    InvalidInput,
    /// Frobenius norm below the sensitivity floor: the objective has gone
    /// numerically insensitive to this layer.
    InsufficientSensitivity,
    /// |determinant| below the stability floor: near-singular mapping.
    StabilityFloorBreach,
    /// Singular-value spread above the imbalance bound: one direction
    /// dominates the response.
    AuthorityImbalance,
    /// Minimum eigenvalue magnitude below threshold: brittle direction.
    SpectralBrittleness,
    /// Externally supplied coherence signal below its floor.
    InsufficientCoherence,
    /// Aggregate coherence below the operational authorization threshold.
    InsufficientOverallCoherence,
    /// A layer pipeline failed unexpectedly; converted at the controller
    /// boundary so a report is still produced.
    EvaluationFault,
}

impl ViolationKind {
    /// The canonical string name of this violation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::InsufficientSensitivity => "insufficient_sensitivity",
            Self::StabilityFloorBreach => "stability_floor_breach",
            Self::AuthorityImbalance => "authority_imbalance",
            Self::SpectralBrittleness => "spectral_brittleness",
            Self::InsufficientCoherence => "insufficient_coherence",
            Self::InsufficientOverallCoherence => "insufficient_overall_coherence",
            Self::EvaluationFault => "evaluation_fault",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Violation
// ---------------------------------------------------------------------------

/// One failed gate or broken contract, scoped to a layer (or to the
/// aggregate when `layer` is `None`).
///
/// Never mutated after creation. `actual`/`threshold` are optional because
/// contract violations (NaN inputs, objective failures) have no meaningful
/// metric value to report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// The layer this violation is scoped to; `None` for aggregate gates.
    pub layer: Option<Layer>,
    /// The violation type.
    pub kind: ViolationKind,
    /// Severity of the breach.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Name of the metric that was evaluated (e.g. `"frobenius_norm"`).
    pub metric: String,
    /// The observed metric value, when one exists and is finite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    /// The configured threshold, when the violation came from a gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Whether the external intervention consumer must pause the system.
    pub requires_pause: bool,
}

impl Violation {
    /// A gate violation with an observed value and threshold.
    #[allow(clippy::too_many_arguments)]
    pub fn gate(
        layer: Layer,
        kind: ViolationKind,
        severity: Severity,
        metric: impl Into<String>,
        actual: f64,
        threshold: f64,
        requires_pause: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            layer: Some(layer),
            kind,
            severity,
            message: message.into(),
            metric: metric.into(),
            actual: actual.is_finite().then_some(actual),
            threshold: Some(threshold),
            requires_pause,
        }
    }

    /// A critical, pause-requiring `invalid_input` violation for a layer.
    pub fn invalid_input(layer: Layer, message: impl Into<String>) -> Self {
        Self {
            layer: Some(layer),
            kind: ViolationKind::InvalidInput,
            severity: Severity::Critical,
            message: message.into(),
            metric: "input_contract".into(),
            actual: None,
            threshold: None,
            requires_pause: true,
        }
    }

    /// A critical, pause-requiring fault for an unexpected layer failure.
    pub fn evaluation_fault(layer: Layer, message: impl Into<String>) -> Self {
        Self {
            layer: Some(layer),
            kind: ViolationKind::EvaluationFault,
            severity: Severity::Critical,
            message: message.into(),
            metric: "layer_pipeline".into(),
            actual: None,
            threshold: None,
            requires_pause: true,
        }
    }
}

// ---------------------------------------------------------------------------
// LayerScore & CoherenceReport
// ---------------------------------------------------------------------------

/// One layer's health score for a cycle, in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerScore {
    /// The scored layer.
    pub layer: Layer,
    /// 1.0 when every gate passed; degraded toward 0 otherwise.
    pub score: f64,
}

/// The outcome of one complete evaluation cycle.
///
/// Created fresh by the controller at the Reporting stage, appended to the
/// bounded history buffer, and handed unchanged to the report sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceReport {
    /// Unique report identifier.
    pub id: ReportId,
    /// The monitored system.
    pub system_id: SystemId,
    /// Cycle timestamp (taken at Sampling).
    pub timestamp: DateTime<Utc>,
    /// Per-layer health scores, one per declared layer.
    pub layer_scores: Vec<LayerScore>,
    /// Weighted aggregate coherence, in [0, 1].
    pub overall_coherence: f64,
    /// Every violation emitted this cycle, in layer order then aggregate.
    pub violations: Vec<Violation>,
    /// Informational marker: aggregate above the authorization threshold
    /// with zero violations.
    pub triumph: bool,
    /// True iff any violation this cycle requires a pause.
    pub requires_intervention: bool,
}

impl CoherenceReport {
    /// The score recorded for a layer, if the layer was evaluated.
    pub fn layer_score(&self, layer: Layer) -> Option<f64> {
        self.layer_scores
            .iter()
            .find(|s| s.layer == layer)
            .map(|s| s.score)
    }

    /// Violations scoped to one layer.
    pub fn violations_for(&self, layer: Layer) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(move |v| v.layer == Some(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_medium_below_critical() {
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn invalid_input_is_critical_and_pausing() {
        let v = Violation::invalid_input(Layer::Consent, "NaN in component `quorum`");
        assert_eq!(v.severity, Severity::Critical);
        assert!(v.requires_pause);
        assert_eq!(v.kind.as_str(), "invalid_input");
        assert!(v.actual.is_none());
    }

    #[test]
    fn gate_violation_drops_non_finite_actuals() {
        let v = Violation::gate(
            Layer::Consent,
            ViolationKind::AuthorityImbalance,
            Severity::High,
            "singular_value_ratio",
            f64::INFINITY,
            100.0,
            false,
            "unbounded spread",
        );
        assert!(v.actual.is_none());
        assert_eq!(v.threshold, Some(100.0));
        // Serializes cleanly despite the infinite observed value.
        serde_json::to_string(&v).unwrap();
    }

    #[test]
    fn violation_kind_serde_matches_as_str() {
        for kind in [
            ViolationKind::InvalidInput,
            ViolationKind::InsufficientSensitivity,
            ViolationKind::StabilityFloorBreach,
            ViolationKind::AuthorityImbalance,
            ViolationKind::SpectralBrittleness,
            ViolationKind::InsufficientCoherence,
            ViolationKind::InsufficientOverallCoherence,
            ViolationKind::EvaluationFault,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
