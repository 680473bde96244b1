//! End-to-end cycle scenarios: a full controller wired to in-memory
//! collaborators, exercised through `run_cycle`.

use std::sync::Arc;

use chrono::Utc;

use argus_core::{
    Layer, LinearObjective, MonitorConfig, ObjectiveError, ObjectiveFn, Severity,
    StateComponent, StateSnapshot, StateVector, SystemId, ViolationKind,
};
use argus_monitor::{
    FixedStateProvider, MemoryInterventionSink, MemoryReportSink, MonitorController,
};

/// An objective that ignores its inputs entirely — every Jacobian is zero.
struct ConstantObjective;

impl ObjectiveFn for ConstantObjective {
    fn output_len(&self, _layer: Layer, input_len: usize) -> usize {
        input_len
    }

    fn reward(
        &self,
        _layer: Layer,
        values: &[f64],
        _context: &StateSnapshot,
    ) -> Result<Vec<f64>, ObjectiveError> {
        Ok(vec![0.7; values.len()])
    }
}

fn layer_vector(layer: Layer, values: &[f64]) -> StateVector {
    let components = values
        .iter()
        .enumerate()
        .map(|(i, v)| StateComponent::new(format!("c{i}"), *v))
        .collect();
    StateVector::new(layer, components).unwrap()
}

fn full_snapshot(id: &SystemId) -> StateSnapshot {
    let mut snapshot = StateSnapshot::new(id.clone(), Utc::now());
    for layer in Layer::ALL {
        snapshot = snapshot.with_layer(layer_vector(layer, &[0.4, 1.2, 2.5]));
    }
    snapshot
}

fn build_controller(
    id: &SystemId,
    snapshot: StateSnapshot,
    objective: Arc<dyn ObjectiveFn>,
) -> (
    MonitorController,
    Arc<MemoryReportSink>,
    Arc<MemoryInterventionSink>,
) {
    let reports = Arc::new(MemoryReportSink::new());
    let interventions = Arc::new(MemoryInterventionSink::new());
    let controller = MonitorController::new(
        id.clone(),
        MonitorConfig::default(),
        objective,
        Arc::new(FixedStateProvider::new(snapshot)),
        reports.clone(),
        interventions.clone(),
    )
    .unwrap();
    (controller, reports, interventions)
}

/// Scenario A: a locally constant objective zeroes every Jacobian. The
/// sensitivity-gated layer must flag the collapse critically and the
/// cycle must demand intervention.
#[test]
fn locally_constant_objective_triggers_intervention() {
    let id = SystemId::new("scenario-a").unwrap();
    let snapshot = full_snapshot(&id).with_coherence_signal(Layer::Cognitive, 0.9);
    let (controller, reports, interventions) =
        build_controller(&id, snapshot, Arc::new(ConstantObjective));

    let report = controller.run_cycle().unwrap();

    // The sensitivity-gated layer reports the collapse.
    let eco: Vec<_> = report.violations_for(Layer::Ecological).collect();
    assert_eq!(eco.len(), 1);
    assert_eq!(eco[0].kind, ViolationKind::InsufficientSensitivity);
    assert_eq!(eco[0].severity, Severity::Critical);
    assert!(eco[0].requires_pause);

    // Zero determinants also breach the stability-gated layers.
    for layer in [Layer::Consent, Layer::Temporal] {
        assert!(
            report
                .violations_for(layer)
                .any(|v| v.kind == ViolationKind::StabilityFloorBreach),
            "{layer} should breach its stability floor"
        );
    }

    assert!(report.requires_intervention);
    assert!(!report.triumph);
    assert_eq!(reports.reports().len(), 1);
    assert_eq!(interventions.notifications().len(), 1);
}

/// Scenario B: well-conditioned identity Jacobians, a healthy cognitive
/// coherence signal, default thresholds — a clean, triumphant cycle.
#[test]
fn well_conditioned_cycle_is_triumphant() {
    let id = SystemId::new("scenario-b").unwrap();
    let snapshot = full_snapshot(&id).with_coherence_signal(Layer::Cognitive, 0.9);
    let (controller, _, interventions) =
        build_controller(&id, snapshot, Arc::new(LinearObjective::identity()));

    let report = controller.run_cycle().unwrap();

    assert!(report.violations.is_empty());
    assert!(report.overall_coherence >= 0.95);
    assert!(report.triumph);
    assert!(!report.requires_intervention);
    for layer in Layer::ALL {
        assert_eq!(report.layer_score(layer), Some(1.0));
    }
    assert!(interventions.notifications().is_empty());
}

/// Scenario C: a NaN in one layer. That layer short-circuits to exactly
/// one `invalid_input` violation; the other three evaluate normally.
#[test]
fn nan_in_one_layer_isolates_the_fault() {
    let id = SystemId::new("scenario-c").unwrap();
    let mut snapshot = StateSnapshot::new(id.clone(), Utc::now())
        .with_coherence_signal(Layer::Cognitive, 0.9);
    for layer in Layer::ALL {
        let values: &[f64] = if layer == Layer::Ecological {
            &[0.4, f64::NAN, 2.5]
        } else {
            &[0.4, 1.2, 2.5]
        };
        snapshot = snapshot.with_layer(layer_vector(layer, values));
    }
    let (controller, _, interventions) =
        build_controller(&id, snapshot, Arc::new(LinearObjective::identity()));

    let report = controller.run_cycle().unwrap();

    let eco: Vec<_> = report.violations_for(Layer::Ecological).collect();
    assert_eq!(eco.len(), 1, "exactly one violation for the NaN layer");
    assert_eq!(eco[0].kind, ViolationKind::InvalidInput);
    assert_eq!(eco[0].severity, Severity::Critical);
    assert_eq!(report.layer_score(Layer::Ecological), Some(0.0));

    // The other three layers ran their full pipelines.
    for layer in [Layer::Cognitive, Layer::Consent, Layer::Temporal] {
        assert_eq!(report.layer_score(layer), Some(1.0), "{layer} unaffected");
        assert_eq!(report.violations_for(layer).count(), 0);
    }

    // One layer at zero drags the aggregate below authorization, which is
    // itself gated.
    assert!(report.overall_coherence < 0.95);
    assert!(report
        .violations
        .iter()
        .any(|v| v.kind == ViolationKind::InsufficientOverallCoherence));
    assert!(report.requires_intervention);
    assert_eq!(interventions.notifications().len(), 1);
}

/// Coherence scores stay in [0, 1] even when every gate fails at once.
#[test]
fn overall_coherence_is_clamped_under_total_failure() {
    let id = SystemId::new("floor-check").unwrap();
    let snapshot = full_snapshot(&id).with_coherence_signal(Layer::Cognitive, 0.0);
    let (controller, _, _) = build_controller(&id, snapshot, Arc::new(ConstantObjective));

    let report = controller.run_cycle().unwrap();
    assert!((0.0..=1.0).contains(&report.overall_coherence));
    for score in &report.layer_scores {
        assert!((0.0..=1.0).contains(&score.score));
    }
}
