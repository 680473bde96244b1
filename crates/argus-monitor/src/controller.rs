//! # Monitor Controller — Cycle State Machine
//!
//! One controller per monitored system. Each evaluation cycle walks
//! `Idle → Sampling → Estimating → Analyzing → Evaluating → Aggregating →
//! Reporting → Idle`. Estimating fans the four independent layers out on
//! scoped threads; Analyzing forces each Jacobian's invariant cache, also
//! in parallel; Evaluating applies the gates serially (they are cheap once
//! the invariants exist). Every phase is visible through
//! [`MonitorController::current_phase`] while it runs.
//!
//! ## Fault isolation
//!
//! Failures are per layer, never global: a contract violation or a panic
//! inside one layer's pipeline collapses to a single critical violation
//! for that layer while the other layers evaluate normally. A requested
//! cycle therefore always produces a report; the only errors a caller
//! sees are the initial state fetch (surfaced, caller may retry) and
//! configuration errors at construction.
//!
//! ## Serialization
//!
//! Cycles for the same system are serialized by a per-controller mutex so
//! history appends stay ordered; cycles for different systems share
//! nothing and never contend. There is no pause state here — pausing the
//! monitored system is the intervention consumer's job.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use argus_core::{
    CoherenceReport, ConfigError, Layer, LayerScore, MonitorConfig, ObjectiveFn, ReportId,
    StateSnapshot, SystemId, Violation,
};
use argus_matrix::{JacobianEstimator, JacobianMatrix};

use crate::aggregator::CoherenceAggregator;
use crate::evaluator::{LayerEvaluation, LayerSensitivityEvaluator};
use crate::sinks::{InterventionSink, ProviderError, ReportSink, StateProvider};

/// The stages of one evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    /// No cycle in progress.
    Idle,
    /// Fetching the state snapshot.
    Sampling,
    /// Estimating per-layer Jacobians.
    Estimating,
    /// Computing matrix invariants.
    Analyzing,
    /// Applying threshold gates.
    Evaluating,
    /// Folding layer scores into the aggregate.
    Aggregating,
    /// Building and emitting the report.
    Reporting,
}

impl CyclePhase {
    /// The canonical string name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sampling => "sampling",
            Self::Estimating => "estimating",
            Self::Analyzing => "analyzing",
            Self::Evaluating => "evaluating",
            Self::Aggregating => "aggregating",
            Self::Reporting => "reporting",
        }
    }
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors a cycle can surface to its caller.
///
/// Everything else — contract violations, numerical degeneracy, layer
/// faults — is converted into violations on the emitted report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycleError {
    /// The initial state fetch failed. Not retried internally.
    #[error("state fetch failed for system `{system_id}`: {source}")]
    StateFetch {
        /// The system whose snapshot was requested.
        system_id: SystemId,
        /// The provider's failure.
        #[source]
        source: ProviderError,
    },
}

/// Orchestrates evaluation cycles for one monitored system.
pub struct MonitorController {
    system_id: SystemId,
    config: MonitorConfig,
    estimator: JacobianEstimator,
    evaluator: LayerSensitivityEvaluator,
    aggregator: CoherenceAggregator,
    objective: Arc<dyn ObjectiveFn>,
    provider: Arc<dyn StateProvider>,
    report_sink: Arc<dyn ReportSink>,
    intervention_sink: Arc<dyn InterventionSink>,
    /// Serializes cycles for this system. Held across the whole cycle.
    cycle_lock: Mutex<()>,
    /// Current phase, for observability only.
    phase: Mutex<CyclePhase>,
    /// Bounded report history, appended at Reporting. Oldest dropped on
    /// overflow. Owned exclusively by this controller.
    history: Mutex<VecDeque<CoherenceReport>>,
}

impl std::fmt::Debug for MonitorController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorController")
            .field("system_id", &self.system_id)
            .field("phase", &*self.phase.lock())
            .field("history_len", &self.history.lock().len())
            .finish_non_exhaustive()
    }
}

impl MonitorController {
    /// Construct a controller, validating the configuration eagerly.
    ///
    /// This is the only place a [`ConfigError`] can surface; once a
    /// controller exists, its configuration is immutable and known good.
    pub fn new(
        system_id: SystemId,
        config: MonitorConfig,
        objective: Arc<dyn ObjectiveFn>,
        provider: Arc<dyn StateProvider>,
        report_sink: Arc<dyn ReportSink>,
        intervention_sink: Arc<dyn InterventionSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let estimator = JacobianEstimator::new(config.epsilon)?;
        let aggregator = CoherenceAggregator::new(&config)?;
        Ok(Self {
            system_id,
            config,
            estimator,
            evaluator: LayerSensitivityEvaluator::new(),
            aggregator,
            objective,
            provider,
            report_sink,
            intervention_sink,
            cycle_lock: Mutex::new(()),
            phase: Mutex::new(CyclePhase::Idle),
            history: Mutex::new(VecDeque::new()),
        })
    }

    /// The monitored system's identifier.
    pub fn system_id(&self) -> &SystemId {
        &self.system_id
    }

    /// The validated configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The phase the controller is currently in.
    pub fn current_phase(&self) -> CyclePhase {
        *self.phase.lock()
    }

    /// A copy of the report history, oldest first.
    pub fn history(&self) -> Vec<CoherenceReport> {
        self.history.lock().iter().cloned().collect()
    }

    /// The most recent report, if any cycle has completed.
    pub fn latest_report(&self) -> Option<CoherenceReport> {
        self.history.lock().back().cloned()
    }

    fn set_phase(&self, phase: CyclePhase) {
        tracing::debug!(system_id = %self.system_id, %phase, "cycle phase");
        *self.phase.lock() = phase;
    }

    /// Run one complete evaluation cycle.
    ///
    /// Returns the emitted report. The only error path is the initial
    /// state fetch; everything downstream is represented on the report.
    pub fn run_cycle(&self) -> Result<CoherenceReport, CycleError> {
        let _cycle = self.cycle_lock.lock();
        let span = tracing::info_span!("evaluation_cycle", system_id = %self.system_id);
        let _guard = span.enter();

        self.set_phase(CyclePhase::Sampling);
        let snapshot = match self.provider.snapshot(&self.system_id) {
            Ok(snapshot) => snapshot,
            Err(source) => {
                self.set_phase(CyclePhase::Idle);
                return Err(CycleError::StateFetch {
                    system_id: self.system_id.clone(),
                    source,
                });
            }
        };

        // The four layers are independent; estimate their Jacobians on
        // scoped threads and join before analysis.
        self.set_phase(CyclePhase::Estimating);
        let estimates: Vec<Result<JacobianMatrix, LayerEvaluation>> =
            std::thread::scope(|scope| {
                let handles: Vec<_> = Layer::ALL
                    .into_iter()
                    .map(|layer| {
                        let snapshot = &snapshot;
                        scope.spawn(move || self.estimate_layer(snapshot, layer))
                    })
                    .collect();
                handles
                    .into_iter()
                    .zip(Layer::ALL)
                    .map(|(handle, layer)| {
                        handle.join().unwrap_or_else(|_| {
                            Err(LayerEvaluation::fault(
                                layer,
                                Violation::evaluation_fault(
                                    layer,
                                    "layer estimation thread panicked",
                                ),
                            ))
                        })
                    })
                    .collect()
            });

        // Invariant computation is the expensive half of evaluation; force
        // each surviving Jacobian's cache in parallel. A panic here leaves
        // the cache unset and resurfaces at Evaluating, where it is
        // converted per layer.
        self.set_phase(CyclePhase::Analyzing);
        std::thread::scope(|scope| {
            for jacobian in estimates.iter().flatten() {
                scope.spawn(move || {
                    let _ = catch_unwind(AssertUnwindSafe(|| jacobian.invariants()));
                });
            }
        });

        self.set_phase(CyclePhase::Evaluating);
        let evaluations: Vec<LayerEvaluation> = estimates
            .into_iter()
            .zip(Layer::ALL)
            .map(|(estimate, layer)| match estimate {
                Ok(jacobian) => catch_unwind(AssertUnwindSafe(|| {
                    self.evaluator.evaluate(
                        &jacobian,
                        snapshot.coherence_signal(layer),
                        &self.config.thresholds_for(layer),
                    )
                }))
                .unwrap_or_else(|_| {
                    tracing::error!(%layer, "layer evaluation panicked; converting to violation");
                    LayerEvaluation::fault(
                        layer,
                        Violation::evaluation_fault(layer, "layer evaluation panicked"),
                    )
                }),
                Err(evaluation) => evaluation,
            })
            .collect();

        self.set_phase(CyclePhase::Aggregating);
        let outcome = self.aggregator.aggregate(&evaluations);

        self.set_phase(CyclePhase::Reporting);
        let mut violations: Vec<Violation> = evaluations
            .iter()
            .flat_map(|e| e.violations.iter().cloned())
            .collect();
        if let Some(violation) = outcome.violation {
            violations.push(violation);
        }

        let requires_intervention = violations.iter().any(|v| v.requires_pause);
        let triumph = violations.is_empty()
            && outcome.overall_coherence >= self.aggregator.authorization_threshold();

        let report = CoherenceReport {
            id: ReportId::new(),
            system_id: self.system_id.clone(),
            timestamp: snapshot.timestamp,
            layer_scores: evaluations
                .iter()
                .map(|e| LayerScore {
                    layer: e.layer,
                    score: e.score,
                })
                .collect(),
            overall_coherence: outcome.overall_coherence,
            violations,
            triumph,
            requires_intervention,
        };

        {
            let mut history = self.history.lock();
            if history.len() == self.config.history_capacity {
                history.pop_front();
            }
            history.push_back(report.clone());
        }

        self.report_sink.emit(&report);
        if report.requires_intervention {
            self.intervention_sink
                .notify(&self.system_id, &report.violations);
        }

        self.set_phase(CyclePhase::Idle);
        Ok(report)
    }

    /// Estimate one layer's Jacobian with fault isolation.
    ///
    /// Contract violations become a single critical `invalid_input`
    /// violation; a panic inside the objective becomes an
    /// `evaluation_fault`. Either way the layer scores 0 and the cycle
    /// continues.
    fn estimate_layer(
        &self,
        snapshot: &StateSnapshot,
        layer: Layer,
    ) -> Result<JacobianMatrix, LayerEvaluation> {
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.estimator
                .estimate(self.objective.as_ref(), snapshot, layer)
        }));
        match result {
            Ok(Ok(jacobian)) => Ok(jacobian),
            Ok(Err(violation)) => {
                tracing::warn!(%layer, %violation, "input contract violated");
                Err(LayerEvaluation::fault(
                    layer,
                    Violation::invalid_input(layer, violation.to_string()),
                ))
            }
            Err(_) => {
                tracing::error!(%layer, "objective panicked; converting to violation");
                Err(LayerEvaluation::fault(
                    layer,
                    Violation::evaluation_fault(layer, "objective evaluation panicked"),
                ))
            }
        }
    }
}
