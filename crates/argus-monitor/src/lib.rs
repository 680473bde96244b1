//! # argus-monitor — Evaluation Pipeline & Controller
//!
//! Everything between a raw [`JacobianMatrix`](argus_matrix::JacobianMatrix)
//! and an emitted [`CoherenceReport`](argus_core::CoherenceReport):
//!
//! - **Evaluator** ([`evaluator`]): applies each layer's gate set to the
//!   matrix invariants via an exhaustive match on
//!   [`Layer`](argus_core::Layer) — adding a layer is a compile error here
//!   until its gates are declared.
//!
//! - **Aggregator** ([`aggregator`]): weight-validated weighted mean of the
//!   per-layer scores, the triumph marker, and the aggregate authorization
//!   gate.
//!
//! - **Controller** ([`controller`]): the per-cycle state machine
//!   (`Idle → Sampling → … → Reporting → Idle`), per-layer fault isolation
//!   on scoped threads, the bounded report history, and sink dispatch.
//!
//! - **Sinks** ([`sinks`]): the consumed/produced interfaces —
//!   [`StateProvider`], [`ReportSink`], [`InterventionSink`] — with
//!   tracing-backed defaults and in-memory test doubles.
//!
//! - **Registry** ([`registry`]): one controller per monitored system;
//!   cycles for different systems never contend.

pub mod aggregator;
pub mod controller;
pub mod evaluator;
pub mod registry;
pub mod sinks;

pub use aggregator::{AggregateOutcome, CoherenceAggregator};
pub use controller::{CycleError, CyclePhase, MonitorController};
pub use evaluator::{LayerEvaluation, LayerSensitivityEvaluator};
pub use registry::MonitorRegistry;
pub use sinks::{
    FixedStateProvider, InterventionSink, MemoryInterventionSink, MemoryReportSink,
    ProviderError, ReportSink, StateProvider, TracingInterventionSink, TracingReportSink,
};
