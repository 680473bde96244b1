//! # argus-core — Foundational Types
//!
//! Shared vocabulary for the Argus coherence monitor:
//!
//! - **Layer** ([`layer`]): the closed set of monitored layers. Every
//!   threshold rule and Jacobian dimension is checked against this enum at
//!   compile time — there are no string-keyed layer lookups anywhere in the
//!   stack.
//!
//! - **State model** ([`state`]): [`SystemId`], [`StateVector`] (a layer's
//!   ordered, named components) and [`StateSnapshot`] (one complete
//!   observation of the monitored system).
//!
//! - **Objective** ([`objective`]): the [`ObjectiveFn`] consumed interface —
//!   a pure mapping from a layer's component vector to a reward vector —
//!   plus [`LinearObjective`], a deterministic serde-loadable implementation
//!   used by the CLI and the test suites.
//!
//! - **Configuration** ([`config`]): [`LayerThresholds`] and
//!   [`MonitorConfig`], validated eagerly at construction. A monitor never
//!   starts with a bad epsilon or a zero weight sum.
//!
//! - **Reports** ([`report`]): [`Violation`], [`LayerScore`] and
//!   [`CoherenceReport`] — the only channel through which evaluation
//!   outcomes leave the monitor.
//!
//! - **Errors** ([`error`]): the three-way taxonomy. Configuration errors
//!   are fatal at construction; input-contract violations are recovered per
//!   layer as critical violations; numerical degeneracy is data, never an
//!   error.

pub mod config;
pub mod error;
pub mod layer;
pub mod objective;
pub mod report;
pub mod state;

pub use config::{LayerThresholds, MonitorConfig};
pub use error::{ConfigError, ContractViolation, ObjectiveError};
pub use layer::Layer;
pub use objective::{LinearObjective, ObjectiveFn, RewardVector};
pub use report::{
    CoherenceReport, LayerScore, ReportId, Severity, Violation, ViolationKind,
};
pub use state::{StateComponent, StateSnapshot, StateVector, SystemId};
