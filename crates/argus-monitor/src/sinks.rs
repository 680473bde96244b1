//! # External Interfaces
//!
//! The monitor's collaborators, as traits:
//!
//! - [`StateProvider`] — pull: a fully populated snapshot on demand.
//! - [`ReportSink`] — push: every completed cycle's report.
//! - [`InterventionSink`] — push, conditional: only when a cycle demands a
//!   pause.
//!
//! No wire format is prescribed here. The tracing-backed implementations
//! serialize reports to JSON because that is what a log pipeline wants;
//! other sinks are free to do otherwise. The in-memory implementations
//! exist for tests and for the CLI's single-shot mode.

use parking_lot::Mutex;
use thiserror::Error;

use argus_core::{CoherenceReport, StateSnapshot, SystemId, Violation};

/// Failure to fetch a snapshot.
///
/// Surfaced to the cycle's caller unchanged — the controller does not
/// retry the fetch internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The provider has no snapshot for this system.
    #[error("no snapshot available for system `{system_id}`")]
    NoSnapshot {
        /// The requested system.
        system_id: String,
    },

    /// The provider failed for an implementation-specific reason.
    #[error("state provider failed: {reason}")]
    Unavailable {
        /// Provider diagnostic.
        reason: String,
    },
}

/// Supplies a complete snapshot of a monitored system on demand.
pub trait StateProvider: Send + Sync {
    /// Fetch the current snapshot for `system_id`.
    fn snapshot(&self, system_id: &SystemId) -> Result<StateSnapshot, ProviderError>;
}

/// Receives every completed cycle's report.
pub trait ReportSink: Send + Sync {
    /// Called exactly once per completed cycle.
    fn emit(&self, report: &CoherenceReport);
}

/// Receives pause demands.
pub trait InterventionSink: Send + Sync {
    /// Called only when a cycle produced at least one pause-requiring
    /// violation. Pausing the monitored system is this consumer's job —
    /// the monitor itself never pauses anything.
    fn notify(&self, system_id: &SystemId, violations: &[Violation]);
}

// ---------------------------------------------------------------------------
// Tracing-backed implementations
// ---------------------------------------------------------------------------

/// Logs each report as a structured `info` event with its JSON body.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReportSink;

impl ReportSink for TracingReportSink {
    fn emit(&self, report: &CoherenceReport) {
        match serde_json::to_string(report) {
            Ok(body) => tracing::info!(
                system_id = %report.system_id,
                overall_coherence = report.overall_coherence,
                violations = report.violations.len(),
                requires_intervention = report.requires_intervention,
                report = %body,
                "coherence report"
            ),
            Err(e) => tracing::error!(
                system_id = %report.system_id,
                "failed to serialize coherence report: {e}"
            ),
        }
    }
}

/// Logs each intervention demand as a `warn` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterventionSink;

impl InterventionSink for TracingInterventionSink {
    fn notify(&self, system_id: &SystemId, violations: &[Violation]) {
        let pausing = violations.iter().filter(|v| v.requires_pause).count();
        tracing::warn!(
            %system_id,
            total_violations = violations.len(),
            pause_requiring = pausing,
            "intervention required"
        );
    }
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// A provider that serves one fixed snapshot, replaceable between cycles.
#[derive(Debug)]
pub struct FixedStateProvider {
    snapshot: Mutex<StateSnapshot>,
}

impl FixedStateProvider {
    /// Create a provider serving `snapshot`.
    pub fn new(snapshot: StateSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    /// Replace the snapshot served to subsequent cycles.
    pub fn set(&self, snapshot: StateSnapshot) {
        *self.snapshot.lock() = snapshot;
    }
}

impl StateProvider for FixedStateProvider {
    fn snapshot(&self, system_id: &SystemId) -> Result<StateSnapshot, ProviderError> {
        let snapshot = self.snapshot.lock().clone();
        if snapshot.system_id != *system_id {
            return Err(ProviderError::NoSnapshot {
                system_id: system_id.to_string(),
            });
        }
        Ok(snapshot)
    }
}

/// Collects every emitted report for later inspection.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    reports: Mutex<Vec<CoherenceReport>>,
}

impl MemoryReportSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports received so far, in emission order.
    pub fn reports(&self) -> Vec<CoherenceReport> {
        self.reports.lock().clone()
    }
}

impl ReportSink for MemoryReportSink {
    fn emit(&self, report: &CoherenceReport) {
        self.reports.lock().push(report.clone());
    }
}

/// Collects every intervention demand for later inspection.
#[derive(Debug, Default)]
pub struct MemoryInterventionSink {
    notifications: Mutex<Vec<(SystemId, Vec<Violation>)>>,
}

impl MemoryInterventionSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far.
    pub fn notifications(&self) -> Vec<(SystemId, Vec<Violation>)> {
        self.notifications.lock().clone()
    }
}

impl InterventionSink for MemoryInterventionSink {
    fn notify(&self, system_id: &SystemId, violations: &[Violation]) {
        self.notifications
            .lock()
            .push((system_id.clone(), violations.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn fixed_provider_rejects_unknown_system() {
        let id = SystemId::new("known").unwrap();
        let provider =
            FixedStateProvider::new(StateSnapshot::new(id.clone(), Utc::now()));
        assert!(provider.snapshot(&id).is_ok());
        let other = SystemId::new("other").unwrap();
        assert!(matches!(
            provider.snapshot(&other),
            Err(ProviderError::NoSnapshot { .. })
        ));
    }

    #[test]
    fn fixed_provider_set_replaces_snapshot() {
        let id = SystemId::new("sys").unwrap();
        let t0 = Utc::now();
        let provider = FixedStateProvider::new(StateSnapshot::new(id.clone(), t0));
        let t1 = t0 + chrono::Duration::seconds(5);
        provider.set(StateSnapshot::new(id.clone(), t1));
        assert_eq!(provider.snapshot(&id).unwrap().timestamp, t1);
    }
}
