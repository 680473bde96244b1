//! # Monitor Registry
//!
//! One [`MonitorController`] per monitored system. Cycles for different
//! systems share nothing and run fully in parallel; the registry's only
//! job is handing out the right controller. Serialization of overlapping
//! cycles for the *same* system is the controller's own cycle mutex.

use std::sync::Arc;

use dashmap::DashMap;

use argus_core::SystemId;

use crate::controller::MonitorController;

/// Concurrent map from system id to its controller.
#[derive(Debug, Default)]
pub struct MonitorRegistry {
    monitors: DashMap<SystemId, Arc<MonitorController>>,
}

impl MonitorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller under its system id.
    ///
    /// Returns the previously registered controller for that system, if
    /// any — replacing a controller discards its threshold configuration
    /// but not its already-emitted reports.
    pub fn register(&self, controller: Arc<MonitorController>) -> Option<Arc<MonitorController>> {
        self.monitors
            .insert(controller.system_id().clone(), controller)
    }

    /// The controller for a system, if registered.
    pub fn get(&self, system_id: &SystemId) -> Option<Arc<MonitorController>> {
        self.monitors.get(system_id).map(|entry| entry.clone())
    }

    /// Remove a system's controller.
    pub fn remove(&self, system_id: &SystemId) -> Option<Arc<MonitorController>> {
        self.monitors.remove(system_id).map(|(_, controller)| controller)
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Whether no systems are registered.
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// All registered system ids.
    pub fn system_ids(&self) -> Vec<SystemId> {
        self.monitors.iter().map(|entry| entry.key().clone()).collect()
    }
}
