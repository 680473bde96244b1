//! # `argus validate` — check a configuration file
//!
//! Parses and validates a monitor configuration without running a cycle.
//! Prints the effective per-layer thresholds so operators can see what
//! defaults filled in, and exits non-zero on any validation failure.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use argus_core::{Layer, MonitorConfig};

/// Arguments for `argus validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the monitor configuration (YAML).
    pub config: PathBuf,
}

/// Validate a configuration file and print the effective settings.
pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<u8> {
    let config = MonitorConfig::from_yaml_file(&args.config)
        .with_context(|| format!("validating {}", args.config.display()))?;

    println!(
        "ok: epsilon={} authorization_threshold={} history_capacity={}",
        config.epsilon, config.authorization_threshold, config.history_capacity
    );
    for layer in Layer::ALL {
        let t = config.thresholds_for(layer);
        println!(
            "  {layer}: min_sensitivity={} stability_floor={} min_eigenvalue={} \
             max_imbalance_ratio={} min_coherence={} weight={}",
            t.min_sensitivity,
            t.stability_floor,
            t.min_eigenvalue,
            t.max_imbalance_ratio,
            t.min_coherence,
            t.weight
        );
    }
    Ok(0)
}
