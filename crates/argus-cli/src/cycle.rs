//! # `argus cycle` — run one evaluation cycle
//!
//! Loads a state snapshot (JSON), an optional monitor configuration
//! (YAML) and an optional linear objective definition (YAML), runs a
//! single cycle, and prints the coherence report as JSON on stdout.
//!
//! Exit codes: 0 for a clean cycle, 2 when the report demands an
//! intervention — so shell pipelines can gate on the monitor's verdict
//! without parsing the report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use argus_core::{LinearObjective, MonitorConfig, StateSnapshot};
use argus_monitor::{
    FixedStateProvider, MemoryReportSink, MonitorController, TracingInterventionSink,
};

/// Arguments for `argus cycle`.
#[derive(Args, Debug)]
pub struct CycleArgs {
    /// Path to the state snapshot (JSON).
    pub snapshot: PathBuf,

    /// Path to the monitor configuration (YAML). Defaults apply if omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to a linear objective definition (YAML). The identity
    /// objective is used if omitted.
    #[arg(long)]
    pub objective: Option<PathBuf>,

    /// Pretty-print the report JSON.
    #[arg(long)]
    pub pretty: bool,
}

/// Run one evaluation cycle and print the report.
pub fn run_cycle(args: &CycleArgs) -> anyhow::Result<u8> {
    let raw = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("reading snapshot {}", args.snapshot.display()))?;
    let snapshot: StateSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot {}", args.snapshot.display()))?;

    let config = match &args.config {
        Some(path) => MonitorConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MonitorConfig::default(),
    };

    let objective = match &args.objective {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading objective {}", path.display()))?;
            serde_yaml::from_str::<LinearObjective>(&raw)
                .with_context(|| format!("parsing objective {}", path.display()))?
        }
        None => LinearObjective::identity(),
    };

    let system_id = snapshot.system_id.clone();
    tracing::info!(%system_id, "running evaluation cycle");

    let reports = Arc::new(MemoryReportSink::new());
    let controller = MonitorController::new(
        system_id,
        config,
        Arc::new(objective),
        Arc::new(FixedStateProvider::new(snapshot)),
        reports.clone(),
        Arc::new(TracingInterventionSink),
    )?;

    let report = controller.run_cycle()?;

    let body = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{body}");

    Ok(if report.requires_intervention { 2 } else { 0 })
}
