//! # argus-cli — subcommand handlers
//!
//! Thin wiring around `argus-monitor`: each subcommand module exposes an
//! args struct (clap derive) and a `run_*` function returning a process
//! exit code. The binary entry point lives in `main.rs`.

pub mod cycle;
pub mod validate;
