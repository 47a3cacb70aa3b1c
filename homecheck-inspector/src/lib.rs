//! Homecheck Inspector
//!
//! CI home inspection for the study database: provisions the schema,
//! seeds one sample record set, runs the integrity and latency checks and
//! produces a pass/fail report.
//!
//! # Modules
//!
//! - `config`: clap arguments and the validated run configuration
//! - `db`: PostgreSQL store over a single pooled connection
//! - `inspector`: the provision, seed and check pipeline
//! - `runner`: a complete run with exit-code mapping
//! - `report`: JSON report output
//! - `telemetry`: tracing subscriber setup

pub mod config;
pub mod db;
pub mod error;
pub mod inspector;
pub mod report;
pub mod runner;
pub mod schema;
pub mod telemetry;

pub use config::{Cli, InspectorConfig, DEFAULT_REPORT_PATH};
pub use db::{DbConfig, PgStore, DEFAULT_CONNECT_TIMEOUT, DEFAULT_DB_URL};
pub use error::{
    InspectError, InspectResult, EXIT_CHECKS_FAILED, EXIT_CONNECTION_FAILED, EXIT_OK,
};
pub use inspector::Inspector;
pub use report::{read_report, render_report, write_report};
pub use runner::{run, run_inspection, RunOutcome};
pub use telemetry::{init_tracing, LogFormat};
