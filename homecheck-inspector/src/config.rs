//! Command-line and environment configuration.
//!
//! The environment is read once, by clap, while arguments are parsed. From
//! there on the typed [`InspectorConfig`] is passed explicitly.

use crate::db::{DbConfig, DEFAULT_DB_URL};
use crate::telemetry::LogFormat;
use clap::Parser;
use homecheck_core::{
    ConfigError, Thresholds, DEFAULT_LATENCY_THRESHOLD_MS, DEFAULT_MIN_EMBEDDING_COVERAGE,
};
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the JSON report.
pub const DEFAULT_REPORT_PATH: &str = "ci/inspection_report.json";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "homecheck",
    version,
    about = "Provision, seed and integrity-check the study database"
)]
pub struct Cli {
    /// Postgres connection string (postgresql://...)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DB_URL)]
    pub db_url: String,

    /// Where to write the JSON report
    #[arg(long, env = "HOMECHECK_REPORT", default_value = DEFAULT_REPORT_PATH)]
    pub report: PathBuf,

    /// Minimum fraction of studies that must have an embedding, in [0, 1]
    #[arg(
        long,
        env = "HOMECHECK_MIN_EMBEDDING_COVERAGE",
        default_value_t = DEFAULT_MIN_EMBEDDING_COVERAGE
    )]
    pub min_embedding_coverage: f64,

    /// Maximum acceptable latency of the join probe, in milliseconds
    #[arg(
        long,
        env = "HOMECHECK_LATENCY_THRESHOLD_MS",
        default_value_t = DEFAULT_LATENCY_THRESHOLD_MS
    )]
    pub latency_threshold_ms: u64,

    /// Seconds allowed to establish the database connection
    #[arg(long, env = "HOMECHECK_CONNECT_TIMEOUT_SECS", default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "HOMECHECK_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Convert parsed arguments into a validated configuration.
    pub fn into_config(self) -> Result<InspectorConfig, ConfigError> {
        let config = InspectorConfig {
            db: DbConfig::new(self.db_url)
                .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs)),
            thresholds: Thresholds {
                min_embedding_coverage: self.min_embedding_coverage,
                latency_threshold_ms: self.latency_threshold_ms,
            },
            report_path: self.report,
            log_format: self.log_format,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Everything one inspection run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorConfig {
    pub db: DbConfig,
    pub thresholds: Thresholds,
    pub report_path: PathBuf,
    pub log_format: LogFormat,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            db: DbConfig::default(),
            thresholds: Thresholds::default(),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            log_format: LogFormat::default(),
        }
    }
}

impl InspectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.db.validate()?;
        self.thresholds.validate()?;
        if self.report_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "report".to_string(),
            });
        }
        Ok(())
    }
}
