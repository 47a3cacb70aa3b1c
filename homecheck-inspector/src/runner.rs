//! One complete run: connect, inspect, release, decide the exit code.

use crate::config::InspectorConfig;
use crate::db::PgStore;
use crate::error::{EXIT_CHECKS_FAILED, EXIT_CONNECTION_FAILED, EXIT_OK};
use crate::inspector::Inspector;
use homecheck_core::{InspectionReport, Thresholds};
use homecheck_storage::InspectionStore;

/// Report and process exit code of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub report: InspectionReport,
    pub exit_code: u8,
}

impl RunOutcome {
    fn from_report(report: InspectionReport) -> Self {
        let exit_code = if report.ok { EXIT_OK } else { EXIT_CHECKS_FAILED };
        Self { report, exit_code }
    }

    fn connection_failed(message: impl std::fmt::Display) -> Self {
        Self {
            report: InspectionReport::connection_failure(message),
            exit_code: EXIT_CONNECTION_FAILED,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.exit_code == EXIT_OK
    }
}

/// Run the pipeline over an already-connected store and hand the store back.
pub async fn run_inspection<S: InspectionStore>(
    store: S,
    thresholds: &Thresholds,
) -> (RunOutcome, S) {
    let mut inspector = Inspector::new(store);
    let report = inspector.inspect(thresholds).await;
    (RunOutcome::from_report(report), inspector.into_store())
}

/// Connect to the configured database and run the full inspection.
///
/// The connection is released before this returns, whatever the outcome.
pub async fn run(config: &InspectorConfig) -> RunOutcome {
    tracing::info!(
        min_embedding_coverage = config.thresholds.min_embedding_coverage,
        latency_threshold_ms = config.thresholds.latency_threshold_ms,
        "Starting home inspection"
    );

    let store = match PgStore::connect(&config.db).await {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, "Database connection failed");
            return RunOutcome::connection_failed(err);
        }
    };

    let (outcome, store) = run_inspection(store, &config.thresholds).await;
    store.close();
    outcome
}
