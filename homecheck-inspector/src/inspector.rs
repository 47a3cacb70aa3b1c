//! The inspection pipeline: provision, seed, then the four checks.
//!
//! A single linear pass. Each step runs exactly once and nothing is retried.

use homecheck_core::{
    CheckName, CheckRecord, HomecheckResult, InspectionReport, SampleFixture, SeededFixture,
    Thresholds,
};
use homecheck_storage::InspectionStore;
use std::time::Instant;

/// Runs the inspection against one store.
pub struct Inspector<S: InspectionStore> {
    store: S,
}

impl<S: InspectionStore> Inspector<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give the store back, e.g. to close its connection.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Create the schema if absent.
    pub async fn provision(&mut self) -> HomecheckResult<()> {
        self.store.provision().await?;
        tracing::info!("Schema provisioned");
        Ok(())
    }

    /// Insert the CI sample fixture.
    pub async fn seed(&mut self) -> HomecheckResult<SeededFixture> {
        self.seed_fixture(&SampleFixture::ci_sample()).await
    }

    pub async fn seed_fixture(&mut self, fixture: &SampleFixture) -> HomecheckResult<SeededFixture> {
        let seeded = self.store.seed(fixture).await?;
        tracing::info!(
            study_id = %seeded.study_id,
            artifact_id = %seeded.artifact_id,
            "Sample fixture seeded"
        );
        Ok(seeded)
    }

    /// Run all four checks and aggregate them into a report.
    ///
    /// A check whose query fails is recorded as a failed check and its
    /// error is added to the report; the checks after it still run.
    pub async fn run_checks(&mut self, thresholds: &Thresholds) -> InspectionReport {
        let mut report = InspectionReport::new();
        let mut checks = Vec::with_capacity(CheckName::ALL.len());

        for name in CheckName::ALL {
            let record = match self.run_check(name, thresholds).await {
                Ok(record) => record,
                Err(err) => {
                    let message = err.to_string();
                    report.push_error(format!("{}: {}", name, message));
                    CheckRecord::errored(name, thresholds, message)
                }
            };

            if record.ok {
                tracing::info!(check = %record.name, value = ?record.value(), "Check passed");
            } else {
                tracing::warn!(
                    check = %record.name,
                    value = ?record.value(),
                    error = ?record.error,
                    "Check failed"
                );
            }
            checks.push(record);
        }

        report.record_checks(checks);
        report
    }

    async fn run_check(
        &mut self,
        name: CheckName,
        thresholds: &Thresholds,
    ) -> HomecheckResult<CheckRecord> {
        let record = match name {
            CheckName::NoOrphanArtifacts => {
                CheckRecord::orphan_artifacts(self.store.count_orphan_artifacts().await?)
            }
            CheckName::HeadsPointToValidArtifacts => {
                CheckRecord::invalid_heads(self.store.count_invalid_heads().await?)
            }
            CheckName::EmbeddingCoveragePercent => {
                let coverage = self.store.embedding_coverage().await?;
                CheckRecord::embedding_coverage(coverage, thresholds)
            }
            CheckName::LatencyProbeJoin => {
                let started = Instant::now();
                self.store.probe_join().await?;
                CheckRecord::latency_probe(started.elapsed(), thresholds)
            }
        };
        Ok(record)
    }

    /// Full pipeline. Provisioning or seeding errors are recorded in the
    /// report and the checks are skipped.
    pub async fn inspect(&mut self, thresholds: &Thresholds) -> InspectionReport {
        if let Err(err) = self.provision().await {
            tracing::error!(error = %err, "Provisioning failed");
            return InspectionReport::failed(err.to_string());
        }
        if let Err(err) = self.seed().await {
            tracing::error!(error = %err, "Seeding failed");
            return InspectionReport::failed(err.to_string());
        }

        let report = self.run_checks(thresholds).await;
        tracing::info!(
            ok = report.ok,
            failed = report.failed_checks().count(),
            "Inspection finished"
        );
        report
    }
}
