//! Integrity check records and the inspection report
//!
//! The evaluation rules live here as pure functions over observed values so
//! they can be exercised without a database. The storage layer supplies the
//! counts and timings; these constructors turn them into pass/fail records.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default minimum embedding coverage, as a fraction of studies.
pub const DEFAULT_MIN_EMBEDDING_COVERAGE: f64 = 0.01;

/// Default latency budget for the join probe, in milliseconds.
pub const DEFAULT_LATENCY_THRESHOLD_MS: u64 = 500;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Pass/fail thresholds for the checks that are not simple zero-counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum embedding coverage, in `[0, 1]`. Compared as-is against the
    /// observed coverage percentage.
    pub min_embedding_coverage: f64,
    /// Maximum acceptable probe latency in milliseconds.
    pub latency_threshold_ms: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_embedding_coverage: DEFAULT_MIN_EMBEDDING_COVERAGE,
            latency_threshold_ms: DEFAULT_LATENCY_THRESHOLD_MS,
        }
    }
}

impl Thresholds {
    /// Build validated thresholds.
    pub fn new(min_embedding_coverage: f64, latency_threshold_ms: u64) -> Result<Self, ConfigError> {
        let thresholds = Self {
            min_embedding_coverage,
            latency_threshold_ms,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_embedding_coverage.is_finite() {
            return Err(ConfigError::invalid(
                "min_embedding_coverage",
                self.min_embedding_coverage,
                "must be a finite number",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_embedding_coverage) {
            return Err(ConfigError::invalid(
                "min_embedding_coverage",
                self.min_embedding_coverage,
                "must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// CHECK NAMES
// ============================================================================

/// The four fixed checks, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    NoOrphanArtifacts,
    HeadsPointToValidArtifacts,
    EmbeddingCoveragePercent,
    LatencyProbeJoin,
}

impl CheckName {
    pub const ALL: [CheckName; 4] = [
        CheckName::NoOrphanArtifacts,
        CheckName::HeadsPointToValidArtifacts,
        CheckName::EmbeddingCoveragePercent,
        CheckName::LatencyProbeJoin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::NoOrphanArtifacts => "no_orphan_artifacts",
            CheckName::HeadsPointToValidArtifacts => "heads_point_to_valid_artifacts",
            CheckName::EmbeddingCoveragePercent => "embedding_coverage_percent",
            CheckName::LatencyProbeJoin => "latency_probe_join",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// OBSERVATIONS
// ============================================================================

/// Observed value and expectation of a check.
///
/// Serialized flat into the record. Variant order matters for decoding:
/// integer counts must be tried before percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Observation {
    Count { value: i64, expect: String },
    Percent { value: f64, expect: String },
    Latency { value_ms: f64, expect_ms: String },
    /// The latency probe failed, so no duration was observed.
    LatencyUnavailable { expect_ms: String },
    /// The check query failed, so no value was observed.
    Unavailable { expect: String },
}

/// Embedding coverage counts as read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmbeddingCoverage {
    pub total_studies: i64,
    pub embedded_studies: i64,
}

impl EmbeddingCoverage {
    pub fn percent(&self) -> f64 {
        coverage_percent(self.embedded_studies, self.total_studies)
    }
}

/// Percentage of studies with an embedding. Zero studies yields 0.
pub fn coverage_percent(embedded_studies: i64, total_studies: i64) -> f64 {
    if total_studies <= 0 {
        return 0.0;
    }
    embedded_studies as f64 * 100.0 / total_studies as f64
}

// ============================================================================
// CHECK RECORD
// ============================================================================

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub name: CheckName,
    pub ok: bool,
    #[serde(flatten)]
    pub observation: Observation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckRecord {
    /// Artifacts whose study does not resolve; passes at zero.
    pub fn orphan_artifacts(count: i64) -> Self {
        Self::zero_count(CheckName::NoOrphanArtifacts, count)
    }

    /// Heads whose artifact does not resolve; passes at zero.
    pub fn invalid_heads(count: i64) -> Self {
        Self::zero_count(CheckName::HeadsPointToValidArtifacts, count)
    }

    fn zero_count(name: CheckName, count: i64) -> Self {
        Self {
            name,
            ok: count == 0,
            observation: Observation::Count {
                value: count,
                expect: "0".to_string(),
            },
            error: None,
        }
    }

    pub fn embedding_coverage(coverage: EmbeddingCoverage, thresholds: &Thresholds) -> Self {
        let value = coverage.percent();
        Self {
            name: CheckName::EmbeddingCoveragePercent,
            ok: value >= thresholds.min_embedding_coverage,
            observation: Observation::Percent {
                value,
                expect: Self::expectation(CheckName::EmbeddingCoveragePercent, thresholds),
            },
            error: None,
        }
    }

    pub fn latency_probe(elapsed: Duration, thresholds: &Thresholds) -> Self {
        // Coarse clocks can report zero for a completed query.
        let elapsed = elapsed.max(Duration::from_nanos(1));
        let value_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
        Self {
            name: CheckName::LatencyProbeJoin,
            ok: value_ms <= thresholds.latency_threshold_ms as f64,
            observation: Observation::Latency {
                value_ms,
                expect_ms: Self::expectation(CheckName::LatencyProbeJoin, thresholds),
            },
            error: None,
        }
    }

    /// A check whose query failed. Always a failure.
    pub fn errored(name: CheckName, thresholds: &Thresholds, error: impl Into<String>) -> Self {
        let expect = Self::expectation(name, thresholds);
        let observation = match name {
            CheckName::LatencyProbeJoin => Observation::LatencyUnavailable { expect_ms: expect },
            _ => Observation::Unavailable { expect },
        };
        Self {
            name,
            ok: false,
            observation,
            error: Some(error.into()),
        }
    }

    /// Human-readable expectation for a check.
    pub fn expectation(name: CheckName, thresholds: &Thresholds) -> String {
        match name {
            CheckName::NoOrphanArtifacts | CheckName::HeadsPointToValidArtifacts => {
                "0".to_string()
            }
            CheckName::EmbeddingCoveragePercent => {
                format!(">={:?}", thresholds.min_embedding_coverage)
            }
            CheckName::LatencyProbeJoin => format!("<={}", thresholds.latency_threshold_ms),
        }
    }

    /// Observed integer count, for the zero-count checks.
    pub fn count(&self) -> Option<i64> {
        match self.observation {
            Observation::Count { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Observed numeric value regardless of kind.
    pub fn value(&self) -> Option<f64> {
        match self.observation {
            Observation::Count { value, .. } => Some(value as f64),
            Observation::Percent { value, .. } => Some(value),
            Observation::Latency { value_ms, .. } => Some(value_ms),
            Observation::LatencyUnavailable { .. } | Observation::Unavailable { .. } => None,
        }
    }
}

// ============================================================================
// INSPECTION REPORT
// ============================================================================

/// The report written at the end of every run.
///
/// `errors` holds unexpected failures only; a failed check is data in
/// `checks`, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub ok: bool,
    pub errors: Vec<String>,
    pub checks: Vec<CheckRecord>,
}

impl Default for InspectionReport {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectionReport {
    /// An empty report. Not ok until checks are recorded.
    pub fn new() -> Self {
        Self {
            ok: false,
            errors: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Report for a run that never reached the database.
    pub fn connection_failure(message: impl fmt::Display) -> Self {
        Self::failed(format!("db_connect_error: {}", message))
    }

    /// Report for a run aborted before any check ran.
    pub fn failed(error: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.push_error(error);
        report
    }

    /// Record check results; `ok` becomes the AND of all records unless an
    /// error has already been recorded.
    pub fn record_checks(&mut self, checks: Vec<CheckRecord>) {
        self.checks = checks;
        self.ok = self.errors.is_empty()
            && !self.checks.is_empty()
            && self.checks.iter().all(|c| c.ok);
    }

    /// Record an unexpected failure. Forces the report to fail.
    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.ok = false;
    }

    pub fn check(&self, name: CheckName) -> Option<&CheckRecord> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckRecord> {
        self.checks.iter().filter(|c| !c.ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_zero_studies_is_zero() {
        assert_eq!(coverage_percent(0, 0), 0.0);
        assert_eq!(coverage_percent(3, 0), 0.0);
    }

    #[test]
    fn test_coverage_percent_values() {
        assert_eq!(coverage_percent(1, 1), 100.0);
        assert_eq!(coverage_percent(1, 4), 25.0);
        assert_eq!(coverage_percent(0, 5), 0.0);
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(Thresholds::new(0.0, 0).is_ok());
        assert!(Thresholds::new(1.0, 500).is_ok());
        assert!(Thresholds::new(-0.1, 500).is_err());
        assert!(Thresholds::new(1.01, 500).is_err());
        assert!(Thresholds::new(f64::NAN, 500).is_err());
        assert!(Thresholds::new(f64::INFINITY, 500).is_err());
    }

    #[test]
    fn test_coverage_minimum_compared_against_percent() -> Result<(), serde_json::Error> {
        let thresholds = Thresholds::new(0.5, 500).unwrap();
        let record = CheckRecord::embedding_coverage(
            EmbeddingCoverage {
                total_studies: 4,
                embedded_studies: 1,
            },
            &thresholds,
        );
        assert!(record.ok);
        assert_eq!(
            serde_json::to_value(&record)?,
            serde_json::json!({
                "name": "embedding_coverage_percent",
                "ok": true,
                "value": 25.0,
                "expect": ">=0.5"
            })
        );
        Ok(())
    }

    #[test]
    fn test_zero_count_checks() {
        assert!(CheckRecord::orphan_artifacts(0).ok);
        assert!(!CheckRecord::orphan_artifacts(2).ok);
        assert!(CheckRecord::invalid_heads(0).ok);
        assert!(!CheckRecord::invalid_heads(1).ok);
        assert_eq!(CheckRecord::invalid_heads(1).count(), Some(1));
    }

    #[test]
    fn test_coverage_check_with_zero_minimum_passes_on_empty_store() {
        let thresholds = Thresholds::new(0.0, 500).unwrap();
        let record = CheckRecord::embedding_coverage(EmbeddingCoverage::default(), &thresholds);
        assert!(record.ok);
        assert_eq!(record.value(), Some(0.0));
    }

    #[test]
    fn test_coverage_check_fails_below_minimum() {
        let thresholds = Thresholds::new(0.5, 500).unwrap();
        let record = CheckRecord::embedding_coverage(
            EmbeddingCoverage {
                total_studies: 1_000,
                embedded_studies: 4,
            },
            &thresholds,
        );
        assert!(!record.ok);
        assert_eq!(record.value(), Some(0.4));
    }

    #[test]
    fn test_latency_zero_threshold_fails_even_for_zero_elapsed() {
        let thresholds = Thresholds::new(0.01, 0).unwrap();
        let record = CheckRecord::latency_probe(Duration::ZERO, &thresholds);
        assert!(!record.ok);
        assert!(record.value().is_some_and(|ms| ms > 0.0));
    }

    #[test]
    fn test_latency_within_threshold_passes() {
        let thresholds = Thresholds::default();
        assert!(CheckRecord::latency_probe(Duration::from_millis(12), &thresholds).ok);
        assert!(CheckRecord::latency_probe(Duration::from_millis(500), &thresholds).ok);
        assert!(!CheckRecord::latency_probe(Duration::from_millis(501), &thresholds).ok);
    }

    #[test]
    fn test_record_wire_format() -> Result<(), serde_json::Error> {
        let thresholds = Thresholds::default();

        let json = serde_json::to_value(CheckRecord::orphan_artifacts(0))?;
        assert_eq!(
            json,
            serde_json::json!({
                "name": "no_orphan_artifacts",
                "ok": true,
                "value": 0,
                "expect": "0"
            })
        );

        let json = serde_json::to_value(CheckRecord::latency_probe(
            Duration::from_millis(3),
            &thresholds,
        ))?;
        assert_eq!(json["name"], "latency_probe_join");
        assert_eq!(json["expect_ms"], "<=500");
        assert_eq!(json["value_ms"], 3.0);
        assert!(json.get("value").is_none());

        let json = serde_json::to_value(CheckRecord::embedding_coverage(
            EmbeddingCoverage {
                total_studies: 1,
                embedded_studies: 1,
            },
            &thresholds,
        ))?;
        assert_eq!(json["value"], 100.0);
        assert_eq!(json["expect"], ">=0.01");
        Ok(())
    }

    #[test]
    fn test_errored_latency_keeps_latency_field_names() -> Result<(), serde_json::Error> {
        let thresholds = Thresholds::default();
        let json = serde_json::to_value(CheckRecord::errored(
            CheckName::LatencyProbeJoin,
            &thresholds,
            "timeout",
        ))?;
        assert_eq!(
            json,
            serde_json::json!({
                "name": "latency_probe_join",
                "ok": false,
                "expect_ms": "<=500",
                "error": "timeout"
            })
        );

        let json = serde_json::to_value(CheckRecord::errored(
            CheckName::EmbeddingCoveragePercent,
            &thresholds,
            "timeout",
        ))?;
        assert_eq!(json["expect"], ">=0.01");
        assert!(json.get("expect_ms").is_none());
        Ok(())
    }

    #[test]
    fn test_record_decodes_each_observation_kind() -> Result<(), serde_json::Error> {
        let thresholds = Thresholds::default();
        let records = vec![
            CheckRecord::orphan_artifacts(3),
            CheckRecord::embedding_coverage(
                EmbeddingCoverage {
                    total_studies: 2,
                    embedded_studies: 0,
                },
                &thresholds,
            ),
            CheckRecord::latency_probe(Duration::from_millis(7), &thresholds),
            CheckRecord::errored(CheckName::HeadsPointToValidArtifacts, &thresholds, "boom"),
            CheckRecord::errored(CheckName::LatencyProbeJoin, &thresholds, "boom"),
        ];
        let json = serde_json::to_string(&records)?;
        let decoded: Vec<CheckRecord> = serde_json::from_str(&json)?;
        assert_eq!(decoded, records);
        Ok(())
    }

    #[test]
    fn test_report_ok_is_and_of_checks() {
        let mut report = InspectionReport::new();
        assert!(!report.ok);

        report.record_checks(vec![
            CheckRecord::orphan_artifacts(0),
            CheckRecord::invalid_heads(0),
        ]);
        assert!(report.ok);

        report.record_checks(vec![
            CheckRecord::orphan_artifacts(0),
            CheckRecord::invalid_heads(4),
        ]);
        assert!(!report.ok);
        assert_eq!(report.failed_checks().count(), 1);
    }

    #[test]
    fn test_report_error_forces_failure() {
        let mut report = InspectionReport::new();
        report.push_error("relation \"studies\" does not exist");
        report.record_checks(vec![CheckRecord::orphan_artifacts(0)]);
        assert!(!report.ok);
    }

    #[test]
    fn test_connection_failure_report() -> Result<(), serde_json::Error> {
        let report = InspectionReport::connection_failure("connection refused");
        assert!(!report.ok);
        assert!(report.checks.is_empty());
        assert_eq!(report.errors, vec!["db_connect_error: connection refused"]);

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["checks"], serde_json::json!([]));
        Ok(())
    }

    #[test]
    fn test_check_names_in_order() {
        let names: Vec<&str> = CheckName::ALL.iter().map(|n| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "no_orphan_artifacts",
                "heads_point_to_valid_artifacts",
                "embedding_coverage_percent",
                "latency_probe_join",
            ]
        );
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_more_embeddings_never_turn_pass_into_fail(
                total in 1i64..5_000,
                embedded in 0i64..5_000,
                extra in 0i64..5_000,
                min in 0.0f64..=1.0,
            ) {
                let embedded = embedded.min(total);
                let more = (embedded + extra).min(total);
                let thresholds = Thresholds::new(min, 500)
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;

                let before = CheckRecord::embedding_coverage(
                    EmbeddingCoverage { total_studies: total, embedded_studies: embedded },
                    &thresholds,
                );
                let after = CheckRecord::embedding_coverage(
                    EmbeddingCoverage { total_studies: total, embedded_studies: more },
                    &thresholds,
                );
                prop_assert!(!before.ok || after.ok);
            }
        }
    }
}
