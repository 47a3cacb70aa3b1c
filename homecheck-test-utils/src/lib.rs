//! Homecheck Test Utilities
//!
//! Shared test infrastructure for the homecheck workspace:
//! - Proptest generators for entities and thresholds
//! - Fixtures for common store states
//! - Assertions over reports and storage errors

// Re-export mock storage from its source crate
pub use homecheck_storage::{InspectionStore, MockOperation, MockStore, RowCounts};

// Re-export core types for convenience
pub use homecheck_core::{
    abstract_digest_hex, Artifact, ArtifactHead, ArtifactStatus, CheckName, CheckRecord,
    ConfigError, EmbeddingCoverage, EntityId, HeadScope, HomecheckError, HomecheckResult,
    InspectionReport, Observation, SampleFixture, SeededFixture, StorageError, Study,
    StudyEmbedding, Thresholds, Timestamp, Workspace, DEFAULT_EMBEDDING_MODEL,
};

use chrono::Utc;
use uuid::Uuid;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for homecheck types.

    use super::*;
    use chrono::{DateTime, TimeZone};
    use proptest::prelude::*;

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate a timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800i64..1_893_456_000i64).prop_map(|secs| {
            Utc.timestamp_opt(secs, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        })
    }

    pub fn arb_artifact_status() -> impl Strategy<Value = ArtifactStatus> {
        prop_oneof![
            Just(ArtifactStatus::Draft),
            Just(ArtifactStatus::Proposed),
            Just(ArtifactStatus::Approved),
            Just(ArtifactStatus::Archived),
        ]
    }

    pub fn arb_workspace() -> impl Strategy<Value = Workspace> {
        prop_oneof![Just(Workspace::Roots), Just(Workspace::Prod)]
    }

    pub fn arb_head_scope() -> impl Strategy<Value = HeadScope> {
        prop_oneof![
            Just(HeadScope::Global),
            Just(HeadScope::Org),
            Just(HeadScope::User),
        ]
    }

    /// Seven-digit PubMed identifier.
    pub fn arb_pmid() -> impl Strategy<Value = String> {
        (0u32..10_000_000).prop_map(|n| format!("{:07}", n))
    }

    /// Thresholds that pass validation.
    pub fn arb_thresholds() -> impl Strategy<Value = Thresholds> {
        (0.0f64..=1.0, 0u64..5_000).prop_map(|(min_embedding_coverage, latency_threshold_ms)| {
            Thresholds {
                min_embedding_coverage,
                latency_threshold_ms,
            }
        })
    }

    /// Coverage figures where embedded never exceeds total.
    pub fn arb_embedding_coverage() -> impl Strategy<Value = EmbeddingCoverage> {
        (0i64..10_000).prop_flat_map(|total| {
            (Just(total), 0..=total).prop_map(|(total_studies, embedded_studies)| {
                EmbeddingCoverage {
                    total_studies,
                    embedded_studies,
                }
            })
        })
    }

    pub fn arb_study() -> impl Strategy<Value = Study> {
        (
            arb_uuid(),
            proptest::option::of(arb_pmid()),
            "[a-zA-Z ]{1,40}",
            proptest::option::of("[a-zA-Z .]{0,200}"),
            proptest::option::of("[a-zA-Z ]{1,30}"),
            proptest::option::of(1950i32..2030),
            arb_timestamp(),
        )
            .prop_map(
                |(study_id, pmid, title, abstract_text, journal, year, created_at)| Study {
                    study_id,
                    pmid,
                    title,
                    abstract_text,
                    journal,
                    year,
                    metadata: None,
                    created_at,
                },
            )
    }

    /// A complete fixture with every reference wired to its own study.
    pub fn arb_sample_fixture() -> impl Strategy<Value = SampleFixture> {
        (
            arb_study(),
            arb_uuid(),
            arb_workspace(),
            arb_artifact_status(),
            arb_head_scope(),
            proptest::option::of("[a-z0-9]{1,12}"),
            proptest::option::of(proptest::collection::vec(-1.0f32..1.0, 1..4)),
        )
            .prop_map(
                |(study, artifact_id, workspace, status, scope, scope_id, vector)| {
                    let study_id = study.study_id;
                    let digest = study.abstract_text.as_deref().map(abstract_digest_hex);
                    let artifact = Artifact {
                        artifact_id,
                        study_id,
                        artifact_type: "clinical".to_string(),
                        workspace,
                        content: serde_json::json!({ "summary": "generated" }),
                        model_id: None,
                        created_by: "prop_user".to_string(),
                        status,
                        supersedes_id: None,
                        created_at: study.created_at,
                    };
                    let head = ArtifactHead {
                        study_id,
                        artifact_type: artifact.artifact_type.clone(),
                        workspace,
                        scope,
                        scope_id,
                        artifact_id,
                        updated_by: "prop_user".to_string(),
                        updated_at: study.created_at,
                    };
                    let embedding = StudyEmbedding {
                        study_id,
                        model: DEFAULT_EMBEDDING_MODEL.to_string(),
                        embedding: vector,
                        abstract_sha256: digest,
                        created_at: study.created_at,
                    };
                    SampleFixture {
                        study,
                        artifact,
                        head,
                        embedding,
                    }
                },
            )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common testing scenarios.

    use super::*;

    /// The CI sample with a distinct pmid, so several can share one store.
    pub fn numbered_fixture(index: usize) -> SampleFixture {
        let mut fixture = SampleFixture::ci_sample();
        fixture.study.pmid = Some(format!("{:07}", index));
        fixture
    }

    /// The CI sample with no embedding vector.
    pub fn unembedded_fixture(index: usize) -> SampleFixture {
        let mut fixture = numbered_fixture(index);
        fixture.embedding.embedding = None;
        fixture
    }

    /// Thresholds that any run passes on coverage and nearly any on latency.
    pub fn lenient_thresholds() -> Thresholds {
        Thresholds {
            min_embedding_coverage: 0.0,
            latency_threshold_ms: 60_000,
        }
    }

    /// Thresholds no run can meet on latency.
    pub fn zero_latency_thresholds() -> Thresholds {
        Thresholds {
            latency_threshold_ms: 0,
            ..Thresholds::default()
        }
    }

    /// A provisioned store holding one artifact whose study is gone.
    pub fn store_with_orphan_artifact() -> MockStore {
        let mut store = MockStore::provisioned();
        let fixture = SampleFixture::ci_sample();
        store.inject_artifact(fixture.artifact);
        store
    }

    /// A provisioned store holding one head whose artifact is gone.
    pub fn store_with_dangling_head() -> MockStore {
        let mut store = MockStore::provisioned();
        let fixture = SampleFixture::ci_sample();
        store.inject_study(fixture.study);
        store.inject_head(fixture.head);
        store
    }

    /// A study row with no embedding, for coverage tests.
    pub fn bare_study() -> Study {
        let mut study = SampleFixture::ci_sample().study;
        study.study_id = Uuid::now_v7();
        study.pmid = None;
        study.created_at = Utc::now();
        study
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over inspection reports and storage errors.

    use super::*;

    /// Assert that a report passed with no errors.
    #[track_caller]
    pub fn assert_report_ok(report: &InspectionReport) {
        assert!(
            report.ok && report.errors.is_empty(),
            "Expected passing report, got: {:?}",
            report
        );
    }

    /// Assert that a report failed.
    #[track_caller]
    pub fn assert_report_failed(report: &InspectionReport) {
        assert!(!report.ok, "Expected failing report, got: {:?}", report);
    }

    /// Assert that the four checks are present, in execution order.
    #[track_caller]
    pub fn assert_all_checks_present(report: &InspectionReport) {
        let names: Vec<CheckName> = report.checks.iter().map(|c| c.name).collect();
        assert_eq!(names, CheckName::ALL.to_vec(), "Unexpected check list");
    }

    fn find_check(report: &InspectionReport, name: CheckName) -> &CheckRecord {
        match report.check(name) {
            Some(record) => record,
            None => panic!("Check {} missing from report: {:?}", name, report),
        }
    }

    #[track_caller]
    pub fn assert_check_passed(report: &InspectionReport, name: CheckName) {
        let record = find_check(report, name);
        assert!(record.ok, "Expected {} to pass, got: {:?}", name, record);
    }

    #[track_caller]
    pub fn assert_check_failed(report: &InspectionReport, name: CheckName) {
        let record = find_check(report, name);
        assert!(!record.ok, "Expected {} to fail, got: {:?}", name, record);
    }

    /// Assert the observed count of a zero-count check.
    #[track_caller]
    pub fn assert_check_count(report: &InspectionReport, name: CheckName, expected: i64) {
        let record = find_check(report, name);
        assert_eq!(record.count(), Some(expected), "Wrong count for {}", name);
    }

    /// Assert that a result is a violation of the named constraint.
    #[track_caller]
    pub fn assert_constraint_violation<T: std::fmt::Debug>(
        result: &HomecheckResult<T>,
        constraint: &str,
    ) {
        match result {
            Err(HomecheckError::Storage(StorageError::ConstraintViolation {
                constraint: c, ..
            })) => assert_eq!(c, constraint, "Wrong constraint violated"),
            other => panic!("Expected violation of {}, got: {:?}", constraint, other),
        }
    }

    /// Assert that a result is a storage error of any kind.
    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &HomecheckResult<T>) {
        match result {
            Err(HomecheckError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }
}
