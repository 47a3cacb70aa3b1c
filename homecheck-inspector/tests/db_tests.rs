//! PostgreSQL-backed tests. Run with `--features db-tests` and a reachable
//! `DATABASE_URL` whose server has the pgvector extension available.

#![cfg(feature = "db-tests")]

mod support;

use homecheck_inspector::{run, InspectorConfig, Inspector, PgStore, EXIT_OK};
use homecheck_test_utils::assertions::*;
use homecheck_test_utils::fixtures::*;
use homecheck_test_utils::*;
use support::db::TestSchema;

#[tokio::test]
async fn test_provision_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let schema = TestSchema::create().await;
    let mut store = PgStore::connect(&schema.db_config()).await?;

    store.provision().await?;
    store.provision().await?;
    assert_eq!(store.provisioned_table_count().await?, 4);
    assert_eq!(store.row_counts().await?, RowCounts::default());

    store.close();
    schema.drop_schema().await;
    Ok(())
}

#[tokio::test]
async fn test_seed_then_checks_pass() -> Result<(), Box<dyn std::error::Error>> {
    let schema = TestSchema::create().await;
    let store = PgStore::connect(&schema.db_config()).await?;
    let mut inspector = Inspector::new(store);

    inspector.provision().await?;
    inspector.seed().await?;
    let counts = inspector.store_mut().row_counts().await?;
    assert_eq!(counts.studies, 1);
    assert_eq!(counts.artifacts, 1);
    assert_eq!(counts.artifact_heads, 1);
    assert_eq!(counts.study_embeddings, 1);

    let report = inspector.run_checks(&lenient_thresholds()).await;
    assert_report_ok(&report);
    assert_check_count(&report, CheckName::NoOrphanArtifacts, 0);
    assert_check_count(&report, CheckName::HeadsPointToValidArtifacts, 0);
    assert_eq!(
        report
            .check(CheckName::EmbeddingCoveragePercent)
            .and_then(|c| c.value()),
        Some(100.0)
    );

    inspector.into_store().close();
    schema.drop_schema().await;
    Ok(())
}

#[tokio::test]
async fn test_second_seed_is_rejected_and_rolled_back() -> Result<(), Box<dyn std::error::Error>> {
    let schema = TestSchema::create().await;
    let store = PgStore::connect(&schema.db_config()).await?;
    let mut inspector = Inspector::new(store);

    inspector.provision().await?;
    inspector.seed().await?;
    let second = inspector.seed().await;
    assert_constraint_violation(&second, "studies_pmid_key");

    let counts = inspector.store_mut().row_counts().await?;
    assert_eq!(counts.studies, 1);
    assert_eq!(counts.artifacts, 1);

    inspector.into_store().close();
    schema.drop_schema().await;
    Ok(())
}

#[tokio::test]
async fn test_unembedded_study_lowers_coverage() -> Result<(), Box<dyn std::error::Error>> {
    let schema = TestSchema::create().await;
    let store = PgStore::connect(&schema.db_config()).await?;
    let mut inspector = Inspector::new(store);

    inspector.provision().await?;
    inspector.seed_fixture(&numbered_fixture(1)).await?;
    inspector.seed_fixture(&unembedded_fixture(2)).await?;

    let coverage = inspector.store_mut().embedding_coverage().await?;
    assert_eq!(coverage.total_studies, 2);
    assert_eq!(coverage.embedded_studies, 1);
    assert_eq!(coverage.percent(), 50.0);

    inspector.into_store().close();
    schema.drop_schema().await;
    Ok(())
}

#[tokio::test]
async fn test_full_run_against_fresh_schema() {
    let schema = TestSchema::create().await;
    let config = InspectorConfig {
        db: schema.db_config(),
        ..InspectorConfig::default()
    };

    let outcome = run(&config).await;
    assert_eq!(outcome.exit_code, EXIT_OK, "report: {:?}", outcome.report);
    assert_all_checks_present(&outcome.report);

    schema.drop_schema().await;
}
