//! In-memory inspection store for testing.
//!
//! Enforces the same constraints as the PostgreSQL schema (foreign keys,
//! unique pmid, one head per key, one embedding per study) on the seed
//! path. The `inject_*` methods bypass those constraints so tests can
//! build the broken states the checks are meant to catch.

use crate::{InspectionStore, RowCounts};
use ::async_trait::async_trait;
use homecheck_core::{
    Artifact, ArtifactHead, EmbeddingCoverage, EntityId, EntityType, HomecheckResult,
    SampleFixture, SeededFixture, StorageError, Study, StudyEmbedding,
};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Store operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    Provision,
    Seed,
    CountOrphanArtifacts,
    CountInvalidHeads,
    EmbeddingCoverage,
    ProbeJoin,
}

/// In-memory mock store.
#[derive(Debug, Default)]
pub struct MockStore {
    provisioned: bool,
    provision_calls: usize,
    studies: HashMap<EntityId, Study>,
    artifacts: HashMap<EntityId, Artifact>,
    heads: Vec<ArtifactHead>,
    embeddings: HashMap<EntityId, StudyEmbedding>,
    failing: HashSet<MockOperation>,
    probe_delay: Option<Duration>,
    probe_calls: usize,
    probe_hits: usize,
}

impl MockStore {
    /// Create an empty, unprovisioned store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose schema already exists.
    pub fn provisioned() -> Self {
        Self {
            provisioned: true,
            ..Self::default()
        }
    }

    /// Make `operation` fail with a query error from now on.
    pub fn fail_on(mut self, operation: MockOperation) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Delay the join probe, to exercise the latency threshold.
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = Some(delay);
        self
    }

    pub fn is_provisioned(&self) -> bool {
        self.provisioned
    }

    pub fn provision_calls(&self) -> usize {
        self.provision_calls
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls
    }

    /// Probes whose join produced a row.
    pub fn probe_hits(&self) -> usize {
        self.probe_hits
    }

    /// Number of schema objects (tables) present.
    pub fn table_count(&self) -> usize {
        if self.provisioned {
            4
        } else {
            0
        }
    }

    // ========================================================================
    // Constraint-bypassing helpers
    // ========================================================================

    /// Insert a study without touching the other tables.
    pub fn inject_study(&mut self, study: Study) {
        self.studies.insert(study.study_id, study);
    }

    /// Insert an artifact without checking that its study exists.
    pub fn inject_artifact(&mut self, artifact: Artifact) {
        self.artifacts.insert(artifact.artifact_id, artifact);
    }

    /// Insert a head without checking that its artifact exists.
    pub fn inject_head(&mut self, head: ArtifactHead) {
        self.heads.push(head);
    }

    /// Insert an embedding without checking that its study exists.
    pub fn inject_embedding(&mut self, embedding: StudyEmbedding) {
        self.embeddings.insert(embedding.study_id, embedding);
    }

    /// Delete a study but leave dependent rows behind, as a store without
    /// enforced foreign keys would.
    pub fn remove_study_unchecked(&mut self, study_id: EntityId) -> Option<Study> {
        self.studies.remove(&study_id)
    }

    /// Delete an artifact but leave heads pointing at it.
    pub fn remove_artifact_unchecked(&mut self, artifact_id: EntityId) -> Option<Artifact> {
        self.artifacts.remove(&artifact_id)
    }

    fn check_failure(&self, operation: MockOperation) -> HomecheckResult<()> {
        if self.failing.contains(&operation) {
            return Err(StorageError::QueryFailed {
                query: format!("{:?}", operation),
                reason: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn require_schema(&self) -> HomecheckResult<()> {
        if !self.provisioned {
            return Err(StorageError::NotProvisioned {
                table: EntityType::Study.table_name().to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Validate every constraint the seed would touch before writing
    /// anything, so a failed seed leaves the store unchanged.
    fn validate_seed(&self, fixture: &SampleFixture) -> Result<(), StorageError> {
        let study = &fixture.study;
        if self.studies.contains_key(&study.study_id) {
            return Err(StorageError::ConstraintViolation {
                constraint: "studies_pkey".to_string(),
                reason: format!("study {} already exists", study.study_id),
            });
        }
        if let Some(pmid) = &study.pmid {
            if self.studies.values().any(|s| s.pmid.as_ref() == Some(pmid)) {
                return Err(StorageError::ConstraintViolation {
                    constraint: "studies_pmid_key".to_string(),
                    reason: format!("pmid {} already exists", pmid),
                });
            }
        }

        let artifact = &fixture.artifact;
        if self.artifacts.contains_key(&artifact.artifact_id) {
            return Err(StorageError::ConstraintViolation {
                constraint: "artifacts_pkey".to_string(),
                reason: format!("artifact {} already exists", artifact.artifact_id),
            });
        }
        if artifact.study_id != study.study_id && !self.studies.contains_key(&artifact.study_id) {
            return Err(StorageError::ConstraintViolation {
                constraint: "artifacts_study_id_fkey".to_string(),
                reason: format!("study {} does not exist", artifact.study_id),
            });
        }
        if let Some(prior) = artifact.supersedes_id {
            if !self.artifacts.contains_key(&prior) {
                return Err(StorageError::ConstraintViolation {
                    constraint: "artifacts_supersedes_id_fkey".to_string(),
                    reason: format!("artifact {} does not exist", prior),
                });
            }
        }

        let head = &fixture.head;
        if head.artifact_id != artifact.artifact_id && !self.artifacts.contains_key(&head.artifact_id)
        {
            return Err(StorageError::ConstraintViolation {
                constraint: "artifact_heads_artifact_id_fkey".to_string(),
                reason: format!("artifact {} does not exist", head.artifact_id),
            });
        }
        // NULL scope ids never collide under a SQL UNIQUE constraint.
        if head.scope_id.is_some() && self.heads.iter().any(|h| h.unique_key() == head.unique_key())
        {
            return Err(StorageError::ConstraintViolation {
                constraint: "artifact_heads_unique".to_string(),
                reason: "head already exists for key".to_string(),
            });
        }

        let embedding = &fixture.embedding;
        if self.embeddings.contains_key(&embedding.study_id) {
            return Err(StorageError::ConstraintViolation {
                constraint: "study_embeddings_pkey".to_string(),
                reason: format!("embedding for study {} already exists", embedding.study_id),
            });
        }
        if embedding.study_id != study.study_id && !self.studies.contains_key(&embedding.study_id)
        {
            return Err(StorageError::ConstraintViolation {
                constraint: "study_embeddings_study_id_fkey".to_string(),
                reason: format!("study {} does not exist", embedding.study_id),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InspectionStore for MockStore {
    async fn provision(&mut self) -> HomecheckResult<()> {
        self.check_failure(MockOperation::Provision)?;
        self.provision_calls += 1;
        self.provisioned = true;
        Ok(())
    }

    async fn seed(&mut self, fixture: &SampleFixture) -> HomecheckResult<SeededFixture> {
        self.check_failure(MockOperation::Seed)?;
        self.require_schema()?;
        self.validate_seed(fixture)?;

        self.studies
            .insert(fixture.study.study_id, fixture.study.clone());
        self.artifacts
            .insert(fixture.artifact.artifact_id, fixture.artifact.clone());
        self.heads.push(fixture.head.clone());
        self.embeddings
            .insert(fixture.embedding.study_id, fixture.embedding.clone());
        Ok(fixture.seeded())
    }

    async fn count_orphan_artifacts(&mut self) -> HomecheckResult<i64> {
        self.check_failure(MockOperation::CountOrphanArtifacts)?;
        self.require_schema()?;
        let orphans = self
            .artifacts
            .values()
            .filter(|a| !self.studies.contains_key(&a.study_id))
            .count();
        Ok(orphans as i64)
    }

    async fn count_invalid_heads(&mut self) -> HomecheckResult<i64> {
        self.check_failure(MockOperation::CountInvalidHeads)?;
        self.require_schema()?;
        let invalid = self
            .heads
            .iter()
            .filter(|h| !self.artifacts.contains_key(&h.artifact_id))
            .count();
        Ok(invalid as i64)
    }

    async fn embedding_coverage(&mut self) -> HomecheckResult<EmbeddingCoverage> {
        self.check_failure(MockOperation::EmbeddingCoverage)?;
        self.require_schema()?;
        let embedded = self
            .studies
            .keys()
            .filter(|id| {
                self.embeddings
                    .get(id)
                    .is_some_and(|e| e.embedding.is_some())
            })
            .count();
        Ok(EmbeddingCoverage {
            total_studies: self.studies.len() as i64,
            embedded_studies: embedded as i64,
        })
    }

    async fn probe_join(&mut self) -> HomecheckResult<()> {
        self.check_failure(MockOperation::ProbeJoin)?;
        self.require_schema()?;
        self.probe_calls += 1;
        if let Some(delay) = self.probe_delay {
            tokio::time::sleep(delay).await;
        }
        let joined = self
            .artifacts
            .values()
            .any(|a| self.studies.contains_key(&a.study_id));
        if joined {
            self.probe_hits += 1;
        }
        Ok(())
    }

    async fn row_counts(&mut self) -> HomecheckResult<RowCounts> {
        self.require_schema()?;
        Ok(RowCounts {
            studies: self.studies.len() as i64,
            artifacts: self.artifacts.len() as i64,
            artifact_heads: self.heads.len() as i64,
            study_embeddings: self.embeddings.len() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homecheck_core::HomecheckError;

    #[tokio::test]
    async fn test_provision_is_idempotent() -> HomecheckResult<()> {
        let mut store = MockStore::new();
        store.provision().await?;
        store.provision().await?;
        assert_eq!(store.table_count(), 4);
        assert_eq!(store.provision_calls(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_requires_schema() {
        let mut store = MockStore::new();
        let result = store.seed(&SampleFixture::ci_sample()).await;
        assert!(matches!(
            result,
            Err(HomecheckError::Storage(StorageError::NotProvisioned { .. }))
        ));
    }

    #[tokio::test]
    async fn test_seed_adds_one_row_per_table() -> HomecheckResult<()> {
        let mut store = MockStore::provisioned();
        let before = store.row_counts().await?;
        store.seed(&SampleFixture::ci_sample()).await?;
        let after = store.row_counts().await?;

        assert_eq!(after.studies, before.studies + 1);
        assert_eq!(after.artifacts, before.artifacts + 1);
        assert_eq!(after.artifact_heads, before.artifact_heads + 1);
        assert_eq!(after.study_embeddings, before.study_embeddings + 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_seed_conflicts_and_writes_nothing() -> HomecheckResult<()> {
        let mut store = MockStore::provisioned();
        store.seed(&SampleFixture::ci_sample()).await?;
        let counts = store.row_counts().await?;

        let result = store.seed(&SampleFixture::ci_sample()).await;
        match result {
            Err(HomecheckError::Storage(StorageError::ConstraintViolation {
                constraint, ..
            })) => assert_eq!(constraint, "studies_pmid_key"),
            other => panic!("expected pmid conflict, got {:?}", other),
        }
        assert_eq!(store.row_counts().await?, counts);
        Ok(())
    }

    #[tokio::test]
    async fn test_counts_detect_injected_breakage() -> HomecheckResult<()> {
        let mut store = MockStore::provisioned();
        let fixture = SampleFixture::ci_sample();
        store.seed(&fixture).await?;
        assert_eq!(store.count_orphan_artifacts().await?, 0);
        assert_eq!(store.count_invalid_heads().await?, 0);

        store.remove_artifact_unchecked(fixture.artifact.artifact_id);
        assert_eq!(store.count_invalid_heads().await?, 1);

        let mut orphan = fixture.artifact.clone();
        orphan.artifact_id = homecheck_core::new_entity_id();
        orphan.study_id = homecheck_core::new_entity_id();
        store.inject_artifact(orphan);
        assert_eq!(store.count_orphan_artifacts().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_coverage_counts_only_non_null_vectors() -> HomecheckResult<()> {
        let mut store = MockStore::provisioned();
        assert_eq!(
            store.embedding_coverage().await?,
            EmbeddingCoverage::default()
        );

        let fixture = SampleFixture::ci_sample();
        store.seed(&fixture).await?;

        let mut bare = fixture.study.clone();
        bare.study_id = homecheck_core::new_entity_id();
        bare.pmid = None;
        store.inject_study(bare.clone());

        let mut empty_vector = fixture.embedding.clone();
        empty_vector.study_id = bare.study_id;
        empty_vector.embedding = None;
        store.inject_embedding(empty_vector);

        let coverage = store.embedding_coverage().await?;
        assert_eq!(coverage.total_studies, 2);
        assert_eq!(coverage.embedded_studies, 1);
        assert_eq!(coverage.percent(), 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_probe_hits_only_when_join_has_rows() -> HomecheckResult<()> {
        let mut store = MockStore::provisioned();
        store.probe_join().await?;
        assert_eq!(store.probe_calls(), 1);
        assert_eq!(store.probe_hits(), 0);

        let fixture = SampleFixture::ci_sample();
        store.seed(&fixture).await?;
        store.probe_join().await?;
        assert_eq!(store.probe_hits(), 1);

        // An orphaned artifact does not join.
        store.remove_study_unchecked(fixture.study.study_id);
        store.probe_join().await?;
        assert_eq!(store.probe_calls(), 3);
        assert_eq!(store.probe_hits(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_fail_on_injects_query_error() {
        let mut store = MockStore::provisioned().fail_on(MockOperation::ProbeJoin);
        assert!(store.probe_join().await.is_err());
        assert!(store.count_invalid_heads().await.is_ok());
    }
}
