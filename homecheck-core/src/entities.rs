//! Core entity structures

use crate::{
    abstract_digest_hex, new_entity_id, ArtifactStatus, EntityId, HeadScope, Timestamp,
    Workspace,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Default embedding model recorded for study embeddings.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// Study - a scholarly record under inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub study_id: EntityId,
    /// PubMed identifier, unique across studies when present.
    pub pmid: Option<String>,
    pub title: String,
    pub abstract_text: Option<String>,
    pub journal: Option<String>,
    pub year: Option<i32>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// Artifact - a derived work item belonging to exactly one study.
///
/// `supersedes_id` links to the prior revision, forming a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_id: EntityId,
    pub study_id: EntityId,
    pub artifact_type: String,
    pub workspace: Workspace,
    pub content: serde_json::Value,
    pub model_id: Option<String>,
    pub created_by: String,
    pub status: ArtifactStatus,
    pub supersedes_id: Option<EntityId>,
    pub created_at: Timestamp,
}

/// ArtifactHead - pointer to the current artifact for a
/// (study, type, workspace, scope, scope_id) tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactHead {
    pub study_id: EntityId,
    pub artifact_type: String,
    pub workspace: Workspace,
    pub scope: HeadScope,
    pub scope_id: Option<String>,
    pub artifact_id: EntityId,
    pub updated_by: String,
    pub updated_at: Timestamp,
}

impl ArtifactHead {
    /// Key under which at most one head may exist.
    pub fn unique_key(&self) -> (EntityId, &str, Workspace, HeadScope, Option<&str>) {
        (
            self.study_id,
            self.artifact_type.as_str(),
            self.workspace,
            self.scope,
            self.scope_id.as_deref(),
        )
    }
}

/// StudyEmbedding - vector representation of a study, at most one per study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyEmbedding {
    pub study_id: EntityId,
    pub model: String,
    pub embedding: Option<Vec<f32>>,
    pub abstract_sha256: Option<String>,
    pub created_at: Timestamp,
}

impl StudyEmbedding {
    /// Render the vector in pgvector text form, e.g. `[0.1,0.2]`.
    pub fn vector_literal(&self) -> Option<String> {
        self.embedding.as_ref().map(|values| {
            let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            format!("[{}]", parts.join(","))
        })
    }
}

// ============================================================================
// SEED FIXTURE
// ============================================================================

/// The four records inserted by a single seed: one of each entity, wired
/// together so every reference resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleFixture {
    pub study: Study,
    pub artifact: Artifact,
    pub head: ArtifactHead,
    pub embedding: StudyEmbedding,
}

impl SampleFixture {
    /// The CI sample: an approved clinical artifact in the roots workspace,
    /// with a global head and a one-dimensional embedding.
    pub fn ci_sample() -> Self {
        let now = Utc::now();
        let study_id = new_entity_id();
        let artifact_id = new_entity_id();
        let abstract_text = "Sample abstract".to_string();

        let study = Study {
            study_id,
            pmid: Some("0000000".to_string()),
            title: "CI sample study".to_string(),
            abstract_text: Some(abstract_text.clone()),
            journal: Some("CI Journal".to_string()),
            year: Some(2025),
            metadata: None,
            created_at: now,
        };

        let artifact = Artifact {
            artifact_id,
            study_id,
            artifact_type: "clinical".to_string(),
            workspace: Workspace::Roots,
            content: serde_json::json!({ "summary": "initial" }),
            model_id: None,
            created_by: "ci_user".to_string(),
            status: ArtifactStatus::Approved,
            supersedes_id: None,
            created_at: now,
        };

        let head = ArtifactHead {
            study_id,
            artifact_type: artifact.artifact_type.clone(),
            workspace: artifact.workspace,
            scope: HeadScope::Global,
            scope_id: None,
            artifact_id,
            updated_by: "ci_user".to_string(),
            updated_at: now,
        };

        let embedding = StudyEmbedding {
            study_id,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding: Some(vec![0.1]),
            abstract_sha256: Some(abstract_digest_hex(&abstract_text)),
            created_at: now,
        };

        Self {
            study,
            artifact,
            head,
            embedding,
        }
    }

    /// Identifiers of the inserted rows.
    pub fn seeded(&self) -> SeededFixture {
        SeededFixture {
            study_id: self.study.study_id,
            artifact_id: self.artifact.artifact_id,
        }
    }
}

/// Identifiers returned by a successful seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededFixture {
    pub study_id: EntityId,
    pub artifact_id: EntityId,
}
