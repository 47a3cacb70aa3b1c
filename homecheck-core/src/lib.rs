//! Homecheck Core - Entity and Report Types
//!
//! Pure data structures with no I/O. All other crates depend on this.
//! Storage access lives in homecheck-storage, the PostgreSQL binding and
//! the pipeline in homecheck-inspector.

pub mod check;
pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;

pub use check::{
    coverage_percent, CheckName, CheckRecord, EmbeddingCoverage, InspectionReport, Observation,
    Thresholds, DEFAULT_LATENCY_THRESHOLD_MS, DEFAULT_MIN_EMBEDDING_COVERAGE,
};
pub use entities::{
    Artifact, ArtifactHead, SampleFixture, SeededFixture, Study, StudyEmbedding,
    DEFAULT_EMBEDDING_MODEL,
};
pub use enums::{ArtifactStatus, EntityType, EnumParseError, HeadScope, Workspace};
pub use error::{ConfigError, HomecheckError, HomecheckResult, StorageError};
pub use identity::{
    abstract_digest_hex, compute_content_hash, new_entity_id, ContentHash, EntityId, Timestamp,
};
