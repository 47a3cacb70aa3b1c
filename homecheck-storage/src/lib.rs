//! Homecheck Storage - Inspection Store Trait and Mock Implementation
//!
//! Defines the storage abstraction the inspection pipeline runs against.
//! The PostgreSQL implementation lives in homecheck-inspector.

pub mod mock;

pub use mock::{MockOperation, MockStore};

use ::async_trait::async_trait;
use homecheck_core::{EmbeddingCoverage, HomecheckResult, SampleFixture, SeededFixture};

/// Row counts of the four inspected tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowCounts {
    pub studies: i64,
    pub artifacts: i64,
    pub artifact_heads: i64,
    pub study_embeddings: i64,
}

// ============================================================================
// INSPECTION STORE TRAIT
// ============================================================================

/// Backing store for one inspection run.
///
/// An implementation owns exactly one connection; methods take `&mut self`
/// because the connection is never shared. Every method is attempted once
/// and never retried.
#[async_trait]
pub trait InspectionStore: Send {
    /// Create tables and extensions if absent. Safe to call repeatedly.
    async fn provision(&mut self) -> HomecheckResult<()>;

    /// Insert one study, artifact, head and embedding atomically.
    ///
    /// Not idempotent: the fixture's unique keys make a second seed of the
    /// same data fail.
    async fn seed(&mut self, fixture: &SampleFixture) -> HomecheckResult<SeededFixture>;

    /// Artifacts whose study reference does not resolve.
    async fn count_orphan_artifacts(&mut self) -> HomecheckResult<i64>;

    /// Heads whose artifact reference does not resolve.
    async fn count_invalid_heads(&mut self) -> HomecheckResult<i64>;

    /// Studies in total and studies with a non-null embedding.
    async fn embedding_coverage(&mut self) -> HomecheckResult<EmbeddingCoverage>;

    /// Run the bounded study-artifact join used as the latency probe.
    async fn probe_join(&mut self) -> HomecheckResult<()>;

    /// Current row counts of the inspected tables.
    async fn row_counts(&mut self) -> HomecheckResult<RowCounts>;
}
