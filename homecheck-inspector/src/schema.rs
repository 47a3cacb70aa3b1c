//! SQL for the inspection schema and the integrity queries.
//!
//! Every DDL statement is guarded with `IF NOT EXISTS`, which is what makes
//! provisioning idempotent. Constraints live here, in the database, and the
//! checks only observe their effect.

/// Extensions, tables and constraints. Executed as one batch.
pub const PROVISION_SQL: &str = r#"
CREATE EXTENSION IF NOT EXISTS pgcrypto;

CREATE TABLE IF NOT EXISTS studies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    pmid TEXT UNIQUE,
    title TEXT NOT NULL,
    abstract TEXT,
    journal TEXT,
    year INT,
    metadata JSONB,
    created_at TIMESTAMPTZ DEFAULT now()
);

CREATE TABLE IF NOT EXISTS artifacts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    study_id UUID NOT NULL REFERENCES studies(id),
    artifact_type TEXT NOT NULL,
    workspace TEXT NOT NULL CHECK (workspace IN ('roots', 'prod')),
    content JSONB NOT NULL,
    model_id TEXT,
    created_by TEXT NOT NULL,
    status TEXT DEFAULT 'draft' CHECK (status IN ('draft', 'proposed', 'approved', 'archived')),
    supersedes_id UUID REFERENCES artifacts(id),
    created_at TIMESTAMPTZ DEFAULT now()
);

CREATE TABLE IF NOT EXISTS artifact_heads (
    study_id UUID NOT NULL REFERENCES studies(id),
    artifact_type TEXT NOT NULL,
    workspace TEXT NOT NULL CHECK (workspace IN ('roots', 'prod')),
    scope TEXT NOT NULL CHECK (scope IN ('global', 'org', 'user')),
    scope_id TEXT,
    artifact_id UUID NOT NULL REFERENCES artifacts(id),
    updated_by TEXT NOT NULL,
    updated_at TIMESTAMPTZ DEFAULT now(),
    UNIQUE (study_id, artifact_type, workspace, scope, scope_id)
);

CREATE EXTENSION IF NOT EXISTS vector;

CREATE TABLE IF NOT EXISTS study_embeddings (
    study_id UUID PRIMARY KEY REFERENCES studies(id) ON DELETE CASCADE,
    model TEXT NOT NULL DEFAULT 'text-embedding-3-large',
    embedding vector(1),
    abstract_sha256 TEXT,
    created_at TIMESTAMPTZ DEFAULT now()
);
"#;

/// Tables created by [`PROVISION_SQL`], in dependency order.
pub const TABLES: [&str; 4] = ["studies", "artifacts", "artifact_heads", "study_embeddings"];

// ============================================================================
// SEED
// ============================================================================

pub const INSERT_STUDY: &str = "INSERT INTO studies \
     (id, pmid, title, abstract, journal, year, metadata, created_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";

pub const INSERT_ARTIFACT: &str = "INSERT INTO artifacts \
     (id, study_id, artifact_type, workspace, content, model_id, created_by, status, supersedes_id, created_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)";

pub const INSERT_ARTIFACT_HEAD: &str = "INSERT INTO artifact_heads \
     (study_id, artifact_type, workspace, scope, scope_id, artifact_id, updated_by, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";

/// The vector is bound as text and cast, so no client-side vector type is
/// needed.
pub const INSERT_STUDY_EMBEDDING: &str = "INSERT INTO study_embeddings \
     (study_id, model, embedding, abstract_sha256, created_at) \
     VALUES ($1, $2, $3::text::vector, $4, $5)";

// ============================================================================
// CHECKS
// ============================================================================

pub const COUNT_ORPHAN_ARTIFACTS: &str = "SELECT COUNT(*) FROM artifacts a \
     LEFT JOIN studies s ON s.id = a.study_id \
     WHERE s.id IS NULL";

pub const COUNT_INVALID_HEADS: &str = "SELECT COUNT(*) FROM artifact_heads h \
     LEFT JOIN artifacts a ON a.id = h.artifact_id \
     WHERE a.id IS NULL";

pub const EMBEDDING_COVERAGE: &str = "SELECT \
     (SELECT COUNT(*) FROM studies) AS total_studies, \
     (SELECT COUNT(*) FROM study_embeddings e \
         JOIN studies s ON s.id = e.study_id \
         WHERE e.embedding IS NOT NULL) AS embedded_studies";

pub const PROBE_JOIN: &str = "SELECT s.id, a.id FROM studies s \
     JOIN artifacts a ON a.study_id = s.id \
     LIMIT 1";

pub const ROW_COUNTS: &str = "SELECT \
     (SELECT COUNT(*) FROM studies), \
     (SELECT COUNT(*) FROM artifacts), \
     (SELECT COUNT(*) FROM artifact_heads), \
     (SELECT COUNT(*) FROM study_embeddings)";

/// Number of inspected tables present in the current schema.
pub const COUNT_PROVISIONED_TABLES: &str = "SELECT COUNT(*) FROM information_schema.tables \
     WHERE table_schema = current_schema() AND table_name::text = ANY($1::text[])";
