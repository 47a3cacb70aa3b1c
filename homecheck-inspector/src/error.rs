//! Error Types for the Inspector
//!
//! Two failure classes exist. A connection failure means the run never
//! reached the database and maps to its own exit code. Everything else
//! (provisioning, seeding, a check query, writing the report) is an
//! in-pipeline failure. Failed checks are not errors at all; they are
//! recorded in the report.

use homecheck_core::{ConfigError, EntityType, HomecheckError, StorageError};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// EXIT CODES
// ============================================================================

/// All checks passed.
pub const EXIT_OK: u8 = 0;

/// A check failed or the pipeline hit an unexpected error.
pub const EXIT_CHECKS_FAILED: u8 = 1;

/// The database connection could not be established.
pub const EXIT_CONNECTION_FAILED: u8 = 2;

// ============================================================================
// INSPECT ERROR
// ============================================================================

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Failed to connect to database: {0}")]
    Connect(String),

    #[error(transparent)]
    Homecheck(#[from] HomecheckError),

    #[error("Failed to write report {path}: {source}")]
    ReportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to initialize logging: {0}")]
    Telemetry(String),
}

impl InspectError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            InspectError::Connect(_) => EXIT_CONNECTION_FAILED,
            _ => EXIT_CHECKS_FAILED,
        }
    }

    pub fn is_connection_failure(&self) -> bool {
        matches!(self, InspectError::Connect(_))
    }
}

impl From<ConfigError> for InspectError {
    fn from(err: ConfigError) -> Self {
        InspectError::Homecheck(err.into())
    }
}

impl From<StorageError> for InspectError {
    fn from(err: StorageError) -> Self {
        InspectError::Homecheck(err.into())
    }
}

/// Convert from deadpool_postgres::PoolError. Failing to check out the one
/// connection means the database is unreachable.
impl From<deadpool_postgres::PoolError> for InspectError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!("Connection pool error: {:?}", err);

        match err {
            deadpool_postgres::PoolError::Timeout(_) => {
                InspectError::Connect("timed out establishing connection".to_string())
            }
            deadpool_postgres::PoolError::Closed => {
                InspectError::Connect("connection pool is closed".to_string())
            }
            other => InspectError::Connect(other.to_string()),
        }
    }
}

/// Convert from deadpool_postgres::CreatePoolError, raised for an unusable
/// connection string.
impl From<deadpool_postgres::CreatePoolError> for InspectError {
    fn from(err: deadpool_postgres::CreatePoolError) -> Self {
        tracing::error!("Failed to create pool: {:?}", err);
        InspectError::Connect(err.to_string())
    }
}

/// Convert from tokio_postgres::Error raised outside a named query.
impl From<tokio_postgres::Error> for InspectError {
    fn from(err: tokio_postgres::Error) -> Self {
        InspectError::Homecheck(query_failed("statement", err))
    }
}

/// Server message when present, otherwise the client-side description.
fn db_reason(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => db.message().to_string(),
        None => err.to_string(),
    }
}

/// Map a failed statement to a storage error, naming the query that failed.
pub(crate) fn query_failed(query: &str, err: tokio_postgres::Error) -> HomecheckError {
    tracing::error!(query, "Database error: {:?}", err);
    StorageError::QueryFailed {
        query: query.to_string(),
        reason: db_reason(&err),
    }
    .into()
}

/// Map a failed insert. A named constraint becomes a constraint violation.
pub(crate) fn insert_failed(entity_type: EntityType, err: tokio_postgres::Error) -> HomecheckError {
    tracing::error!(?entity_type, "Insert error: {:?}", err);
    let constraint = err
        .as_db_error()
        .and_then(|db| db.constraint())
        .map(str::to_string);
    insert_error(entity_type, constraint, db_reason(&err)).into()
}

fn insert_error(entity_type: EntityType, constraint: Option<String>, reason: String) -> StorageError {
    match constraint {
        Some(constraint) => StorageError::ConstraintViolation { constraint, reason },
        None => StorageError::InsertFailed {
            entity_type,
            reason,
        },
    }
}

/// Map a failure to begin or commit a transaction.
pub(crate) fn transaction_failed(stage: &str, err: tokio_postgres::Error) -> HomecheckError {
    tracing::error!(stage, "Transaction error: {:?}", err);
    transaction_error(stage, db_reason(&err)).into()
}

fn transaction_error(stage: &str, reason: String) -> StorageError {
    StorageError::TransactionFailed {
        reason: format!("{}: {}", stage, reason),
    }
}

/// Result type alias for inspector operations.
pub type InspectResult<T> = Result<T, InspectError>;
