//! Enum types for homecheck entities
//!
//! Each enum mirrors a `CHECK (... IN (...))` constraint of the inspection
//! schema, so `as_db_str` must stay in lockstep with the DDL.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTITY TYPE
// ============================================================================

/// Entity type discriminator, used in storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Study,
    Artifact,
    ArtifactHead,
    StudyEmbedding,
}

impl EntityType {
    /// Backing table for this entity.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityType::Study => "studies",
            EntityType::Artifact => "artifacts",
            EntityType::ArtifactHead => "artifact_heads",
            EntityType::StudyEmbedding => "study_embeddings",
        }
    }
}

// ============================================================================
// ARTIFACT STATUS
// ============================================================================

/// Lifecycle status of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    #[default]
    Draft,
    Proposed,
    Approved,
    Archived,
}

impl ArtifactStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Draft => "draft",
            ArtifactStatus::Proposed => "proposed",
            ArtifactStatus::Approved => "approved",
            ArtifactStatus::Archived => "archived",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ArtifactStatus::Draft),
            "proposed" => Ok(ArtifactStatus::Proposed),
            "approved" => Ok(ArtifactStatus::Approved),
            "archived" => Ok(ArtifactStatus::Archived),
            _ => Err(EnumParseError::new("artifact status", s)),
        }
    }
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for ArtifactStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

// ============================================================================
// WORKSPACE
// ============================================================================

/// Workspace an artifact lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workspace {
    Roots,
    Prod,
}

impl Workspace {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Workspace::Roots => "roots",
            Workspace::Prod => "prod",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        match s.to_lowercase().as_str() {
            "roots" => Ok(Workspace::Roots),
            "prod" => Ok(Workspace::Prod),
            _ => Err(EnumParseError::new("workspace", s)),
        }
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for Workspace {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

// ============================================================================
// HEAD SCOPE
// ============================================================================

/// Visibility scope of an artifact head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadScope {
    Global,
    Org,
    User,
}

impl HeadScope {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            HeadScope::Global => "global",
            HeadScope::Org => "org",
            HeadScope::User => "user",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        match s.to_lowercase().as_str() {
            "global" => Ok(HeadScope::Global),
            "org" => Ok(HeadScope::Org),
            "user" => Ok(HeadScope::User),
            _ => Err(EnumParseError::new("head scope", s)),
        }
    }
}

impl fmt::Display for HeadScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for HeadScope {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

// ============================================================================
// PARSE ERROR
// ============================================================================

/// Error when parsing an enum from its database string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

impl EnumParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for EnumParseError {}
