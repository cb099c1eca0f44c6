//! Error types for the TopicGraph engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole engine.
///
/// Validation, not-found and guard failures are local and recoverable: the
/// operation that returned them has not mutated anything, and callers are
/// expected to treat them as no-ops.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TopicGraphError {
    /// Input rejected before any mutation (empty title, empty name, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// An operation that would break a structural guarantee (e.g. deleting the last topic)
    #[error("Guard violation: {0}")]
    GuardViolation(String),

    /// The assistant-reply collaborator failed
    #[error("{0}")]
    Remote(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Migration error (persisted data could not be brought to the current schema)
    #[error("Migration error: {0}")]
    Migration(String),

    /// Durable store unavailable or write rejected
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TopicGraphError {
    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a GuardViolation error
    pub fn guard(message: impl Into<String>) -> Self {
        Self::GuardViolation(message.into())
    }

    /// Creates a Remote error
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates a Migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_guard_violation(&self) -> bool {
        matches!(self, Self::GuardViolation(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// True for failures that callers swallow as no-ops.
    ///
    /// Returns true for:
    /// - `Validation` errors
    /// - `NotFound` errors
    /// - `GuardViolation` errors
    pub fn is_benign(&self) -> bool {
        self.is_validation() || self.is_not_found() || self.is_guard_violation()
    }

    /// True for failures of the durable medium.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Serialization { .. } | Self::Migration(_) | Self::Persistence(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TopicGraphError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TopicGraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TopicGraphError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for TopicGraphError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::Serialization {
                    format: "migration".to_string(),
                    message: err.to_string(),
                }
            }
            _ => Self::Migration(err.to_string()),
        }
    }
}

/// A type alias for `Result<T, TopicGraphError>`.
pub type Result<T> = std::result::Result<T, TopicGraphError>;
