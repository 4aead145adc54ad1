//! Error types for recordkit
//!
//! Every failure surfaced by the orchestration pipeline is a [`PersistError`].
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Storage-level errors are raised with the storage table's name as the entity;
//! the orchestrator relabels them with its configured descriptor through
//! [`PersistError::with_entity`] before they reach the caller.

use crate::resolution::ResolutionError;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Result type alias for recordkit operations
pub type Result<T> = std::result::Result<T, PersistError>;

/// Error types for recordkit
#[derive(Debug, Error)]
pub enum PersistError {
    /// Transfer object rejected before any resolution or write
    #[error("validation failed for {entity}: {}", .violations.join("; "))]
    Validation {
        /// Entity descriptor
        entity: String,
        /// One message per violated rule
        violations: Vec<String>,
    },

    /// Auxiliary data missing from, or mistyped in, the resolution map
    #[error("dependency resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// Lookup by key found nothing
    #[error("{entity} entity was not found")]
    NotFound {
        /// Entity descriptor
        entity: String,
        /// Debug rendering of the key
        key: String,
    },

    /// Insert of a key that is already stored
    #[error("{entity} entity already exists")]
    AlreadyExists {
        /// Entity descriptor
        entity: String,
        /// Debug rendering of the key
        key: String,
    },

    /// Optimistic-lock version mismatch at write time
    #[error(
        "{entity} {key} was modified concurrently: expected version {}, found {}",
        display_version(.expected),
        display_version(.found)
    )]
    ConcurrencyConflict {
        /// Entity descriptor
        entity: String,
        /// Debug rendering of the key
        key: String,
        /// Version the writer read the record under
        expected: Option<u64>,
        /// Version currently stored (`None` if the record is gone)
        found: Option<u64>,
    },

    /// Minified projection could not be built
    #[error("cannot project {source_type} onto {target}: {reason}")]
    Projection {
        /// Source type name
        source_type: &'static str,
        /// Target type name
        target: &'static str,
        /// What went wrong
        reason: String,
    },

    /// Any other record-construction fault
    #[error("cannot assemble {entity}{}: {reason}", display_field(.field))]
    Assembly {
        /// Entity descriptor
        entity: String,
        /// Offending field, if known
        field: Option<String>,
        /// What went wrong
        reason: String,
    },

    /// Transaction used outside its valid state
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Discriminant of a [`PersistError`], stable across message changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// [`PersistError::Validation`]
    Validation,
    /// [`ResolutionError::NotFound`]
    Resolution,
    /// [`ResolutionError::TypeMismatch`]
    TypeMismatch,
    /// [`PersistError::NotFound`]
    NotFound,
    /// [`PersistError::AlreadyExists`]
    AlreadyExists,
    /// [`PersistError::ConcurrencyConflict`]
    ConcurrencyConflict,
    /// [`PersistError::Projection`]
    Projection,
    /// [`PersistError::Assembly`]
    Assembly,
    /// [`PersistError::Transaction`]
    Transaction,
    /// [`PersistError::Configuration`]
    Configuration,
}

fn display_version(version: &Option<u64>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

fn display_field(field: &Option<String>) -> String {
    match field {
        Some(f) => format!(" (field '{}')", f),
        None => String::new(),
    }
}

impl PersistError {
    /// Validation failure with the given violations
    pub fn validation(entity: impl Into<String>, violations: Vec<String>) -> Self {
        PersistError::Validation {
            entity: entity.into(),
            violations,
        }
    }

    /// Nothing stored under `key`
    pub fn not_found<K: Debug>(entity: impl Into<String>, key: &K) -> Self {
        PersistError::NotFound {
            entity: entity.into(),
            key: format!("{:?}", key),
        }
    }

    /// `key` is already stored
    pub fn already_exists<K: Debug>(entity: impl Into<String>, key: &K) -> Self {
        PersistError::AlreadyExists {
            entity: entity.into(),
            key: format!("{:?}", key),
        }
    }

    /// Version mismatch on `key`
    pub fn conflict<K: Debug>(
        entity: impl Into<String>,
        key: &K,
        expected: Option<u64>,
        found: Option<u64>,
    ) -> Self {
        PersistError::ConcurrencyConflict {
            entity: entity.into(),
            key: format!("{:?}", key),
            expected,
            found,
        }
    }

    /// Record construction failure not tied to a field
    pub fn assembly(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        PersistError::Assembly {
            entity: entity.into(),
            field: None,
            reason: reason.into(),
        }
    }

    /// Record construction failure on a specific field
    pub fn assembly_field(
        entity: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PersistError::Assembly {
            entity: entity.into(),
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    /// Projection of `S` onto `T` failed
    pub fn projection<S, T>(reason: impl Into<String>) -> Self {
        PersistError::Projection {
            source_type: std::any::type_name::<S>(),
            target: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// Stable discriminant
    pub fn kind(&self) -> ErrorKind {
        match self {
            PersistError::Validation { .. } => ErrorKind::Validation,
            PersistError::Resolution(ResolutionError::NotFound { .. }) => ErrorKind::Resolution,
            PersistError::Resolution(ResolutionError::TypeMismatch { .. }) => {
                ErrorKind::TypeMismatch
            }
            PersistError::NotFound { .. } => ErrorKind::NotFound,
            PersistError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            PersistError::ConcurrencyConflict { .. } => ErrorKind::ConcurrencyConflict,
            PersistError::Projection { .. } => ErrorKind::Projection,
            PersistError::Assembly { .. } => ErrorKind::Assembly,
            PersistError::Transaction(_) => ErrorKind::Transaction,
            PersistError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Is this an optimistic-lock conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, PersistError::ConcurrencyConflict { .. })
    }

    /// Is this a failed lookup by key
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistError::NotFound { .. })
    }

    /// Is this a validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, PersistError::Validation { .. })
    }

    /// Entity descriptor carried by the error, if any
    pub fn entity(&self) -> Option<&str> {
        match self {
            PersistError::Validation { entity, .. }
            | PersistError::NotFound { entity, .. }
            | PersistError::AlreadyExists { entity, .. }
            | PersistError::ConcurrencyConflict { entity, .. }
            | PersistError::Assembly { entity, .. } => Some(entity),
            _ => None,
        }
    }

    /// Replace the entity descriptor carried by the error
    pub fn with_entity(mut self, descriptor: &str) -> Self {
        match &mut self {
            PersistError::Validation { entity, .. }
            | PersistError::NotFound { entity, .. }
            | PersistError::AlreadyExists { entity, .. }
            | PersistError::ConcurrencyConflict { entity, .. }
            | PersistError::Assembly { entity, .. } => {
                *entity = descriptor.to_string();
            }
            _ => {}
        }
        self
    }
}
