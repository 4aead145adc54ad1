//! Serializable error report
//!
//! The shape callers hand to their clients when a persistence operation fails.
//! Validation failures carry the individual violations instead of a message.

use crate::error::{ErrorKind, PersistError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-facing description of a [`PersistError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// When the failure was reported
    pub timestamp: DateTime<Utc>,
    /// Error discriminant
    pub kind: ErrorKind,
    /// Entity descriptor, when the error names one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Rendered message; absent for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Individual violations of a validation failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
}

impl ErrorReport {
    /// Build a report for `error` stamped with `now`
    pub fn from_error(error: &PersistError, now: DateTime<Utc>) -> Self {
        let (message, validation_errors) = match error {
            PersistError::Validation { violations, .. } => (None, Some(violations.clone())),
            other => (Some(other.to_string()), None),
        };

        ErrorReport {
            timestamp: now,
            kind: error.kind(),
            entity: error.entity().map(str::to_string),
            message,
            validation_errors,
        }
    }
}
