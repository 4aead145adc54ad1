//! Audit block carried by every versioned record
//!
//! ## Invariants
//!
//! - `version_lock` is `Some(1)` after the first persist and only grows afterwards
//! - `created_at <= modified_at` whenever both are set
//! - `created_at` never changes once the record has been persisted
//! - `modified_by` is never empty on a persisted record (defaults to [`SYSTEM_ACTOR`])

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the actor that performed the last modification
pub type ActorId = u64;

/// Actor recorded when a write does not name one
pub const SYSTEM_ACTOR: ActorId = 0;

/// Version assigned to a record on its first persist
pub const INITIAL_VERSION: u64 = 1;

/// Version lock, soft-delete flag and audit timestamps of a record
///
/// A transient record has no version and no timestamps. The lifecycle hooks in
/// [`crate::lifecycle`] fill them in at the pipeline points where a record is
/// created or updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    /// Optimistic-lock version, assigned by the storage layer
    pub version_lock: Option<u64>,

    /// `false` once the record has been soft-deleted
    pub active: bool,

    /// Instant of the first persist (UTC)
    pub created_at: Option<DateTime<Utc>>,

    /// Instant of the last persisted write (UTC)
    pub modified_at: Option<DateTime<Utc>>,

    /// Actor of the last persisted write
    pub modified_by: Option<ActorId>,
}

impl AuditFields {
    /// Audit block of a transient record
    pub const fn transient() -> Self {
        AuditFields {
            version_lock: None,
            active: true,
            created_at: None,
            modified_at: None,
            modified_by: None,
        }
    }

    /// Audit block carrying only a client-supplied version
    pub const fn with_version(version: u64) -> Self {
        AuditFields {
            version_lock: Some(version),
            ..Self::transient()
        }
    }

    /// Has this block been through a create hook
    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.version_lock.is_some() && self.created_at.is_some()
    }
}

impl Default for AuditFields {
    fn default() -> Self {
        Self::transient()
    }
}
