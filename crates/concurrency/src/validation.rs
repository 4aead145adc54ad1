//! Commit-time validation for OCC
//!
//! Rules:
//! - First-committer-wins: every staged write names the version it expects
//!   to find in the table; any mismatch aborts the whole transaction
//! - An insert expects the key to be absent
//! - Validation and application happen under the same table write lock, so
//!   nothing can slip in between the check and the write

use recordkit_core::{PersistError, VersionedRecord};
use recordkit_storage::{TableWriteGuard, WriteOp};
use std::fmt::Debug;

/// A staged write whose guard no longer holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict<K> {
    /// The key that conflicted
    pub key: K,
    /// Version the transaction expected (`None`: key must be absent)
    pub expected: Option<u64>,
    /// Version stored at validation time (`None`: key absent)
    pub current: Option<u64>,
}

impl<K: Debug> Conflict<K> {
    /// Error reported to the caller for this conflict
    ///
    /// Losing an insert race is [`PersistError::AlreadyExists`]; everything
    /// else is [`PersistError::ConcurrencyConflict`].
    pub fn into_error(self, entity: &str) -> PersistError {
        match self.expected {
            None => PersistError::already_exists(entity, &self.key),
            Some(_) => PersistError::conflict(entity, &self.key, self.expected, self.current),
        }
    }
}

/// Result of transaction validation
///
/// A transaction commits only if [`is_valid`](ValidationResult::is_valid).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult<K> {
    /// All conflicts detected
    pub conflicts: Vec<Conflict<K>>,
}

impl<K> ValidationResult<K> {
    /// No conflicts
    pub fn ok() -> Self {
        ValidationResult {
            conflicts: Vec::new(),
        }
    }

    /// Did validation pass
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Number of conflicts
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    /// First conflict in write-set order
    pub fn into_first(self) -> Option<Conflict<K>> {
        self.conflicts.into_iter().next()
    }
}

/// Check every operation's guard against the locked table
pub fn validate_write_set<R: VersionedRecord>(
    ops: &[WriteOp<R>],
    table: &TableWriteGuard<'_, R>,
) -> ValidationResult<R::Key> {
    let conflicts = ops
        .iter()
        .filter_map(|op| {
            let current = table.version_of(op.key());
            (current != op.guard()).then(|| Conflict {
                key: op.key().clone(),
                expected: op.guard(),
                current,
            })
        })
        .collect();
    ValidationResult { conflicts }
}
