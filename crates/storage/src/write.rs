//! Write operations applied to a table
//!
//! Each operation carries a version guard: the version the writer expects the
//! stored record to have when the operation is applied. `None` means the key
//! must not be stored at all (an insert).

use recordkit_core::VersionedRecord;

/// One staged write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp<R: VersionedRecord> {
    /// Store `record` under `key`, replacing any previous copy
    Put {
        /// Target key
        key: R::Key,
        /// Record to store, with its new version already set
        record: R,
        /// Expected stored version
        guard: Option<u64>,
    },
    /// Remove `key`
    Delete {
        /// Target key
        key: R::Key,
        /// Expected stored version
        guard: Option<u64>,
    },
}

impl<R: VersionedRecord> WriteOp<R> {
    /// Key the operation targets
    pub fn key(&self) -> &R::Key {
        match self {
            WriteOp::Put { key, .. } | WriteOp::Delete { key, .. } => key,
        }
    }

    /// Expected stored version
    pub fn guard(&self) -> Option<u64> {
        match self {
            WriteOp::Put { guard, .. } | WriteOp::Delete { guard, .. } => *guard,
        }
    }

    /// Is this a delete
    pub fn is_delete(&self) -> bool {
        matches!(self, WriteOp::Delete { .. })
    }
}
