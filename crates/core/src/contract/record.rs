//! Record traits
//!
//! `Identifiable` gives a record its key; `VersionedRecord` exposes the audit
//! block the storage and orchestration layers operate on. Entity types embed an
//! [`AuditFields`] and implement both traits with a few accessor lines:
//!
//! ```
//! use recordkit_core::{AuditFields, Identifiable, VersionedRecord};
//!
//! #[derive(Debug, Clone)]
//! struct Invoice {
//!     id: Option<u64>,
//!     total: i64,
//!     audit: AuditFields,
//! }
//!
//! impl Identifiable for Invoice {
//!     type Key = u64;
//!     fn id(&self) -> Option<&u64> {
//!         self.id.as_ref()
//!     }
//!     fn set_id(&mut self, id: u64) {
//!         self.id = Some(id);
//!     }
//! }
//!
//! impl VersionedRecord for Invoice {
//!     fn audit(&self) -> &AuditFields {
//!         &self.audit
//!     }
//!     fn audit_mut(&mut self) -> &mut AuditFields {
//!         &mut self.audit
//!     }
//! }
//! ```

use super::AuditFields;
use std::fmt::Debug;

/// A record addressed by a key
///
/// The key is `None` while the record is transient; storage assigns one on the
/// first persist when the caller did not.
pub trait Identifiable {
    /// Key type
    type Key: Clone + Ord + Debug + Send + Sync + 'static;

    /// The key, if one has been assigned
    fn id(&self) -> Option<&Self::Key>;

    /// Assign the key
    fn set_id(&mut self, id: Self::Key);
}

/// A persisted entity with optimistic-lock version and audit timestamps
pub trait VersionedRecord: Identifiable + Clone + Send + Sync + 'static {
    /// The audit block
    fn audit(&self) -> &AuditFields;

    /// Mutable access to the audit block
    fn audit_mut(&mut self) -> &mut AuditFields;

    /// Current optimistic-lock version
    #[inline]
    fn version_lock(&self) -> Option<u64> {
        self.audit().version_lock
    }

    /// `false` once soft-deleted
    #[inline]
    fn is_active(&self) -> bool {
        self.audit().active
    }
}
