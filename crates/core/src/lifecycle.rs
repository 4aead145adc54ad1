//! Record lifecycle hooks
//!
//! ```text
//! Transient ──prepare_create──▶ Persisted/Active ──prepare_update──▶ Persisted/Active
//!                                      │
//!                                 mark_inactive
//!                                      ▼
//!                              Persisted/Inactive
//! ```
//!
//! The hooks are plain functions over [`AuditFields`]. They are invoked by the
//! orchestrator (and by the storage soft-delete policy) at fixed pipeline points;
//! nothing calls them implicitly.
//!
//! `modified_at` is clamped so that it always moves strictly forward, even when
//! the clock returns an instant at or before the previous modification.

use crate::contract::{AuditFields, INITIAL_VERSION, SYSTEM_ACTOR};
use chrono::{DateTime, Duration, Utc};

/// Pre-create hook
///
/// Forces `version_lock = 1`, `active = true` and
/// `created_at = modified_at = now`. An unset `modified_by` becomes
/// [`SYSTEM_ACTOR`].
pub fn prepare_create(audit: &mut AuditFields, now: DateTime<Utc>) {
    audit.version_lock = Some(INITIAL_VERSION);
    audit.active = true;
    audit.created_at = Some(now);
    audit.modified_at = Some(now);
    audit.modified_by.get_or_insert(SYSTEM_ACTOR);
}

/// Pre-update hook
///
/// Advances `modified_at` to `now` and defaults `modified_by`. `active` and
/// `created_at` are left as they are; the caller must already have copied the
/// stored values in (see [`copy_common_fields`]).
pub fn prepare_update(audit: &mut AuditFields, now: DateTime<Utc>) {
    audit.modified_at = Some(next_modified_at(audit, now));
    audit.modified_by.get_or_insert(SYSTEM_ACTOR);
}

/// Soft-delete a record
pub fn mark_inactive(audit: &mut AuditFields, now: DateTime<Utc>) {
    audit.active = false;
    audit.modified_at = Some(next_modified_at(audit, now));
}

/// Overwrite `active`, `created_at` and `modified_at` of `incoming` with the
/// stored values from `previous`
///
/// Stops a client payload from resurrecting a soft-deleted record, forging a
/// creation date or rewinding the audit trail.
pub fn copy_common_fields(previous: &AuditFields, incoming: &mut AuditFields) {
    incoming.active = previous.active;
    incoming.created_at = previous.created_at;
    incoming.modified_at = previous.modified_at;
}

fn next_modified_at(audit: &AuditFields, now: DateTime<Utc>) -> DateTime<Utc> {
    match audit.modified_at.max(audit.created_at) {
        Some(floor) if now <= floor => floor + Duration::microseconds(1),
        _ => now,
    }
}
