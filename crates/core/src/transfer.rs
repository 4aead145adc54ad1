//! Transfer-object metadata
//!
//! Transfer objects carry a copy of the record's audit block with timestamps
//! encoded as ISO-8601 strings, so clients can round-trip them:
//!
//! ```json
//! {"versionLock": 2, "active": true,
//!  "createdAt": "2024-01-01T00:00:00Z", "modifiedAt": "2024-01-02T10:00:00Z",
//!  "modifiedBy": 17}
//! ```
//!
//! [`apply_metadata`] and [`metadata_from`] are the helpers assemblers use to
//! move this block between a transfer object and a record.

use crate::contract::{ActorId, AuditFields};
use crate::error::{PersistError, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Wire-facing copy of [`AuditFields`]
///
/// Unknown fields are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferMetadata {
    /// Version the client read the record under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_lock: Option<u64>,

    /// Soft-delete flag
    pub active: bool,

    /// Creation instant, ISO-8601
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Last modification instant, ISO-8601
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,

    /// Actor of the last modification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<ActorId>,
}

/// A transfer object handled by the orchestrator
pub trait TransferObject {
    /// Key type of the record this object represents
    type Key: Debug;

    /// Identifier carried by the object; `None` for objects describing a new record
    fn transfer_id(&self) -> Option<&Self::Key>;
}

/// Copy transfer metadata onto a record's audit block
///
/// Copies `version_lock`, `modified_by` and any non-blank timestamp. `active` is
/// server-controlled and never taken from the client.
///
/// # Errors
///
/// [`PersistError::Assembly`] naming the offending field when a timestamp is
/// not an ISO-8601 date-time.
pub fn apply_metadata(metadata: &TransferMetadata, audit: &mut AuditFields) -> Result<()> {
    audit.version_lock = metadata.version_lock;
    if metadata.modified_by.is_some() {
        audit.modified_by = metadata.modified_by;
    }
    if let Some(created_at) = parse_instant("createdAt", metadata.created_at.as_deref())? {
        audit.created_at = Some(created_at);
    }
    if let Some(modified_at) = parse_instant("modifiedAt", metadata.modified_at.as_deref())? {
        audit.modified_at = Some(modified_at);
    }
    Ok(())
}

/// Build transfer metadata from a record's audit block
///
/// Timestamps are rendered as UTC instants with a `Z` suffix.
pub fn metadata_from(audit: &AuditFields) -> TransferMetadata {
    TransferMetadata {
        version_lock: audit.version_lock,
        active: audit.active,
        created_at: audit.created_at.map(format_instant),
        modified_at: audit.modified_at.map(format_instant),
        modified_by: audit.modified_by,
    }
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_instant(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }

    // Zone-less date-times are read as UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| {
            PersistError::assembly_field(
                "record",
                field,
                format!("'{}' is not an ISO-8601 date-time: {}", raw, e),
            )
        })
}
