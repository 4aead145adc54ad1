//! Table configuration
//!
//! Read from the `[store]` section of `recordkit.toml`:
//!
//! ```toml
//! [store]
//! name = "widgets"
//! delete_policy = "soft"
//! ```

use serde::{Deserialize, Serialize};

/// What `delete_by_id` does to a stored record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Remove the record
    #[default]
    Hard,
    /// Keep the record, mark it inactive and bump its version
    Soft,
}

/// Settings for one [`VersionedTable`](crate::VersionedTable)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Table name used in errors and logs; defaults to the record type name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Delete behavior
    pub delete_policy: DeletePolicy,
}
