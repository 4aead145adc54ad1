//! Storage layer for recordkit
//!
//! This crate implements the in-memory reference storage used behind the
//! transaction manager:
//! - VersionedTable: BTreeMap of records behind a `parking_lot::RwLock`
//! - TableWriteGuard: exclusive access used to validate and apply a write set
//! - Key generators: sequential `u64` keys and random UUID keys
//! - DeletePolicy / StoreConfig: hard or soft delete, table naming
//!
//! The table holds only the latest copy of each record; the record's own
//! `version_lock` is the version checked by optimistic concurrency control.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod keys;
pub mod table;
pub mod write;

pub use config::{DeletePolicy, StoreConfig};
pub use keys::{KeyGenerator, SequentialKeys, UuidKeys};
pub use table::{TableWriteGuard, VersionedTable};
pub use write::WriteOp;
