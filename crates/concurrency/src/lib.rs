//! Concurrency layer for recordkit
//!
//! This crate implements optimistic concurrency control (OCC) over a
//! [`VersionedTable`](recordkit_storage::VersionedTable) with:
//! - TransactionContext: write-set tracking with read-your-writes
//! - Flush-time version checks for `save_and_flush`
//! - Commit-time validation (first-committer-wins) under the table lock
//! - TableTransactionManager: closure-based units of work with rollback
//!
//! Aborted transactions write nothing.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod transaction;
pub mod validation;

pub use manager::{TableTransactionManager, TransactionStats};
pub use transaction::{PendingOperations, TransactionContext, TransactionStatus};
pub use validation::{validate_write_set, Conflict, ValidationResult};
