//! Collaborator contracts for storage and transactions
//!
//! The orchestration layer only talks to storage through these two traits.
//! `Repository` is the per-transaction view of one record table; the
//! `TransactionManager` hands out such views inside a unit of work that is
//! committed when the closure returns `Ok` and rolled back otherwise.
//!
//! Implementations must be safe to share across threads; each transaction
//! context is owned by a single thread for its lifetime.

use crate::contract::VersionedRecord;
use crate::error::Result;

/// Transactional view of one record table
///
/// Reads see the writes already staged in the same transaction. Deferred
/// writes ([`save`](Repository::save)) are version-checked at commit;
/// flushed writes ([`save_and_flush`](Repository::save_and_flush)) are
/// version-checked immediately, so their conflicts surface before the
/// orchestrator builds its response.
///
/// The trait is object-safe so dependency resolvers can take a
/// `&mut dyn Repository<R>`.
pub trait Repository<R: VersionedRecord> {
    /// Look up a record by key, inactive records included
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is no longer active.
    fn find_by_id(&self, id: &R::Key) -> Result<Option<R>>;

    /// Every visible record, in key order
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is no longer active.
    fn find_all(&self) -> Result<Vec<R>>;

    /// Stage an insert or update, checked at commit
    ///
    /// Records without a key are inserted under a freshly generated key.
    /// Returns the record as it will be stored.
    ///
    /// # Errors
    ///
    /// - [`PersistError::AlreadyExists`](crate::PersistError::AlreadyExists)
    ///   when inserting a key that is already visible
    /// - [`PersistError::Transaction`](crate::PersistError::Transaction) if the
    ///   transaction is no longer active
    fn save(&mut self, record: R) -> Result<R>;

    /// Insert or update with an immediate version check
    ///
    /// An update must carry the version currently visible; the stored copy
    /// gets that version plus one.
    ///
    /// # Errors
    ///
    /// - [`PersistError::ConcurrencyConflict`](crate::PersistError::ConcurrencyConflict)
    ///   when the carried version is stale or the record is gone
    /// - [`PersistError::AlreadyExists`](crate::PersistError::AlreadyExists)
    ///   when inserting a key that is already visible
    fn save_and_flush(&mut self, record: R) -> Result<R>;

    /// [`save`](Repository::save) for each record, in order
    ///
    /// # Errors
    ///
    /// Stops at the first failing record.
    fn save_all(&mut self, records: Vec<R>) -> Result<Vec<R>> {
        records.into_iter().map(|record| self.save(record)).collect()
    }

    /// [`save_and_flush`](Repository::save_and_flush) for each record, in order
    ///
    /// # Errors
    ///
    /// Stops at the first failing record.
    fn save_all_and_flush(&mut self, records: Vec<R>) -> Result<Vec<R>> {
        records
            .into_iter()
            .map(|record| self.save_and_flush(record))
            .collect()
    }

    /// Delete by key; deleting a missing key is a no-op
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is no longer active.
    fn delete_by_id(&mut self, id: &R::Key) -> Result<()>;

    /// [`delete_by_id`](Repository::delete_by_id) for each key
    ///
    /// # Errors
    ///
    /// Stops at the first failing key.
    fn delete_all_by_id(&mut self, ids: &[R::Key]) -> Result<()> {
        for id in ids {
            self.delete_by_id(id)?;
        }
        Ok(())
    }
}

/// Runs units of work against a [`Repository`]
pub trait TransactionManager<R: VersionedRecord>: Send + Sync {
    /// Repository view handed to the unit of work
    type Context: Repository<R>;

    /// Run `f` in a fresh transaction
    ///
    /// Commits when `f` returns `Ok`; rolls back every staged write when it
    /// returns `Err` or when commit-time validation fails.
    ///
    /// # Errors
    ///
    /// The error returned by `f`, or the commit conflict.
    fn execute<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self::Context) -> Result<T>;
}
