//! Transaction context for OCC
//!
//! A `TransactionContext` buffers the writes of one unit of work against a
//! [`VersionedTable`]. Nothing is visible to other transactions until the
//! manager commits it, validating and applying the whole write set under the
//! table lock. Closures only ever get the context to read and stage writes.
//!
//! # Read-Your-Writes Semantics
//!
//! When reading a key, the transaction checks in order:
//! 1. **write set**: the staged record, or nothing for a staged delete
//! 2. **table**: the committed record
//!
//! # Version Guards
//!
//! Every staged write remembers the committed version it expects to replace
//! (`None` for an insert). The guard is taken the first time the transaction
//! touches a key and kept across later writes to the same key, so commit
//! checks against what the table held when this transaction first saw it.
//!
//! - `save` on an untouched key defers the check: the guard is the version the
//!   record claims, verified at commit
//! - `save_and_flush`, and any write to a key already in the write set, checks
//!   the claimed version against the visible one immediately
//!
//! # Lifecycle
//!
//! `Active` → `Validating` → `Committed`, or `Aborted` from either of the first
//! two. Terminal states accept no further operations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use recordkit_core::lifecycle::mark_inactive;
use recordkit_core::{PersistError, Repository, Result, VersionedRecord, INITIAL_VERSION};
use recordkit_storage::{DeletePolicy, VersionedTable, WriteOp};

use crate::validation::validate_write_set;

/// Status of a transaction in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Transaction is executing, can read/write
    Active,
    /// Transaction is being validated for conflicts
    Validating,
    /// Transaction committed successfully
    Committed,
    /// Transaction was aborted
    Aborted {
        /// Human-readable reason for abort
        reason: String,
    },
}

/// Summary of buffered operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOperations {
    /// Staged inserts and updates
    pub puts: usize,
    /// Staged deletes
    pub deletes: usize,
}

impl PendingOperations {
    /// Total number of pending operations
    pub fn total(&self) -> usize {
        self.puts + self.deletes
    }

    /// Nothing staged
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[derive(Debug, Clone)]
enum Staged<R> {
    Put(R),
    Delete,
}

#[derive(Debug, Clone)]
struct Pending<R> {
    staged: Staged<R>,
    guard: Option<u64>,
}

/// Write mode of a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Deferred,
    Flush,
}

/// One unit of work against a single table
pub struct TransactionContext<R: VersionedRecord> {
    txn_id: u64,
    status: TransactionStatus,
    table: Arc<VersionedTable<R>>,
    writes: BTreeMap<R::Key, Pending<R>>,
    start_time: Instant,
}

impl<R: VersionedRecord> TransactionContext<R> {
    /// Start a transaction on `table`
    pub(crate) fn new(txn_id: u64, table: Arc<VersionedTable<R>>) -> Self {
        Self {
            txn_id,
            status: TransactionStatus::Active,
            table,
            writes: BTreeMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Unique transaction ID
    pub fn txn_id(&self) -> u64 {
        self.txn_id
    }

    /// Current transaction status
    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    /// The table this transaction writes to
    pub fn table(&self) -> &Arc<VersionedTable<R>> {
        &self.table
    }

    // === Reads ===

    /// Record under `key` as seen by this transaction
    ///
    /// # Errors
    ///
    /// [`PersistError::Transaction`] if the transaction is not active.
    pub fn get(&self, key: &R::Key) -> Result<Option<R>> {
        self.ensure_active()?;
        Ok(self.visible(key))
    }

    /// Every record seen by this transaction, in key order
    ///
    /// # Errors
    ///
    /// [`PersistError::Transaction`] if the transaction is not active.
    pub fn scan(&self) -> Result<Vec<R>> {
        self.ensure_active()?;

        let mut merged: BTreeMap<R::Key, R> = self
            .table
            .all()
            .into_iter()
            .filter_map(|record| record.id().cloned().map(|key| (key, record)))
            .collect();

        for (key, pending) in &self.writes {
            match &pending.staged {
                Staged::Put(record) => {
                    merged.insert(key.clone(), record.clone());
                }
                Staged::Delete => {
                    merged.remove(key);
                }
            }
        }

        Ok(merged.into_values().collect())
    }

    fn visible(&self, key: &R::Key) -> Option<R> {
        match self.writes.get(key) {
            Some(Pending {
                staged: Staged::Put(record),
                ..
            }) => Some(record.clone()),
            Some(Pending {
                staged: Staged::Delete,
                ..
            }) => None,
            None => self.table.get(key),
        }
    }

    fn visible_version(&self, key: &R::Key) -> Option<u64> {
        match self.writes.get(key) {
            Some(Pending {
                staged: Staged::Put(record),
                ..
            }) => record.version_lock(),
            Some(Pending {
                staged: Staged::Delete,
                ..
            }) => None,
            None => self.table.version_of(key),
        }
    }

    /// Committed version this transaction expects to replace
    fn base_guard(&self, key: &R::Key) -> Option<u64> {
        match self.writes.get(key) {
            Some(pending) => pending.guard,
            None => self.table.version_of(key),
        }
    }

    /// Version following `current`; a version at `u64::MAX` cannot advance
    fn next_version(&self, key: &R::Key, current: u64) -> Result<u64> {
        current
            .checked_add(1)
            .ok_or_else(|| PersistError::conflict(self.table.name(), key, Some(current), None))
    }

    // === Writes ===

    /// Stage an insert or update; version checked at commit
    ///
    /// A record without a key, or whose key this transaction cannot see, is
    /// inserted at version 1. Otherwise it replaces the visible record and
    /// must carry that record's version.
    ///
    /// # Errors
    ///
    /// - [`PersistError::ConcurrencyConflict`] when the record carries no
    ///   version, or a stale one for a key already written in this transaction
    /// - [`PersistError::Transaction`] if the transaction is not active
    pub fn save(&mut self, record: R) -> Result<R> {
        self.stage_put(record, Check::Deferred)
    }

    /// Stage an insert or update with an immediate version check
    ///
    /// # Errors
    ///
    /// - [`PersistError::ConcurrencyConflict`] when the carried version does
    ///   not match the visible one
    /// - [`PersistError::Transaction`] if the transaction is not active
    pub fn save_and_flush(&mut self, record: R) -> Result<R> {
        self.stage_put(record, Check::Flush)
    }

    fn stage_put(&mut self, mut record: R, check: Check) -> Result<R> {
        self.ensure_active()?;

        let key = match record.id() {
            Some(key) => key.clone(),
            None => {
                let key = self.table.next_key();
                record.set_id(key.clone());
                key
            }
        };

        let claimed = record.version_lock();
        let (version, guard) = match self.visible_version(&key) {
            None => match self.base_guard(&key) {
                // Deleted earlier in this transaction; the key keeps counting
                Some(replaced) => (self.next_version(&key, replaced)?, Some(replaced)),
                None => (INITIAL_VERSION, None),
            },
            Some(current) => {
                let touched = self.writes.contains_key(&key);
                if claimed.is_none() || check == Check::Flush || touched {
                    if claimed != Some(current) {
                        return Err(PersistError::conflict(
                            self.table.name(),
                            &key,
                            claimed,
                            Some(current),
                        ));
                    }
                    (self.next_version(&key, current)?, self.base_guard(&key))
                } else {
                    // Untouched key: the claimed version is checked at commit
                    let expected = claimed.unwrap_or(current);
                    (self.next_version(&key, expected)?, Some(expected))
                }
            }
        };

        record.audit_mut().version_lock = Some(version);
        self.writes.insert(
            key,
            Pending {
                staged: Staged::Put(record.clone()),
                guard,
            },
        );
        Ok(record)
    }

    /// Stage a delete; a key this transaction cannot see is ignored
    ///
    /// Under [`DeletePolicy::Soft`] the record is kept, marked inactive and its
    /// version bumped; deleting an already inactive record changes nothing.
    ///
    /// # Errors
    ///
    /// [`PersistError::Transaction`] if the transaction is not active.
    pub fn delete(&mut self, key: &R::Key) -> Result<()> {
        self.ensure_active()?;

        let current = match self.visible(key) {
            Some(record) => record,
            None => return Ok(()),
        };
        let guard = self.base_guard(key);

        match self.table.delete_policy() {
            DeletePolicy::Hard => {
                if guard.is_none() {
                    // Inserted by this transaction; drop the staged insert
                    self.writes.remove(key);
                } else {
                    self.writes.insert(
                        key.clone(),
                        Pending {
                            staged: Staged::Delete,
                            guard,
                        },
                    );
                }
            }
            DeletePolicy::Soft => {
                if !current.is_active() {
                    return Ok(());
                }
                let mut record = current;
                let now = self.table.clock().now();
                mark_inactive(record.audit_mut(), now);
                let next = match record.version_lock() {
                    Some(version) => self.next_version(key, version)?,
                    None => INITIAL_VERSION,
                };
                record.audit_mut().version_lock = Some(next);
                self.writes.insert(
                    key.clone(),
                    Pending {
                        staged: Staged::Put(record),
                        guard,
                    },
                );
            }
        }
        Ok(())
    }

    // === State ===

    /// Is the transaction accepting operations
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// Did the transaction commit
    pub fn is_committed(&self) -> bool {
        self.status == TransactionStatus::Committed
    }

    /// Was the transaction aborted
    pub fn is_aborted(&self) -> bool {
        matches!(self.status, TransactionStatus::Aborted { .. })
    }

    /// Reason given when the transaction was aborted
    pub fn abort_reason(&self) -> Option<&str> {
        match &self.status {
            TransactionStatus::Aborted { reason } => Some(reason),
            _ => None,
        }
    }

    /// Time since the transaction started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Fail unless the transaction is `Active`
    ///
    /// # Errors
    ///
    /// [`PersistError::Transaction`] naming the current state.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(PersistError::Transaction(format!(
                "transaction {} is {:?}, not active",
                self.txn_id, self.status
            )))
        }
    }

    /// Counts of buffered operations
    pub fn pending_operations(&self) -> PendingOperations {
        let deletes = self
            .writes
            .values()
            .filter(|pending| matches!(pending.staged, Staged::Delete))
            .count();
        PendingOperations {
            puts: self.writes.len() - deletes,
            deletes,
        }
    }

    /// Nothing staged
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    /// Abort and discard every staged write
    ///
    /// # Errors
    ///
    /// [`PersistError::Transaction`] if the transaction already committed or
    /// aborted.
    pub(crate) fn mark_aborted(&mut self, reason: String) -> Result<()> {
        match &self.status {
            TransactionStatus::Committed => Err(PersistError::Transaction(format!(
                "cannot abort committed transaction {}",
                self.txn_id
            ))),
            TransactionStatus::Aborted { .. } => Err(PersistError::Transaction(format!(
                "transaction {} already aborted",
                self.txn_id
            ))),
            _ => {
                self.status = TransactionStatus::Aborted { reason };
                self.writes.clear();
                Ok(())
            }
        }
    }

    // === Commit ===

    /// Validate the write set against the table and apply it atomically
    ///
    /// On a conflict the transaction is aborted and nothing is written.
    ///
    /// # Errors
    ///
    /// - [`PersistError::ConcurrencyConflict`] for the first stale guard
    /// - [`PersistError::AlreadyExists`] when another transaction inserted
    ///   the same key first
    /// - [`PersistError::Transaction`] if the transaction is not active
    pub(crate) fn commit(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.status = TransactionStatus::Validating;

        let ops: Vec<WriteOp<R>> = std::mem::take(&mut self.writes)
            .into_iter()
            .map(|(key, pending)| match pending.staged {
                Staged::Put(record) => WriteOp::Put {
                    key,
                    record,
                    guard: pending.guard,
                },
                Staged::Delete => WriteOp::Delete {
                    key,
                    guard: pending.guard,
                },
            })
            .collect();

        if ops.is_empty() {
            self.status = TransactionStatus::Committed;
            return Ok(());
        }

        let mut guard = self.table.lock();
        let result = validate_write_set(&ops, &guard);
        if let Some(conflict) = result.into_first() {
            drop(guard);
            let error = conflict.into_error(self.table.name());
            self.status = TransactionStatus::Aborted {
                reason: error.to_string(),
            };
            return Err(error);
        }

        guard.apply(ops);
        self.status = TransactionStatus::Committed;
        Ok(())
    }
}

impl<R: VersionedRecord> Repository<R> for TransactionContext<R> {
    fn find_by_id(&self, id: &R::Key) -> Result<Option<R>> {
        self.get(id)
    }

    fn find_all(&self) -> Result<Vec<R>> {
        self.scan()
    }

    fn save(&mut self, record: R) -> Result<R> {
        TransactionContext::save(self, record)
    }

    fn save_and_flush(&mut self, record: R) -> Result<R> {
        TransactionContext::save_and_flush(self, record)
    }

    fn delete_by_id(&mut self, id: &R::Key) -> Result<()> {
        self.delete(id)
    }
}
