//! Transaction manager for closure-based units of work
//!
//! ## Execution Sequence
//!
//! ```text
//! 1. allocate txn_id, record start
//! 2. run the closure against a fresh TransactionContext
//! 3. IF the closure failed: mark_aborted() and return its error
//! 4. commit() - validate guards and apply the write set under the table lock
//! 5. IF validation failed: the context is already aborted; return the conflict
//! ```
//!
//! There are no retries: a conflict is reported to the caller as is.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use recordkit_core::{Result, TransactionManager, VersionedRecord};
use recordkit_storage::VersionedTable;
use tracing::{debug, warn};

use crate::transaction::TransactionContext;

/// Transaction counters
///
/// The counters use Relaxed ordering: they are observational only and do not
/// synchronize any other memory operations.
#[derive(Debug, Default)]
pub struct TransactionStats {
    started: AtomicU64,
    committed: AtomicU64,
    aborted: AtomicU64,
}

impl TransactionStats {
    /// Transactions started
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// Transactions committed
    pub fn committed(&self) -> u64 {
        self.committed.load(Ordering::Relaxed)
    }

    /// Transactions aborted, by the closure or by a conflict
    pub fn aborted(&self) -> u64 {
        self.aborted.load(Ordering::Relaxed)
    }

    /// Committed share of finished transactions, 0.0 when none finished
    pub fn commit_rate(&self) -> f64 {
        let committed = self.committed();
        let finished = committed + self.aborted();
        if finished == 0 {
            0.0
        } else {
            committed as f64 / finished as f64
        }
    }

    fn record_start(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_abort(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }
}

/// Runs units of work against one [`VersionedTable`]
pub struct TableTransactionManager<R: VersionedRecord> {
    table: Arc<VersionedTable<R>>,
    next_txn_id: AtomicU64,
    stats: TransactionStats,
}

impl<R: VersionedRecord> TableTransactionManager<R> {
    /// Manager over `table`
    pub fn new(table: Arc<VersionedTable<R>>) -> Self {
        Self {
            table,
            next_txn_id: AtomicU64::new(1),
            stats: TransactionStats::default(),
        }
    }

    /// The managed table
    pub fn table(&self) -> &Arc<VersionedTable<R>> {
        &self.table
    }

    /// Transaction counters
    pub fn stats(&self) -> &TransactionStats {
        &self.stats
    }

    /// Start a transaction without running it
    ///
    /// Only [`execute`](TransactionManager::execute) ends a transaction, so
    /// closures see a context they cannot commit or abort themselves.
    pub(crate) fn begin(&self) -> TransactionContext<R> {
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::SeqCst);
        TransactionContext::new(txn_id, Arc::clone(&self.table))
    }

    fn run_single_attempt<T>(&self, txn: &mut TransactionContext<R>, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => match txn.commit() {
                Ok(()) => {
                    self.stats.record_commit();
                    debug!(target: "recordkit::txn", txn_id = txn.txn_id(), table = self.table.name(), "Transaction committed");
                    Ok(value)
                }
                Err(e) => {
                    self.stats.record_abort();
                    warn!(target: "recordkit::txn", txn_id = txn.txn_id(), table = self.table.name(), error = %e, "Transaction aborted at commit");
                    Err(e)
                }
            },
            Err(e) => {
                self.stats.record_abort();
                if let Err(ended) = txn.mark_aborted(format!("closure error: {}", e)) {
                    warn!(target: "recordkit::txn", txn_id = txn.txn_id(), table = self.table.name(), error = %e, "Transaction ended before the closure failed");
                    return Err(ended);
                }
                debug!(target: "recordkit::txn", txn_id = txn.txn_id(), table = self.table.name(), error = %e, "Transaction rolled back");
                Err(e)
            }
        }
    }
}

impl<R: VersionedRecord> TransactionManager<R> for TableTransactionManager<R> {
    type Context = TransactionContext<R>;

    fn execute<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self::Context) -> Result<T>,
    {
        let mut txn = self.begin();
        self.stats.record_start();
        debug!(target: "recordkit::txn", txn_id = txn.txn_id(), table = self.table.name(), "Transaction started");

        let result = f(&mut txn);
        self.run_single_attempt(&mut txn, result)
    }
}

impl<R: VersionedRecord> fmt::Debug for TableTransactionManager<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableTransactionManager")
            .field("table", &self.table.name())
            .field("stats", &self.stats)
            .finish()
    }
}
