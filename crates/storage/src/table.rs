//! VersionedTable: in-memory record table with version-guarded batch writes
//!
//! This module implements the storage primitive behind the transaction
//! manager using:
//! - `BTreeMap<K, R>` for key-ordered storage
//! - `parking_lot::RwLock` for thread-safe access
//! - a pluggable [`KeyGenerator`] for records inserted without a key
//!
//! # Design Notes
//!
//! - **No version history**: each key stores only its latest record
//! - **Record-carried versions**: the version checked by OCC is the record's
//!   own `version_lock`, not a table-wide counter
//! - **Validate and apply under one lock**: [`VersionedTable::lock`] hands out
//!   a [`TableWriteGuard`] so a transaction can check every guard and apply its
//!   whole write set before any other writer or reader gets in

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::debug;

use recordkit_core::{Clock, SystemClock, VersionedRecord};

use crate::config::{DeletePolicy, StoreConfig};
use crate::keys::KeyGenerator;
use crate::write::WriteOp;

/// Thread-safe table of the latest copy of each record
pub struct VersionedTable<R: VersionedRecord> {
    name: String,
    data: RwLock<BTreeMap<R::Key, R>>,
    keys: Box<dyn KeyGenerator<R::Key>>,
    delete_policy: DeletePolicy,
    clock: Arc<dyn Clock>,
}

impl<R: VersionedRecord> VersionedTable<R> {
    /// Empty table named after the record type, hard deletes, system clock
    pub fn new(keys: impl KeyGenerator<R::Key> + 'static) -> Self {
        Self::named(default_name::<R>(), keys)
    }

    /// Empty table with an explicit name
    pub fn named(name: impl Into<String>, keys: impl KeyGenerator<R::Key> + 'static) -> Self {
        Self {
            name: name.into(),
            data: RwLock::new(BTreeMap::new()),
            keys: Box::new(keys),
            delete_policy: DeletePolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Empty table configured from a `[store]` section
    pub fn from_config(config: &StoreConfig, keys: impl KeyGenerator<R::Key> + 'static) -> Self {
        let name = config.name.clone().unwrap_or_else(default_name::<R>);
        Self::named(name, keys).with_delete_policy(config.delete_policy)
    }

    /// Set the delete policy
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Set the clock used to stamp soft deletes
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delete policy
    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Clock used to stamp soft deletes
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Draw a fresh key from the table's generator
    pub fn next_key(&self) -> R::Key {
        self.keys.next_key()
    }

    /// Committed copy of the record under `key`
    pub fn get(&self, key: &R::Key) -> Option<R> {
        self.data.read().get(key).cloned()
    }

    /// Committed version of the record under `key`; `None` if not stored
    pub fn version_of(&self, key: &R::Key) -> Option<u64> {
        self.data.read().get(key).and_then(VersionedRecord::version_lock)
    }

    /// Is a record stored under `key`
    pub fn contains_key(&self, key: &R::Key) -> bool {
        self.data.read().contains_key(key)
    }

    /// Every committed record, in key order
    pub fn all(&self) -> Vec<R> {
        self.data.read().values().cloned().collect()
    }

    /// Number of stored records, inactive ones included
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// No records stored
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Take exclusive access to the table
    ///
    /// Readers block until the guard is dropped.
    pub fn lock(&self) -> TableWriteGuard<'_, R> {
        TableWriteGuard {
            name: &self.name,
            data: self.data.write(),
        }
    }
}

fn default_name<R>() -> String {
    let full = std::any::type_name::<R>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

impl<R: VersionedRecord> fmt::Debug for VersionedTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedTable")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("delete_policy", &self.delete_policy)
            .finish()
    }
}

/// Exclusive access to a [`VersionedTable`]
pub struct TableWriteGuard<'a, R: VersionedRecord> {
    name: &'a str,
    data: RwLockWriteGuard<'a, BTreeMap<R::Key, R>>,
}

impl<'a, R: VersionedRecord> TableWriteGuard<'a, R> {
    /// Table name
    pub fn name(&self) -> &str {
        self.name
    }

    /// Stored version of `key`; `None` if not stored
    pub fn version_of(&self, key: &R::Key) -> Option<u64> {
        self.data.get(key).and_then(VersionedRecord::version_lock)
    }

    /// Apply a write set in order
    ///
    /// Guards are not checked here; callers validate them first while holding
    /// the same guard. All operations become visible together when the guard
    /// is dropped.
    pub fn apply(&mut self, ops: Vec<WriteOp<R>>) {
        let (mut puts, mut deletes) = (0usize, 0usize);
        for op in ops {
            match op {
                WriteOp::Put { key, record, .. } => {
                    self.data.insert(key, record);
                    puts += 1;
                }
                WriteOp::Delete { key, .. } => {
                    self.data.remove(&key);
                    deletes += 1;
                }
            }
        }
        debug!(target: "recordkit::storage", table = self.name, puts, deletes, "Write set applied");
    }
}
