//! Key generators
//!
//! A table assigns a key to every record inserted without one. Keys are handed
//! out before the enclosing transaction commits, so a rolled-back insert burns
//! its key; sequences have gaps but never repeat.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of fresh record keys
pub trait KeyGenerator<K>: Send + Sync {
    /// Next unused key
    fn next_key(&self) -> K;
}

/// Monotonic `u64` keys, starting at 1 by default
#[derive(Debug)]
pub struct SequentialKeys {
    next: AtomicU64,
}

impl SequentialKeys {
    /// Sequence starting at 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Sequence whose first key is `first`
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Key the next call to `next_key` will return
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for SequentialKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator<u64> for SequentialKeys {
    fn next_key(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

/// Random v4 UUID keys
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeys;

impl KeyGenerator<Uuid> for UuidKeys {
    fn next_key(&self) -> Uuid {
        Uuid::new_v4()
    }
}

impl<K, F> KeyGenerator<K> for F
where
    F: Fn() -> K + Send + Sync,
{
    fn next_key(&self) -> K {
        self()
    }
}
