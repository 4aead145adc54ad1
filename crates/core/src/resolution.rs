//! Heterogeneous resolution map
//!
//! A `ResolutionMap` carries the auxiliary records an assembler needs to build a
//! domain record from a transfer object: a parent record, a lookup row, a
//! referenced owner. Each key holds exactly one value of a concrete type and
//! reads are type-checked:
//!
//! ```
//! use recordkit_core::{ResolutionError, ResolutionMap};
//!
//! let mut deps = ResolutionMap::new();
//! deps.put("owner", 42u64);
//!
//! assert_eq!(deps.get::<u64>("owner"), Ok(&42));
//! assert!(matches!(deps.get::<u64>("parent"), Err(ResolutionError::NotFound { .. })));
//! assert!(matches!(deps.get::<String>("owner"), Err(ResolutionError::TypeMismatch { .. })));
//! ```
//!
//! Maps are built fresh for each request batch, one per input transfer object,
//! and collected into a [`BatchResolution`]. They are consumed during assembly
//! and dropped with the request; they are never shared between requests.

use std::any::{type_name, Any};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// Failure to read a value from a [`ResolutionMap`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No value under the key
    #[error("no dependency found with the key '{key}'")]
    NotFound {
        /// The missing key
        key: String,
    },

    /// A value exists under the key but has another type
    #[error("dependency '{key}' holds a {found}, not the expected {expected}")]
    TypeMismatch {
        /// The key that was read
        key: String,
        /// Type requested by the reader
        expected: &'static str,
        /// Type actually stored
        found: &'static str,
    },
}

struct Entry {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

/// Type-checked, string-keyed bag of auxiliary values
#[derive(Default)]
pub struct ResolutionMap {
    entries: HashMap<String, Entry>,
}

impl ResolutionMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with a single entry
    pub fn from_entry<T: Any + Send>(key: impl Into<String>, value: T) -> Self {
        let mut map = Self::new();
        map.put(key, value);
        map
    }

    /// Map built from entries sharing one value type
    ///
    /// Later entries overwrite earlier ones with the same key.
    pub fn from_entries<K, T, I>(entries: I) -> Self
    where
        K: Into<String>,
        T: Any + Send,
        I: IntoIterator<Item = (K, T)>,
    {
        let mut map = Self::new();
        for (key, value) in entries {
            map.put(key, value);
        }
        map
    }

    /// Builder-style [`put`](Self::put)
    pub fn with<T: Any + Send>(mut self, key: impl Into<String>, value: T) -> Self {
        self.put(key, value);
        self
    }

    /// Associate `value` with `key`, replacing any previous value
    pub fn put<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(
            key.into(),
            Entry {
                value: Box::new(value),
                type_name: type_name::<T>(),
            },
        );
    }

    /// Borrow the value under `key` as a `T`
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::NotFound`] if nothing is stored under `key`
    /// - [`ResolutionError::TypeMismatch`] if the stored value is not a `T`
    pub fn get<T: Any>(&self, key: &str) -> Result<&T, ResolutionError> {
        let entry = self.entries.get(key).ok_or_else(|| ResolutionError::NotFound {
            key: key.to_string(),
        })?;

        entry
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| mismatch::<T>(key, entry))
    }

    /// Remove the value under `key` and return it as a `T`
    ///
    /// On a type mismatch the entry stays in the map.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn take<T: Any>(&mut self, key: &str) -> Result<T, ResolutionError> {
        match self.entries.get(key) {
            None => {
                return Err(ResolutionError::NotFound {
                    key: key.to_string(),
                })
            }
            Some(entry) if !entry.value.is::<T>() => return Err(mismatch::<T>(key, entry)),
            Some(_) => {}
        }

        let entry = self
            .entries
            .remove(key)
            .ok_or_else(|| ResolutionError::NotFound {
                key: key.to_string(),
            })?;
        let found = entry.type_name;
        entry
            .value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| ResolutionError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                found,
            })
    }

    /// Is anything stored under `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored keys, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn mismatch<T: Any>(key: &str, entry: &Entry) -> ResolutionError {
    ResolutionError::TypeMismatch {
        key: key.to_string(),
        expected: type_name::<T>(),
        found: entry.type_name,
    }
}

impl fmt::Debug for ResolutionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.as_str(), entry.type_name))
            .collect();
        entries.sort_unstable();
        f.debug_map().entries(entries).finish()
    }
}

/// Resolution maps for one request batch, indexed by position in the batch
///
/// An item without an entry resolves to an empty map, so an assembler that
/// needs a dependency fails with [`ResolutionError::NotFound`] rather than
/// silently building a partial record.
#[derive(Debug, Default)]
pub struct BatchResolution {
    maps: BTreeMap<usize, ResolutionMap>,
}

impl BatchResolution {
    /// Empty batch resolution
    pub fn new() -> Self {
        Self::default()
    }

    /// One map per item, in batch order
    pub fn from_maps(maps: impl IntoIterator<Item = ResolutionMap>) -> Self {
        Self {
            maps: maps.into_iter().enumerate().collect(),
        }
    }

    /// Set the map of the item at `index`
    pub fn insert(&mut self, index: usize, map: ResolutionMap) {
        self.maps.insert(index, map);
    }

    /// Map of the item at `index`, if one was resolved
    pub fn get(&self, index: usize) -> Option<&ResolutionMap> {
        self.maps.get(&index)
    }

    /// Take the map of the item at `index`; empty if none was resolved
    pub fn take(&mut self, index: usize) -> ResolutionMap {
        self.maps.remove(&index).unwrap_or_default()
    }

    /// Number of items with a map
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// No item has a map
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
