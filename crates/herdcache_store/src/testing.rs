// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Mock store implementation for testing.
//!
//! This module provides `MockStore`, an unbounded in-memory store that records every
//! operation so tests can verify exactly how a group used its store.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{ByteView, LocalStore};

/// Recorded store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// A get was performed with the given key.
    Get(String),
    /// An add was performed with the given key and value.
    Add {
        /// The key that was added.
        key: String,
        /// The value that was added.
        value: ByteView,
    },
}

/// A recording mock store for testing.
///
/// Clones share the same data and operation log.
///
/// # Examples
///
/// ```
/// use herdcache_store::testing::{MockStore, StoreOp};
/// use herdcache_store::{ByteView, LocalStore};
///
/// let store = MockStore::new();
/// store.add("Tom", ByteView::from("630"));
/// assert_eq!(store.get("Tom").unwrap(), "630");
///
/// assert_eq!(
///     store.operations(),
///     vec![
///         StoreOp::Add { key: "Tom".to_string(), value: ByteView::from("630") },
///         StoreOp::Get("Tom".to_string()),
///     ]
/// );
/// ```
#[derive(Clone, Default)]
pub struct MockStore {
    data: Arc<Mutex<HashMap<String, ByteView>>>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
}

impl std::fmt::Debug for MockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("entries", &self.data.lock().len())
            .field("operations", &self.operations.lock().len())
            .finish()
    }
}

impl MockStore {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock store with pre-populated data.
    ///
    /// Seeding is not recorded as an operation.
    #[must_use]
    pub fn with_data<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ByteView>,
    {
        let data = data.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self {
            data: Arc::new(Mutex::new(data)),
            operations: Arc::default(),
        }
    }

    /// Returns true if the store contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Returns the number of entries in the store.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().clone()
    }

    /// Returns the number of recorded add operations.
    #[must_use]
    pub fn add_count(&self) -> usize {
        self.operations
            .lock()
            .iter()
            .filter(|op| matches!(op, StoreOp::Add { .. }))
            .count()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }
}

impl LocalStore for MockStore {
    fn get(&self, key: &str) -> Option<ByteView> {
        self.operations.lock().push(StoreOp::Get(key.to_owned()));
        self.data.lock().get(key).cloned()
    }

    fn add(&self, key: &str, value: ByteView) {
        self.operations.lock().push(StoreOp::Add {
            key: key.to_owned(),
            value: value.clone(),
        });
        self.data.lock().insert(key.to_owned(), value);
    }

    fn len(&self) -> Option<u64> {
        Some(self.data.lock().len() as u64)
    }
}
