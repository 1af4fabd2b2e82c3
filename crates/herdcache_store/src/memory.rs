// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! In-memory store backed by moka.

use std::fmt;

use moka::{policy::EvictionPolicy, sync::Cache};

use crate::{ByteView, LocalStore, builder::InMemoryStoreBuilder};

/// A concurrent, byte-bounded in-memory store with LRU eviction.
///
/// Clones share the same underlying storage.
///
/// # Examples
///
/// ```
/// use herdcache_store::{ByteView, InMemoryStore, LocalStore};
///
/// let store = InMemoryStore::with_max_bytes(2048);
/// store.add("Tom", ByteView::from("630"));
///
/// assert_eq!(store.get("Tom").unwrap(), "630");
/// assert!(store.get("Jack").is_none());
/// ```
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Cache<String, ByteView>,
    max_bytes: u64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a new unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a store that holds at most `max_bytes` of keys and values.
    ///
    /// A budget of `0` means the store is unbounded.
    #[must_use]
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self::builder().max_bytes(max_bytes).build()
    }

    /// Creates a new builder for configuring a store.
    #[must_use]
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::new()
    }

    pub(crate) fn from_builder(builder: &InMemoryStoreBuilder) -> Self {
        let mut moka_builder = Cache::builder().eviction_policy(EvictionPolicy::lru());

        if builder.max_bytes > 0 {
            moka_builder = moka_builder
                .max_capacity(builder.max_bytes)
                .weigher(|key: &String, value: &ByteView| weight(key, value));
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: moka_builder.build(),
            max_bytes: builder.max_bytes,
        }
    }

    /// Returns the configured byte budget, `0` meaning unbounded.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Returns the total weight of resident entries in bytes.
    ///
    /// Like [`LocalStore::len`], the figure is eventually consistent; call
    /// [`run_pending_tasks`](Self::run_pending_tasks) first for an exact value.
    #[must_use]
    pub fn weighted_size(&self) -> u64 {
        self.inner.weighted_size()
    }

    /// Applies pending evictions and bookkeeping immediately.
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }
}

fn weight(key: &str, value: &ByteView) -> u32 {
    u32::try_from(key.len().saturating_add(value.len())).unwrap_or(u32::MAX)
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("name", &self.inner.name())
            .field("max_bytes", &self.max_bytes)
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

impl LocalStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<ByteView> {
        self.inner.get(key)
    }

    fn add(&self, key: &str, value: ByteView) {
        self.inner.insert(key.to_owned(), value);
    }

    fn len(&self) -> Option<u64> {
        Some(self.inner.entry_count())
    }
}
