// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Builder for configuring in-memory stores.
//!
//! The builder keeps moka's configuration types out of the public API.

use crate::memory::InMemoryStore;

/// Builder for configuring an [`InMemoryStore`].
///
/// # Examples
///
/// ```
/// use herdcache_store::InMemoryStore;
///
/// let store = InMemoryStore::builder()
///     .max_bytes(64 * 1024)
///     .initial_capacity(128)
///     .name("scores")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStoreBuilder {
    pub(crate) max_bytes: u64,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) name: Option<String>,
}

impl InMemoryStoreBuilder {
    /// Creates a new builder for an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the byte budget of the store.
    ///
    /// Each entry weighs the length of its key plus the length of its value. Once the budget is
    /// exceeded, the least recently used entries are evicted. A budget of `0` means the store is
    /// unbounded.
    ///
    /// # Examples
    ///
    /// ```
    /// use herdcache_store::InMemoryStore;
    ///
    /// let store = InMemoryStore::builder().max_bytes(2048).build();
    /// assert_eq!(store.max_bytes(), 2048);
    /// ```
    #[must_use]
    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the number of entries to pre-allocate room for.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets a name for the store, used in debugging output of the underlying cache.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured store.
    #[must_use]
    pub fn build(self) -> InMemoryStore {
        InMemoryStore::from_builder(&self)
    }
}
