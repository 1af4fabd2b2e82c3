// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! The contract every local store backing a group must satisfy.

use crate::ByteView;

/// A capacity-bounded map from keys to [`ByteView`] values.
///
/// Implementations must be safe under any number of concurrent callers. `add` may evict other
/// entries to respect the store's capacity; the eviction policy is up to the implementation.
/// Both operations are infallible: a store that cannot keep a value simply forgets it.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::RwLock;
///
/// use herdcache_store::{ByteView, LocalStore};
///
/// #[derive(Debug, Default)]
/// struct Unbounded(RwLock<HashMap<String, ByteView>>);
///
/// impl LocalStore for Unbounded {
///     fn get(&self, key: &str) -> Option<ByteView> {
///         self.0.read().unwrap().get(key).cloned()
///     }
///
///     fn add(&self, key: &str, value: ByteView) {
///         self.0.write().unwrap().insert(key.to_owned(), value);
///     }
/// }
/// ```
pub trait LocalStore: Send + Sync + std::fmt::Debug {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<ByteView>;

    /// Stores `value` under `key`, possibly evicting other entries.
    fn add(&self, key: &str, value: ByteView);

    /// Returns the number of resident entries, if the store tracks it.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns `true` if the store holds no entries, if the store tracks it.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}
