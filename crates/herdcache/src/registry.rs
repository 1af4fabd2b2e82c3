// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Name-to-group lookup.

use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;
use tick::Clock;

use crate::{
    Group, GroupBuilder, Loader, Result,
    telemetry::{GroupActivity, GroupEvent, GroupOperation},
};

/// A table of groups keyed by name.
///
/// The registry owns the clock its groups use to time operations. Clones share the same table.
/// Groups stay registered until the last clone of the registry is dropped.
///
/// # Examples
///
/// ```
/// use herdcache::{GroupRegistry, loader_fn};
/// use tick::Clock;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let registry = GroupRegistry::new(Clock::new_tokio());
/// registry
///     .create("scores", 2048, loader_fn(|_key: String| async { Ok(b"630".to_vec()) }))
///     .unwrap();
///
/// let group = registry.lookup("scores").unwrap();
/// assert_eq!(group.get("Tom").await.unwrap(), "630");
/// assert!(registry.lookup("missing").is_none());
/// # }
/// ```
#[derive(Clone)]
pub struct GroupRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    clock: Clock,
    groups: RwLock<HashMap<Arc<str>, Group>>,
}

impl GroupRegistry {
    /// Creates an empty registry whose groups time their operations with `clock`.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                clock,
                groups: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Creates a group backed by an in-memory store of `max_bytes` and registers it.
    ///
    /// Shorthand for `builder(name).max_bytes(max_bytes).loader(loader).build()`.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) error when
    /// `name` is empty.
    pub fn create(&self, name: impl Into<String>, max_bytes: u64, loader: impl Loader + 'static) -> Result<Group> {
        self.builder(name).max_bytes(max_bytes).loader(loader).build()
    }

    /// Starts configuring a group called `name`.
    pub fn builder(&self, name: impl Into<String>) -> GroupBuilder {
        GroupBuilder::new(self.clone(), name.into())
    }

    /// Returns the group registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Group> {
        self.inner.groups.read().get(name).cloned()
    }

    /// Returns the number of registered groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.groups.read().len()
    }

    /// Returns `true` if no group is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.groups.read().is_empty()
    }

    /// Returns the clock handed to every group of this registry.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.inner.clock
    }

    pub(crate) fn publish(&self, group: Group) {
        let name: Arc<str> = Arc::from(group.name());
        let previous = self.inner.groups.write().insert(name, group.clone());

        let activity = if previous.is_some() {
            GroupActivity::Replaced
        } else {
            GroupActivity::Created
        };
        group.record(GroupEvent::new(group.name(), GroupOperation::Register, activity));
    }
}

impl fmt::Debug for GroupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups = self.inner.groups.read();
        let mut names: Vec<&str> = groups.keys().map(AsRef::as_ref).collect();
        names.sort_unstable();
        f.debug_struct("GroupRegistry").field("groups", &names).finish_non_exhaustive()
    }
}
