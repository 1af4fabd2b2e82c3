// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Builder for configuring and registering groups.

use std::{fmt, sync::Arc};

use herdcache_store::{InMemoryStore, LocalStore};
#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::MeterProvider;

use crate::{
    Error, Group, GroupRegistry, Loader, PeerPicker, Result,
    group::GroupParts,
    loader::DynLoader,
    telemetry::TelemetryConfig,
};

/// Builder for a [`Group`].
///
/// Created by [`GroupRegistry::builder`]. Building registers the group under its name.
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
/// let group = registry
///     .builder("thumbnails")
///     .max_bytes(64 << 20)
///     .loader(loader_fn(|key: String| async move { Ok(key.into_bytes()) }))
///     .build()
///     .unwrap();
///
/// assert_eq!(group.get("cat.png").await.unwrap(), "cat.png");
/// assert!(registry.lookup("thumbnails").is_some());
/// # }
/// ```
#[must_use]
pub struct GroupBuilder {
    registry: GroupRegistry,
    name: String,
    max_bytes: u64,
    loader: Option<Arc<DynLoader<'static>>>,
    store: Option<Arc<dyn LocalStore>>,
    peers: Option<Arc<dyn PeerPicker>>,
    telemetry: TelemetryConfig,
}

impl GroupBuilder {
    pub(crate) fn new(registry: GroupRegistry, name: String) -> Self {
        Self {
            registry,
            name,
            max_bytes: 0,
            loader: None,
            store: None,
            peers: None,
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Sets the byte budget of the group's in-memory store.
    ///
    /// Entries weigh the length of their key plus the length of their value. A budget of `0`,
    /// the default, means the store never evicts. Ignored when a custom
    /// [`store`](Self::store) is set.
    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the loader consulted on a miss. Required.
    pub fn loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(DynLoader::new_arc(loader));
        self
    }

    /// Replaces the default in-memory store with a custom one.
    pub fn store(mut self, store: impl LocalStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Attaches a peer picker at construction.
    ///
    /// A group built with peers rejects later calls to
    /// [`Group::register_peers`].
    pub fn peers(mut self, picker: impl PeerPicker + 'static) -> Self {
        self.peers = Some(Arc::new(picker));
        self
    }

    /// Enables or disables structured logs for this group.
    ///
    /// Logs are enabled by default when the `logs` feature is on.
    pub fn logs(mut self, enabled: bool) -> Self {
        self.telemetry = self.telemetry.with_logs(enabled);
        self
    }

    /// Records metrics for this group through the given meter provider.
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    pub fn metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.telemetry = self.telemetry.with_metrics(provider);
        self
    }

    /// Builds the group and registers it, replacing any group with the same name.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::MissingLoader`](crate::ErrorKind::MissingLoader) error when no
    /// loader was set, and an [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument)
    /// error when the name is empty. Nothing is registered in either case.
    pub fn build(self) -> Result<Group> {
        if self.name.is_empty() {
            return Err(Error::invalid_argument("group name is required"));
        }

        let loader = self.loader.ok_or_else(|| Error::missing_loader(&self.name))?;
        let name: Arc<str> = Arc::from(self.name);
        let store: Arc<dyn LocalStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryStore::builder().max_bytes(self.max_bytes).name(name.as_ref()).build()),
        };

        let group = Group::from_parts(GroupParts {
            name,
            store,
            loader,
            peers: self.peers,
            telemetry: self.telemetry.build(),
            clock: self.registry.clock().clone(),
        });

        self.registry.publish(group.clone());
        Ok(group)
    }
}

impl fmt::Debug for GroupBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupBuilder")
            .field("name", &self.name)
            .field("max_bytes", &self.max_bytes)
            .field("has_loader", &self.loader.is_some())
            .field("store", &self.store)
            .field("has_peers", &self.peers.is_some())
            .finish_non_exhaustive()
    }
}
