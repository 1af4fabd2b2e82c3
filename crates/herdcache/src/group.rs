// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! The per-namespace read path.

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use herdcache_store::{ByteView, LocalStore};
use herdflight::Coalescer;
use tick::Clock;

use crate::{
    Error, GroupStats, Loader, PeerPicker, Result,
    loader::DynLoader,
    stats::StatsCounters,
    telemetry::{GroupActivity, GroupEvent, GroupOperation, GroupTelemetry},
};

/// A named cache namespace.
///
/// A group answers [`get`](Self::get) from its local store when it can. On a miss it asks its
/// peer picker (if any) for the owning node, and otherwise runs its loader. However many
/// callers miss on the same key at once, only one fetch or load runs for them and all of them
/// receive its outcome.
///
/// `Group` is a cheap handle: clones share the same store, loader, and in-flight state.
///
/// Groups are created through a [`GroupRegistry`](crate::GroupRegistry).
///
/// # Examples
///
/// ```
/// use herdcache::{Error, GroupRegistry, loader_fn};
/// use tick::Clock;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Error> {
/// let registry = GroupRegistry::new(Clock::new_tokio());
/// let group = registry.create(
///     "scores",
///     2 << 10,
///     loader_fn(|key: String| async move {
///         match key.as_str() {
///             "Tom" => Ok(b"630".to_vec()),
///             _ => Err(Error::loader(format!("{key} not exist"))),
///         }
///     }),
/// )?;
///
/// assert_eq!(group.get("Tom").await?, "630");
/// assert!(group.get("Jack").await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Group {
    inner: Arc<GroupInner>,
}

struct GroupInner {
    name: Arc<str>,
    store: Arc<dyn LocalStore>,
    loader: Arc<DynLoader<'static>>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: Coalescer<String, Result<ByteView>>,
    telemetry: GroupTelemetry,
    clock: Clock,
    stats: StatsCounters,
}

pub(crate) struct GroupParts {
    pub name: Arc<str>,
    pub store: Arc<dyn LocalStore>,
    pub loader: Arc<DynLoader<'static>>,
    pub peers: Option<Arc<dyn PeerPicker>>,
    pub telemetry: GroupTelemetry,
    pub clock: Clock,
}

impl Group {
    pub(crate) fn from_parts(parts: GroupParts) -> Self {
        Self {
            inner: Arc::new(GroupInner {
                name: parts.name,
                store: parts.store,
                loader: parts.loader,
                peers: parts.peers.map_or_else(OnceLock::new, OnceLock::from),
                flight: Coalescer::new(),
                telemetry: parts.telemetry,
                clock: parts.clock,
                stats: StatsCounters::default(),
            }),
        }
    }

    /// Returns the name the group was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the value for `key`.
    ///
    /// Resident values are returned straight from the local store. Otherwise the value is
    /// fetched from the owning peer or, failing that, produced by the loader and added to the
    /// local store. Concurrent misses on one key share a single fetch or load.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) error for an
    /// empty key, and the loader's own error when the load fails. Peer failures are never
    /// returned: the group falls back to its loader instead.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        let inner = &*self.inner;

        if key.is_empty() {
            inner.stats.rejected.increment();
            let error = Error::invalid_argument("key is required");
            inner.record(GroupEvent::new(&inner.name, GroupOperation::Get, GroupActivity::Rejected).error(&error));
            return Err(error);
        }

        inner.stats.gets.increment();
        let stopwatch = inner.clock.stopwatch();

        if let Some(value) = inner.store.get(key) {
            inner.stats.cache_hits.increment();
            inner.record(GroupEvent::new(&inner.name, GroupOperation::Get, GroupActivity::Hit).duration(stopwatch.elapsed()));
            return Ok(value);
        }

        inner.record(GroupEvent::new(&inner.name, GroupOperation::Get, GroupActivity::Miss));
        inner.stats.loads.increment();
        inner.flight.work(key.to_owned(), || inner.load(key)).await
    }

    /// Attaches the picker used to route misses to other nodes.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::PeersAlreadyRegistered`](crate::ErrorKind::PeersAlreadyRegistered)
    /// error if the group already has a picker. The existing picker stays in place.
    pub fn register_peers(&self, picker: impl PeerPicker + 'static) -> Result<()> {
        let inner = &*self.inner;
        match inner.peers.set(Arc::new(picker)) {
            Ok(()) => {
                inner.record(GroupEvent::new(&inner.name, GroupOperation::RegisterPeers, GroupActivity::PeersAttached));
                Ok(())
            }
            Err(_) => {
                let error = Error::peers_already_registered(&inner.name);
                inner.record(
                    GroupEvent::new(&inner.name, GroupOperation::RegisterPeers, GroupActivity::Rejected).error(&error),
                );
                Err(error)
            }
        }
    }

    /// Returns `true` if a peer picker is attached.
    #[must_use]
    pub fn has_peers(&self) -> bool {
        self.inner.peers.get().is_some()
    }

    /// Returns a snapshot of the group's counters.
    #[must_use]
    pub fn stats(&self) -> GroupStats {
        self.inner.stats.snapshot()
    }

    /// Returns the approximate number of entries in the local store, if the store tracks it.
    #[must_use]
    pub fn store_len(&self) -> Option<u64> {
        self.inner.store.len()
    }

    /// Returns the number of keys with a fetch or load currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.flight.in_flight()
    }

    pub(crate) fn record(&self, event: GroupEvent<'_>) {
        self.inner.record(event);
    }
}

impl GroupInner {
    fn record(&self, event: GroupEvent<'_>) {
        self.telemetry.record(event);
    }

    /// Runs once per coalesced miss.
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.stats.loads_deduped.increment();

        if let Some(peer) = self.peers.get().and_then(|picker| picker.pick_peer(key)) {
            let stopwatch = self.clock.stopwatch();
            match peer.fetch(&self.name, key).await {
                Ok(bytes) => {
                    self.stats.peer_loads.increment();
                    self.record(
                        GroupEvent::new(&self.name, GroupOperation::PeerFetch, GroupActivity::PeerHit).duration(stopwatch.elapsed()),
                    );
                    // Peer values are not kept locally; the owning node caches them.
                    return Ok(ByteView::copy_from_slice(&bytes));
                }
                Err(error) => {
                    self.stats.peer_errors.increment();
                    self.record(
                        GroupEvent::new(&self.name, GroupOperation::PeerFetch, GroupActivity::PeerFallback)
                            .duration(stopwatch.elapsed())
                            .error(&error),
                    );
                }
            }
        }

        self.load_locally(key).await
    }

    async fn load_locally(&self, key: &str) -> Result<ByteView> {
        let stopwatch = self.clock.stopwatch();
        match self.loader.load(key).await {
            Ok(bytes) => {
                let value = ByteView::copy_from_slice(&bytes);
                self.store.add(key, value.clone());
                self.stats.local_loads.increment();
                self.record(
                    GroupEvent::new(&self.name, GroupOperation::LocalLoad, GroupActivity::Loaded).duration(stopwatch.elapsed()),
                );
                Ok(value)
            }
            Err(error) => {
                self.stats.local_load_errors.increment();
                self.record(
                    GroupEvent::new(&self.name, GroupOperation::LocalLoad, GroupActivity::Error)
                        .duration(stopwatch.elapsed())
                        .error(&error),
                );
                Err(error)
            }
        }
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.inner.name)
            .field("store", &self.inner.store)
            .field("has_peers", &self.has_peers())
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}
