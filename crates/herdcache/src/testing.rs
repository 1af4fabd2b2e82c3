// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Test doubles for loaders and peers.
//!
//! This module provides `MockLoader`, `MockPeer`, and `StaticPicker`. Each records how it was
//! used so tests can verify how many loads or fetches a group actually performed. Clones share
//! their recordings.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use tick::Clock;

use crate::{Error, Loader, Peer, PeerFetcher, PeerPicker, Result};

type FailPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A recording loader backed by an in-memory map.
///
/// Missing keys fail with a loader error reading `"<key> not exist"`.
///
/// # Examples
///
/// ```
/// use herdcache::testing::MockLoader;
/// use herdcache::Loader;
///
/// # futures::executor::block_on(async {
/// let loader = MockLoader::with_data([("Tom", "630")]);
///
/// assert_eq!(loader.load("Tom").await.unwrap(), b"630");
/// assert!(loader.load("Jack").await.is_err());
/// assert_eq!(loader.calls(), vec!["Tom".to_string(), "Jack".to_string()]);
/// # });
/// ```
///
/// # Failure Injection
///
/// ```
/// use herdcache::testing::MockLoader;
/// use herdcache::Loader;
///
/// # futures::executor::block_on(async {
/// let loader = MockLoader::with_data([("Tom", "630")]);
/// loader.fail_when(|key| key == "Tom");
/// assert!(loader.load("Tom").await.is_err());
///
/// loader.clear_failures();
/// assert!(loader.load("Tom").await.is_ok());
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MockLoader {
    data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
    latency: Option<(Clock, Duration)>,
}

impl fmt::Debug for MockLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockLoader")
            .field("entries", &self.data.lock().len())
            .field("calls", &self.calls.lock().len())
            .field("fail_when", &self.fail_when.lock().is_some())
            .field("latency", &self.latency.as_ref().map(|(_, d)| d))
            .finish()
    }
}

impl MockLoader {
    /// Creates a loader that knows no keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader that serves the given entries.
    #[must_use]
    pub fn with_data<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        let loader = Self::new();
        for (key, value) in data {
            loader.insert(key, value);
        }
        loader
    }

    /// Makes every load wait for `latency` on `clock` before answering.
    ///
    /// Useful to keep a load in flight while other callers pile up behind it.
    #[must_use]
    pub fn with_latency(mut self, clock: Clock, latency: Duration) -> Self {
        self.latency = Some((clock, latency));
        self
    }

    /// Adds or replaces an entry.
    pub fn insert(&self, key: impl Into<String>, value: impl AsRef<[u8]>) {
        self.data.lock().insert(key.into(), value.as_ref().to_vec());
    }

    /// Makes loads fail for every key matching `predicate`.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns every key loaded so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Returns the total number of loads.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the number of loads of `key`.
    #[must_use]
    pub fn calls_for(&self, key: &str) -> usize {
        self.calls.lock().iter().filter(|k| *k == key).count()
    }
}

impl Loader for MockLoader {
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        self.calls.lock().push(key.to_owned());

        if let Some((clock, latency)) = &self.latency {
            clock.delay(*latency).await;
        }

        if self.fail_when.lock().as_ref().is_some_and(|fail| fail(key)) {
            return Err(Error::loader(format!("injected failure loading {key}")));
        }

        self.data
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::loader(format!("{key} not exist")))
    }
}

/// A recording remote node backed by an in-memory map.
///
/// Turn it into a [`Peer`] with [`into_peer`](Self::into_peer); keep a clone to inspect the
/// recorded fetches.
#[derive(Clone, Default)]
pub struct MockPeer {
    data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fetches: Arc<Mutex<Vec<(String, String)>>>,
    failure: Option<Arc<str>>,
    latency: Option<(Clock, Duration)>,
}

impl fmt::Debug for MockPeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockPeer")
            .field("entries", &self.data.lock().len())
            .field("fetches", &self.fetches.lock().len())
            .field("failure", &self.failure)
            .field("latency", &self.latency.as_ref().map(|(_, d)| d))
            .finish()
    }
}

impl MockPeer {
    /// Creates a peer that serves the given entries for any group.
    #[must_use]
    pub fn with_data<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        let data = data.into_iter().map(|(k, v)| (k.into(), v.as_ref().to_vec())).collect();
        Self {
            data: Arc::new(Mutex::new(data)),
            ..Self::default()
        }
    }

    /// Creates a peer whose every fetch fails with `message`.
    #[must_use]
    pub fn failing(message: impl AsRef<str>) -> Self {
        Self {
            failure: Some(Arc::from(message.as_ref())),
            ..Self::default()
        }
    }

    /// Makes every fetch wait for `latency` on `clock` before answering, whether it succeeds
    /// or fails.
    #[must_use]
    pub fn with_latency(mut self, clock: Clock, latency: Duration) -> Self {
        self.latency = Some((clock, latency));
        self
    }

    /// Returns every `(group, key)` pair fetched so far, in call order.
    #[must_use]
    pub fn fetches(&self) -> Vec<(String, String)> {
        self.fetches.lock().clone()
    }

    /// Returns the total number of fetches.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().len()
    }

    /// Wraps a clone of this mock in a [`Peer`] handle.
    #[must_use]
    pub fn into_peer(self) -> Peer {
        Peer::new(self)
    }
}

impl PeerFetcher for MockPeer {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        self.fetches.lock().push((group.to_owned(), key.to_owned()));

        if let Some((clock, latency)) = &self.latency {
            clock.delay(*latency).await;
        }

        if let Some(message) = &self.failure {
            return Err(Error::peer(message.to_string()));
        }

        self.data
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::peer(format!("peer has no {group}/{key}")))
    }
}

enum Route {
    Always(Peer),
    Never,
    Keys(Peer, HashSet<String>),
}

/// A picker with a fixed routing rule.
///
/// Records every key it was asked about.
#[derive(Clone)]
pub struct StaticPicker {
    route: Arc<Route>,
    picks: Arc<Mutex<Vec<String>>>,
}

impl fmt::Debug for StaticPicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = match &*self.route {
            Route::Always(_) => "always",
            Route::Never => "never",
            Route::Keys(..) => "keys",
        };
        f.debug_struct("StaticPicker")
            .field("route", &route)
            .field("picks", &self.picks.lock().len())
            .finish()
    }
}

impl StaticPicker {
    fn with_route(route: Route) -> Self {
        Self {
            route: Arc::new(route),
            picks: Arc::default(),
        }
    }

    /// Routes every key to `peer`.
    #[must_use]
    pub fn always(peer: Peer) -> Self {
        Self::with_route(Route::Always(peer))
    }

    /// Keeps every key local.
    #[must_use]
    pub fn never() -> Self {
        Self::with_route(Route::Never)
    }

    /// Routes the listed keys to `peer` and keeps all others local.
    #[must_use]
    pub fn for_keys<I, K>(peer: Peer, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::with_route(Route::Keys(peer, keys.into_iter().map(Into::into).collect()))
    }

    /// Returns every key the picker was asked about, in call order.
    #[must_use]
    pub fn picks(&self) -> Vec<String> {
        self.picks.lock().clone()
    }
}

impl PeerPicker for StaticPicker {
    fn pick_peer(&self, key: &str) -> Option<Peer> {
        self.picks.lock().push(key.to_owned());
        match &*self.route {
            Route::Always(peer) => Some(peer.clone()),
            Route::Never => None,
            Route::Keys(peer, keys) => keys.contains(key).then(|| peer.clone()),
        }
    }
}
