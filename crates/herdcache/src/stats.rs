// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Per-group counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// A point-in-time snapshot of a group's counters.
///
/// Every counter only ever grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    /// Calls to `get` with a valid key.
    pub gets: u64,
    /// Calls served from the local store.
    pub cache_hits: u64,
    /// Misses that entered load coalescing.
    pub loads: u64,
    /// Loads that actually ran, after duplicates were suppressed.
    pub loads_deduped: u64,
    /// Values served by a peer.
    pub peer_loads: u64,
    /// Failed peer fetches.
    pub peer_errors: u64,
    /// Successful loader calls.
    pub local_loads: u64,
    /// Failed loader calls.
    pub local_load_errors: u64,
    /// Calls rejected for an invalid argument.
    pub rejected: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counter(AtomicU64);

impl Counter {
    pub(crate) fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub(crate) gets: Counter,
    pub(crate) cache_hits: Counter,
    pub(crate) loads: Counter,
    pub(crate) loads_deduped: Counter,
    pub(crate) peer_loads: Counter,
    pub(crate) peer_errors: Counter,
    pub(crate) local_loads: Counter,
    pub(crate) local_load_errors: Counter,
    pub(crate) rejected: Counter,
}

impl StatsCounters {
    pub(crate) fn snapshot(&self) -> GroupStats {
        GroupStats {
            gets: self.gets.get(),
            cache_hits: self.cache_hits.get(),
            loads: self.loads.get(),
            loads_deduped: self.loads_deduped.get(),
            peer_loads: self.peer_loads.get(),
            peer_errors: self.peer_errors.get(),
            local_loads: self.local_loads.get(),
            local_load_errors: self.local_load_errors.get(),
            rejected: self.rejected.get(),
        }
    }
}
