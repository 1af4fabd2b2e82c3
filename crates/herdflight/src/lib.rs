// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Coalesces concurrent duplicate async work into a single execution.
//!
//! This crate provides [`Coalescer`], a request-deduplication primitive. When several tasks ask
//! for the same work (identified by a key) while that work is in flight, only the first task
//! (the "leader") runs it. Every other task (a "follower") waits for the leader and receives a
//! clone of the leader's output.
//!
//! A `Coalescer` is not a cache. The bookkeeping record for a key is dropped the moment its work
//! finishes, so a call issued after completion runs the work again. Suppression depends only on
//! temporal overlap.
//!
//! # Example
//!
//! ```
//! use herdflight::Coalescer;
//!
//! # futures::executor::block_on(async {
//! let group: Coalescer<&str, String> = Coalescer::new();
//!
//! let result = group
//!     .work("user:123", || async {
//!         // Runs once, however many callers overlap on "user:123".
//!         "expensive_result".to_string()
//!     })
//!     .await;
//!
//! assert_eq!(result, "expensive_result");
//! # });
//! ```
//!
//! # Failures
//!
//! The output type is opaque to the coalescer. To share failures, use a `Result` with a
//! clonable error: every overlapping caller then observes the identical `Ok` or `Err`.
//!
//! # Dropped and Panicking Leaders
//!
//! There are no timeouts. If the leader's future is dropped or panics before its work
//! completes, the work never completed, and one of the waiting followers runs its own closure
//! instead. Only one completed execution is ever observed per overlapping window.
//!
//! # Locking
//!
//! A single lock guards the table of pending keys. It is held while a key is registered or
//! retired and never while the work itself runs. A record is retired when its work completes
//! or when the last caller waiting on it drops its future.

use std::{collections::HashMap, fmt, hash::Hash, sync::Arc};

use async_once_cell::OnceCell;
use parking_lot::Mutex;

type Call<T> = Arc<OnceCell<T>>;
type Pending<K, T> = Arc<Mutex<HashMap<K, Record<T>>>>;

/// A pending call and the number of callers still waiting on it.
struct Record<T> {
    call: Call<T>,
    waiters: usize,
}

/// Represents a class of work and creates a space in which units of work can be executed with
/// duplicate suppression.
pub struct Coalescer<K, T> {
    pending: Pending<K, T>,
}

impl<K, T> Default for Coalescer<K, T> {
    fn default() -> Self {
        Self {
            pending: Arc::default(),
        }
    }
}

impl<K, T> fmt::Debug for Coalescer<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coalescer")
            .field("in_flight", &self.pending.lock().len())
            .finish()
    }
}

impl<K, T> Coalescer<K, T>
where
    K: Hash + Eq + Clone,
{
    /// Creates a new `Coalescer` with no pending work.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys that currently have pending work.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.lock().len()
    }

    /// Executes the work produced by `func`, making sure only one execution per `key` is in
    /// flight at any moment.
    ///
    /// The caller is registered for `key` when this method is called, not when the returned
    /// future is first polled. If work for `key` is already pending, `func` is never invoked
    /// (unless the leader goes away before finishing) and the returned future resolves to a
    /// clone of the leader's output.
    pub fn work<F, Fut>(&self, key: K, func: F) -> impl Future<Output = T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
        T: Clone,
    {
        let call = {
            let mut pending = self.pending.lock();
            let record = pending.entry(key.clone()).or_insert_with(|| Record {
                call: Arc::new(OnceCell::new()),
                waiters: 0,
            });
            record.waiters += 1;
            Arc::clone(&record.call)
        };
        let waiter = Waiter {
            pending: Arc::clone(&self.pending),
            key,
            call,
        };

        async move {
            waiter
                .call
                .get_or_init(async {
                    let value = func().await;
                    retire(&waiter.pending, &waiter.key, &waiter.call);
                    value
                })
                .await
                .clone()
        }
    }
}

/// One caller's claim on a pending record.
///
/// Dropping the last claim on a record that never completed removes the record, so a cancelled
/// call does not linger in the pending table.
struct Waiter<K, T>
where
    K: Hash + Eq,
{
    pending: Pending<K, T>,
    key: K,
    call: Call<T>,
}

impl<K, T> Drop for Waiter<K, T>
where
    K: Hash + Eq,
{
    fn drop(&mut self) {
        let mut pending = self.pending.lock();
        if let Some(record) = pending.get_mut(&self.key)
            && Arc::ptr_eq(&record.call, &self.call)
        {
            record.waiters -= 1;
            if record.waiters == 0 {
                pending.remove(&self.key);
            }
        }
    }
}

/// Drops the pending record for `key` if it still belongs to `call`.
fn retire<K, T>(pending: &Mutex<HashMap<K, Record<T>>>, key: &K, call: &Call<T>)
where
    K: Hash + Eq,
{
    let mut pending = pending.lock();
    if pending.get(key).is_some_and(|current| Arc::ptr_eq(&current.call, call)) {
        pending.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: Future>(f: F) -> F::Output {
        futures::executor::block_on(f)
    }

    #[test]
    fn registration_happens_before_first_poll() {
        let group: Coalescer<&str, i32> = Coalescer::new();
        let fut = group.work("key", || async { 1 });
        assert_eq!(group.in_flight(), 1);

        assert_eq!(block_on(fut), 1);
        assert_eq!(group.in_flight(), 0);
    }

    #[test]
    fn retire_ignores_foreign_records() {
        let pending: Mutex<HashMap<&str, Record<i32>>> = Mutex::new(HashMap::new());
        let current = Arc::new(OnceCell::new());
        let stale = Arc::new(OnceCell::new());
        pending.lock().insert(
            "key",
            Record {
                call: Arc::clone(&current),
                waiters: 1,
            },
        );

        retire(&pending, &"key", &stale);
        assert_eq!(pending.lock().len(), 1);

        retire(&pending, &"key", &current);
        assert!(pending.lock().is_empty());
    }

    #[test]
    fn dropping_the_only_waiter_removes_the_record() {
        let group: Coalescer<&str, i32> = Coalescer::new();
        let fut = group.work("key", || async { 1 });
        assert_eq!(group.in_flight(), 1);

        drop(fut);
        assert_eq!(group.in_flight(), 0);
    }

    #[test]
    fn record_stays_while_another_waiter_remains() {
        let group: Coalescer<&str, i32> = Coalescer::new();
        let first = group.work("key", || async { 1 });
        let second = group.work("key", || async { 2 });

        drop(first);
        assert_eq!(group.in_flight(), 1);

        assert_eq!(block_on(second), 2);
        assert_eq!(group.in_flight(), 0);
    }

    #[test]
    fn stale_waiter_leaves_a_newer_record_alone() {
        let group: Coalescer<&str, i32> = Coalescer::new();
        let stale = group.work("key", || async { 1 });
        assert_eq!(block_on(group.work("key", || async { 2 })), 2);
        assert_eq!(group.in_flight(), 0);

        let newer = group.work("key", || async { 3 });
        assert_eq!(group.in_flight(), 1);

        drop(stale);
        assert_eq!(group.in_flight(), 1);
        assert_eq!(block_on(newer), 3);
        assert_eq!(group.in_flight(), 0);
    }

    #[test]
    fn debug_reports_pending_count() {
        let group: Coalescer<&str, i32> = Coalescer::new();
        let _fut = group.work("key", || async { 1 });
        let debug = format!("{group:?}");
        assert!(debug.contains("Coalescer"));
        assert!(debug.contains("in_flight: 1"));
    }
}
