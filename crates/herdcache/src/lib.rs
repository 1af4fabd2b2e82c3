// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A namespaced read-through cache with per-key load coalescing.
//!
//! Values live in named [`Group`]s. Each group owns a capacity-bounded local store and a
//! [`Loader`] that produces values on a miss. When many callers miss on the same key at once,
//! the group runs a single load and hands its outcome to every one of them. In a cluster, a
//! group can also ask a [`PeerPicker`] which node owns a key and fetch the value from that
//! [`Peer`] before falling back to its own loader.
//!
//! # Quick Start
//!
//! ```
//! use herdcache::{Error, GroupRegistry, loader_fn};
//! use tick::Clock;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Error> {
//! let registry = GroupRegistry::new(Clock::new_tokio());
//!
//! let scores = registry.create(
//!     "scores",
//!     2 << 10,
//!     loader_fn(|key: String| async move {
//!         match key.as_str() {
//!             "Tom" => Ok(b"630".to_vec()),
//!             _ => Err(Error::loader(format!("{key} not exist"))),
//!         }
//!     }),
//! )?;
//!
//! let value = scores.get("Tom").await?;
//! assert_eq!(value.to_string(), "630");
//! # Ok(())
//! # }
//! ```
//!
//! # Retrieval
//!
//! [`Group::get`] walks these steps:
//!
//! 1. An empty key is rejected with [`ErrorKind::InvalidArgument`].
//! 2. A value resident in the local store is returned immediately.
//! 3. Otherwise the miss joins the single in-flight load for that key, or starts it.
//! 4. The load asks the peer picker for an owner. A peer's answer is returned as is and is not
//!    stored locally. A failing peer is logged and the group falls back to its loader.
//! 5. The loader's bytes are copied into a [`ByteView`], added to the local store, and returned.
//!    Loader errors reach every waiting caller unchanged and are not cached.
//!
//! No timeouts are applied. A load that never finishes blocks every caller of that key.
//!
//! # Features
//!
//! - `logs` (default): structured events through `tracing`.
//! - `metrics`: OpenTelemetry counters and histograms via [`GroupBuilder::metrics`].
//! - `test-util`: the [`testing`] module with recording loaders, peers, and pickers.

mod builder;
mod error;
mod group;
mod loader;
mod peers;
mod registry;
mod stats;
mod telemetry;

#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod testing;

#[doc(inline)]
pub use builder::GroupBuilder;
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
#[doc(inline)]
pub use group::Group;
#[doc(no_inline)]
pub use herdcache_store::{ByteView, InMemoryStore, LocalStore};
#[doc(inline)]
pub use loader::{Loader, LoaderFn, loader_fn};
#[doc(inline)]
pub use peers::{Peer, PeerFetcher, PeerPicker};
#[doc(inline)]
pub use registry::GroupRegistry;
#[doc(inline)]
pub use stats::GroupStats;
