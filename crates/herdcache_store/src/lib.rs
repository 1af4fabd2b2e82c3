// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Immutable byte values and capacity-bounded local stores.
//!
//! This crate provides the storage half of a herdcache group:
//!
//! - [`ByteView`], an immutable byte payload that is copied on the way in and on the way out.
//! - [`LocalStore`], the contract a group uses to keep values resident between loads.
//! - [`InMemoryStore`], a concurrent, byte-bounded store with LRU eviction backed by moka.
//!
//! # Quick Start
//!
//! ```
//! use herdcache_store::{ByteView, InMemoryStore, LocalStore};
//!
//! let store = InMemoryStore::builder().max_bytes(2048).build();
//! store.add("Tom", ByteView::from("630"));
//!
//! let value = store.get("Tom").unwrap();
//! assert_eq!(value.to_string(), "630");
//! ```
//!
//! # Capacity
//!
//! Each entry weighs `key.len() + value.len()` bytes. A byte budget of `0` means the store
//! never evicts.
//!
//! # Features
//!
//! - `test-util`: enables the [`testing`] module with a recording [`testing::MockStore`].

mod builder;
mod memory;
mod store;
mod value;

#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod testing;

#[doc(inline)]
pub use builder::InMemoryStoreBuilder;
#[doc(inline)]
pub use memory::InMemoryStore;
#[doc(inline)]
pub use store::LocalStore;
#[doc(inline)]
pub use value::ByteView;
