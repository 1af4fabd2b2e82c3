// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Delegation of misses to other nodes in a cluster.
//!
//! A group with a [`PeerPicker`] asks it, on every miss, which node owns the key. When the
//! picker names a [`Peer`], the group fetches the value from that peer instead of running its
//! own loader. How keys map to nodes and how bytes travel between nodes are up to the
//! implementations.

use std::{fmt, sync::Arc};

use crate::Result;

/// Fetches a key of a named group from a remote node.
#[dynosaur::dynosaur(pub(crate) DynPeerFetcher = dyn(box) PeerFetcher, bridge(none))]
pub trait PeerFetcher: Send + Sync {
    /// Fetches `key` from the group called `group` on the remote node.
    ///
    /// A failure is not fatal: the requesting group falls back to its own loader.
    fn fetch(&self, group: &str, key: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Decides which node is authoritative for a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the peer that owns `key`, or `None` when the local node should load it.
    fn pick_peer(&self, key: &str) -> Option<Peer>;
}

/// A clonable handle to a remote node.
///
/// # Examples
///
/// ```
/// use herdcache::{Error, Peer, PeerFetcher};
///
/// struct Unreachable;
///
/// impl PeerFetcher for Unreachable {
///     async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>, Error> {
///         Err(Error::peer(format!("cannot reach owner of {group}/{key}")))
///     }
/// }
///
/// let peer = Peer::new(Unreachable);
/// let clone = peer.clone();
/// # let _ = clone;
/// ```
#[derive(Clone)]
pub struct Peer(Arc<DynPeerFetcher<'static>>);

impl Peer {
    /// Creates a peer handle around any [`PeerFetcher`].
    pub fn new(fetcher: impl PeerFetcher + 'static) -> Self {
        Self(DynPeerFetcher::new_arc(fetcher))
    }

    /// Fetches `key` of the group called `group` from this peer.
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying fetcher reports.
    pub async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        self.0.fetch(group, key).await
    }
}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ErrorKind};

    fn block_on<F: Future>(f: F) -> F::Output {
        futures::executor::block_on(f)
    }

    struct Echo;

    impl PeerFetcher for Echo {
        async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>> {
            Ok(format!("{group}/{key}").into_bytes())
        }
    }

    struct Broken;

    impl PeerFetcher for Broken {
        async fn fetch(&self, _group: &str, _key: &str) -> Result<Vec<u8>> {
            Err(Error::peer("connection refused"))
        }
    }

    struct KeyedPicker(Peer);

    impl PeerPicker for KeyedPicker {
        fn pick_peer(&self, key: &str) -> Option<Peer> {
            key.starts_with('r').then(|| self.0.clone())
        }
    }

    #[test]
    fn peer_forwards_group_and_key() {
        let peer = Peer::new(Echo);
        let bytes = block_on(peer.fetch("scores", "Tom")).expect("fetch should succeed");
        assert_eq!(bytes, b"scores/Tom");
    }

    #[test]
    fn peer_surfaces_fetch_errors() {
        let peer = Peer::new(Broken);
        let error = block_on(peer.fetch("scores", "Tom")).expect_err("fetch should fail");
        assert_eq!(error.kind(), ErrorKind::Peer);
    }

    #[test]
    fn clones_share_fetcher() {
        let peer = Peer::new(Echo);
        let clone = peer.clone();
        assert!(Arc::ptr_eq(&peer.0, &clone.0));
        assert!(format!("{clone:?}").contains("Peer"));
    }

    #[test]
    fn picker_may_decline() {
        let picker = KeyedPicker(Peer::new(Echo));
        assert!(picker.pick_peer("remote").is_some());
        assert!(picker.pick_peer("local").is_none());
    }
}
