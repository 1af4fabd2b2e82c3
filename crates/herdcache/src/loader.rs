// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! The source of truth a group consults on a miss.

use std::fmt;

use crate::Result;

/// Produces the bytes for a key when no cached copy is available.
///
/// A group calls its loader only on a miss, and only once per key for all callers that
/// overlap on that miss. Whatever the loader returns is copied before it is cached, so
/// the loader keeps ownership of nothing the group holds.
///
/// Errors are handed to every waiting caller unchanged and are never cached; see
/// [`Error::loader`](crate::Error::loader).
///
/// For closures, see [`loader_fn`].
#[dynosaur::dynosaur(pub(crate) DynLoader = dyn(box) Loader, bridge(none))]
pub trait Loader: Send + Sync {
    /// Loads the bytes for `key`.
    fn load(&self, key: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// A [`Loader`] backed by an async closure.
///
/// Created by [`loader_fn`].
#[derive(Clone)]
pub struct LoaderFn<F> {
    func: F,
}

impl<F> fmt::Debug for LoaderFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderFn").finish_non_exhaustive()
    }
}

/// Adapts an async closure into a [`Loader`].
///
/// The closure receives an owned copy of the key.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use herdcache::{Error, loader_fn};
///
/// let scores = HashMap::from([("Tom", "630"), ("Jack", "589")]);
/// let loader = loader_fn(move |key: String| {
///     let found = scores.get(key.as_str()).map(|v| v.as_bytes().to_vec());
///     async move { found.ok_or_else(|| Error::loader(format!("{key} not exist"))) }
/// });
/// # let _ = loader;
/// ```
pub fn loader_fn<F, Fut>(func: F) -> LoaderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<u8>>> + Send,
{
    LoaderFn { func }
}

impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<u8>>> + Send,
{
    fn load(&self, key: &str) -> impl Future<Output = Result<Vec<u8>>> + Send {
        (self.func)(key.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{Error, ErrorKind};

    fn block_on<F: Future>(f: F) -> F::Output {
        futures::executor::block_on(f)
    }

    #[test]
    fn loader_fn_receives_key() {
        let loader = loader_fn(|key: String| async move { Ok(key.into_bytes()) });
        assert_eq!(block_on(loader.load("Tom")).expect("load should succeed"), b"Tom");
    }

    #[test]
    fn loader_fn_propagates_errors() {
        let loader = loader_fn(|key: String| async move { Err::<Vec<u8>, _>(Error::loader(format!("{key} not exist"))) });
        let error = block_on(loader.load("Jack")).expect_err("load should fail");
        assert_eq!(error.kind(), ErrorKind::Loader);
        assert!(error.to_string().contains("Jack not exist"));
    }

    #[test]
    fn dyn_loader_dispatches_to_inner() {
        let loader: Arc<DynLoader<'static>> = DynLoader::new_arc(loader_fn(|_key: String| async { Ok(b"630".to_vec()) }));
        assert_eq!(block_on(loader.load("Tom")).expect("load should succeed"), b"630");
    }

    #[test]
    fn debug_hides_closure() {
        let loader = loader_fn(|_key: String| async { Ok(Vec::new()) });
        assert!(format!("{loader:?}").contains("LoaderFn"));
    }
}
