// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Error types for group operations.

/// Classifies an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The caller supplied an invalid argument, such as an empty key.
    InvalidArgument,
    /// The group's loader failed.
    Loader,
    /// A peer failed to serve a key.
    Peer,
    /// A group was built without a loader.
    MissingLoader,
    /// A peer picker was already attached to the group.
    PeersAlreadyRegistered,
}

/// An error from a group operation.
///
/// Errors are cheap to clone, so one failed load can be handed to every caller that was
/// waiting on it. Use [`Error::kind`] to classify an error.
///
/// # Examples
///
/// ```
/// use herdcache::{Error, ErrorKind};
///
/// let error = Error::loader("database unavailable");
/// assert_eq!(error.kind(), ErrorKind::Loader);
/// assert!(error.to_string().contains("database unavailable"));
/// ```
#[ohno::error]
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Creates an error reporting that a loader failed.
    ///
    /// Loaders return this from [`Loader::load`](crate::Loader::load). The error reaches the
    /// callers of [`Group::get`](crate::Group::get) unchanged.
    pub fn loader(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::Loader, cause)
    }

    /// Creates an error reporting that a peer could not serve a key.
    pub fn peer(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::Peer, cause)
    }

    /// Creates an error reporting an invalid argument.
    pub fn invalid_argument(message: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::InvalidArgument, message)
    }

    pub(crate) fn missing_loader(group: &str) -> Self {
        Self::caused_by(ErrorKind::MissingLoader, format!("group '{group}' has no loader"))
    }

    pub(crate) fn peers_already_registered(group: &str) -> Self {
        Self::caused_by(
            ErrorKind::PeersAlreadyRegistered,
            format!("group '{group}' already has a peer picker"),
        )
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A specialized [`Result`] type for group operations.
pub type Result<T> = std::result::Result<T, Error>;
