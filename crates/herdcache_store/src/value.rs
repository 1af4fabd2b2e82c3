// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Immutable byte payloads shared between a store and its callers.

use std::fmt;

use bytes::Bytes;

/// An immutable view over a cached byte payload.
///
/// A `ByteView` is always built by copying its input, and every accessor hands out a copy. A
/// caller therefore can never alter what a store holds, and a store can never change bytes a
/// caller already received. Cloning is cheap: clones share the same immutable buffer.
///
/// # Examples
///
/// ```
/// use herdcache_store::ByteView;
///
/// let mut source = b"630".to_vec();
/// let view = ByteView::copy_from_slice(&source);
///
/// source[0] = b'9';
/// assert_eq!(view, "630");
///
/// let mut copy = view.to_vec();
/// copy.clear();
/// assert_eq!(view.len(), 3);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    /// Creates a view holding a private copy of `data`.
    #[must_use]
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// Returns the number of bytes in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the view holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a copy of the bytes.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Returns the bytes as a string, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl From<&[u8]> for ByteView {
    fn from(data: &[u8]) -> Self {
        Self::copy_from_slice(data)
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        Self::copy_from_slice(data.as_bytes())
    }
}

impl PartialEq<[u8]> for ByteView {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl PartialEq<&[u8]> for ByteView {
    fn eq(&self, other: &&[u8]) -> bool {
        self.bytes == *other
    }
}

impl PartialEq<str> for ByteView {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for ByteView {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_copies_input() {
        let mut source = vec![1_u8, 2, 3];
        let view = ByteView::copy_from_slice(&source);
        source[0] = 42;

        assert_eq!(view.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn to_vec_returns_independent_copy() {
        let view = ByteView::from("hello");
        let mut copy = view.to_vec();
        copy.push(b'!');
        copy[0] = b'j';

        assert_eq!(view, "hello");
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn clones_compare_equal() {
        let view = ByteView::from(&b"abc"[..]);
        let clone = view.clone();
        assert_eq!(view, clone);
        assert_eq!(clone, &b"abc"[..]);
    }

    #[test]
    fn display_is_lossy_utf8() {
        let view = ByteView::copy_from_slice(&[b'o', b'k', 0xFF]);
        assert_eq!(view.to_string(), "ok\u{FFFD}");
        assert_eq!(view.to_string_lossy(), "ok\u{FFFD}");
    }

    #[test]
    fn default_is_empty() {
        let view = ByteView::default();
        assert!(view.is_empty());
        assert_eq!(view.len(), 0);
    }

    #[test]
    fn debug_reports_length_only() {
        let view = ByteView::from("secret");
        let debug = format!("{view:?}");
        assert!(debug.contains("len: 6"));
        assert!(!debug.contains("secret"));
    }
}
