//! Response bodies.
//!
//! A [`Body`] is either fully buffered with a known length, or an open-ended
//! stream fed chunk by chunk through a Tokio channel. Middleware that needs
//! to hold on to a body (the response cache) only ever touches the buffered
//! variant.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::sync::mpsc;

/// The payload of a [`Response`](super::Response).
///
/// # Examples
///
/// ```
/// use response_cache::http::Body;
///
/// let body = Body::from("hello");
/// assert_eq!(body.len(), Some(5));
/// assert!(!body.is_stream());
///
/// let (_tx, stream) = Body::channel(8);
/// assert_eq!(stream.len(), None);
/// assert!(stream.is_stream());
/// ```
pub enum Body {
    /// A materialized body whose full length is known.
    Full(Bytes),
    /// A body produced incrementally; its length is unknown until the
    /// sending half is dropped.
    Stream(mpsc::Receiver<Bytes>),
}

impl Body {
    /// An empty, fully buffered body.
    pub fn empty() -> Self {
        Self::Full(Bytes::new())
    }

    /// Creates a streaming body and the sender that feeds it.
    ///
    /// The stream ends when every clone of the sender has been dropped.
    pub fn channel(buffer: usize) -> (mpsc::Sender<Bytes>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::Stream(rx))
    }

    /// Returns `true` if this body is an open-ended stream.
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Returns the body length when it is known up front.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Full(bytes) => Some(bytes.len()),
            Self::Stream(_) => None,
        }
    }

    /// Returns `true` for a buffered body with no content.
    ///
    /// A stream is never considered empty, since its length is not known.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Returns the buffered bytes, or `None` for a stream.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Full(bytes) => Some(bytes),
            Self::Stream(_) => None,
        }
    }

    /// Drains the body into one contiguous buffer.
    ///
    /// For a stream this waits until the sender side is closed.
    pub async fn collect(self) -> Bytes {
        match self {
            Self::Full(bytes) => bytes,
            Self::Stream(mut rx) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = rx.recv().await {
                    buf.put(chunk);
                }
                buf.freeze()
            }
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Full(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Full(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::Full(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Self::Full(Bytes::from_static(s.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_bounded() {
        let body = Body::empty();
        assert!(body.is_empty());
        assert_eq!(body.as_bytes().map(Bytes::len), Some(0));
    }

    #[test]
    fn stream_has_no_length() {
        let (_tx, body) = Body::channel(1);
        assert!(body.is_stream());
        assert!(!body.is_empty());
        assert!(body.as_bytes().is_none());
    }

    #[tokio::test]
    async fn collect_drains_stream() {
        let (tx, body) = Body::channel(4);
        tx.send(Bytes::from_static(b"hel")).await.unwrap();
        tx.send(Bytes::from_static(b"lo")).await.unwrap();
        drop(tx);
        assert_eq!(body.collect().await, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn collect_full_is_identity() {
        let body = Body::from("abc");
        assert_eq!(body.collect().await, Bytes::from_static(b"abc"));
    }
}
