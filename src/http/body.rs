//! Response bodies as ordered byte chunks.

use std::fmt;

use bytes::{Bytes, BytesMut};

type ChunkStream = Box<dyn Iterator<Item = Bytes> + Send + 'static>;

/// A response body: an ordered sequence of byte chunks.
///
/// Buffered bodies know their length up front. Streamed bodies are passed
/// through untouched and can only be measured by consuming them, so
/// [`len`](Self::len) reports `None` for them.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use switchyard::http::Body;
///
/// let body = Body::from("hello");
/// assert_eq!(body.len(), Some(5));
///
/// let streamed = Body::stream(vec![Bytes::from("a"), Bytes::from("b")]);
/// assert_eq!(streamed.len(), None);
/// assert_eq!(&streamed.into_bytes()[..], b"ab");
/// ```
pub enum Body {
    /// Chunks held in memory.
    Chunks(Vec<Bytes>),
    /// Chunks produced lazily by an iterator.
    Stream(ChunkStream),
}

impl Body {
    /// An empty body.
    pub fn empty() -> Self {
        Body::Chunks(Vec::new())
    }

    /// Wraps an iterator of chunks as a pass-through body.
    pub fn stream<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        Body::Stream(Box::new(chunks.into_iter()))
    }

    /// Total byte length, or `None` when the body cannot be measured without
    /// consuming it.
    pub fn len(&self) -> Option<usize> {
        match self {
            Body::Chunks(chunks) => Some(chunks.iter().map(Bytes::len).sum()),
            Body::Stream(_) => None,
        }
    }

    /// Returns `true` only for a buffered body with no bytes in it.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// The buffered chunks, if this body is not a stream.
    pub fn chunks(&self) -> Option<&[Bytes]> {
        match self {
            Body::Chunks(chunks) => Some(chunks),
            Body::Stream(_) => None,
        }
    }

    /// Concatenates every chunk, draining a stream if necessary.
    pub fn into_bytes(self) -> Bytes {
        match self {
            Body::Chunks(mut chunks) if chunks.len() == 1 => chunks.remove(0),
            Body::Chunks(chunks) => concat(chunks),
            Body::Stream(stream) => concat(stream),
        }
    }
}

fn concat(chunks: impl IntoIterator<Item = Bytes>) -> Bytes {
    let mut buf = BytesMut::new();
    for chunk in chunks {
        buf.extend_from_slice(&chunk);
    }
    buf.freeze()
}

impl Default for Body {
    fn default() -> Self {
        Body::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Chunks(chunks) => f.debug_tuple("Chunks").field(chunks).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(chunk: Bytes) -> Self {
        Body::Chunks(vec![chunk])
    }
}

impl From<Vec<Bytes>> for Body {
    fn from(chunks: Vec<Bytes>) -> Self {
        Body::Chunks(chunks)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::from(Bytes::from(text))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Body::from(Bytes::from_static(text.as_bytes()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::from(Bytes::from(bytes))
    }
}

impl From<Option<String>> for Body {
    fn from(text: Option<String>) -> Self {
        text.map_or_else(Body::empty, Body::from)
    }
}
