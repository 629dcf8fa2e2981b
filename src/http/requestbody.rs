//! Request body handed to the transport.

use bytes::Bytes;
use futures::TryStreamExt;
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use std::convert::Infallible;
use std::fmt;
use std::io;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// A readable byte stream supplied by the caller.
pub type BodyReader = Box<dyn AsyncRead + Send + Unpin>;

/// Body type the hyper transport sends.
pub type BoxedBody = UnsyncBoxBody<Bytes, io::Error>;

/// Request body produced by body source resolution.
#[derive(Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Body with known bytes.
    Bytes(Bytes),
    /// Body streamed from a reader, length unknown.
    Stream(BodyReader),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            RequestBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Bytes(Bytes::from(s))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Bytes(Bytes::from(s.to_owned()))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Bytes(b)
    }
}

impl RequestBody {
    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    /// Length in bytes, `None` for streamed bodies.
    pub fn len(&self) -> Option<usize> {
        match self {
            RequestBody::Empty => Some(0),
            RequestBody::Bytes(b) => Some(b.len()),
            RequestBody::Stream(_) => None,
        }
    }

    /// Convert into a boxed `http_body::Body` for hyper.
    pub fn into_boxed(self) -> BoxedBody {
        match self {
            RequestBody::Empty => Full::new(Bytes::new()).map_err(unreachable).boxed_unsync(),
            RequestBody::Bytes(b) => Full::new(b).map_err(unreachable).boxed_unsync(),
            RequestBody::Stream(reader) => {
                StreamBody::new(ReaderStream::new(reader).map_ok(Frame::data)).boxed_unsync()
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn collect_bytes(self) -> io::Result<Bytes> {
        match self {
            RequestBody::Empty => Ok(Bytes::new()),
            RequestBody::Bytes(b) => Ok(b),
            RequestBody::Stream(mut reader) => {
                let mut buf = Vec::new();
                tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buf).await?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

fn unreachable(never: Infallible) -> io::Error {
    match never {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body::Body;

    #[test]
    fn test_empty_body() {
        let body = RequestBody::Empty;
        assert!(body.is_empty());
        assert_eq!(body.len(), Some(0));
    }

    #[test]
    fn test_bytes_body() {
        let body = RequestBody::Bytes(Bytes::from("hello"));
        assert!(!body.is_empty());
        assert_eq!(body.len(), Some(5));
    }

    #[test]
    fn test_stream_has_unknown_length() {
        let body = RequestBody::Stream(Box::new(&b"streamed"[..]));
        assert!(!body.is_empty());
        assert_eq!(body.len(), None);
    }

    #[test]
    fn test_from_str() {
        let body: RequestBody = "test".into();
        assert_eq!(body.len(), Some(4));
    }

    #[test]
    fn test_from_vec() {
        let body: RequestBody = vec![1u8, 2, 3, 4].into();
        assert_eq!(body.len(), Some(4));
    }

    #[test]
    fn test_default_is_empty() {
        assert!(RequestBody::default().is_empty());
    }

    #[test]
    fn test_boxed_size_hint() {
        let boxed = RequestBody::from("test").into_boxed();
        assert_eq!(boxed.size_hint().exact(), Some(4));

        let boxed = RequestBody::Empty.into_boxed();
        assert_eq!(boxed.size_hint().exact(), Some(0));
    }

    #[tokio::test]
    async fn test_collect_stream() {
        let body = RequestBody::Stream(Box::new(&b"from a reader"[..]));
        let bytes = body.collect_bytes().await.unwrap();
        assert_eq!(&bytes[..], b"from a reader");
    }

    #[tokio::test]
    async fn test_boxed_stream_collects() {
        let boxed = RequestBody::Stream(Box::new(&b"chunked"[..])).into_boxed();
        let collected = boxed.collect().await.unwrap().to_bytes();
        assert_eq!(&collected[..], b"chunked");
    }
}
