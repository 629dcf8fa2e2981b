//! Response body streaming and content decoding.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use bytes::Bytes;
use flate2::write::{DeflateDecoder, MultiGzDecoder};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt, TryStreamExt};
use http_body_util::BodyStream;
use hyper::body::Incoming;
use std::fmt;
use std::io::Write;

/// Response body stream.
///
/// The underlying stream is released exactly once: on [`close`](Self::close),
/// after a full drain, or on drop, whichever comes first.
pub struct ResponseBody {
    inner: Option<BoxStream<'static, Result<Bytes, NetError>>>,
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody")
            .field("open", &self.is_open())
            .finish()
    }
}

impl ResponseBody {
    /// Wrap any `Send` stream of byte chunks.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, NetError>> + Send + 'static,
    {
        Self {
            inner: Some(stream.boxed()),
        }
    }

    /// A body with the given bytes as its only chunk.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::from_stream(stream::once(futures::future::ready(Ok(data.into()))))
    }

    pub fn empty() -> Self {
        Self::from_stream(stream::empty())
    }

    /// Adapt hyper's incoming body.
    pub fn from_incoming(body: Incoming) -> Self {
        let chunks = BodyStream::new(body)
            .map_err(|e| NetError::BodyRead(e.to_string()))
            .try_filter_map(|frame| futures::future::ready(Ok(frame.into_data().ok())));
        Self::from_stream(chunks)
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Release the underlying stream. Idempotent.
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            tracing::trace!("response body closed");
        }
    }

    /// Next raw chunk, `None` once exhausted or closed.
    pub async fn chunk(&mut self) -> Option<Result<Bytes, NetError>> {
        let next = self.inner.as_mut()?.next().await;
        if next.is_none() {
            self.close();
        }
        next
    }
}

impl Drop for ResponseBody {
    fn drop(&mut self) {
        self.close();
    }
}

/// Supported `Content-Encoding` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentEncoding {
    #[default]
    Identity,
    Gzip,
    Deflate,
}

impl ContentEncoding {
    /// Detect from a `Content-Encoding` header value by substring.
    ///
    /// `gzip` is checked before `deflate`; anything else passes through.
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.contains("gzip") => ContentEncoding::Gzip,
            Some(v) if v.contains("deflate") => ContentEncoding::Deflate,
            _ => ContentEncoding::Identity,
        }
    }
}

/// Incremental decompressor. Gzip input may hold several members.
enum Decoder {
    Identity(Vec<u8>),
    Gzip(MultiGzDecoder<Vec<u8>>),
    Deflate(DeflateDecoder<Vec<u8>>),
}

impl Decoder {
    fn new(encoding: ContentEncoding) -> Self {
        match encoding {
            ContentEncoding::Identity => Decoder::Identity(Vec::new()),
            ContentEncoding::Gzip => Decoder::Gzip(MultiGzDecoder::new(Vec::new())),
            ContentEncoding::Deflate => Decoder::Deflate(DeflateDecoder::new(Vec::new())),
        }
    }

    fn push(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        match self {
            Decoder::Identity(buf) => {
                buf.extend_from_slice(chunk);
                Ok(())
            }
            Decoder::Gzip(d) => d.write_all(chunk),
            Decoder::Deflate(d) => d.write_all(chunk),
        }
    }

    /// `fed` is false when no body bytes arrived at all; a compressed
    /// encoding then decodes to nothing instead of a truncated stream.
    fn finish(self, fed: bool) -> std::io::Result<Vec<u8>> {
        match self {
            Decoder::Identity(buf) => Ok(buf),
            _ if !fed => Ok(Vec::new()),
            Decoder::Gzip(d) => d.finish(),
            Decoder::Deflate(d) => d.finish(),
        }
    }
}

/// A response body wrapped in the decoder its encoding calls for.
///
/// Chunks are decompressed as they arrive.
#[derive(Debug)]
pub struct DecodedBody {
    body: ResponseBody,
    encoding: ContentEncoding,
}

impl DecodedBody {
    pub fn new(body: ResponseBody, encoding: ContentEncoding) -> Self {
        Self { body, encoding }
    }

    pub fn close(&mut self) {
        self.body.close();
    }

    /// Drain and decode the remaining body. The stream is closed on return,
    /// whether or not decoding succeeded; no partial output is returned.
    pub async fn read_to_end(&mut self) -> Result<Bytes, NetError> {
        let result = self.drain().await;
        self.body.close();
        result
    }

    async fn drain(&mut self) -> Result<Bytes, NetError> {
        let mut decoder = Decoder::new(self.encoding);
        let mut fed = false;
        while let Some(chunk) = self.body.chunk().await {
            let chunk = chunk?;
            fed |= !chunk.is_empty();
            decoder.push(&chunk).body_context()?;
        }
        Ok(Bytes::from(decoder.finish(fed).body_context()?))
    }

    /// Drain, decode and trim surrounding whitespace.
    pub async fn read_trimmed(&mut self) -> Result<String, NetError> {
        let bytes = self.read_to_end().await?;
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }
}
