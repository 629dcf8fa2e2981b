//! `multipart/form-data` encoding (RFC 7578) for field and file uploads.
//!
//! Parts are written in insertion order.
//!
//! # Example
//! ```ignore
//! use curlnet::http::multipart::{Form, Part};
//!
//! let body = Form::new()
//!     .text("username", "user123")
//!     .part("file", Part::file(b"file content".as_slice(), "doc.txt"))
//!     .into_body();
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

static BOUNDARY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// An ordered set of named parts sharing one boundary.
#[derive(Debug)]
pub struct Form {
    boundary: String,
    fields: Vec<(Cow<'static, str>, Part)>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    pub fn new() -> Self {
        Self {
            boundary: generate_boundary(),
            fields: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Append a plain field.
    pub fn text<N, V>(self, name: N, value: V) -> Self
    where
        N: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        self.part(name, Part::text(value))
    }

    /// Append an arbitrary part.
    pub fn part<N>(mut self, name: N, part: Part) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        self.fields.push((name.into(), part));
        self
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serialize every part followed by the closing delimiter.
    ///
    /// An empty form still carries its closing boundary.
    pub fn into_body(self) -> Bytes {
        let payload: usize = self.fields.iter().map(|(_, p)| p.data.len()).sum();
        let mut out = BytesMut::with_capacity(payload + 128 * (self.fields.len() + 1));

        for (name, part) in &self.fields {
            put_delimiter(&mut out, &self.boundary);
            out.put_slice(b"\r\n");
            part.put_head(&mut out, name);
            out.put_slice(b"\r\n\r\n");
            out.put_slice(&part.data);
            out.put_slice(b"\r\n");
        }

        put_delimiter(&mut out, &self.boundary);
        out.put_slice(b"--\r\n");
        out.freeze()
    }
}

fn put_delimiter(out: &mut BytesMut, boundary: &str) {
    out.put_slice(b"--");
    out.put_slice(boundary.as_bytes());
}

/// One entry of a [`Form`].
#[derive(Debug, Clone)]
pub struct Part {
    data: Bytes,
    content_type: Option<String>,
    file_name: Option<Cow<'static, str>>,
}

impl Part {
    /// A plain field; written without a `Content-Type` line.
    pub fn text<V>(value: V) -> Self
    where
        V: Into<Cow<'static, str>>,
    {
        Self::bytes(value.into().into_owned())
    }

    pub fn bytes<B>(data: B) -> Self
    where
        B: Into<Bytes>,
    {
        Self {
            data: data.into(),
            content_type: None,
            file_name: None,
        }
    }

    /// A file upload. Content type defaults to `application/octet-stream`.
    pub fn file<B, S>(data: B, file_name: S) -> Self
    where
        B: Into<Bytes>,
        S: Into<Cow<'static, str>>,
    {
        Self::bytes(data)
            .file_name(file_name)
            .content_type("application/octet-stream")
    }

    pub fn content_type<S: Into<String>>(mut self, mime: S) -> Self {
        self.content_type = Some(mime.into());
        self
    }

    pub fn file_name<S>(mut self, name: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        self.file_name = Some(name.into());
        self
    }

    /// Write the part's header lines, without the trailing blank line.
    fn put_head(&self, out: &mut BytesMut, name: &str) {
        out.put_slice(b"Content-Disposition: form-data; name=");
        put_quoted(out, name);
        if let Some(file_name) = &self.file_name {
            out.put_slice(b"; filename=");
            put_quoted(out, file_name);
        }
        if let Some(mime) = &self.content_type {
            out.put_slice(b"\r\nContent-Type: ");
            out.put_slice(mime.as_bytes());
        }
    }
}

/// Write `value` as a quoted-string, backslash-escaping `"` and `\`.
fn put_quoted(out: &mut BytesMut, value: &str) {
    out.put_u8(b'"');
    for &b in value.as_bytes() {
        if b == b'"' || b == b'\\' {
            out.put_u8(b'\\');
        }
        out.put_u8(b);
    }
    out.put_u8(b'"');
}

fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = BOUNDARY_COUNTER.fetch_add(1, Ordering::Relaxed);

    format!(
        "----curlnet-boundary-{:016x}{:08x}{:04x}",
        nanos,
        std::process::id(),
        seq & 0xffff
    )
}
