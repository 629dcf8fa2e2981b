//! Body source resolution.
//!
//! A request may have several body sources populated at once; exactly one is
//! used, picked by fixed priority:
//!
//! 1. raw bytes
//! 2. raw string (non-empty)
//! 3. reader
//! 4. multipart form built from fields, field readers and files
//! 5. nothing, an empty body
//!
//! Only the multipart strategy supplies its own `Content-Type`.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::fs::FileSystem;
use crate::http::multipart::{Form, Part};
use crate::http::requestbody::{BodyReader, RequestBody};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Every place a request body can come from.
#[derive(Default)]
pub struct BodySources {
    pub bytes: Option<Bytes>,
    pub string: String,
    pub reader: Option<BodyReader>,
    pub fields: BTreeMap<String, Vec<String>>,
    pub field_readers: BTreeMap<String, BodyReader>,
    pub files: BTreeMap<String, Vec<PathBuf>>,
}

impl fmt::Debug for BodySources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodySources")
            .field("bytes", &self.bytes.as_ref().map(|b| b.len()))
            .field("string_len", &self.string.len())
            .field("reader", &self.reader.is_some())
            .field("fields", &self.fields)
            .field("field_readers", &self.field_readers.keys().collect::<Vec<_>>())
            .field("files", &self.files)
            .finish()
    }
}

impl BodySources {
    /// Whether any source would contribute a body.
    pub fn is_populated(&self) -> bool {
        self.bytes.is_some()
            || !self.string.is_empty()
            || self.reader.is_some()
            || self.has_form_data()
    }

    fn has_form_data(&self) -> bool {
        !self.fields.is_empty() || !self.field_readers.is_empty() || !self.files.is_empty()
    }

    /// The strategy [`resolve_body`] will pick.
    pub fn strategy(&self) -> BodyStrategy {
        if self.bytes.is_some() {
            BodyStrategy::Bytes
        } else if !self.string.is_empty() {
            BodyStrategy::String
        } else if self.reader.is_some() {
            BodyStrategy::Reader
        } else if self.has_form_data() {
            BodyStrategy::Multipart
        } else {
            BodyStrategy::Empty
        }
    }
}

/// Body construction strategy, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStrategy {
    Bytes,
    String,
    Reader,
    Multipart,
    Empty,
}

/// Output of [`resolve_body`].
#[derive(Debug)]
pub struct ResolvedBody {
    pub body: RequestBody,
    /// Set only for multipart bodies; replaces any caller `Content-Type`.
    pub content_type: Option<String>,
}

/// Pick one body strategy and build the body.
///
/// Any multipart failure aborts the whole resolution.
pub async fn resolve_body(
    sources: BodySources,
    fs: &dyn FileSystem,
) -> Result<ResolvedBody, NetError> {
    let strategy = sources.strategy();
    tracing::debug!(?strategy, "resolving request body");

    let BodySources {
        bytes,
        string,
        reader,
        fields,
        field_readers,
        files,
    } = sources;

    let resolved = match strategy {
        BodyStrategy::Bytes => ResolvedBody {
            body: RequestBody::Bytes(bytes.unwrap_or_default()),
            content_type: None,
        },
        BodyStrategy::String => ResolvedBody {
            body: RequestBody::from(string),
            content_type: None,
        },
        BodyStrategy::Reader => ResolvedBody {
            body: reader.map(RequestBody::Stream).unwrap_or_default(),
            content_type: None,
        },
        BodyStrategy::Multipart => {
            let form = build_form(fields, field_readers, files, fs).await?;
            let content_type = form.content_type();
            ResolvedBody {
                body: RequestBody::Bytes(form.into_body()),
                content_type: Some(content_type),
            }
        }
        BodyStrategy::Empty => ResolvedBody {
            body: RequestBody::Empty,
            content_type: None,
        },
    };

    Ok(resolved)
}

/// Plain fields first, then field readers, then files.
async fn build_form(
    fields: BTreeMap<String, Vec<String>>,
    field_readers: BTreeMap<String, BodyReader>,
    files: BTreeMap<String, Vec<PathBuf>>,
    fs: &dyn FileSystem,
) -> Result<Form, NetError> {
    let mut form = Form::new();

    for (key, values) in fields {
        for value in values {
            form = form.text(key.clone(), value);
        }
    }

    for (key, mut reader) in field_readers {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|e| NetError::MultipartAssembly(format!("field {}: {}", key, e)))?;
        form = form.part(key, Part::bytes(buf));
    }

    for (key, paths) in files {
        for path in paths {
            let data = read_upload(fs, &key, &path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            form = form.part(key.clone(), Part::file(data, file_name));
        }
    }

    Ok(form)
}

async fn read_upload(fs: &dyn FileSystem, key: &str, path: &Path) -> Result<Vec<u8>, NetError> {
    if !fs.exists(path).await {
        return Err(NetError::FileNotFound {
            key: key.to_string(),
            path: path.display().to_string(),
        });
    }

    let mut file = fs.open(path).await.file_context(key, path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).await.map_err(|e| {
        NetError::MultipartAssembly(format!("copy {} - {}: {}", key, path.display(), e))
    })?;
    tracing::debug!(key, path = %path.display(), size = data.len(), "read upload file");
    Ok(data)
}
