//! Filesystem access used by multipart file uploads.
//!
//! Upload paths are checked and opened through the [`FileSystem`] trait so the
//! body resolver never touches the OS directly.

use crate::http::requestbody::BodyReader;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

/// Alias for the `Future` returned by [`FileSystem::exists`].
pub type Checking = Pin<Box<dyn Future<Output = bool> + Send>>;

/// Alias for the `Future` returned by [`FileSystem::open`].
pub type Opening = Pin<Box<dyn Future<Output = io::Result<BodyReader>> + Send>>;

/// Trait for reading upload files.
///
/// Implementations must be thread-safe; the default is [`LocalFileSystem`].
pub trait FileSystem: Send + Sync {
    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> Checking;

    /// Open `path` for reading.
    fn open(&self, path: &Path) -> Opening;
}

impl<F: FileSystem + ?Sized> FileSystem for Arc<F> {
    fn exists(&self, path: &Path) -> Checking {
        (**self).exists(path)
    }

    fn open(&self, path: &Path) -> Opening {
        (**self).open(path)
    }
}

/// The local disk, accessed through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> Checking {
        let path = path.to_path_buf();
        Box::pin(async move { tokio::fs::metadata(&path).await.is_ok() })
    }

    fn open(&self, path: &Path) -> Opening {
        let path: PathBuf = path.to_path_buf();
        Box::pin(async move {
            let file = tokio::fs::File::open(&path).await?;
            Ok(Box::new(file) as BodyReader)
        })
    }
}
