//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `NetError` variants.

use crate::base::neterror::NetError;
use std::io;
use std::path::Path;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add upload file context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use curlnet::base::context::IoResultExt;
    ///
    /// let file = tokio::fs::File::open(path).await
    ///     .file_context("avatar", path)?;
    /// // Error: "Open post file avatar - /tmp/a.png failed: permission denied"
    /// ```
    fn file_context(self, key: &str, path: &Path) -> Result<T, NetError>;

    /// Add response body context to an IO error.
    fn body_context(self) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn file_context(self, key: &str, path: &Path) -> Result<T, NetError> {
        self.map_err(|e| NetError::FileOpen {
            key: key.to_string(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn body_context(self) -> Result<T, NetError> {
        self.map_err(|e| NetError::BodyRead(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_file_context() {
        let result: Result<(), io::Error> =
            Err(Error::new(ErrorKind::PermissionDenied, "permission denied"));
        let err = result
            .file_context("avatar", Path::new("/tmp/a.png"))
            .unwrap_err();

        match err {
            NetError::FileOpen { key, path, reason } => {
                assert_eq!(key, "avatar");
                assert_eq!(path, "/tmp/a.png");
                assert!(reason.contains("permission denied"));
            }
            _ => panic!("Expected FileOpen"),
        }
    }

    #[test]
    fn test_body_context() {
        let result: Result<(), io::Error> =
            Err(Error::new(ErrorKind::InvalidData, "corrupt deflate stream"));
        let err = result.body_context().unwrap_err();

        match err {
            NetError::BodyRead(reason) => assert!(reason.contains("corrupt deflate stream")),
            _ => panic!("Expected BodyRead"),
        }
    }
}
