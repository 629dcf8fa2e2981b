use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // Request construction errors
    #[error("Invalid request config: {field} is empty")]
    InvalidRequestConfig { field: &'static str },
    #[error("Invalid method {0:?}")]
    InvalidMethod(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("Method {method} cannot carry a body, only POST can")]
    MethodBodyMismatch { method: String },
    #[error("Post file {key} - {path} does not exist")]
    FileNotFound { key: String, path: String },
    #[error("Open post file {key} - {path} failed: {reason}")]
    FileOpen {
        key: String,
        path: String,
        reason: String,
    },
    #[error("Multipart assembly failed: {0}")]
    MultipartAssembly(String),

    // Execution errors
    #[error("Request timed out after {0:?}")]
    RequestTimeout(Duration),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Transport error: {0}")]
    Transport(String),

    // Response errors
    #[error("Reading response body failed: {0}")]
    BodyRead(String),
}

impl NetError {
    /// Nearest Chromium net error code for this error.
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::Cancelled => -3,
            NetError::InvalidRequestConfig { .. } => -4,
            NetError::FileNotFound { .. } => -6,
            NetError::RequestTimeout(_) => -7,
            NetError::FileOpen { .. } => -10,
            NetError::MultipartAssembly(_) => -14,
            NetError::Transport(_) => -104,
            NetError::InvalidUrl(_) => -300,
            NetError::InvalidMethod(_) => -322,
            NetError::MethodBodyMismatch { .. } => -322,
            NetError::InvalidHeader(_) => -320,
            NetError::BodyRead(_) => -330,
        }
    }

    /// Errors raised while validating the request config, before any I/O.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            NetError::InvalidRequestConfig { .. }
                | NetError::InvalidMethod(_)
                | NetError::InvalidUrl(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, NetError::RequestTimeout(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, NetError::Cancelled)
    }
}
