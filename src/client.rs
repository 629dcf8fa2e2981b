//! HTTP Client with builder pattern.
//!
//! A [`Client`] owns the transport, the filesystem used for uploads and the
//! defaults stamped onto every request. Requests are described with a
//! [`RequestConfig`] and handed to [`Client::execute`].
//!
//! # Example
//!
//! ```rust,ignore
//! use curlnet::{Client, HeaderPreset, RequestConfig};
//!
//! let client = Client::builder()
//!     .preset(HeaderPreset::Browser)
//!     .build();
//!
//! let mut config = client.post("http://example.com/upload");
//! config.add_post_field("name", "value").add_post_file("file", "report.csv");
//! let resp = client.execute(config).await?;
//! println!("{} {}", resp.header("Status").unwrap_or(""), resp.body());
//! ```

use crate::base::neterror::NetError;
use crate::fs::{FileSystem, LocalFileSystem};
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::response::Response;
use crate::http::transaction::DEFAULT_TIMEOUT;
use crate::http::transport::{HyperTransport, Transport};
use crate::urlrequest::job::RequestJob;
use crate::urlrequest::profile::HeaderPreset;
use crate::urlrequest::request::RequestConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Serializable client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout for requests that do not set a positive one.
    pub default_timeout_secs: u64,
    /// Header preset applied before each request's own headers.
    pub preset: Option<HeaderPreset>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            preset: None,
        }
    }
}

/// HTTP Client for executing requests.
///
/// Cheap to clone; clones share the transport and filesystem.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    filesystem: Arc<dyn FileSystem>,
    base_headers: Arc<OrderedHeaderMap>,
    default_timeout: Duration,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Start describing a GET request.
    pub fn get(&self, url: &str) -> RequestConfig {
        RequestConfig::new("GET", url)
    }

    /// Start describing a POST request.
    pub fn post(&self, url: &str) -> RequestConfig {
        RequestConfig::new("POST", url)
    }

    /// Start describing a request with any method.
    pub fn request(&self, method: &str, url: &str) -> RequestConfig {
        RequestConfig::new(method, url)
    }

    /// Build, send and decode `config`.
    pub async fn execute(&self, config: RequestConfig) -> Result<Response, NetError> {
        RequestJob::new(self.clone(), config).run().await
    }

    /// Like [`execute`](Self::execute), cancelled when `parent` is.
    pub async fn execute_with_context(
        &self,
        mut config: RequestConfig,
        parent: &CancellationToken,
    ) -> Result<Response, NetError> {
        config.set_context(parent);
        self.execute(config).await
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    pub(crate) fn filesystem(&self) -> &dyn FileSystem {
        self.filesystem.as_ref()
    }

    pub(crate) fn base_headers(&self) -> &OrderedHeaderMap {
        &self.base_headers
    }
}

/// Builder for creating a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    filesystem: Option<Arc<dyn FileSystem>>,
    timeout: Option<Duration>,
    preset: Option<HeaderPreset>,
}

impl ClientBuilder {
    /// Set the transport (defaults to [`HyperTransport`]).
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the filesystem used for file uploads.
    pub fn filesystem<F: FileSystem + 'static>(mut self, filesystem: F) -> Self {
        self.filesystem = Some(Arc::new(filesystem));
        self
    }

    /// Set the default request timeout. Zero keeps the built-in default.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Apply a header preset to every request.
    pub fn preset(mut self, preset: HeaderPreset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Take timeout and preset from a [`ClientConfig`].
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.timeout = Some(Duration::from_secs(config.default_timeout_secs));
        self.preset = config.preset;
        self
    }

    /// Build the client.
    pub fn build(self) -> Client {
        let base_headers = self
            .preset
            .map(|p| p.headers())
            .unwrap_or_default();
        let default_timeout = self
            .timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT);

        tracing::debug!(
            preset = ?self.preset,
            timeout = ?default_timeout,
            "building client"
        );

        Client {
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(HyperTransport::new()) as Arc<dyn Transport>),
            filesystem: self
                .filesystem
                .unwrap_or_else(|| Arc::new(LocalFileSystem) as Arc<dyn FileSystem>),
            base_headers: Arc::new(base_headers),
            default_timeout,
        }
    }
}
