//! # curlnet
//!
//! A curl-style HTTP request builder and executor.
//!
//! A request is described with a [`RequestConfig`] (method, URL, headers,
//! cookie, referer, option flags and one of several body sources), then
//! executed by a [`Client`]. Execution races the transport against a timeout
//! and a cancellation handle; the response is decoded into a [`Response`]
//! with normalized headers, aggregated cookies and a decompressed body.
//!
//! ## Features
//!
//! - **Body sources**: raw bytes, string, reader, or a multipart form built
//!   from fields, field readers and file uploads, picked by fixed priority
//! - **Deadline race**: timeout and cancellation always unblock the caller
//! - **Decoding**: gzip and deflate bodies, sorted cookie string,
//!   synthesized `Status`/`Status-Code`/`Proto` headers
//! - **Redirects**: with the `Redirect` option a single redirect hop is taken
//! - **Header presets**: browser-like or JSON API defaults, applied explicitly
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use curlnet::{Client, HeaderPreset};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::builder().preset(HeaderPreset::Browser).build();
//!     let mut config = client.get("http://example.com");
//!     config.set_option("Redirect", true);
//!     let response = client.execute(config).await.unwrap();
//!     println!("{} {}", response.header("Status").unwrap_or(""), response.cookie());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`fs`] - Filesystem access for uploads
//! - [`http`] - Bodies, transport, executor and response decoding
//! - [`urlrequest`] - Request description, building and redirect handling

pub mod base;
pub mod client;
pub mod fs;
pub mod http;
pub mod urlrequest;

pub use base::neterror::NetError;
pub use client::{Client, ClientBuilder, ClientConfig};
pub use self::http::{Response, Transport};
pub use urlrequest::{HeaderPreset, RequestConfig};
