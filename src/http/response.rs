//! Decoded HTTP response.

use crate::base::neterror::NetError;
use crate::http::orderedheaders::canonical_header_key;
use crate::http::responsebody::DecodedBody;
use http::{StatusCode, Version};
use serde::Serialize;
use std::collections::BTreeMap;

/// A fully decoded response.
///
/// Headers are normalized to one joined value per canonical name and carry
/// the synthesized `Status`, `Status-Code` and `Proto` entries. The body is
/// filled in once the stream has been drained; see [`read_body`](Self::read_body).
#[derive(Debug, Serialize)]
pub struct Response {
    headers: BTreeMap<String, String>,
    #[serde(rename = "Cookie")]
    cookie: String,
    #[serde(rename = "URL")]
    url: String,
    body: String,
    #[serde(skip)]
    status: StatusCode,
    #[serde(skip)]
    version: Version,
    #[serde(skip)]
    body_reader: Option<DecodedBody>,
}

impl Response {
    pub(crate) fn new(
        status: StatusCode,
        version: Version,
        headers: BTreeMap<String, String>,
        cookie: String,
        url: String,
        body_reader: DecodedBody,
    ) -> Self {
        Self {
            headers,
            cookie,
            url,
            body: String::new(),
            status,
            version,
            body_reader: Some(body_reader),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&canonical_header_key(name))
            .map(String::as_str)
    }

    /// Sorted `name=value` pairs joined with `"; "`.
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// URL of the request that produced this response.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Trimmed body text; empty until drained.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the body stream has not been released yet.
    pub fn is_open(&self) -> bool {
        self.body_reader.is_some()
    }

    /// Drain the body stream at most once and return the trimmed text.
    ///
    /// Later calls return an empty string without touching the stream. A
    /// failed drain still releases the stream and leaves `body` empty.
    pub async fn read_body(&mut self) -> Result<String, NetError> {
        let Some(mut reader) = self.body_reader.take() else {
            return Ok(String::new());
        };
        let text = reader.read_trimmed().await?;
        self.body = text.clone();
        Ok(text)
    }

    /// Release the body stream without reading it. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut reader) = self.body_reader.take() {
            reader.close();
        }
    }

    /// Deserialize the drained body as JSON.
    #[cfg(feature = "json")]
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_str(&self.body).map_err(|e| NetError::BodyRead(e.to_string()))
    }
}
