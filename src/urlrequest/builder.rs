//! Turns a [`RequestConfig`] into a transport-ready request.

use crate::base::neterror::NetError;
use crate::fs::FileSystem;
use crate::http::bodysource::resolve_body;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::transport::HttpRequest;
use crate::urlrequest::request::{is_allowed_method, RequestConfig};
use http::{Method, Uri};
use url::Url;

/// Validate `config` and build the request.
///
/// Headers go on in this order, later entries overwriting earlier ones:
/// `base` (client preset), the config's own headers, the multipart
/// `Content-Type` if the body is multipart, then `Cookie` and `Referer`.
/// Nothing touches the network; every failure here is returned before any
/// I/O other than reading upload files.
pub async fn build_request(
    mut config: RequestConfig,
    base: &OrderedHeaderMap,
    fs: &dyn FileSystem,
) -> Result<HttpRequest, NetError> {
    if config.method().is_empty() {
        return Err(NetError::InvalidRequestConfig { field: "method" });
    }
    if config.url().is_empty() {
        return Err(NetError::InvalidRequestConfig { field: "url" });
    }
    if !is_allowed_method(config.method()) {
        return Err(NetError::InvalidMethod(config.method().to_string()));
    }

    let url = Url::parse(config.url()).map_err(|e| NetError::InvalidUrl(e.to_string()))?;
    let uri: Uri = url
        .as_str()
        .parse()
        .map_err(|e: http::uri::InvalidUri| NetError::InvalidUrl(e.to_string()))?;
    let method = Method::from_bytes(config.method().as_bytes())
        .map_err(|_| NetError::InvalidMethod(config.method().to_string()))?;

    if config.has_body() && method != Method::POST {
        return Err(NetError::MethodBodyMismatch {
            method: method.to_string(),
        });
    }

    let resolved = resolve_body(config.take_body(), fs).await?;

    let mut headers = base.clone();
    headers.extend_from(config.headers());
    if let Some(content_type) = resolved.content_type {
        headers.remove("Content-Type");
        headers.insert("Content-Type", content_type);
    }
    if !config.cookie().is_empty() {
        headers.insert("Cookie", config.cookie());
    }
    if !config.referer().is_empty() {
        headers.insert("Referer", config.referer());
    }

    let mut request = http::Request::new(resolved.body);
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    *request.headers_mut() = headers.to_header_map()?;

    tracing::debug!(
        method = %request.method(),
        url = %url,
        headers = headers.len(),
        body_len = ?request.body().len(),
        "built request"
    );
    Ok(request)
}
