//! Turns a raw transport response into a [`Response`].

use crate::base::neterror::NetError;
use crate::http::orderedheaders::canonical_header_key;
use crate::http::response::Response;
use crate::http::responsebody::{ContentEncoding, DecodedBody};
use crate::http::transport::HttpResponse;
use cookie::Cookie;
use http::header::{LOCATION, SET_COOKIE};
use http::{HeaderMap, StatusCode, Version};
use std::collections::BTreeMap;
use url::Url;

/// Result of decoding one response.
#[derive(Debug)]
pub enum Decoded {
    /// The response was decoded and its body drained.
    Complete(Response),
    /// A redirect should be followed; the body was released unread.
    Redirect { location: String },
}

/// Decode `raw`, which answered a request to `request_url`.
///
/// With `follow_redirect` set, a response carrying `Location` short-circuits
/// into [`Decoded::Redirect`]. The body stream is released on every path.
pub async fn decode_response(
    raw: HttpResponse,
    request_url: &str,
    follow_redirect: bool,
) -> Result<Decoded, NetError> {
    let (parts, mut body) = raw.into_parts();
    let mut headers = normalize_headers(&parts.headers);

    if let Some(location) = redirect_target(&parts.headers, request_url) {
        headers.insert("Location".to_string(), location.clone());
        if follow_redirect {
            tracing::debug!(from = %request_url, to = %location, "redirect target found");
            body.close();
            return Ok(Decoded::Redirect { location });
        }
    }

    let reason = parts
        .extensions
        .get::<hyper::ext::ReasonPhrase>()
        .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned());
    headers.insert("Status".to_string(), status_line(parts.status, reason));
    headers.insert("Status-Code".to_string(), parts.status.as_u16().to_string());
    headers.insert("Proto".to_string(), proto(parts.version).to_string());

    let cookie = aggregate_cookies(&parts.headers);

    let encoding =
        ContentEncoding::from_header(headers.get("Content-Encoding").map(String::as_str));
    let mut response = Response::new(
        parts.status,
        parts.version,
        headers,
        cookie,
        request_url.to_string(),
        DecodedBody::new(body, encoding),
    );
    response.read_body().await?;

    Ok(Decoded::Complete(response))
}

/// One entry per canonical name; repeated values joined with a space.
fn normalize_headers(raw: &HeaderMap) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for name in raw.keys() {
        let joined = raw
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        headers.insert(canonical_header_key(name.as_str()), joined);
    }
    headers
}

/// `Location` resolved against the request URL.
fn redirect_target(raw: &HeaderMap, request_url: &str) -> Option<String> {
    let location = raw.get(LOCATION)?;
    let location = String::from_utf8_lossy(location.as_bytes()).into_owned();
    if location.is_empty() {
        return None;
    }
    let resolved = Url::parse(request_url)
        .and_then(|base| base.join(&location))
        .map(|u| u.to_string())
        .unwrap_or(location);
    Some(resolved)
}

/// "200 OK", preferring the reason phrase the server actually sent.
fn status_line(status: StatusCode, reason: Option<String>) -> String {
    let reason = reason.or_else(|| status.canonical_reason().map(str::to_string));
    match reason {
        Some(reason) if !reason.is_empty() => format!("{} {}", status.as_u16(), reason),
        _ => status.as_u16().to_string(),
    }
}

fn proto(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

/// Sorted `name=value` pairs from every `Set-Cookie`, joined with `"; "`.
fn aggregate_cookies(raw: &HeaderMap) -> String {
    let mut pairs: Vec<String> = raw
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse(v).ok())
        .map(|c| format!("{}={}", c.name(), c.value_trimmed()))
        .collect();
    pairs.sort();
    pairs.join("; ").trim().to_string()
}
