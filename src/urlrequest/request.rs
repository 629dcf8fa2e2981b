use crate::base::neterror::NetError;
use crate::http::bodysource::BodySources;
use crate::http::orderedheaders::{canonical_header_key, OrderedHeaderMap};
use crate::http::requestbody::BodyReader;
use crate::urlrequest::profile::HeaderPreset;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Methods a request may use.
pub const ALLOWED_METHODS: [&str; 8] = [
    "GET", "POST", "DELETE", "OPTIONS", "HEAD", "PUT", "CONNECT", "TRACE",
];

/// Option flag that makes a single server redirect be followed.
pub const REDIRECT_OPTION: &str = "Redirect";

/// Everything needed to build and execute one request.
///
/// Populated through setters, then consumed by a client. `url`, `cookie`,
/// `referer` and the raw post string are set-once: a later call is ignored
/// while a non-empty value is present.
#[derive(Debug, Default)]
pub struct RequestConfig {
    method: String,
    url: String,
    headers: OrderedHeaderMap,
    cookie: String,
    referer: String,
    options: HashMap<String, bool>,
    body: BodySources,
    timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl RequestConfig {
    /// Create a config. The method is upper-cased here and validated when the
    /// request is built.
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url: url.to_string(),
            ..Default::default()
        }
    }

    /// The follow-up request for a one-hop redirect: a `GET` to `url` that
    /// carries the redirect target as its `Referer`.
    pub fn redirect_hop(url: &str, location: &str) -> Self {
        let mut hop = Self::new("GET", url);
        hop.set_referer(location);
        hop
    }

    pub fn set_url(&mut self, url: &str) -> &mut Self {
        if self.url.is_empty() {
            self.url = url.to_string();
        }
        self
    }

    /// Upper-case and validate. An unknown method leaves the current one
    /// untouched.
    pub fn set_method(&mut self, method: &str) -> Result<&mut Self, NetError> {
        let method = method.to_ascii_uppercase();
        if !is_allowed_method(&method) {
            return Err(NetError::InvalidMethod(method));
        }
        self.method = method;
        Ok(self)
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Copy a preset's headers in, overwriting same-named ones.
    pub fn apply_preset(&mut self, preset: HeaderPreset) -> &mut Self {
        self.headers.extend_from(&preset.headers());
        self
    }

    pub fn set_default_headers(&mut self) -> &mut Self {
        self.apply_preset(HeaderPreset::Browser)
    }

    pub fn set_option(&mut self, name: &str, value: bool) -> &mut Self {
        self.options.insert(canonical_header_key(name), value);
        self
    }

    pub fn set_cookie(&mut self, cookie: &str) -> &mut Self {
        if self.cookie.is_empty() {
            self.cookie = cookie.to_string();
        }
        self
    }

    pub fn set_referer(&mut self, referer: &str) -> &mut Self {
        if self.referer.is_empty() {
            self.referer = referer.to_string();
        }
        self
    }

    /// Derive this request's cancellation handle from `parent`. Only the
    /// first call has an effect.
    pub fn set_context(&mut self, parent: &CancellationToken) -> &mut Self {
        if self.cancel.is_none() {
            self.cancel = Some(parent.child_token());
        }
        self
    }

    /// A zero duration falls back to the default at execution time.
    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn set_post_bytes(&mut self, data: impl Into<Bytes>) -> &mut Self {
        self.body.bytes = Some(data.into());
        self
    }

    pub fn set_post_string(&mut self, data: &str) -> &mut Self {
        if self.body.string.is_empty() {
            self.body.string = data.to_string();
        }
        self
    }

    pub fn set_post_fields(&mut self, fields: BTreeMap<String, Vec<String>>) -> &mut Self {
        self.body.fields = fields;
        self
    }

    pub fn add_post_field(&mut self, key: &str, value: &str) -> &mut Self {
        self.body
            .fields
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn set_post_reader(&mut self, reader: BodyReader) -> &mut Self {
        self.body.reader = Some(reader);
        self
    }

    pub fn set_post_field_readers(&mut self, readers: BTreeMap<String, BodyReader>) -> &mut Self {
        self.body.field_readers = readers;
        self
    }

    pub fn add_post_field_reader(&mut self, key: &str, reader: BodyReader) -> &mut Self {
        self.body.field_readers.insert(key.to_string(), reader);
        self
    }

    pub fn set_post_files(&mut self, files: BTreeMap<String, Vec<PathBuf>>) -> &mut Self {
        self.body.files = files;
        self
    }

    pub fn add_post_file(&mut self, key: &str, path: impl Into<PathBuf>) -> &mut Self {
        self.body
            .files
            .entry(key.to_string())
            .or_default()
            .push(path.into());
        self
    }

    // Accessors

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &OrderedHeaderMap {
        &self.headers
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn referer(&self) -> &str {
        &self.referer
    }

    /// Flag value; unset flags read as `false`.
    pub fn option(&self, name: &str) -> bool {
        self.options
            .get(&canonical_header_key(name))
            .copied()
            .unwrap_or(false)
    }

    pub fn body(&self) -> &BodySources {
        &self.body
    }

    pub fn has_body(&self) -> bool {
        self.body.is_populated()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The cancellation handle, created on first use if none was derived.
    pub fn cancel_handle(&mut self) -> CancellationToken {
        self.cancel.get_or_insert_with(CancellationToken::new).clone()
    }

    pub(crate) fn take_body(&mut self) -> BodySources {
        std::mem::take(&mut self.body)
    }
}

pub fn is_allowed_method(method: &str) -> bool {
    ALLOWED_METHODS.contains(&method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uppercases_method() {
        let config = RequestConfig::new("post", "http://example.test/");
        assert_eq!(config.method(), "POST");
        assert_eq!(config.url(), "http://example.test/");
        assert!(!config.has_body());
    }

    #[test]
    fn test_set_method_validates_after_uppercasing() {
        let mut config = RequestConfig::new("GET", "http://example.test/");
        config.set_method("put").unwrap();
        assert_eq!(config.method(), "PUT");

        let err = config.set_method("fetch").unwrap_err();
        assert_eq!(err, NetError::InvalidMethod("FETCH".into()));
        assert!(err.is_config_error());
        assert_eq!(config.method(), "PUT");
    }

    #[test]
    fn test_set_once_fields() {
        let mut config = RequestConfig::new("GET", "http://first.test/");
        config
            .set_url("http://second.test/")
            .set_cookie("a=1")
            .set_cookie("b=2")
            .set_referer("http://r1.test/")
            .set_referer("http://r2.test/")
            .set_post_string("one")
            .set_post_string("two");

        assert_eq!(config.url(), "http://first.test/");
        assert_eq!(config.cookie(), "a=1");
        assert_eq!(config.referer(), "http://r1.test/");
        assert_eq!(config.body().string, "one");

        let mut empty = RequestConfig::default();
        empty.set_url("http://late.test/");
        assert_eq!(empty.url(), "http://late.test/");
    }

    #[test]
    fn test_headers_and_options_canonicalized() {
        let mut config = RequestConfig::new("GET", "http://example.test/");
        config
            .set_header("x-trace-id", "1")
            .set_header("X-TRACE-ID", "2")
            .set_option("redirect", true);

        assert_eq!(config.headers().len(), 1);
        assert_eq!(config.headers().get("X-Trace-Id"), Some("2"));
        assert!(config.option(REDIRECT_OPTION));
        assert!(!config.option("Other"));
    }

    #[test]
    fn test_preset_then_override() {
        let mut config = RequestConfig::new("GET", "http://example.test/");
        config
            .set_default_headers()
            .set_header("content-type", "text/plain");
        assert_eq!(config.headers().get("Content-Type"), Some("text/plain"));
        assert_eq!(config.headers().get("Connection"), Some("keep-alive"));
    }

    #[test]
    fn test_body_setters() {
        let mut config = RequestConfig::new("POST", "http://example.test/");
        config
            .add_post_field("k", "v1")
            .add_post_field("k", "v2")
            .add_post_file("f", "/tmp/a.txt")
            .add_post_field_reader("r", Box::new(&b"data"[..]));
        assert!(config.has_body());
        assert_eq!(config.body().fields["k"], vec!["v1", "v2"]);
        assert_eq!(config.body().files["f"], vec![PathBuf::from("/tmp/a.txt")]);

        config.set_post_reader(Box::new(&b"first"[..]));
        config.set_post_reader(Box::new(&b"second"[..]));
        assert!(config.body().reader.is_some());

        let taken = config.take_body();
        assert!(taken.is_populated());
        assert!(!config.has_body());
    }

    #[test]
    fn test_context_is_set_once() {
        let first = CancellationToken::new();
        let second = CancellationToken::new();
        let mut config = RequestConfig::new("GET", "http://example.test/");
        config.set_context(&first).set_context(&second);

        let handle = config.cancel_handle();
        second.cancel();
        assert!(!handle.is_cancelled());
        first.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_cancel_handle_lazily_created_and_stable() {
        let mut config = RequestConfig::new("GET", "http://example.test/");
        let a = config.cancel_handle();
        let b = config.cancel_handle();
        a.cancel();
        assert!(b.is_cancelled());
    }

    #[test]
    fn test_redirect_hop() {
        let hop = RequestConfig::redirect_hop("http://origin.test/", "http://target.test/");
        assert_eq!(hop.method(), "GET");
        assert_eq!(hop.url(), "http://origin.test/");
        assert_eq!(hop.referer(), "http://target.test/");
        assert!(!hop.option(REDIRECT_OPTION));
        assert!(hop.timeout().is_none());
    }
}
