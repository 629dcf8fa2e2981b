use crate::base::neterror::NetError;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::str::FromStr;

/// Canonical MIME header form: first letter and every letter after a hyphen
/// upper-cased, the rest lower-cased ("content-type" -> "Content-Type").
///
/// Keys containing bytes that are not valid header token characters are
/// returned unchanged.
pub fn canonical_header_key(key: &str) -> String {
    if !key.bytes().all(is_token_byte) {
        return key.to_string();
    }

    let mut upper = true;
    key.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                | b'`' | b'|' | b'~'
        )
}

/// A header map keyed by canonical header name that preserves insertion order.
/// Inserting an existing key overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedHeaderMap {
    headers: Vec<(String, String)>,
}

impl OrderedHeaderMap {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = canonical_header_key(name);
        let value = value.into();

        if let Some((_, v)) = self.headers.iter_mut().find(|(n, _)| *n == name) {
            *v = value;
        } else {
            self.headers.push((name, value));
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let target = canonical_header_key(name);
        let idx = self.headers.iter().position(|(n, _)| *n == target)?;
        Some(self.headers.remove(idx).1)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let target = canonical_header_key(name);
        self.headers
            .iter()
            .find(|(n, _)| *n == target)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Copy every entry of `other` into `self`, overwriting same-named entries.
    pub fn extend_from(&mut self, other: &OrderedHeaderMap) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Converts to a standard http::HeaderMap, validating names and values.
    pub fn to_header_map(&self) -> Result<HeaderMap, NetError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name_header =
                HeaderName::from_str(name).map_err(|_| NetError::InvalidHeader(name.clone()))?;
            let value_header =
                HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader(name.clone()))?;
            map.insert(name_header, value_header);
        }
        Ok(map)
    }
}
