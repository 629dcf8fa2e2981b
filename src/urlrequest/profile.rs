//! Named default-header presets.
//!
//! A preset is applied explicitly, per request or per client. Nothing here is
//! process-wide state.

use crate::http::orderedheaders::OrderedHeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Preset Type Enum
// =============================================================================

/// Default header set to stamp onto a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPreset {
    /// Looks like a desktop Chrome browser (default).
    #[default]
    Browser,
    /// JSON API client.
    Api,
}

impl HeaderPreset {
    /// The preset's headers, in the order they are sent.
    pub fn headers(&self) -> OrderedHeaderMap {
        let entries: &[(&str, &str)] = match self {
            HeaderPreset::Browser => &BROWSER,
            HeaderPreset::Api => &API,
        };
        let mut headers = OrderedHeaderMap::new();
        for (name, value) in entries {
            headers.insert(name, *value);
        }
        headers
    }
}

impl fmt::Display for HeaderPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderPreset::Browser => "browser",
            HeaderPreset::Api => "api",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// Header Tables
// =============================================================================

const BROWSER: [(&str, &str); 6] = [
    ("Content-Type", "application/json"),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    ),
    ("Accept-Encoding", "gzip, deflate"),
    ("Accept-Language", "zh-cn,zh;q=0.8,en-us;q=0.5,en;q=0.3"),
    ("Connection", "keep-alive"),
    (
        "User-Agent",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/65.0.3325.146 Safari/537.36",
    ),
];

const API: [(&str, &str); 3] = [
    ("Accept", "application/json"),
    ("Content-Type", "application/json"),
    ("Accept-Encoding", "gzip, deflate"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_preset() {
        let headers = HeaderPreset::Browser.headers();
        assert_eq!(headers.len(), 6);
        assert_eq!(headers.get("accept-encoding"), Some("gzip, deflate"));
        assert_eq!(headers.get("Connection"), Some("keep-alive"));
        assert!(headers.get("User-Agent").unwrap().contains("Chrome/65"));

        let names: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names[0], "Content-Type");
        assert_eq!(names[5], "User-Agent");
    }

    #[test]
    fn test_api_preset() {
        let headers = HeaderPreset::Api.headers();
        assert_eq!(headers.get("Accept"), Some("application/json"));
        assert!(!headers.contains("User-Agent"));
    }

    #[test]
    fn test_display_and_serde_names_match() {
        for preset in [HeaderPreset::Browser, HeaderPreset::Api] {
            let json = serde_json::to_string(&preset).unwrap();
            assert_eq!(json, format!("\"{}\"", preset));
            let back: HeaderPreset = serde_json::from_str(&json).unwrap();
            assert_eq!(back, preset);
        }
        assert_eq!(HeaderPreset::default(), HeaderPreset::Browser);
    }
}
