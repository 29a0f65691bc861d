//! CORS relay used to route absolute image URLs around canvas tainting.
//!
//! The relay is a third-party passthrough reached as
//! `GET <base><encodeURIComponent(original)>`. It is treated as best-effort:
//! callers may [`probe`] it first and skip rewriting when it is unreachable.

use crate::{Error, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client;
use std::time::Duration;

/// Relay used when nothing else is configured.
pub const DEFAULT_RELAY: &str = "https://corsproxy.io/?";

/// Characters left untouched by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A validated relay base URL. The encoded original URL is appended verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    base: String,
}

impl RelayEndpoint {
    /// Validate `base` as an absolute http(s) URL.
    pub fn new(base: &str) -> Result<Self> {
        let parsed = url::Url::parse(base)
            .map_err(|e| Error::RelayError(format!("invalid relay URL '{}': {}", base, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self { base: base.to_string() }),
            other => Err(Error::RelayError(format!(
                "relay must use http or https, got '{}'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Whether an image source should go through the relay.
    pub fn applies_to(src: &str) -> bool {
        src.starts_with("http")
    }

    /// Relay URL for `src`.
    pub fn proxied(&self, src: &str) -> String {
        format!("{}{}", self.base, utf8_percent_encode(src, URI_COMPONENT))
    }
}

impl Default for RelayEndpoint {
    fn default() -> Self {
        Self {
            base: DEFAULT_RELAY.to_string(),
        }
    }
}

/// Check whether the relay answers at all.
///
/// Any response below 500 counts as reachable; transport errors and server
/// errors do not. Must not be called from inside an async runtime.
pub fn probe(endpoint: &RelayEndpoint, timeout: Duration) -> bool {
    let client = match Client::builder().timeout(timeout).build() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Failed to build HTTP client for relay probe: {}", e);
            return false;
        }
    };

    match client.get(endpoint.as_str()).send() {
        Ok(resp) if !resp.status().is_server_error() => {
            log::debug!("Relay {} answered {}", endpoint.as_str(), resp.status());
            true
        }
        Ok(resp) => {
            log::warn!("Relay {} answered {}", endpoint.as_str(), resp.status());
            false
        }
        Err(e) => {
            log::warn!("Relay {} unreachable: {}", endpoint.as_str(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxied_matches_encode_uri_component() {
        let relay = RelayEndpoint::default();
        assert_eq!(
            relay.proxied("https://img.example.com/a b.png?x=1&y=(2)"),
            "https://corsproxy.io/?https%3A%2F%2Fimg.example.com%2Fa%20b.png%3Fx%3D1%26y%3D(2)"
        );
    }

    #[test]
    fn only_http_sources_are_relayed() {
        assert!(RelayEndpoint::applies_to("http://a/b.png"));
        assert!(RelayEndpoint::applies_to("https://a/b.png"));
        assert!(!RelayEndpoint::applies_to("data:image/png;base64,AAAA"));
        assert!(!RelayEndpoint::applies_to("/local/b.png"));
    }

    #[test]
    fn rejects_non_http_relays() {
        assert!(RelayEndpoint::new("ftp://relay.example/?").is_err());
        assert!(RelayEndpoint::new("not a url").is_err());
        let ok = RelayEndpoint::new("https://relay.example/fetch?url=").unwrap();
        assert_eq!(ok.as_str(), "https://relay.example/fetch?url=");
    }
}
