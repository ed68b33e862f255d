//! Response cache configuration.

use std::time::Duration;

use serde::Deserialize;

use super::error::ConfigError;

/// Which routes to cache, which headers to keep, and for how long.
///
/// Built in code with the builder methods, or deserialized from the host's
/// own configuration:
///
/// ```json
/// { "urls": ["/", "/api???"], "headers": ["Content-Type"], "ttl_secs": 60 }
/// ```
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use response_cache::cache::CacheConfig;
///
/// let config = CacheConfig::new(["/", "/static***", "/search???"])
///     .allow_header("Content-Type")
///     .allow_header("ETag")
///     .ttl(Duration::from_secs(300));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.ttl_secs, Some(300));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Route patterns; see [`RoutePattern`](super::RoutePattern) for the markers.
    pub urls: Vec<String>,
    /// Response headers persisted with a cached entry, in this spelling.
    pub headers: Vec<String>,
    /// Expiry passed to the store on every write. `None` never expires.
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Adds a route pattern.
    #[must_use]
    pub fn url(mut self, pattern: impl Into<String>) -> Self {
        self.urls.push(pattern.into());
        self
    }

    /// Adds a header to the allowlist.
    #[must_use]
    pub fn allow_header(mut self, name: impl Into<String>) -> Self {
        self.headers.push(name.into());
        self
    }

    /// Sets the TTL handed to the store. Sub-second parts are dropped.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = Some(ttl.as_secs());
        self
    }

    /// Checks that no pattern or header name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(index) = self.urls.iter().position(String::is_empty) {
            return Err(ConfigError::EmptyPattern { index });
        }
        if let Some(index) = self.headers.iter().position(|h| h.trim().is_empty()) {
            return Err(ConfigError::EmptyHeaderName { index });
        }
        Ok(())
    }

    pub(crate) fn ttl_duration(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_everything() {
        let config = CacheConfig::new(["/"])
            .url("/api???")
            .allow_header("foo")
            .ttl(Duration::from_millis(2_500));
        assert_eq!(config.urls, vec!["/", "/api???"]);
        assert_eq!(config.headers, vec!["foo"]);
        assert_eq!(config.ttl_duration(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn empty_pattern_rejected() {
        let config = CacheConfig::new(["/", ""]);
        assert_eq!(config.validate(), Err(ConfigError::EmptyPattern { index: 1 }));
    }

    #[test]
    fn blank_header_rejected() {
        let config = CacheConfig::new(["/"]).allow_header("ETag").allow_header("  ");
        assert_eq!(config.validate(), Err(ConfigError::EmptyHeaderName { index: 1 }));
    }

    #[test]
    fn marker_only_pattern_is_valid() {
        assert!(CacheConfig::new(["***"]).validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{ "urls": ["/", "/api???"] }"#).unwrap();
        assert_eq!(config.urls.len(), 2);
        assert!(config.headers.is_empty());
        assert_eq!(config.ttl_secs, None);
    }

    #[test]
    fn deserializes_full() {
        let config: CacheConfig = serde_json::from_str(
            r#"{ "urls": ["/"], "headers": ["Content-Type"], "ttl_secs": 60 }"#,
        )
        .unwrap();
        assert_eq!(config, CacheConfig::new(["/"]).allow_header("Content-Type").ttl(Duration::from_secs(60)));
    }
}
