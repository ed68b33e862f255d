//! Cacheability rules and cache-key derivation.

use std::time::Duration;

use crate::context::{Context, SessionHandle};
use crate::{Method, Request, Response};

use super::pattern::UrlClassifier;

/// Decides what may be cached and under which key.
#[derive(Debug, Clone, Default)]
pub struct CachePolicy {
    classifier: UrlClassifier,
    ttl: Option<Duration>,
}

impl CachePolicy {
    pub fn new(classifier: UrlClassifier, ttl: Option<Duration>) -> Self {
        Self { classifier, ttl }
    }

    pub fn classifier(&self) -> &UrlClassifier {
        &self.classifier
    }

    /// Whether the cache may be consulted for this request at all.
    ///
    /// Only `GET` requests without an active session, on a path admitted by
    /// the classifier, qualify.
    pub fn request_is_cacheable(&self, ctx: &Context) -> bool {
        if ctx.request().method() != &Method::Get {
            return false;
        }

        if session_active(ctx.session()) {
            return false;
        }

        self.classifier.matches(ctx.request().path())
    }

    /// Whether a freshly produced response may be stored.
    ///
    /// `session` is the handle captured from the request before it was handed
    /// downstream; it is read again here since the handler may have started
    /// a session.
    pub fn response_is_cacheable(&self, session: Option<&SessionHandle>, _response: &Response) -> bool {
        !session_active(session)
    }

    /// Derive the cache key: the path, plus `?` and the raw query string for
    /// paths under a query-sensitive prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use response_cache::Request;
    /// use response_cache::cache::{CachePolicy, UrlClassifier};
    ///
    /// let policy = CachePolicy::new(UrlClassifier::new(["/api???", "/wild***"]), None);
    ///
    /// let (req, _) = Request::parse(b"GET /api/x?q=1 HTTP/1.1\r\nHost: a\r\n\r\n").unwrap();
    /// assert_eq!(policy.cache_key(&req), "/api/x?q=1");
    ///
    /// let (req, _) = Request::parse(b"GET /wild/x?q=1 HTTP/1.1\r\nHost: a\r\n\r\n").unwrap();
    /// assert_eq!(policy.cache_key(&req), "/wild/x");
    /// ```
    pub fn cache_key(&self, request: &Request) -> String {
        let path = request.path();
        match request.query_string() {
            Some(query) if !query.is_empty() && self.classifier.query_in_key(path) => {
                format!("{path}?{query}")
            }
            _ => path.to_owned(),
        }
    }

    /// Expiry to hand to the store when writing `key`.
    pub fn ttl_for(&self, _key: &str) -> Option<Duration> {
        self.ttl
    }
}

fn session_active(session: Option<&SessionHandle>) -> bool {
    session.is_some_and(SessionHandle::is_active)
}
