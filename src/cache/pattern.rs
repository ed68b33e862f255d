//! URL classification — which request paths the cache may serve.
//!
//! Patterns are plain path strings with an optional 3-character suffix marker:
//!
//! | Pattern       | Class             | Matches                         | Query in key |
//! |---------------|-------------------|---------------------------------|--------------|
//! | `/about`      | static            | exactly `/about`                | no           |
//! | `/wild***`    | prefix, no query  | any path starting with `/wild`  | no           |
//! | `/api???`     | prefix, query     | any path starting with `/api`   | yes          |
//!
//! Prefix tests are plain byte-prefix comparisons: `/api???` also matches
//! `/apiary`. Use `/api/???` to restrict it to one path segment.

use std::collections::HashSet;

/// Marks a prefix route whose query string is ignored for caching.
pub const PREFIX_WITHOUT_QUERY: &str = "***";

/// Marks a prefix route whose query string is part of the cache key.
pub const PREFIX_WITH_QUERY: &str = "???";

/// One configured route pattern, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    /// Exact path match.
    Static(String),
    /// Path-prefix match; the query string is left out of the cache key.
    PrefixNoQuery(String),
    /// Path-prefix match; a non-empty query string is appended to the cache key.
    PrefixWithQuery(String),
}

impl RoutePattern {
    /// Classify a pattern string by its trailing marker.
    ///
    /// The marker is stripped from prefix patterns. Anything without a
    /// recognised marker, including strings shorter than a marker, is kept
    /// verbatim as a static path.
    ///
    /// # Examples
    ///
    /// ```
    /// use response_cache::cache::RoutePattern;
    ///
    /// assert_eq!(RoutePattern::parse("/api???"), RoutePattern::PrefixWithQuery("/api".into()));
    /// assert_eq!(RoutePattern::parse("/wild***"), RoutePattern::PrefixNoQuery("/wild".into()));
    /// assert_eq!(RoutePattern::parse("/"), RoutePattern::Static("/".into()));
    /// ```
    pub fn parse(pattern: &str) -> Self {
        if let Some(prefix) = pattern.strip_suffix(PREFIX_WITHOUT_QUERY) {
            return RoutePattern::PrefixNoQuery(prefix.to_owned());
        }

        if let Some(prefix) = pattern.strip_suffix(PREFIX_WITH_QUERY) {
            return RoutePattern::PrefixWithQuery(prefix.to_owned());
        }

        RoutePattern::Static(pattern.to_owned())
    }
}

/// The three pattern buckets, built once from configuration.
///
/// Duplicate and overlapping patterns are accepted as-is. When a path falls
/// in several buckets the static set is consulted first, then prefixes
/// without query, then prefixes with query.
#[derive(Debug, Clone, Default)]
pub struct UrlClassifier {
    static_urls: HashSet<String>,
    prefix_urls_without_query: Vec<String>,
    prefix_urls_with_query: Vec<String>,
}

impl UrlClassifier {
    /// Build the buckets from an ordered list of pattern strings.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classifier = Self::default();
        for pattern in patterns {
            classifier.push(RoutePattern::parse(pattern.as_ref()));
        }
        classifier
    }

    fn push(&mut self, pattern: RoutePattern) {
        match pattern {
            RoutePattern::Static(url) => {
                self.static_urls.insert(url);
            }
            RoutePattern::PrefixNoQuery(prefix) => self.prefix_urls_without_query.push(prefix),
            RoutePattern::PrefixWithQuery(prefix) => self.prefix_urls_with_query.push(prefix),
        }
    }

    /// Returns the bucket that admits `path`, or `None` if no pattern does.
    pub fn classify(&self, path: &str) -> Option<RoutePattern> {
        if self.static_urls.contains(path) {
            return Some(RoutePattern::Static(path.to_owned()));
        }

        if let Some(prefix) = first_prefix(&self.prefix_urls_without_query, path) {
            return Some(RoutePattern::PrefixNoQuery(prefix.to_owned()));
        }

        first_prefix(&self.prefix_urls_with_query, path)
            .map(|prefix| RoutePattern::PrefixWithQuery(prefix.to_owned()))
    }

    /// Returns `true` if any pattern admits `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.static_urls.contains(path)
            || first_prefix(&self.prefix_urls_without_query, path).is_some()
            || first_prefix(&self.prefix_urls_with_query, path).is_some()
    }

    /// Returns `true` if `path` falls under a query-sensitive prefix.
    ///
    /// Checked independently of [`classify`](Self::classify): a path that is
    /// also static or also under a no-query prefix still keeps its query.
    pub fn query_in_key(&self, path: &str) -> bool {
        first_prefix(&self.prefix_urls_with_query, path).is_some()
    }

    /// Total number of patterns held across all buckets.
    pub fn len(&self) -> usize {
        self.static_urls.len() + self.prefix_urls_without_query.len() + self.prefix_urls_with_query.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn first_prefix<'a>(prefixes: &'a [String], path: &str) -> Option<&'a str> {
    prefixes
        .iter()
        .map(String::as_str)
        .find(|prefix| path.as_bytes().starts_with(prefix.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── RoutePattern::parse ───────────────────────────────────────────────────

    #[test]
    fn parse_static() {
        assert_eq!(RoutePattern::parse("/no.cache"), RoutePattern::Static("/no.cache".into()));
    }

    #[test]
    fn parse_prefix_without_query() {
        assert_eq!(
            RoutePattern::parse("/wildcard***"),
            RoutePattern::PrefixNoQuery("/wildcard".into())
        );
    }

    #[test]
    fn parse_prefix_with_query() {
        assert_eq!(RoutePattern::parse("/api???"), RoutePattern::PrefixWithQuery("/api".into()));
    }

    #[test]
    fn parse_short_strings_are_static() {
        assert_eq!(RoutePattern::parse("**"), RoutePattern::Static("**".into()));
        assert_eq!(RoutePattern::parse("?"), RoutePattern::Static("?".into()));
        assert_eq!(RoutePattern::parse(""), RoutePattern::Static(String::new()));
    }

    #[test]
    fn parse_marker_only_is_empty_prefix() {
        assert_eq!(RoutePattern::parse("***"), RoutePattern::PrefixNoQuery(String::new()));
        assert_eq!(RoutePattern::parse("???"), RoutePattern::PrefixWithQuery(String::new()));
    }

    #[test]
    fn parse_mixed_marker_is_static() {
        assert_eq!(RoutePattern::parse("/a*??"), RoutePattern::Static("/a*??".into()));
    }

    // ── UrlClassifier ─────────────────────────────────────────────────────────

    fn classifier() -> UrlClassifier {
        UrlClassifier::new(["/", "/no.cache", "/wildcard***", "/api???"])
    }

    #[test]
    fn static_needs_exact_match() {
        let c = classifier();
        assert_eq!(c.classify("/"), Some(RoutePattern::Static("/".into())));
        assert_eq!(c.classify("/no.cache/more"), None);
        assert!(!c.matches("/no.cach"));
    }

    #[test]
    fn prefix_matches() {
        let c = classifier();
        assert_eq!(
            c.classify("/wildcard/blaat"),
            Some(RoutePattern::PrefixNoQuery("/wildcard".into()))
        );
        assert_eq!(
            c.classify("/api/blaat"),
            Some(RoutePattern::PrefixWithQuery("/api".into()))
        );
        // byte prefix, not segment prefix
        assert!(c.matches("/apiary"));
    }

    #[test]
    fn unknown_path_unmatched() {
        let c = classifier();
        assert_eq!(c.classify("/craft-session"), None);
        assert!(!c.matches("/craft-session"));
    }

    #[test]
    fn static_wins_over_prefix() {
        let c = UrlClassifier::new(["/api???", "/api"]);
        assert_eq!(c.classify("/api"), Some(RoutePattern::Static("/api".into())));
        assert!(c.query_in_key("/api"));
    }

    #[test]
    fn no_query_prefix_wins_over_query_prefix() {
        let c = UrlClassifier::new(["/a???", "/a***"]);
        assert_eq!(c.classify("/a/b"), Some(RoutePattern::PrefixNoQuery("/a".into())));
    }

    #[test]
    fn query_in_key_only_for_query_prefixes() {
        let c = classifier();
        assert!(c.query_in_key("/api/x"));
        assert!(!c.query_in_key("/wildcard/x"));
        assert!(!c.query_in_key("/"));
    }

    #[test]
    fn duplicates_are_harmless() {
        let c = UrlClassifier::new(["/x***", "/x***", "/y", "/y"]);
        assert!(c.matches("/x/1"));
        assert!(c.matches("/y"));
    }

    #[test]
    fn empty_classifier_matches_nothing() {
        let c = UrlClassifier::default();
        assert!(c.is_empty());
        assert!(!c.matches("/"));
    }
}
