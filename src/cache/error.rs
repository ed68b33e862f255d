//! Errors raised by the response cache.
//!
//! Only [`ConfigError`] ever reaches a caller, and only at construction time.
//! The others are recovered inside the middleware by falling back to the
//! uncached path.

use thiserror::Error;

/// Invalid cache configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("url pattern #{index} is empty")]
    EmptyPattern { index: usize },

    #[error("header allowlist entry #{index} is empty")]
    EmptyHeaderName { index: usize },
}

/// A cache store could not complete a read, write or delete.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    #[error("cache store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A stored record could not be turned back into a response.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("cached record is empty")]
    Empty,

    #[error("unsupported cache record format version {0}")]
    UnsupportedVersion(u8),

    #[error("malformed cache record: {0}")]
    Malformed(#[from] bincode::Error),

    #[error("cached record has unknown status code {0}")]
    UnknownStatus(u16),

    #[error("cached record timestamp {0} is out of range")]
    TimeOutOfRange(i64),
}

/// A response could not be turned into a stored record.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("streaming bodies cannot be cached")]
    UnboundedBody,

    #[error("failed to serialize cache record: {0}")]
    Serialize(#[from] bincode::Error),
}
