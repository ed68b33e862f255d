//! HTTP response caching.
//!
//! [`ResponseCacheMiddleware`] sits in a middleware [`Pipeline`](crate::middleware::Pipeline)
//! and short-circuits `GET` requests for configured routes with a previously
//! stored response. The pieces it is built from are usable on their own:
//!
//! - [`UrlClassifier`] / [`RoutePattern`] — which paths are cacheable.
//! - [`CachePolicy`] — request/response cacheability and cache keys.
//! - [`ResponseCodec`] / [`CacheRecord`] — the stored representation.
//! - [`CacheStore`] — where records live; [`MemoryStore`] is the default.
//! - [`Clock`] — time source for capture timestamps and `Age`.

pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod middleware;
pub mod pattern;
pub mod policy;
pub mod store;

pub use clock::{Clock, FrozenClock, SystemClock};
pub use codec::{CacheRecord, FORMAT_VERSION, ResponseCodec};
pub use config::CacheConfig;
pub use error::{ConfigError, DecodeError, EncodeError, StoreError};
pub use middleware::ResponseCacheMiddleware;
pub use pattern::{PREFIX_WITH_QUERY, PREFIX_WITHOUT_QUERY, RoutePattern, UrlClassifier};
pub use policy::CachePolicy;
pub use store::{CacheStore, MemoryStore, StoreFuture};
