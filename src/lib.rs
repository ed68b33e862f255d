//! # response-cache
//!
//! Response caching for an async HTTP middleware pipeline.
//!
//! Configure which routes may be cached, which response headers to keep, and
//! an optional TTL; plug in a [`CacheStore`](cache::CacheStore); put the
//! [`ResponseCacheMiddleware`](cache::ResponseCacheMiddleware) in front of
//! your handler.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use response_cache::{Request, Response, StatusCode};
//! use response_cache::cache::{CacheConfig, MemoryStore, ResponseCacheMiddleware};
//! use response_cache::context::Context;
//! use response_cache::middleware::{Pipeline, handler_fn};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cache = ResponseCacheMiddleware::new(
//!     CacheConfig::new(["/", "/assets***", "/search???"]).allow_header("Content-Type"),
//!     Arc::new(MemoryStore::new()),
//! )?;
//!
//! let pipeline = Pipeline::new()
//!     .layer(cache)
//!     .push(handler_fn(|_ctx| async { Response::new(StatusCode::Ok).body("Hello, World!") }));
//!
//! let (req, _) = Request::parse(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")?;
//! let res = pipeline.run(Context::new(req)).await;
//! assert_eq!(res.status(), StatusCode::Ok);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

pub mod cache;
pub mod context;
pub mod http;
pub mod middleware;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use cache::{CacheConfig, ResponseCacheMiddleware};
pub use http::{Body, Headers, Method, Request, Response, StatusCode};
