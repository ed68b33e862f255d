//! The response cache as a pipeline layer.

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::{
    Response,
    context::Context,
    middleware::{Middleware, Next},
};

use super::clock::{Clock, SystemClock};
use super::codec::ResponseCodec;
use super::config::CacheConfig;
use super::error::ConfigError;
use super::pattern::UrlClassifier;
use super::policy::CachePolicy;
use super::store::{CacheStore, MemoryStore};

/// Middleware that serves stored responses for cacheable requests and stores
/// fresh ones on a miss.
///
/// Per request:
///
/// 1. Requests the [`CachePolicy`] rejects go straight downstream; the store
///    is not touched.
/// 2. Otherwise the store is read once under the request's cache key. A hit
///    is decoded and returned with a fresh `Age` header; downstream never runs.
/// 3. On a miss the rest of the pipeline runs. Streaming responses and
///    responses produced while a session became active are returned as-is.
///    Anything else is encoded and written back before being returned.
///
/// The store is fail-open: a failed read is a miss, a failed write is logged
/// and forgotten, and a record that does not decode is evicted and treated
/// as a miss. Concurrent misses on one key each run the handler and each
/// write; the last write wins.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use response_cache::{Request, Response, StatusCode};
/// use response_cache::cache::{CacheConfig, MemoryStore, ResponseCacheMiddleware};
/// use response_cache::context::Context;
/// use response_cache::middleware::{Pipeline, handler_fn};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let config = CacheConfig::new(["/", "/api???"]).allow_header("Content-Type");
/// let cache = ResponseCacheMiddleware::new(config, Arc::new(MemoryStore::new())).unwrap();
///
/// let pipeline = Pipeline::new()
///     .layer(cache)
///     .push(handler_fn(|_ctx| async {
///         Response::new(StatusCode::Ok).header("Content-Type", "text/plain").body("hello")
///     }));
///
/// for _ in 0..2 {
///     let (req, _) = Request::parse(b"GET /api/x?q=1 HTTP/1.1\r\nHost: a\r\n\r\n").unwrap();
///     let res = pipeline.run(Context::new(req)).await;
///     assert_eq!(res.status(), StatusCode::Ok);
/// }
/// # });
/// ```
#[derive(Clone)]
pub struct ResponseCacheMiddleware {
    inner: Arc<Inner>,
}

struct Inner {
    policy: CachePolicy,
    codec: ResponseCodec,
    store: Arc<dyn CacheStore>,
}

impl ResponseCacheMiddleware {
    /// Build the middleware with the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a pattern or allowlisted header is empty.
    pub fn new(config: CacheConfig, store: Arc<dyn CacheStore>) -> Result<Self, ConfigError> {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Build the middleware backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: CacheConfig) -> Result<Self, ConfigError> {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Build the middleware with an explicit clock.
    pub fn with_clock(
        config: CacheConfig,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let policy = CachePolicy::new(UrlClassifier::new(&config.urls), config.ttl_duration());
        let codec = ResponseCodec::new(config.headers, clock);

        Ok(Self {
            inner: Arc::new(Inner { policy, codec, store }),
        })
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.inner.policy
    }
}

impl Inner {
    async fn serve(&self, ctx: Context, next: Next) -> Response {
        if !self.policy.request_is_cacheable(&ctx) {
            debug!(
                method = %ctx.request().method(),
                path = %ctx.request().path(),
                "request not cacheable"
            );
            return next.run(ctx).await;
        }

        let key = self.policy.cache_key(ctx.request());

        if let Some(cached) = self.lookup(&key).await {
            debug!(%key, "response cache hit");
            return cached;
        }
        debug!(%key, "response cache miss");

        let session = ctx.session().cloned();
        let response = next.run(ctx).await;

        if response.body_ref().is_stream() {
            debug!(%key, "streaming response, not caching");
            return response;
        }

        if !self.policy.response_is_cacheable(session.as_ref(), &response) {
            debug!(%key, "response not cacheable");
            return response;
        }

        self.store_response(&key, &response).await;
        response
    }

    async fn lookup(&self, key: &str) -> Option<Response> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => return None,
            Err(e) => {
                warn!(%key, error = %e, "cache lookup failed, treating as miss");
                return None;
            }
        };

        match self.codec.decode(&bytes) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(%key, error = %e, "evicting undecodable cache record");
                if let Err(e) = self.store.delete(key).await {
                    warn!(%key, error = %e, "failed to evict cache record");
                }
                None
            }
        }
    }

    async fn store_response(&self, key: &str, response: &Response) {
        let encoded = match self.codec.encode(response) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(%key, error = %e, "failed to encode response for cache");
                return;
            }
        };

        let ttl = self.policy.ttl_for(key);
        if let Err(e) = self.store.set(key, Bytes::from(encoded), ttl).await {
            warn!(%key, error = %e, "cache write failed");
        }
    }
}

impl Middleware for ResponseCacheMiddleware {
    fn handle(&self, ctx: Context, next: Next) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.serve(ctx, next).await })
    }
}
