//! Per-request context — the request plus type-keyed extensions.
//!
//! Layers earlier in the pipeline attach state to a [`Context`] through its
//! [`Extensions`] map; later layers read it back by type. The session
//! collaborator travels this way as a [`SessionHandle`].

use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

use crate::Request;

pub mod session;

pub use session::{Session, SessionFlag, SessionHandle};

/// Type-erased request extensions map — used to inject per-request state
/// into handlers without requiring handlers to know about each other's types.
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    /// Create a new empty extensions map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value of the same type
    pub fn insert<T>(&mut self, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.map.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a value from the extensions map
    pub fn get<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Remove a value from the extensions map
    pub fn remove<T>(&mut self) -> Option<T>
    where
        T: Send + Sync + 'static,
    {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }
}

/// Per-request context handed from one middleware to the next.
pub struct Context {
    request: Request,
    extensions: Extensions,
}

impl Context {
    /// Create a new context from a request
    pub fn new(request: Request) -> Self {
        Self {
            request,
            extensions: Extensions::new(),
        }
    }

    /// Attach a session collaborator to this request.
    #[must_use]
    pub fn with_session(mut self, session: SessionHandle) -> Self {
        self.extensions.insert(session);
        self
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// The session collaborator, if a session layer attached one.
    ///
    /// `None` means no session subsystem is configured for this request.
    pub fn session(&self) -> Option<&SessionHandle> {
        self.extensions().get::<SessionHandle>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        let (req, _) = Request::parse(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        req
    }

    #[test]
    fn extensions_by_type() {
        let mut ext = Extensions::new();
        ext.insert(7u32);
        ext.insert("seven");
        assert_eq!(ext.get::<u32>(), Some(&7));
        assert_eq!(ext.get::<&str>(), Some(&"seven"));
        assert_eq!(ext.remove::<u32>(), Some(7));
        assert_eq!(ext.get::<u32>(), None);
    }

    #[test]
    fn no_session_by_default() {
        let ctx = Context::new(request());
        assert!(ctx.session().is_none());
    }

    #[test]
    fn session_attached() {
        let flag = SessionFlag::new();
        let ctx = Context::new(request()).with_session(SessionHandle::new(flag.clone()));
        assert!(!ctx.session().unwrap().is_active());
        flag.begin();
        assert!(ctx.session().unwrap().is_active());
    }
}
