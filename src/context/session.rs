//! Session collaborator seam.
//!
//! The cache never manages sessions itself. A session layer (cookie lookup,
//! storage, and so on) lives elsewhere and only has to expose whether the
//! current request has an active session.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Per-request view of a session subsystem.
///
/// `is_active` may change while the request is being handled, e.g. when the
/// downstream handler starts a session, so callers re-check it after the
/// handler returns.
pub trait Session: Send + Sync {
    /// Returns `true` while the request carries per-user session state.
    fn is_active(&self) -> bool;
}

/// Shared handle to a [`Session`], stored in the request extensions.
///
/// Cloning is cheap; every clone observes the same session.
#[derive(Clone)]
pub struct SessionHandle(Arc<dyn Session>);

impl SessionHandle {
    pub fn new<S>(session: S) -> Self
    where
        S: Session + 'static,
    {
        Self(Arc::new(session))
    }

    pub fn is_active(&self) -> bool {
        self.0.is_active()
    }
}

/// Minimal [`Session`]: a shared on/off flag.
///
/// A session layer can hand one clone to the request and keep another;
/// [`begin`](Self::begin) and [`end`](Self::end) are visible through both.
///
/// # Examples
///
/// ```
/// use response_cache::context::{SessionFlag, SessionHandle};
///
/// let flag = SessionFlag::new();
/// let handle = SessionHandle::new(flag.clone());
/// assert!(!handle.is_active());
///
/// flag.begin();
/// assert!(handle.is_active());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionFlag {
    active: Arc<AtomicBool>,
}

impl SessionFlag {
    /// A flag that starts inactive.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that starts active, for requests arriving with a session cookie.
    pub fn active() -> Self {
        let flag = Self::new();
        flag.begin();
        flag
    }

    pub fn begin(&self) {
        self.active.store(true, Ordering::Release);
    }

    pub fn end(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Session for SessionFlag {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_toggles() {
        let flag = SessionFlag::active();
        assert!(flag.is_active());
        flag.end();
        assert!(!flag.is_active());
    }

    #[test]
    fn clones_share_state() {
        let flag = SessionFlag::new();
        let handle = SessionHandle::new(flag.clone());
        let other = handle.clone();
        flag.begin();
        assert!(handle.is_active());
        assert!(other.is_active());
    }
}
