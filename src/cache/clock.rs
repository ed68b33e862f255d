//! Time source for record timestamps and `Age` computation.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Produces "now" as whole seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall-clock time. The default for every cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs() as i64,
            // System clock set before 1970.
            Err(before) => -(before.duration().as_secs() as i64),
        }
    }
}

/// A clock that only moves when told to.
///
/// # Examples
///
/// ```
/// use response_cache::cache::{Clock, FrozenClock};
///
/// let clock = FrozenClock::new(1_700_000_000);
/// clock.advance(5);
/// assert_eq!(clock.now(), 1_700_000_005);
/// ```
#[derive(Default)]
pub struct FrozenClock {
    now: AtomicI64,
}

impl FrozenClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set_to(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock by `secs`, which may be negative.
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for FrozenClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FrozenClock").field(&self.now()).finish()
    }
}
