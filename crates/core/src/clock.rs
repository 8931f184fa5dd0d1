//! Source of the current time.
//!
//! Token expiry and the "active session" predicate are both evaluated against
//! a [`Clock`], so callers can pin time in tests instead of sleeping.

use crate::types::Timestamp;

/// Anything that can report the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time via [`chrono::Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}
