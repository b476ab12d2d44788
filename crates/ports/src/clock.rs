//! Time source used for cache expiry.

use std::time::Instant;

/// Monotonic clock boundary.
pub trait ClockPort: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}
