//! Wall-clock adapter for cache expiry.

use notifyconf_ports::ClockPort;
use std::time::Instant;

/// Clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
