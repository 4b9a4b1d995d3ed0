//! Clock adapters.
//!
//! - [`SystemClock`]: wall clock from `std::time::SystemTime`.
//! - [`FixedClock`]: a frozen instant, for tests and replay.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as i64)
    }
}

/// Always reports the wrapped Unix time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_secs(&self) -> i64 {
        self.0
    }
}
