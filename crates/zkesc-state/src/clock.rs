//! Time source for record timestamps and verification expiry.

use parking_lot::Mutex;
use zkesc_core::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A manually advanced clock for tests and replay tooling.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Start at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move forward by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        let mut now = self.now.lock();
        let next = now.epoch_secs().saturating_add(secs);
        if let Ok(ts) = Timestamp::from_epoch_secs(next) {
            *now = ts;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
