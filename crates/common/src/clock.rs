//! Clock abstraction for wall-clock timestamps.
//!
//! Posts, uploaded media, scheduled records, and export filenames all carry
//! wall-clock time. Components take a [`Clock`] instead of calling
//! `Utc::now()` directly so tests can pin time with [`FixedClock`].

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Current time in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current time as milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// Clock frozen at the given Unix millisecond timestamp.
    /// Out-of-range values fall back to the epoch.
    pub fn from_millis(ms: i64) -> Self {
        let at = Utc
            .timestamp_millis_opt(ms)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}

/// Default shared clock backed by the system time.
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}
