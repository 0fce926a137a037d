//! Clock abstraction.
//!
//! All time arithmetic in the engine is driven through an injected clock:
//! cache ages come from the monotonic `now`, next-departure calculations
//! from the venue-local `civil_now`. Tests use `ManualClock` to pin both.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{Datelike, Local, Timelike, Weekday};

use crate::domain::CivilTime;

/// A snapshot of venue-local civil time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilNow {
    /// Time of day, minutes since midnight.
    pub time: CivilTime,
    /// Day of week, for service-day filtering.
    pub weekday: Weekday,
}

/// Source of current time.
pub trait Clock: Send + Sync {
    /// Monotonic instant, used to age cache entries.
    fn now(&self) -> Instant;

    /// Venue-local civil time of day and weekday.
    fn civil_now(&self) -> CivilNow;
}

/// Clock backed by the system time in the server's local zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn civil_now(&self) -> CivilNow {
        let local = Local::now();
        let time = CivilTime::from_hm(local.hour() as u16, local.minute() as u16)
            .unwrap_or(CivilTime::MIDNIGHT);
        CivilNow {
            time,
            weekday: local.weekday(),
        }
    }
}

/// Settable clock for tests and local development.
///
/// Mimics the real `Clock` interface while letting the caller advance time
/// explicitly, so TTL expiry and day-rollover cases are deterministic.
pub struct ManualClock {
    state: Mutex<ManualState>,
}

struct ManualState {
    base: Instant,
    elapsed: Duration,
    civil: CivilNow,
}

impl ManualClock {
    /// Create a clock frozen at the given civil time.
    pub fn new(time: CivilTime, weekday: Weekday) -> Self {
        Self {
            state: Mutex::new(ManualState {
                base: Instant::now(),
                elapsed: Duration::ZERO,
                civil: CivilNow { time, weekday },
            }),
        }
    }

    /// Advance the monotonic clock without touching civil time.
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap();
        state.elapsed += by;
    }

    /// Move the civil time of day.
    pub fn set_civil(&self, time: CivilTime, weekday: Weekday) {
        let mut state = self.state.lock().unwrap();
        state.civil = CivilNow { time, weekday };
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let state = self.state.lock().unwrap();
        state.base + state.elapsed
    }

    fn civil_now(&self) -> CivilNow {
        let state = self.state.lock().unwrap();
        state.civil
    }
}
