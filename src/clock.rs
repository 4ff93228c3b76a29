//! Wall-clock access
//!
//! The circadian model only looks at hour and minute of the local time, so the
//! clock hands out offset-aware timestamps and leaves the interpretation to the
//! caller.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use std::sync::RwLock;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Local system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().into()
    }
}

/// Clock pinned to an instant until moved with [`FixedClock::set`]
#[derive(Debug)]
pub struct FixedClock {
    instant: RwLock<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Clock at the given UTC wall time on 2024-01-15.
    ///
    /// Returns `None` for an invalid time of day.
    pub fn at_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 15)?.and_hms_opt(hour, minute, second)?;
        let offset = FixedOffset::east_opt(0)?;
        let instant = offset.from_local_datetime(&naive).single()?;
        Some(Self::new(instant))
    }

    pub fn set(&self, instant: DateTime<FixedOffset>) {
        let mut guard = self.instant.write().unwrap_or_else(|e| e.into_inner());
        *guard = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.instant.read().unwrap_or_else(|e| e.into_inner())
    }
}
