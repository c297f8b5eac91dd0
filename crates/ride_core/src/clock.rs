use std::fmt::Debug;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone, Timelike, Utc};

/// Source of "now" for surge pricing and pickup estimates.
pub trait TimeSource: Send + Sync + Debug {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Local clock hour (0-23).
    fn hour(&self) -> u32 {
        self.now().hour()
    }
}

/// Process wall clock in the local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// 2024-01-15 at `hour`:00 UTC. Hours past 23 wrap.
    pub fn at_hour(hour: u32) -> Self {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|date| date.and_hms_opt(hour % 24, 0, 0))
            .unwrap_or_default();
        Self {
            now: Utc.from_utc_datetime(&naive).fixed_offset(),
        }
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }
}
