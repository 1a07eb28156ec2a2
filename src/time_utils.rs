// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling and calendar-day arithmetic.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, SecondsFormat, Timelike, Utc};
use std::sync::Mutex;

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The host system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used by tests and dry runs.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Format a UTC timestamp as RFC3339 with milliseconds and a `Z` suffix
/// (the format browsers produce for `Date.toISOString()`).
pub fn format_utc_millis(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Truncate a local time to midnight of the same calendar day.
pub fn start_of_day(date: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    date - (date.time() - NaiveTime::MIN)
}

/// Midnight of the previous calendar day.
pub fn start_of_yesterday(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    start_of_day(now) - Duration::days(1)
}

/// True only when the wall clock reads exactly 00:00:00.
pub fn is_exact_midnight(now: DateTime<FixedOffset>) -> bool {
    now.hour() == 0 && now.minute() == 0 && now.second() == 0
}

/// Parse a stored RFC3339 timestamp into the given offset.
pub fn parse_in_offset(value: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.with_timezone(&offset))
}
