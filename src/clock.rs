//! Wall-clock access.
//!
//! Login-refresh compares *local* calendar dates, so a clock has to answer two
//! questions: what instant is it, and which local date does an instant fall on.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};
use std::cell::Cell;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date of `instant` in the player's local time zone.
    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate;
}

/// The browser (or OS) clock and time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }
}

/// A settable clock with a fixed UTC offset. Used by tests and replays.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Cell::new(now),
            offset,
        }
    }

    /// A clock in UTC.
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now, Utc.fix())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::utc(at("2026-03-01T08:00:00Z"));
        clock.advance(Duration::hours(13));
        assert_eq!(clock.now(), at("2026-03-01T21:00:00Z"));
    }

    #[test]
    fn local_date_honours_offset() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let clock = FixedClock::new(at("2026-03-01T20:00:00Z"), tokyo);
        assert_eq!(
            clock.local_date(clock.now()),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
    }
}
