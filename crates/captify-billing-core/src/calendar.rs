//! Usage days and subscription periods

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Offset, Utc};

/// Maps instants to the calendar day usage is counted against
#[derive(Debug, Clone, Copy)]
pub struct UsageCalendar {
    offset: FixedOffset,
}

impl UsageCalendar {
    /// Day boundary at UTC midnight
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Day boundary at midnight in a fixed offset from UTC.
    ///
    /// Returns `None` when the offset is not strictly within a day.
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(minutes.checked_mul(60)?)?;
        Some(Self { offset })
    }

    /// Calendar day containing `at`
    pub fn usage_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}

impl Default for UsageCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// Advance `start` by whole calendar months, keeping the time of day.
///
/// A day past the end of the target month rolls into the following month,
/// so Jan 31 plus one month is Mar 3 (Mar 2 in a leap year).
pub fn add_months_rolling(start: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    let date = start.date_naive();
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;

    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let day = first.checked_add_days(Days::new(u64::from(date.day0())))?;

    Some(day.and_time(start.time()).and_utc())
}
