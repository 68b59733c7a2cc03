//! Half-open time windows used by the list queries.
//!
//! All windows are anchored in UTC, the reference zone of both
//! backends. The caller's instant is truncated to midnight before the
//! window is built, so `day(2025-07-03T15:00Z)` and
//! `day(2025-07-03T00:00Z)` describe the same 24 hours.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};

/// A half-open interval `[start, end)` over event start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The 24 hours starting at midnight of `date`.
    pub fn day(date: DateTime<Utc>) -> Self {
        let start = midnight(date);
        Self {
            start,
            end: add_days(start, 1),
        }
    }

    /// The seven days starting at midnight of `week_start`.
    ///
    /// No weekday normalization happens: the caller picks the first day.
    pub fn week(week_start: DateTime<Utc>) -> Self {
        let start = midnight(week_start);
        Self {
            start,
            end: add_days(start, 7),
        }
    }

    /// From the first day of the month containing `month_start` up to the
    /// first day of the following month.
    pub fn month(month_start: DateTime<Utc>) -> Self {
        let date = month_start.date_naive();
        let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
        let next = first.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX);
        Self {
            start: first.and_time(NaiveTime::MIN).and_utc(),
            end: next.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// Whether `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn midnight(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn add_days(start: DateTime<Utc>, days: u64) -> DateTime<Utc> {
    start
        .checked_add_days(Days::new(days))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn day_truncates_to_midnight() {
        let window = TimeWindow::day(utc(2025, 7, 3, 15));
        assert_eq!(window.start, utc(2025, 7, 3, 0));
        assert_eq!(window.end, utc(2025, 7, 4, 0));
    }

    #[test]
    fn day_is_half_open() {
        let window = TimeWindow::day(utc(2025, 7, 3, 0));
        assert!(window.contains(utc(2025, 7, 3, 0)));
        assert!(window.contains(utc(2025, 7, 3, 23)));
        assert!(!window.contains(utc(2025, 7, 4, 0)));
        assert!(!window.contains(utc(2025, 7, 2, 23)));
    }

    #[test]
    fn week_spans_seven_days_from_given_start() {
        // 2025-07-02 is a Wednesday; no snapping to Monday.
        let window = TimeWindow::week(utc(2025, 7, 2, 9));
        assert_eq!(window.start, utc(2025, 7, 2, 0));
        assert_eq!(window.end, utc(2025, 7, 9, 0));
    }

    #[test]
    fn month_starts_on_the_first() {
        let window = TimeWindow::month(utc(2025, 7, 17, 10));
        assert_eq!(window.start, utc(2025, 7, 1, 0));
        assert_eq!(window.end, utc(2025, 8, 1, 0));
    }

    #[test]
    fn month_rolls_over_year_end() {
        let window = TimeWindow::month(utc(2025, 12, 31, 23));
        assert_eq!(window.start, utc(2025, 12, 1, 0));
        assert_eq!(window.end, utc(2026, 1, 1, 0));
    }

    #[test]
    fn february_of_leap_year() {
        let window = TimeWindow::month(utc(2024, 2, 10, 0));
        assert_eq!(window.end, utc(2024, 3, 1, 0));
        assert!(window.contains(utc(2024, 2, 29, 12)));
    }
}
