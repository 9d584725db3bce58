//! Calendar arithmetic and time-of-day windows.
//!
//! Weeks are ISO weeks: they start on Monday. All dates are civil dates
//! in the business's single local calendar (no time zones).
//!
//! # Time Model
//! A [`ShiftWindow`] is a time-of-day interval [start, end). When `end` is
//! not after `start` the window wraps past midnight (a 22:00–06:00 night
//! shift). A window whose start equals its end is malformed.

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Minutes in a civil day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Monday of the ISO week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// The seven consecutive dates starting at `week_start`.
///
/// `week_start` is used as given; normalize with [`start_of_week`] first
/// if the caller may pass a mid-week date.
pub fn week_dates(week_start: NaiveDate) -> [NaiveDate; 7] {
    let mut dates = [week_start; 7];
    for (offset, slot) in dates.iter_mut().enumerate() {
        *slot = shift_days(week_start, offset as i64);
    }
    dates
}

/// Inclusive date range iterator. Empty when `end < start`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Whether `date` falls in the week starting at `week_start`.
pub fn in_week(date: NaiveDate, week_start: NaiveDate) -> bool {
    start_of_week(date) == week_start
}

/// Moves `date` by a signed number of days, saturating at the calendar bounds.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(date)
}

/// A time-of-day interval [start, end), possibly wrapping past midnight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ShiftWindow {
    /// Start time (inclusive).
    pub start: NaiveTime,
    /// End time (exclusive). Not after `start` means the window ends the next day.
    pub end: NaiveTime,
}

impl ShiftWindow {
    /// Creates a new window.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Creates a window from whole hours and minutes. Returns `None` for
    /// out-of-range components.
    pub fn from_hm(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Option<Self> {
        Some(Self {
            start: NaiveTime::from_hms_opt(start_h, start_m, 0)?,
            end: NaiveTime::from_hms_opt(end_h, end_m, 0)?,
        })
    }

    /// Whether the window ends on the following day.
    #[inline]
    pub fn wraps_midnight(&self) -> bool {
        self.end <= self.start
    }

    /// Zero-length windows cannot be scheduled.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.start != self.end
    }

    /// Length of the window in minutes.
    pub fn duration_minutes(&self) -> i64 {
        let start = minute_of_day(self.start);
        let end = minute_of_day(self.end);
        if self.wraps_midnight() {
            MINUTES_PER_DAY - start + end
        } else {
            end - start
        }
    }

    /// Whether a time of day falls within this window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.wraps_midnight() {
            time >= self.start || time < self.end
        } else {
            time >= self.start && time < self.end
        }
    }

    /// Whether two windows share at least one minute of the same day cycle.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.contains(other.start) || other.contains(self.start)
    }

    /// Exact start and end match.
    #[inline]
    pub fn matches(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl std::fmt::Display for ShiftWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_start_of_week() {
        // 2024-06-15 is a Saturday
        assert_eq!(start_of_week(date(2024, 6, 15)), date(2024, 6, 10));
        assert_eq!(start_of_week(date(2024, 6, 10)), date(2024, 6, 10));
        // Sunday belongs to the week that started the previous Monday
        assert_eq!(start_of_week(date(2024, 6, 16)), date(2024, 6, 10));
        assert_eq!(start_of_week(date(2024, 6, 10)).weekday(), Weekday::Mon);
    }

    #[test]
    fn test_start_of_week_across_year() {
        // 2025-01-01 is a Wednesday
        assert_eq!(start_of_week(date(2025, 1, 1)), date(2024, 12, 30));
    }

    #[test]
    fn test_week_dates() {
        let dates = week_dates(date(2024, 6, 10));
        assert_eq!(dates[0], date(2024, 6, 10));
        assert_eq!(dates[6], date(2024, 6, 16));
        assert_eq!(dates[5].weekday(), Weekday::Sat);
    }

    #[test]
    fn test_dates_between() {
        let range: Vec<_> = dates_between(date(2024, 2, 28), date(2024, 3, 1)).collect();
        assert_eq!(range, vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]);
        assert_eq!(dates_between(date(2024, 3, 2), date(2024, 3, 1)).count(), 0);
    }

    #[test]
    fn test_shift_days() {
        assert_eq!(shift_days(date(2024, 6, 10), 7), date(2024, 6, 17));
        assert_eq!(shift_days(date(2024, 6, 10), -7), date(2024, 6, 3));
        assert!(in_week(date(2024, 6, 16), date(2024, 6, 10)));
        assert!(!in_week(date(2024, 6, 17), date(2024, 6, 10)));
    }

    #[test]
    fn test_window_duration() {
        let day = ShiftWindow::from_hm(9, 0, 17, 30).unwrap();
        assert_eq!(day.duration_minutes(), 510);
        assert!(!day.wraps_midnight());

        let night = ShiftWindow::from_hm(22, 0, 6, 0).unwrap();
        assert!(night.wraps_midnight());
        assert_eq!(night.duration_minutes(), 480);
    }

    #[test]
    fn test_window_contains() {
        let night = ShiftWindow::from_hm(22, 0, 6, 0).unwrap();
        assert!(night.contains(NaiveTime::from_hms_opt(23, 0, 0).unwrap()));
        assert!(night.contains(NaiveTime::from_hms_opt(2, 0, 0).unwrap()));
        assert!(!night.contains(NaiveTime::from_hms_opt(6, 0, 0).unwrap())); // exclusive end
        assert!(!night.contains(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
    }

    #[test]
    fn test_window_overlap() {
        let morning = ShiftWindow::from_hm(6, 0, 14, 0).unwrap();
        let evening = ShiftWindow::from_hm(14, 0, 22, 0).unwrap();
        let night = ShiftWindow::from_hm(22, 0, 6, 0).unwrap();
        let late = ShiftWindow::from_hm(12, 0, 20, 0).unwrap();

        assert!(!morning.overlaps(&evening)); // touching, not overlapping
        assert!(!night.overlaps(&morning));
        assert!(morning.overlaps(&late));
        assert!(late.overlaps(&evening));
    }

    #[test]
    fn test_malformed_window() {
        let w = ShiftWindow::from_hm(9, 0, 9, 0).unwrap();
        assert!(!w.is_well_formed());
        assert!(ShiftWindow::from_hm(25, 0, 9, 0).is_none());
    }

    #[test]
    fn test_window_display() {
        let w = ShiftWindow::from_hm(7, 5, 15, 0).unwrap();
        assert_eq!(w.to_string(), "07:05-15:00");
    }
}
