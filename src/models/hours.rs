//! Business operating hours.
//!
//! One opening span per weekday. `00:00-00:00` marks the day as closed.
//! Any other span with equal open and close times has zero length:
//! [`OperatingHours::parse_span`] rejects it as malformed, and
//! [`OperatingHours::with_day`] stores it as closed. A close time before the
//! open time means the business closes after midnight.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::ShiftWindow;

/// Weekly opening schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    days: [Option<ShiftWindow>; 7],
}

impl OperatingHours {
    /// All days closed.
    pub fn closed() -> Self {
        Self::default()
    }

    /// Same hours every day.
    pub fn every_day(open: NaiveTime, close: NaiveTime) -> Self {
        let mut hours = Self::closed();
        for offset in 0..7 {
            hours.days[offset] = span(open, close);
        }
        hours
    }

    /// Sets the span of one weekday. Equal times close the day.
    pub fn with_day(mut self, weekday: Weekday, open: NaiveTime, close: NaiveTime) -> Self {
        self.days[weekday.num_days_from_monday() as usize] = span(open, close);
        self
    }

    /// Closes one weekday.
    pub fn with_closed(mut self, weekday: Weekday) -> Self {
        self.days[weekday.num_days_from_monday() as usize] = None;
        self
    }

    /// Opening span of a weekday, `None` when closed.
    pub fn on_weekday(&self, weekday: Weekday) -> Option<&ShiftWindow> {
        self.days[weekday.num_days_from_monday() as usize].as_ref()
    }

    /// Opening span of a date, `None` when closed.
    pub fn on(&self, date: NaiveDate) -> Option<&ShiftWindow> {
        self.on_weekday(date.weekday())
    }

    /// Parses an `"HH:MM-HH:MM"` span. Returns `Some(None)` for
    /// `00:00-00:00` and `None` when the text is malformed or zero-length.
    pub fn parse_span(text: &str) -> Option<Option<ShiftWindow>> {
        let (open, close) = text.split_once('-')?;
        let open = NaiveTime::parse_from_str(open.trim(), "%H:%M").ok()?;
        let close = NaiveTime::parse_from_str(close.trim(), "%H:%M").ok()?;
        if open == close && open != NaiveTime::MIN {
            return None;
        }
        Some(span(open, close))
    }

    /// Number of open days per week.
    pub fn open_days(&self) -> usize {
        self.days.iter().filter(|d| d.is_some()).count()
    }
}

fn span(open: NaiveTime, close: NaiveTime) -> Option<ShiftWindow> {
    let window = ShiftWindow::new(open, close);
    window.is_well_formed().then_some(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_default_closed() {
        let hours = OperatingHours::closed();
        assert_eq!(hours.open_days(), 0);
        assert!(hours.on_weekday(Weekday::Mon).is_none());
    }

    #[test]
    fn test_every_day_with_closed_monday() {
        let hours = OperatingHours::every_day(t(9, 0), t(22, 0)).with_closed(Weekday::Mon);
        assert_eq!(hours.open_days(), 6);
        assert!(hours.on_weekday(Weekday::Mon).is_none());
        let sat = hours.on_weekday(Weekday::Sat).unwrap();
        assert_eq!(sat.start, t(9, 0));
        assert_eq!(sat.end, t(22, 0));
    }

    #[test]
    fn test_midnight_span_is_closed() {
        let hours = OperatingHours::closed().with_day(Weekday::Sun, t(0, 0), t(0, 0));
        assert!(hours.on_weekday(Weekday::Sun).is_none());
    }

    #[test]
    fn test_on_date() {
        let hours = OperatingHours::closed().with_day(Weekday::Sat, t(18, 0), t(2, 0));
        let saturday = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let window = hours.on(saturday).unwrap();
        assert!(window.wraps_midnight());
    }

    #[test]
    fn test_parse_span() {
        let open = OperatingHours::parse_span("08:30-17:00").unwrap().unwrap();
        assert_eq!(open.start, t(8, 30));
        assert_eq!(open.end, t(17, 0));

        assert_eq!(OperatingHours::parse_span("00:00-00:00"), Some(None));
        assert_eq!(OperatingHours::parse_span("09:00-09:00"), None);
        assert_eq!(OperatingHours::parse_span("8am-5pm"), None);
        assert_eq!(OperatingHours::parse_span("08:00"), None);
    }
}
