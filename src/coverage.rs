//! Opening/closing coverage checks.
//!
//! A day's opening is covered when some assignment's fixed shift starts
//! exactly at the business's opening time; closing is covered when one ends
//! exactly at closing time. Closed days are always fully covered, so a day
//! without configured hours never produces a false alarm.
//!
//! Coverage is informational. It never blocks scheduling.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{start_of_week, week_dates, OperatingHours, ShiftAssignment, ShiftTemplate};
use crate::schedule::ScheduleState;

/// Coverage flags of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCoverage {
    pub date: NaiveDate,
    pub opening_covered: bool,
    pub closing_covered: bool,
}

impl DayCoverage {
    #[inline]
    pub fn is_covered(&self) -> bool {
        self.opening_covered && self.closing_covered
    }
}

/// Checks opening and closing coverage of one day.
///
/// Assignments whose template is unknown or flexible never cover anything.
pub fn validate_day(
    date: NaiveDate,
    day_assignments: &[&ShiftAssignment],
    templates: &[ShiftTemplate],
    hours: &OperatingHours,
) -> DayCoverage {
    let Some(open_span) = hours.on(date) else {
        return DayCoverage {
            date,
            opening_covered: true,
            closing_covered: true,
        };
    };

    let windows = day_assignments
        .iter()
        .filter(|a| a.date == date)
        .filter_map(|a| templates.iter().find(|t| t.id == a.template_id))
        .filter_map(|t| t.window());

    let mut opening_covered = false;
    let mut closing_covered = false;
    for window in windows {
        opening_covered |= window.start == open_span.start;
        closing_covered |= window.end == open_span.end;
    }

    DayCoverage {
        date,
        opening_covered,
        closing_covered,
    }
}

/// Checks every day of a week against committed assignments.
///
/// `week_start` may be any date of the week.
pub fn validate_week(
    week_start: NaiveDate,
    state: &ScheduleState,
    templates: &[ShiftTemplate],
    hours: &OperatingHours,
) -> [DayCoverage; 7] {
    week_dates(start_of_week(week_start)).map(|date| validate_day(date, &state.assignments_on(date), templates, hours))
}

/// Days of a week with an uncovered opening or closing.
pub fn uncovered_days(coverage: &[DayCoverage]) -> Vec<&DayCoverage> {
    coverage.iter().filter(|c| !c.is_covered()).collect()
}
