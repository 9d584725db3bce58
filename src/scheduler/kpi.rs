//! Staffing quality metrics (KPIs).
//!
//! Summarizes how well a week's committed schedule meets its staffing
//! requirements.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Required headcount | Sum of requirement minimums over the 7 dates |
//! | Missing headcount | Sum of gap `missing` over the week |
//! | Fill rate | (required - missing) / required |
//! | Understaffed days | Dates with at least one gap |
//! | Shifts per employee | Committed assignments per employee in the week |
//! | Paid hours per employee | Template paid minutes summed per employee, in hours |

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::gaps::GapReport;
use crate::models::{week_dates, DayType, DayTypePolicy, ShiftTemplate};
use crate::schedule::ScheduleState;
use crate::staffing::StaffingIndex;

/// Week staffing indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingKpi {
    /// Required headcount over the week.
    pub required_headcount: u32,
    /// Missing headcount over the week.
    pub missing_headcount: u32,
    /// Fraction of required headcount that is met (0.0..=1.0).
    pub fill_rate: f64,
    pub missing_by_area: BTreeMap<String, u32>,
    pub missing_by_day_type: BTreeMap<DayType, u32>,
    /// Dates with at least one gap.
    pub understaffed_days: usize,
    /// Committed shifts per employee.
    pub shifts_by_employee: HashMap<String, usize>,
    /// Paid hours per employee.
    pub paid_hours_by_employee: HashMap<String, f64>,
}

impl StaffingKpi {
    /// Computes KPIs for the week of `report`.
    ///
    /// # Arguments
    /// * `report` - Gap analysis of the week.
    /// * `index` - Staffing requirements the report was computed from.
    /// * `policy` - Day-type policy the report was computed with.
    /// * `state` - Schedule state holding the week's committed assignments.
    /// * `templates` - Templates used to derive paid hours.
    pub fn calculate(
        report: &GapReport,
        index: &StaffingIndex,
        policy: &dyn DayTypePolicy,
        state: &ScheduleState,
        templates: &[ShiftTemplate],
    ) -> Self {
        let required_headcount: u32 = week_dates(report.week_start)
            .into_iter()
            .map(|date| {
                index
                    .requirements_on(policy.classify(date))
                    .map(|r| r.required())
                    .sum::<u32>()
            })
            .sum();
        let missing_headcount = report.total_missing();

        let fill_rate = if required_headcount == 0 {
            1.0
        } else {
            f64::from(required_headcount.saturating_sub(missing_headcount))
                / f64::from(required_headcount)
        };

        let mut missing_by_area: BTreeMap<String, u32> = BTreeMap::new();
        let mut missing_by_day_type: BTreeMap<DayType, u32> = BTreeMap::new();
        for gap in report {
            *missing_by_area.entry(gap.area_id.clone()).or_default() += gap.missing;
            *missing_by_day_type.entry(gap.day_type).or_default() += gap.missing;
        }

        let mut shifts_by_employee: HashMap<String, usize> = HashMap::new();
        let mut paid_hours_by_employee: HashMap<String, f64> = HashMap::new();
        for assignment in state.assignments_in_week(report.week_start) {
            *shifts_by_employee
                .entry(assignment.employee_id.clone())
                .or_default() += 1;
            let paid_minutes = templates
                .iter()
                .find(|t| t.id == assignment.template_id)
                .map(ShiftTemplate::paid_minutes)
                .unwrap_or(0);
            *paid_hours_by_employee
                .entry(assignment.employee_id.clone())
                .or_default() += paid_minutes as f64 / 60.0;
        }

        Self {
            required_headcount,
            missing_headcount,
            fill_rate,
            missing_by_area,
            missing_by_day_type,
            understaffed_days: report.by_date().len(),
            shifts_by_employee,
            paid_hours_by_employee,
        }
    }

    /// Whether the week meets the fill-rate threshold.
    pub fn meets_threshold(&self, min_fill_rate: f64) -> bool {
        self.fill_rate >= min_fill_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaps::GapAnalyzer;
    use crate::models::{Employee, ServiceArea, ShiftWindow, StaffingRequirement, WeekdayTiers};
    use crate::schedule::Placement;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn index() -> StaffingIndex {
        StaffingIndex::build(
            "BU1",
            vec![ServiceArea::new("BAR", "BU1"), ServiceArea::new("LOBBY", "BU1")],
            vec![
                StaffingRequirement::new("B3", "BAR", "Bartender", DayType::SuperPeak, 2),
                StaffingRequirement::new("L2", "LOBBY", "Host", DayType::Peak, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_kpi_basic() {
        let index = index();
        let policy = WeekdayTiers::default();
        let templates = vec![ShiftTemplate::fixed("EVE", "BU1", ShiftWindow::from_hm(18, 0, 2, 0).unwrap())
            .with_break(60)];
        let employees = vec![
            Employee::new("E1", "Bartender", "BU1"),
            Employee::new("H1", "Host", "BU1"),
        ];
        let mut state = ScheduleState::new("BU1");
        state.upsert_assignment(Placement::new("E1", date(15), "EVE"));
        state.upsert_assignment(Placement::new("H1", date(14), "EVE"));

        let report = GapAnalyzer::new(&index, &policy).analyze_week(date(10), &state, &employees);
        let kpi = StaffingKpi::calculate(&report, &index, &policy, &state, &templates);

        // Saturday needs 2 Bartenders; Friday and Sunday need 1 Host each.
        assert_eq!(kpi.required_headcount, 4);
        assert_eq!(kpi.missing_headcount, 2);
        assert!((kpi.fill_rate - 0.5).abs() < 1e-10);
        assert_eq!(kpi.missing_by_area["BAR"], 1);
        assert_eq!(kpi.missing_by_area["LOBBY"], 1);
        assert_eq!(kpi.missing_by_day_type[&DayType::Peak], 1);
        assert_eq!(kpi.understaffed_days, 2);
        assert_eq!(kpi.shifts_by_employee["E1"], 1);
        assert!((kpi.paid_hours_by_employee["H1"] - 7.0).abs() < 1e-10);
        assert!(kpi.meets_threshold(0.5));
        assert!(!kpi.meets_threshold(0.9));
    }

    #[test]
    fn test_kpi_no_requirements() {
        let index = StaffingIndex::empty("BU1");
        let policy = WeekdayTiers::default();
        let state = ScheduleState::new("BU1");
        let report = GapAnalyzer::new(&index, &policy).analyze_week(date(10), &state, &[]);
        let kpi = StaffingKpi::calculate(&report, &index, &policy, &state, &[]);
        assert_eq!(kpi.required_headcount, 0);
        assert!((kpi.fill_rate - 1.0).abs() < 1e-10);
        assert!(kpi.missing_by_area.is_empty());
    }
}
