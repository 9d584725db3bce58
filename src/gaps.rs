//! Staffing gap analysis.
//!
//! Compares the required headcount of each staffing requirement against
//! the committed assignments of a week and reports every shortfall.
//!
//! # Algorithm
//!
//! 1. Classify each of the 7 dates with the day-type policy.
//! 2. For each requirement on that tier (index order), count committed
//!    assignments on the date whose employee's role equals the requirement's
//!    role.
//! 3. Emit a [`Gap`] when the count is below the minimum.
//!
//! Output is date-major, then requirement-index order, and is identical for
//! identical inputs.
//!
//! The count is role-wide, not per area: a Bartender assigned to the
//! terrace also counts towards the bar's Bartender minimum on that date.
//!
//! # Complexity
//! O(d * r * a) where d=7 days, r=requirements per tier, a=assignments per day.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{start_of_week, week_dates, DayType, DayTypePolicy, Employee, ShiftWindow, StaffingRequirement};
use crate::schedule::ScheduleState;
use crate::staffing::StaffingIndex;

/// A staffing shortfall on one date for one requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub date: NaiveDate,
    /// Requirement that is not met.
    pub requirement_id: String,
    pub role: String,
    pub area_id: String,
    pub day_type: DayType,
    /// Minimum headcount.
    pub required: u32,
    /// Committed headcount with the role on the date.
    pub scheduled: u32,
    /// `required - scheduled`, always positive.
    pub missing: u32,
    /// Canonical shift time of the requirement.
    pub shift_time: Option<ShiftWindow>,
}

impl Gap {
    fn from_requirement(
        requirement: &StaffingRequirement,
        date: NaiveDate,
        day_type: DayType,
        scheduled: u32,
    ) -> Option<Self> {
        let required = requirement.required();
        let missing = required.saturating_sub(scheduled);
        (missing > 0).then(|| Self {
            date,
            requirement_id: requirement.id.clone(),
            role: requirement.role.clone(),
            area_id: requirement.area_id.clone(),
            day_type,
            required,
            scheduled,
            missing,
            shift_time: requirement.window,
        })
    }
}

/// Gaps of one business unit for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub business_unit: String,
    pub week_start: NaiveDate,
    pub gaps: Vec<Gap>,
}

impl GapReport {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Gap> {
        self.gaps.iter()
    }

    /// Sum of missing headcount.
    pub fn total_missing(&self) -> u32 {
        self.gaps.iter().map(|g| g.missing).sum()
    }

    /// Gaps grouped by area, emitted order within each area.
    pub fn by_area(&self) -> BTreeMap<&str, Vec<&Gap>> {
        let mut groups: BTreeMap<&str, Vec<&Gap>> = BTreeMap::new();
        for gap in &self.gaps {
            groups.entry(gap.area_id.as_str()).or_default().push(gap);
        }
        groups
    }

    /// Gaps grouped by date.
    pub fn by_date(&self) -> BTreeMap<NaiveDate, Vec<&Gap>> {
        let mut groups: BTreeMap<NaiveDate, Vec<&Gap>> = BTreeMap::new();
        for gap in &self.gaps {
            groups.entry(gap.date).or_default().push(gap);
        }
        groups
    }
}

impl<'a> IntoIterator for &'a GapReport {
    type Item = &'a Gap;
    type IntoIter = std::slice::Iter<'a, Gap>;

    fn into_iter(self) -> Self::IntoIter {
        self.gaps.iter()
    }
}

/// Gap analysis over a validated staffing index.
#[derive(Debug, Clone, Copy)]
pub struct GapAnalyzer<'a> {
    index: &'a StaffingIndex,
    policy: &'a dyn DayTypePolicy,
}

impl<'a> GapAnalyzer<'a> {
    pub fn new(index: &'a StaffingIndex, policy: &'a dyn DayTypePolicy) -> Self {
        Self { index, policy }
    }

    /// Analyzes the week containing `week_start`.
    ///
    /// `employees` resolves assignment employee IDs to role labels;
    /// assignments of employees missing from it are not counted.
    pub fn analyze_week(
        &self,
        week_start: NaiveDate,
        state: &ScheduleState,
        employees: &[Employee],
    ) -> GapReport {
        let week_start = start_of_week(week_start);
        let roles = role_lookup(employees);

        let gaps: Vec<Gap> = week_dates(week_start)
            .into_iter()
            .flat_map(|date| self.gaps_on(date, state, &roles))
            .collect();

        debug!(
            business_unit = %self.index.business_unit(),
            week = %week_start,
            gaps = gaps.len(),
            "gap analysis complete"
        );

        GapReport {
            business_unit: self.index.business_unit().to_string(),
            week_start,
            gaps,
        }
    }

    /// Analyzes a single date.
    pub fn analyze_day(&self, date: NaiveDate, state: &ScheduleState, employees: &[Employee]) -> Vec<Gap> {
        self.gaps_on(date, state, &role_lookup(employees))
    }

    fn gaps_on(&self, date: NaiveDate, state: &ScheduleState, roles: &HashMap<&str, &str>) -> Vec<Gap> {
        let day_type = self.policy.classify(date);
        let assigned_roles: Vec<&str> = state
            .assignments_on(date)
            .into_iter()
            .filter_map(|a| roles.get(a.employee_id.as_str()).copied())
            .collect();

        self.index
            .requirements_on(day_type)
            .filter_map(|req| {
                let scheduled = assigned_roles.iter().filter(|r| **r == req.role).count();
                let scheduled = u32::try_from(scheduled).unwrap_or(u32::MAX);
                Gap::from_requirement(req, date, day_type, scheduled)
            })
            .collect()
    }
}

fn role_lookup(employees: &[Employee]) -> HashMap<&str, &str> {
    employees
        .iter()
        .map(|e| (e.id.as_str(), e.role.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ServiceArea, WeekdayTiers};
    use crate::schedule::Placement;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn saturday() -> NaiveDate {
        date(15)
    }

    fn index(tier: DayType) -> StaffingIndex {
        StaffingIndex::build(
            "BU1",
            vec![ServiceArea::new("BAR", "BU1")],
            vec![StaffingRequirement::new("R1", "BAR", "Bartender", tier, 2)
                .with_window(ShiftWindow::from_hm(18, 0, 2, 0).unwrap())],
        )
        .unwrap()
    }

    fn roster() -> Vec<Employee> {
        vec![
            Employee::new("E1", "Bartender", "BU1"),
            Employee::new("E2", "Bartender", "BU1"),
            Employee::new("E3", "Cook", "BU1"),
        ]
    }

    #[test]
    fn test_tier_mismatch_no_gap() {
        let idx = index(DayType::Peak);
        let policy = WeekdayTiers::default();
        let state = ScheduleState::new("BU1");

        let gaps = GapAnalyzer::new(&idx, &policy).analyze_day(saturday(), &state, &roster());
        assert!(gaps.is_empty());
    }

    #[test]
    fn test_super_peak_gap() {
        let idx = index(DayType::SuperPeak);
        let policy = WeekdayTiers::default();
        let mut state = ScheduleState::new("BU1");
        state.upsert_assignment(Placement::new("E1", saturday(), "NIGHT"));

        let report = GapAnalyzer::new(&idx, &policy).analyze_week(date(10), &state, &roster());
        assert_eq!(report.len(), 1);
        let gap = &report.gaps[0];
        assert_eq!(gap.date, saturday());
        assert_eq!(gap.required, 2);
        assert_eq!(gap.scheduled, 1);
        assert_eq!(gap.missing, 1);
        assert_eq!(gap.day_type, DayType::SuperPeak);
        assert_eq!(gap.shift_time, ShiftWindow::from_hm(18, 0, 2, 0));
    }

    #[test]
    fn test_other_roles_do_not_count() {
        let idx = index(DayType::SuperPeak);
        let policy = WeekdayTiers::default();
        let mut state = ScheduleState::new("BU1");
        state.upsert_assignment(Placement::new("E3", saturday(), "NIGHT"));
        // Unknown employee: not counted either.
        state.upsert_assignment(Placement::new("GHOST", saturday(), "NIGHT"));

        let gaps = GapAnalyzer::new(&idx, &policy).analyze_day(saturday(), &state, &roster());
        assert_eq!(gaps[0].scheduled, 0);
        assert_eq!(gaps[0].missing, 2);
    }

    #[test]
    fn test_met_requirement_no_gap() {
        let idx = index(DayType::SuperPeak);
        let policy = WeekdayTiers::default();
        let mut state = ScheduleState::new("BU1");
        state.upsert_assignment(Placement::new("E1", saturday(), "NIGHT"));
        state.upsert_assignment(Placement::new("E2", saturday(), "NIGHT"));

        let report = GapAnalyzer::new(&idx, &policy).analyze_week(date(10), &state, &roster());
        assert!(report.is_empty());
    }

    #[test]
    fn test_suggestions_not_counted() {
        let idx = index(DayType::SuperPeak);
        let policy = WeekdayTiers::default();
        let mut state = ScheduleState::new("BU1");
        state.stage_suggestion(Placement::new("E1", saturday(), "NIGHT"));

        let gaps = GapAnalyzer::new(&idx, &policy).analyze_day(saturday(), &state, &roster());
        assert_eq!(gaps[0].missing, 2);
    }

    #[test]
    fn test_week_order_and_idempotence() {
        let idx = StaffingIndex::build(
            "BU1",
            vec![ServiceArea::new("BAR", "BU1"), ServiceArea::new("LOBBY", "BU1")],
            vec![
                StaffingRequirement::new("L1", "LOBBY", "Receptionist", DayType::OffPeak, 1),
                StaffingRequirement::new("B1", "BAR", "Bartender", DayType::OffPeak, 1),
                StaffingRequirement::new("B2", "BAR", "Bartender", DayType::Peak, 1),
            ],
        )
        .unwrap();
        let policy = WeekdayTiers::default();
        let state = ScheduleState::new("BU1");
        let analyzer = GapAnalyzer::new(&idx, &policy);

        let first = analyzer.analyze_week(date(12), &state, &roster());
        let second = analyzer.analyze_week(date(12), &state, &roster());
        assert_eq!(first, second);
        assert_eq!(first.week_start, date(10));

        // Mon–Thu: B1 then L1 (area order); Fri, Sun: B2; Sat: nothing.
        let keys: Vec<_> = first
            .iter()
            .map(|g| (g.date, g.requirement_id.as_str()))
            .collect();
        assert_eq!(keys.len(), 10);
        assert_eq!(keys[0], (date(10), "B1"));
        assert_eq!(keys[1], (date(10), "L1"));
        assert_eq!(keys[8], (date(14), "B2"));
        assert_eq!(keys[9], (date(16), "B2"));

        assert_eq!(first.total_missing(), 10);
        assert_eq!(first.by_area()["BAR"].len(), 6);
        assert_eq!(first.by_area()["LOBBY"].len(), 4);
        assert_eq!(first.by_date()[&date(10)].len(), 2);
        assert!(!first.by_date().contains_key(&saturday()));
    }

    #[test]
    fn test_missing_invariant() {
        let idx = index(DayType::SuperPeak);
        let policy = WeekdayTiers::default();
        let mut state = ScheduleState::new("BU1");
        state.upsert_assignment(Placement::new("E1", saturday(), "NIGHT"));

        let report = GapAnalyzer::new(&idx, &policy).analyze_week(date(10), &state, &roster());
        for gap in &report {
            assert_eq!(gap.missing, gap.required - gap.scheduled);
            assert!(gap.missing > 0);
        }
    }

    #[test]
    fn test_empty_index_no_gaps() {
        let idx = StaffingIndex::empty("BU1");
        let policy = WeekdayTiers::default();
        let report = GapAnalyzer::new(&idx, &policy).analyze_week(date(10), &ScheduleState::new("BU1"), &[]);
        assert!(report.is_empty());
        assert_eq!(report.business_unit, "BU1");
    }
}
