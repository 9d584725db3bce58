//! Carry-over of the previous week's schedule.
//!
//! When a manager opens an empty week, the previous week's committed
//! assignments are proposed again, shifted by seven days, as provisional
//! suggestions. Suggestions are generated at most once per week; they are
//! committed one by one with [`accept`] or all together by publishing.
//!
//! [`copy_previous_week`] and [`copy_employee_previous_week`] are the
//! explicit, committing variants.
//!
//! Leave is not consulted when copying. Conflicts with approved leave are
//! logged and reported so the manager can resolve them.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SchedulingError};
use crate::models::{shift_days, start_of_week, AssignmentOrigin, ShiftAssignment};
use crate::schedule::{Placement, ScheduleState};

/// Why no suggestions were generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarryOverSkip {
    /// The week already holds assignments or suggestions.
    WeekNotEmpty,
    /// Suggestions were generated for this week before.
    AlreadySuggested,
    /// The previous week has no committed assignments.
    NoPriorAssignments,
}

/// Result of a carry-over attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CarryOverOutcome {
    /// Provisional entries staged for the week, in prior-week order.
    Suggested(Vec<ShiftAssignment>),
    Skipped(CarryOverSkip),
}

impl CarryOverOutcome {
    /// Number of staged suggestions.
    pub fn count(&self) -> usize {
        match self {
            Self::Suggested(entries) => entries.len(),
            Self::Skipped(_) => 0,
        }
    }
}

/// Tracks which weeks already received suggestions.
#[derive(Debug, Clone, Default)]
pub struct CarryOver {
    suggested_weeks: HashSet<NaiveDate>,
}

impl CarryOver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether suggestions were generated for the week before.
    pub fn has_suggested(&self, week_start: NaiveDate) -> bool {
        self.suggested_weeks.contains(&start_of_week(week_start))
    }

    /// Proposes the previous week's committed assignments for an empty week.
    pub fn suggest(&mut self, state: &mut ScheduleState, week_start: NaiveDate) -> CarryOverOutcome {
        let week_start = start_of_week(week_start);

        if state.entry_count_in_week(week_start) > 0 {
            return CarryOverOutcome::Skipped(CarryOverSkip::WeekNotEmpty);
        }
        if self.suggested_weeks.contains(&week_start) {
            return CarryOverOutcome::Skipped(CarryOverSkip::AlreadySuggested);
        }

        let prior = prior_week_placements(state, week_start, None);
        if prior.is_empty() {
            debug!(week = %week_start, "no prior-week assignments to carry over");
            return CarryOverOutcome::Skipped(CarryOverSkip::NoPriorAssignments);
        }

        let staged: Vec<ShiftAssignment> = prior
            .into_iter()
            .filter_map(|p| state.stage_suggestion(p.with_origin(AssignmentOrigin::CarryOver)))
            .collect();
        self.suggested_weeks.insert(week_start);

        info!(
            business_unit = %state.business_unit(),
            week = %week_start,
            suggestions = staged.len(),
            "carried over previous week as suggestions"
        );
        CarryOverOutcome::Suggested(staged)
    }
}

/// Commits one pending suggestion.
///
/// # Errors
/// [`SchedulingError::UnknownSuggestion`] when `suggestion_id` names no
/// provisional entry.
pub fn accept(state: &mut ScheduleState, suggestion_id: &str) -> Result<ShiftAssignment> {
    let placement = state
        .get(suggestion_id)
        .filter(|entry| entry.provisional)
        .map(Placement::from_assignment)
        .ok_or_else(|| SchedulingError::UnknownSuggestion(suggestion_id.to_string()))?;
    Ok(state.upsert_assignment(placement))
}

/// Result of a committing copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyReport {
    /// Destination-week entries removed before copying.
    pub removed: usize,
    /// Committed copies, in prior-week order.
    pub copied: Vec<ShiftAssignment>,
    /// Copies that land on a day of approved leave.
    pub on_leave: Vec<String>,
}

/// Replaces the week with a committed copy of the previous week.
///
/// Every entry of the destination week is removed first.
pub fn copy_previous_week(state: &mut ScheduleState, week_start: NaiveDate) -> CopyReport {
    copy_into(state, start_of_week(week_start), None)
}

/// Replaces one employee's week with a copy of their previous week.
pub fn copy_employee_previous_week(
    state: &mut ScheduleState,
    employee_id: &str,
    week_start: NaiveDate,
) -> CopyReport {
    copy_into(state, start_of_week(week_start), Some(employee_id))
}

fn copy_into(state: &mut ScheduleState, week_start: NaiveDate, employee_id: Option<&str>) -> CopyReport {
    let prior = prior_week_placements(state, week_start, employee_id);

    let stale: Vec<String> = state
        .entries()
        .iter()
        .filter(|a| start_of_week(a.date) == week_start)
        .filter(|a| employee_id.map_or(true, |id| a.employee_id == id))
        .map(|a| a.id.clone())
        .collect();
    for id in &stale {
        state.delete_assignment(id);
    }

    let mut report = CopyReport {
        removed: stale.len(),
        ..CopyReport::default()
    };
    for placement in prior {
        let copy = state.upsert_assignment(placement.with_origin(AssignmentOrigin::CopiedWeek));
        if state.leave_covering(&copy.employee_id, copy.date).is_some() {
            warn!(
                employee = %copy.employee_id,
                date = %copy.date,
                "copied assignment falls on approved leave"
            );
            report.on_leave.push(copy.id.clone());
        }
        report.copied.push(copy);
    }

    info!(
        business_unit = %state.business_unit(),
        week = %week_start,
        employee = ?employee_id,
        removed = report.removed,
        copied = report.copied.len(),
        "copied previous week"
    );
    report
}

/// Committed prior-week assignments moved forward seven days.
fn prior_week_placements(
    state: &ScheduleState,
    week_start: NaiveDate,
    employee_id: Option<&str>,
) -> Vec<Placement> {
    state
        .assignments_in_week(shift_days(week_start, -7))
        .into_iter()
        .filter(|a| employee_id.map_or(true, |id| a.employee_id == id))
        .map(|a| Placement::from_assignment(a).on(shift_days(a.date, 7)))
        .collect()
}
