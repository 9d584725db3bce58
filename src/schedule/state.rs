//! Mutable schedule state of one business unit.
//!
//! Holds committed assignments, provisional suggestions, and approved leave
//! for the loaded window (typically the prior, current, and next week).
//!
//! # Invariant
//! At most one entry (committed or provisional) exists per
//! (employee, date). [`ScheduleState::upsert_assignment`] is the single
//! committing mutation path and replaces an occupied slot in place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AssignmentIntent, PublishLifecycle};
use crate::models::{start_of_week, AssignmentOrigin, Employee, LeaveInterval, ShiftAssignment};

/// Request to place an employee on a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub employee_id: String,
    pub date: NaiveDate,
    pub template_id: String,
    pub area_id: Option<String>,
    pub department: String,
    pub origin: AssignmentOrigin,
}

impl Placement {
    /// A manual placement.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, template_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
            template_id: template_id.into(),
            area_id: None,
            department: String::new(),
            origin: AssignmentOrigin::Manual,
        }
    }

    /// A placement for a known employee, carrying their department.
    pub fn for_employee(employee: &Employee, date: NaiveDate, template_id: impl Into<String>) -> Self {
        Self::new(&employee.id, date, template_id).with_department(&employee.department)
    }

    /// Re-places an existing entry on its own slot.
    pub fn from_assignment(assignment: &ShiftAssignment) -> Self {
        Self {
            employee_id: assignment.employee_id.clone(),
            date: assignment.date,
            template_id: assignment.template_id.clone(),
            area_id: assignment.area_id.clone(),
            department: assignment.department.clone(),
            origin: assignment.origin,
        }
    }

    pub fn with_area(mut self, area_id: impl Into<String>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }

    pub fn with_optional_area(mut self, area_id: Option<String>) -> Self {
        self.area_id = area_id;
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_origin(mut self, origin: AssignmentOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Same placement moved to another date.
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

/// Outcome of a delete request.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The entry existed and was removed.
    Deleted(ShiftAssignment),
    /// No entry had that identifier. Nothing changed.
    NotFound,
}

impl DeleteOutcome {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }
}

/// Assignments, suggestions, and leave of one business unit.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    business_unit: String,
    entries: Vec<ShiftAssignment>,
    leaves: Vec<LeaveInterval>,
    lifecycle: PublishLifecycle,
    intents: Vec<AssignmentIntent>,
}

impl ScheduleState {
    /// Creates an empty state.
    pub fn new(business_unit: impl Into<String>) -> Self {
        Self {
            business_unit: business_unit.into(),
            entries: Vec::new(),
            leaves: Vec::new(),
            lifecycle: PublishLifecycle::new(),
            intents: Vec::new(),
        }
    }

    /// Loads persisted assignments without marking anything dirty.
    ///
    /// Assignments of other business units are ignored. A second record for
    /// an occupied (employee, date) slot replaces the first. Returns the
    /// number of records that were dropped or superseded.
    pub fn restore(&mut self, assignments: impl IntoIterator<Item = ShiftAssignment>) -> usize {
        let mut dropped = 0;
        for assignment in assignments {
            if assignment.business_unit != self.business_unit {
                dropped += 1;
                continue;
            }
            if let Some(pos) = self.slot_index(&assignment.employee_id, assignment.date) {
                warn!(
                    employee = %assignment.employee_id,
                    date = %assignment.date,
                    kept = %assignment.id,
                    superseded = %self.entries[pos].id,
                    "duplicate assignment for employee and date while loading"
                );
                self.entries[pos] = assignment;
                dropped += 1;
            } else {
                self.entries.push(assignment);
            }
        }
        dropped
    }

    /// Adds a leave interval. Non-approved leave is kept but never blocks.
    pub fn add_leave(&mut self, leave: LeaveInterval) {
        self.leaves.push(leave);
    }

    /// Adds leave intervals.
    pub fn with_leaves(mut self, leaves: impl IntoIterator<Item = LeaveInterval>) -> Self {
        self.leaves.extend(leaves);
        self
    }

    pub fn business_unit(&self) -> &str {
        &self.business_unit
    }

    /// Every entry, committed and provisional, in insertion order.
    pub fn entries(&self) -> &[ShiftAssignment] {
        &self.entries
    }

    /// Entry by identifier.
    pub fn get(&self, id: &str) -> Option<&ShiftAssignment> {
        self.entries.iter().find(|a| a.id == id)
    }

    /// Committed assignments on a date.
    pub fn assignments_on(&self, date: NaiveDate) -> Vec<&ShiftAssignment> {
        self.entries
            .iter()
            .filter(|a| a.date == date && a.is_committed())
            .collect()
    }

    /// Committed assignment of an employee on a date.
    pub fn assignment_for(&self, employee_id: &str, date: NaiveDate) -> Option<&ShiftAssignment> {
        self.entry_for(employee_id, date).filter(|a| a.is_committed())
    }

    /// Any entry (committed or provisional) occupying the slot.
    pub fn entry_for(&self, employee_id: &str, date: NaiveDate) -> Option<&ShiftAssignment> {
        self.entries.iter().find(|a| a.occupies(employee_id, date))
    }

    /// Committed assignments in the week starting at `week_start`.
    pub fn assignments_in_week(&self, week_start: NaiveDate) -> Vec<&ShiftAssignment> {
        self.in_week(week_start).filter(|a| a.is_committed()).collect()
    }

    /// Pending suggestions in the week starting at `week_start`.
    pub fn suggestions_in_week(&self, week_start: NaiveDate) -> Vec<&ShiftAssignment> {
        self.in_week(week_start).filter(|a| a.provisional).collect()
    }

    /// Number of entries of either kind in a week.
    pub fn entry_count_in_week(&self, week_start: NaiveDate) -> usize {
        self.in_week(week_start).count()
    }

    /// Places an employee on a shift.
    ///
    /// If the (employee, date) slot is occupied, its template and area are
    /// replaced in place and the entry keeps its identifier; a provisional
    /// entry becomes committed. Otherwise a new assignment is created.
    /// The week is marked dirty either way.
    pub fn upsert_assignment(&mut self, placement: Placement) -> ShiftAssignment {
        let week_date = placement.date;
        let result = match self.slot_index(&placement.employee_id, placement.date) {
            Some(pos) => {
                let entry = &mut self.entries[pos];
                let was_provisional = entry.provisional;
                entry.template_id = placement.template_id;
                entry.area_id = placement.area_id;
                if !placement.department.is_empty() {
                    entry.department = placement.department;
                }
                entry.origin = placement.origin;
                entry.provisional = false;

                let updated = entry.clone();
                debug!(
                    id = %updated.id,
                    employee = %updated.employee_id,
                    date = %updated.date,
                    template = %updated.template_id,
                    accepted = was_provisional,
                    "assignment replaced in place"
                );
                // Suggestions were never persisted, so accepting one is a create.
                self.intents.push(if was_provisional {
                    AssignmentIntent::Create(updated.clone())
                } else {
                    AssignmentIntent::Update(updated.clone())
                });
                updated
            }
            None => {
                let created = self.build_entry(placement);
                debug!(
                    id = %created.id,
                    employee = %created.employee_id,
                    date = %created.date,
                    template = %created.template_id,
                    "assignment created"
                );
                self.entries.push(created.clone());
                self.intents.push(AssignmentIntent::Create(created.clone()));
                created
            }
        };
        self.lifecycle.mark_dirty(&self.business_unit, week_date);
        result
    }

    /// Removes an entry. Unknown identifiers are reported, not fatal.
    pub fn delete_assignment(&mut self, id: &str) -> DeleteOutcome {
        let Some(pos) = self.entries.iter().position(|a| a.id == id) else {
            debug!(id, "delete requested for unknown assignment");
            return DeleteOutcome::NotFound;
        };
        let removed = self.entries.remove(pos);
        if removed.is_committed() {
            self.intents.push(AssignmentIntent::Delete {
                id: removed.id.clone(),
            });
        }
        self.lifecycle.mark_dirty(&self.business_unit, removed.date);
        debug!(id, employee = %removed.employee_id, date = %removed.date, "assignment deleted");
        DeleteOutcome::Deleted(removed)
    }

    /// Adds a provisional entry if the slot is free.
    ///
    /// Suggestions do not mark the week dirty and produce no intent until
    /// accepted. Returns `None` when the slot is already occupied.
    pub fn stage_suggestion(&mut self, placement: Placement) -> Option<ShiftAssignment> {
        if self.slot_index(&placement.employee_id, placement.date).is_some() {
            return None;
        }
        let entry = self.build_entry(placement).as_provisional();
        self.entries.push(entry.clone());
        Some(entry)
    }

    /// Drops pending suggestions of a week. Returns how many were removed.
    pub fn discard_suggestions(&mut self, week_start: NaiveDate) -> usize {
        let week_start = start_of_week(week_start);
        let before = self.entries.len();
        self.entries
            .retain(|a| !(a.provisional && start_of_week(a.date) == week_start));
        before - self.entries.len()
    }

    /// First approved leave of the employee containing `date`.
    pub fn leave_covering(&self, employee_id: &str, date: NaiveDate) -> Option<&LeaveInterval> {
        self.leaves.iter().find(|l| l.blocks(employee_id, date))
    }

    /// All leave intervals.
    pub fn leaves(&self) -> &[LeaveInterval] {
        &self.leaves
    }

    pub fn lifecycle(&self) -> &PublishLifecycle {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut PublishLifecycle {
        &mut self.lifecycle
    }

    /// Intents recorded since the last drain.
    pub fn pending_intents(&self) -> &[AssignmentIntent] {
        &self.intents
    }

    /// Hands recorded intents to the caller and clears them.
    pub fn drain_intents(&mut self) -> Vec<AssignmentIntent> {
        std::mem::take(&mut self.intents)
    }

    fn in_week(&self, week_start: NaiveDate) -> impl Iterator<Item = &ShiftAssignment> {
        let week_start = start_of_week(week_start);
        self.entries
            .iter()
            .filter(move |a| start_of_week(a.date) == week_start)
    }

    fn slot_index(&self, employee_id: &str, date: NaiveDate) -> Option<usize> {
        self.entries.iter().position(|a| a.occupies(employee_id, date))
    }

    fn build_entry(&self, placement: Placement) -> ShiftAssignment {
        let mut entry = ShiftAssignment::new(
            placement.employee_id,
            placement.template_id,
            placement.date,
            self.business_unit.clone(),
        )
        .with_department(placement.department)
        .with_origin(placement.origin);
        entry.area_id = placement.area_id;
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeaveStatus;
    use crate::schedule::WeekStatus;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_upsert_creates() {
        let mut state = ScheduleState::new("BU1");
        let a = state.upsert_assignment(Placement::new("E1", date(10), "T1").with_area("BAR"));
        assert_eq!(a.business_unit, "BU1");
        assert_eq!(a.area_id.as_deref(), Some("BAR"));
        assert_eq!(state.assignments_on(date(10)).len(), 1);
        assert_eq!(state.assignment_for("E1", date(10)).unwrap().id, a.id);
        assert!(matches!(state.pending_intents()[0], AssignmentIntent::Create(_)));
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut state = ScheduleState::new("BU1");
        let first = state.upsert_assignment(Placement::new("E1", date(10), "TA"));
        let second = state.upsert_assignment(Placement::new("E1", date(10), "TB"));

        assert_eq!(first.id, second.id);
        assert_eq!(state.entries().len(), 1);
        assert_eq!(state.assignment_for("E1", date(10)).unwrap().template_id, "TB");
        assert!(matches!(state.pending_intents()[1], AssignmentIntent::Update(_)));
    }

    #[test]
    fn test_upsert_marks_week_dirty() {
        let mut state = ScheduleState::new("BU1");
        assert_eq!(state.lifecycle().status("BU1", date(12)), WeekStatus::Published);
        state.upsert_assignment(Placement::new("E1", date(12), "T1"));
        assert_eq!(state.lifecycle().status("BU1", date(10)), WeekStatus::Dirty);
        assert_eq!(state.lifecycle().status("BU1", date(17)), WeekStatus::Published);
    }

    #[test]
    fn test_delete() {
        let mut state = ScheduleState::new("BU1");
        let a = state.upsert_assignment(Placement::new("E1", date(10), "T1"));
        state.drain_intents();

        let outcome = state.delete_assignment(&a.id);
        assert!(outcome.is_deleted());
        assert!(state.entries().is_empty());
        assert_eq!(
            state.drain_intents(),
            vec![AssignmentIntent::Delete { id: a.id.clone() }]
        );

        assert_eq!(state.delete_assignment(&a.id), DeleteOutcome::NotFound);
        assert!(state.pending_intents().is_empty());
    }

    #[test]
    fn test_suggestion_lifecycle() {
        let mut state = ScheduleState::new("BU1");
        let s = state.stage_suggestion(Placement::new("E1", date(11), "T1")).unwrap();
        assert!(s.provisional);
        assert!(state.assignment_for("E1", date(11)).is_none());
        assert!(state.entry_for("E1", date(11)).is_some());
        assert!(state.pending_intents().is_empty());
        assert_eq!(state.lifecycle().status("BU1", date(11)), WeekStatus::Published);

        // Occupied slot refuses a second suggestion.
        assert!(state.stage_suggestion(Placement::new("E1", date(11), "T2")).is_none());

        let accepted = state.upsert_assignment(Placement::from_assignment(&s));
        assert_eq!(accepted.id, s.id);
        assert!(accepted.is_committed());
        assert!(matches!(state.pending_intents()[0], AssignmentIntent::Create(_)));
    }

    #[test]
    fn test_discard_suggestions() {
        let mut state = ScheduleState::new("BU1");
        state.stage_suggestion(Placement::new("E1", date(11), "T1"));
        state.stage_suggestion(Placement::new("E2", date(18), "T1"));
        state.upsert_assignment(Placement::new("E3", date(11), "T1"));

        assert_eq!(state.discard_suggestions(date(10)), 1);
        assert_eq!(state.entries().len(), 2);
        assert_eq!(state.suggestions_in_week(date(17)).len(), 1);
    }

    #[test]
    fn test_restore_deduplicates() {
        let mut state = ScheduleState::new("BU1");
        let dropped = state.restore(vec![
            ShiftAssignment::new("E1", "T1", date(10), "BU1").with_id("A1"),
            ShiftAssignment::new("E1", "T2", date(10), "BU1").with_id("A2"),
            ShiftAssignment::new("E2", "T1", date(10), "BU2").with_id("A3"),
        ]);
        assert_eq!(dropped, 2);
        assert_eq!(state.entries().len(), 1);
        assert_eq!(state.entries()[0].id, "A2");
        assert_eq!(state.lifecycle().status("BU1", date(10)), WeekStatus::Published);
        assert!(state.pending_intents().is_empty());
    }

    #[test]
    fn test_leave_covering() {
        let state = ScheduleState::new("BU1").with_leaves(vec![
            LeaveInterval::new("E1", date(10), date(14), LeaveStatus::Pending).unwrap(),
            LeaveInterval::approved("E1", date(12), date(13)).unwrap(),
        ]);
        assert!(state.leave_covering("E1", date(10)).is_none());
        let leave = state.leave_covering("E1", date(13)).unwrap();
        assert_eq!(leave.start, date(12));
        assert!(state.leave_covering("E2", date(13)).is_none());
    }

    #[test]
    fn test_week_queries() {
        let mut state = ScheduleState::new("BU1");
        state.upsert_assignment(Placement::new("E1", date(10), "T1"));
        state.upsert_assignment(Placement::new("E1", date(16), "T1"));
        state.upsert_assignment(Placement::new("E1", date(17), "T1"));
        state.stage_suggestion(Placement::new("E2", date(12), "T1"));

        assert_eq!(state.assignments_in_week(date(10)).len(), 2);
        assert_eq!(state.assignments_in_week(date(13)).len(), 2); // normalized
        assert_eq!(state.entry_count_in_week(date(10)), 3);
        assert_eq!(state.assignments_in_week(date(17)).len(), 1);
    }

    #[test]
    fn test_one_entry_per_employee_day_randomized() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut state = ScheduleState::new("BU1");
        let employees = ["E1", "E2", "E3", "E4"];
        let templates = ["T1", "T2", "T3"];

        for _ in 0..500 {
            let employee = employees[rng.random_range(0..employees.len())];
            let day = date(10 + rng.random_range(0..14));
            let template = templates[rng.random_range(0..templates.len())];
            match rng.random_range(0..4) {
                0 => {
                    state.stage_suggestion(Placement::new(employee, day, template));
                }
                1 => {
                    let id = state.entry_for(employee, day).map(|a| a.id.clone());
                    if let Some(id) = id {
                        state.delete_assignment(&id);
                    }
                }
                _ => {
                    state.upsert_assignment(Placement::new(employee, day, template));
                }
            }
        }

        for (i, a) in state.entries().iter().enumerate() {
            for b in &state.entries()[i + 1..] {
                assert!(!b.occupies(&a.employee_id, a.date));
            }
        }
    }
}
