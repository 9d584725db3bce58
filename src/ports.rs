//! Repository port interfaces.
//!
//! The engine reads its reference data and assignments through
//! [`SnapshotSource`] and hands committed changes to [`AssignmentSink`].
//! [`InMemoryRepository`] implements both for tests and embedding.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SchedulingError};
use crate::models::{
    shift_days, start_of_week, Employee, LeaveInterval, OperatingHours, ServiceArea,
    ShiftAssignment, ShiftTemplate, StaffingRequirement,
};
use crate::schedule::AssignmentIntent;

/// Everything a scheduling session needs for one business unit and week.
///
/// `assignments` covers the prior, current, and next week.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub business_unit: String,
    pub week_start: NaiveDate,
    pub employees: Vec<Employee>,
    pub templates: Vec<ShiftTemplate>,
    pub areas: Vec<ServiceArea>,
    pub requirements: Vec<StaffingRequirement>,
    pub assignments: Vec<ShiftAssignment>,
    pub leaves: Vec<LeaveInterval>,
    pub hours: OperatingHours,
}

impl ScheduleSnapshot {
    /// First date of the loaded assignment window.
    pub fn window_start(&self) -> NaiveDate {
        shift_days(start_of_week(self.week_start), -7)
    }

    /// Last date of the loaded assignment window.
    pub fn window_end(&self) -> NaiveDate {
        shift_days(start_of_week(self.week_start), 13)
    }
}

/// Trait for loading scheduling data.
pub trait SnapshotSource: Send + Sync {
    /// Loads the snapshot of a business unit around a week.
    fn load(&self, business_unit: &str, week_start: NaiveDate) -> Result<ScheduleSnapshot>;
}

/// Trait for persisting committed assignment changes.
pub trait AssignmentSink: Send + Sync {
    /// Applies intents in order. Returns how many were applied.
    fn apply(&self, intents: &[AssignmentIntent]) -> Result<usize>;
}

#[derive(Debug, Default)]
struct Store {
    employees: Vec<Employee>,
    templates: Vec<ShiftTemplate>,
    areas: Vec<ServiceArea>,
    requirements: Vec<StaffingRequirement>,
    assignments: Vec<ShiftAssignment>,
    leaves: Vec<LeaveInterval>,
    hours: HashMap<String, OperatingHours>,
}

/// Repository held in memory behind a mutex.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(self, employees: impl IntoIterator<Item = Employee>) -> Self {
        self.store.lock().employees.extend(employees);
        self
    }

    pub fn with_templates(self, templates: impl IntoIterator<Item = ShiftTemplate>) -> Self {
        self.store.lock().templates.extend(templates);
        self
    }

    pub fn with_areas(self, areas: impl IntoIterator<Item = ServiceArea>) -> Self {
        self.store.lock().areas.extend(areas);
        self
    }

    pub fn with_requirements(self, requirements: impl IntoIterator<Item = StaffingRequirement>) -> Self {
        self.store.lock().requirements.extend(requirements);
        self
    }

    pub fn with_assignments(self, assignments: impl IntoIterator<Item = ShiftAssignment>) -> Self {
        self.store.lock().assignments.extend(assignments);
        self
    }

    pub fn with_leaves(self, leaves: impl IntoIterator<Item = LeaveInterval>) -> Self {
        self.store.lock().leaves.extend(leaves);
        self
    }

    pub fn with_hours(self, business_unit: impl Into<String>, hours: OperatingHours) -> Self {
        self.store.lock().hours.insert(business_unit.into(), hours);
        self
    }

    /// Copy of every stored assignment.
    pub fn assignments(&self) -> Vec<ShiftAssignment> {
        self.store.lock().assignments.clone()
    }
}

impl SnapshotSource for InMemoryRepository {
    fn load(&self, business_unit: &str, week_start: NaiveDate) -> Result<ScheduleSnapshot> {
        let store = self.store.lock();
        let mut snapshot = ScheduleSnapshot {
            business_unit: business_unit.to_string(),
            week_start: start_of_week(week_start),
            ..ScheduleSnapshot::default()
        };
        let (from, to) = (snapshot.window_start(), snapshot.window_end());

        snapshot.employees = store
            .employees
            .iter()
            .filter(|e| e.business_unit == business_unit)
            .cloned()
            .collect();
        snapshot.templates = store
            .templates
            .iter()
            .filter(|t| t.business_unit == business_unit)
            .cloned()
            .collect();
        snapshot.areas = store
            .areas
            .iter()
            .filter(|a| a.business_unit == business_unit)
            .cloned()
            .collect();
        // Requirements on unknown areas stay in for validation to report.
        let foreign: HashSet<&str> = store
            .areas
            .iter()
            .filter(|a| a.business_unit != business_unit)
            .map(|a| a.id.as_str())
            .collect();
        snapshot.requirements = store
            .requirements
            .iter()
            .filter(|r| !foreign.contains(r.area_id.as_str()))
            .cloned()
            .collect();
        snapshot.assignments = store
            .assignments
            .iter()
            .filter(|a| a.business_unit == business_unit && a.date >= from && a.date <= to)
            .cloned()
            .collect();
        snapshot.leaves = store
            .leaves
            .iter()
            .filter(|l| snapshot.employees.iter().any(|e| e.id == l.employee_id))
            .filter(|l| l.start <= to && l.end >= from)
            .cloned()
            .collect();
        snapshot.hours = store.hours.get(business_unit).cloned().unwrap_or_default();

        debug!(
            business_unit,
            week = %snapshot.week_start,
            employees = snapshot.employees.len(),
            assignments = snapshot.assignments.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}

impl AssignmentSink for InMemoryRepository {
    /// Applies the batch atomically: on error the store is left unchanged.
    fn apply(&self, intents: &[AssignmentIntent]) -> Result<usize> {
        let mut store = self.store.lock();
        let mut staged = store.assignments.clone();
        for intent in intents {
            match intent {
                AssignmentIntent::Create(assignment) => {
                    if staged.iter().any(|a| a.id == assignment.id) {
                        return Err(SchedulingError::Repository(format!(
                            "assignment '{}' already exists",
                            assignment.id
                        )));
                    }
                    staged.push(assignment.clone());
                }
                AssignmentIntent::Update(assignment) => {
                    let existing = staged
                        .iter_mut()
                        .find(|a| a.id == assignment.id)
                        .ok_or_else(|| {
                            SchedulingError::Repository(format!(
                                "assignment '{}' does not exist",
                                assignment.id
                            ))
                        })?;
                    *existing = assignment.clone();
                }
                AssignmentIntent::Delete { id } => {
                    staged.retain(|a| &a.id != id);
                }
            }
        }
        store.assignments = staged;
        Ok(intents.len())
    }
}
