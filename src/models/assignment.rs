//! Shift assignment model.
//!
//! An assignment places one employee on one shift template on one date.
//! Entries are either committed or provisional (carry-over suggestions
//! waiting for acceptance); both kinds occupy the (employee, date) slot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an assignment came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentOrigin {
    /// Placed by a person.
    Manual,
    /// Staged by the auto-assignment heuristic.
    AutoFill,
    /// Proposed from the prior week.
    CarryOver,
    /// Copied from the prior week by an explicit copy action.
    CopiedWeek,
}

/// An employee × date × shift template placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    /// Unique assignment identifier.
    pub id: String,
    /// Assigned employee.
    pub employee_id: String,
    /// Shift template worked.
    pub template_id: String,
    /// Calendar date of the shift start.
    pub date: NaiveDate,
    /// Service area, if the placement targets one.
    pub area_id: Option<String>,
    /// Owning business unit.
    pub business_unit: String,
    /// Employee department (denormalized for filtering).
    pub department: String,
    /// `true` while this entry is an unaccepted suggestion.
    pub provisional: bool,
    /// Where the entry came from.
    pub origin: AssignmentOrigin,
}

impl ShiftAssignment {
    /// Creates a committed assignment with a fresh identifier.
    pub fn new(
        employee_id: impl Into<String>,
        template_id: impl Into<String>,
        date: NaiveDate,
        business_unit: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.into(),
            template_id: template_id.into(),
            date,
            area_id: None,
            business_unit: business_unit.into(),
            department: String::new(),
            provisional: false,
            origin: AssignmentOrigin::Manual,
        }
    }

    /// Sets the identifier (when restoring persisted assignments).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the service area.
    pub fn with_area(mut self, area_id: impl Into<String>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }

    /// Sets the denormalized department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Sets the origin.
    pub fn with_origin(mut self, origin: AssignmentOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Marks the entry as an unaccepted suggestion.
    pub fn as_provisional(mut self) -> Self {
        self.provisional = true;
        self
    }

    /// Whether this entry occupies the given (employee, date) slot.
    #[inline]
    pub fn occupies(&self, employee_id: &str, date: NaiveDate) -> bool {
        self.employee_id == employee_id && self.date == date
    }

    #[inline]
    pub fn is_committed(&self) -> bool {
        !self.provisional
    }
}
