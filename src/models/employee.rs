//! Employee reference data.
//!
//! Employees are owned by the HR directory; the engine only reads them.
//! The `role` label is the matching key against staffing requirements.

use serde::{Deserialize, Serialize};

/// Employment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentStatus {
    /// Currently employed and schedulable.
    #[default]
    Active,
    /// Left, suspended, or otherwise not schedulable.
    Inactive,
}

/// An employee that can be placed on shifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Position label (e.g., "Bartender"). Matched verbatim against requirements.
    pub role: String,
    /// Department, used to narrow candidate pools for scoped managers.
    pub department: String,
    /// Owning business unit.
    pub business_unit: String,
    /// Employment status.
    pub status: EmploymentStatus,
}

impl Employee {
    /// Creates an active employee.
    pub fn new(
        id: impl Into<String>,
        role: impl Into<String>,
        business_unit: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            role: role.into(),
            department: String::new(),
            business_unit: business_unit.into(),
            status: EmploymentStatus::Active,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Sets the employment status.
    pub fn with_status(mut self, status: EmploymentStatus) -> Self {
        self.status = status;
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == EmploymentStatus::Active
    }

    /// Exact role-label match.
    #[inline]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}
