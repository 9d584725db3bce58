//! Leave intervals.
//!
//! Only approved leave blocks scheduling. Pending and rejected requests are
//! carried so callers can display them, but the engine ignores them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};

/// Approval state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// An inclusive date range during which an employee is off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveInterval {
    /// Employee on leave.
    pub employee_id: String,
    /// First day of leave (inclusive).
    pub start: NaiveDate,
    /// Last day of leave (inclusive).
    pub end: NaiveDate,
    /// Approval state.
    pub status: LeaveStatus,
}

impl LeaveInterval {
    /// Creates a leave interval. Fails when `start > end`.
    pub fn new(
        employee_id: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        status: LeaveStatus,
    ) -> Result<Self> {
        let employee_id = employee_id.into();
        if start > end {
            return Err(SchedulingError::InvalidLeave {
                employee_id,
                start,
                end,
            });
        }
        Ok(Self {
            employee_id,
            start,
            end,
            status,
        })
    }

    /// Creates an approved leave interval.
    pub fn approved(employee_id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(employee_id, start, end, LeaveStatus::Approved)
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whether this interval prevents `employee_id` from working on `date`.
    pub fn blocks(&self, employee_id: &str, date: NaiveDate) -> bool {
        self.status == LeaveStatus::Approved && self.employee_id == employee_id && self.contains(date)
    }

    /// Number of days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}
