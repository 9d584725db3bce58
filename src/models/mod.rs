//! Workforce scheduling domain models.
//!
//! Reference data (employees, shift templates, areas, requirements, leave,
//! operating hours) is read-only for a scheduling pass. Assignments are the
//! only mutable entities and live in [`ScheduleState`](crate::schedule::ScheduleState).
//!
//! # Domain Mappings
//!
//! | u-workforce | Hospitality | Healthcare | Retail |
//! |-------------|-------------|------------|--------|
//! | ServiceArea | Bar, Reception | Ward | Checkout |
//! | Role | Bartender | Nurse | Cashier |
//! | DayType | Weekend rush | Surgery day | Sale day |
//! | ShiftTemplate | Evening shift | Night rotation | Opening shift |

mod area;
mod assignment;
pub mod calendar;
mod day_type;
mod employee;
mod hours;
mod leave;
mod shift;

pub use area::{ServiceArea, StaffingRequirement};
pub use assignment::{AssignmentOrigin, ShiftAssignment};
pub use calendar::{dates_between, in_week, shift_days, start_of_week, week_dates, ShiftWindow};
pub use day_type::{DayType, DayTypePolicy, FnPolicy, HolidayCalendar, WeekdayTiers};
pub use employee::{Employee, EmploymentStatus};
pub use hours::OperatingHours;
pub use leave::{LeaveInterval, LeaveStatus};
pub use shift::{ShiftKind, ShiftTemplate};
