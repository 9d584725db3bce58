//! Workforce scheduling and staffing-gap engine.
//!
//! Maintains a week-oriented shift schedule per business unit, compares it
//! against day-type staffing requirements, reports the shortfalls, and fills
//! them with a greedy auto-assignment heuristic. Managers edit the schedule
//! through upserts and deletes, get last week's schedule proposed for an
//! empty week, and publish a week once it is final.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Employee`, `ShiftTemplate`, `ServiceArea`,
//!   `StaffingRequirement`, `ShiftAssignment`, `LeaveInterval`,
//!   `OperatingHours`, `DayType`, and week utilities
//! - **`validation`**: Configuration integrity checks (duplicate IDs, unknown
//!   areas, negative counts, malformed windows)
//! - **`staffing`**: Validated requirement index per business unit
//! - **`schedule`**: Mutable schedule state, change intents, publish lifecycle
//! - **`gaps`**: Gap analysis of a week
//! - **`coverage`**: Opening/closing coverage checks
//! - **`scheduler`**: Greedy auto-assignment and staffing KPIs
//! - **`carry_over`**: Previous-week suggestions and copies
//! - **`ports`**: Snapshot source and assignment sink interfaces
//! - **`session`**: Session facade and per-week session registry
//! - **`config`**: TOML engine configuration
//!
//! # Architecture
//!
//! The core is synchronous and performs no I/O. Reference data arrives as a
//! [`ports::ScheduleSnapshot`]; committed changes leave as
//! [`schedule::AssignmentIntent`]s for the persistence collaborator.
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Van den Bergh et al. (2013), "Personnel scheduling: A literature review"

pub mod carry_over;
pub mod config;
pub mod coverage;
pub mod error;
pub mod gaps;
pub mod models;
pub mod ports;
pub mod schedule;
pub mod scheduler;
pub mod session;
pub mod staffing;
pub mod validation;

pub use error::{Result, SchedulingError};
