//! Schedule state and its publish lifecycle.
//!
//! [`ScheduleState`] owns the assignments of one business unit for a
//! scheduling session. Every committed mutation goes through
//! [`ScheduleState::upsert_assignment`] or [`ScheduleState::delete_assignment`],
//! which keep the one-entry-per-employee-per-day invariant, mark the week
//! dirty, and record an [`AssignmentIntent`] for persistence.

mod intent;
mod lifecycle;
mod state;

pub use intent::AssignmentIntent;
pub use lifecycle::{publish, PublishLifecycle, PublishReport, WeekStatus};
pub use state::{DeleteOutcome, Placement, ScheduleState};
