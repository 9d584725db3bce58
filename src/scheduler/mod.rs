//! Auto-assignment and staffing KPIs.
//!
//! # Algorithm
//!
//! [`AutoAssigner`] fills staffing gaps with a greedy, first-eligible
//! heuristic. It is not optimal, but it is fast, deterministic for a given
//! candidate order, and never double-books or schedules over leave.
//!
//! # KPI
//!
//! [`StaffingKpi`] summarizes required and missing headcount, fill rate,
//! and per-employee load for a week.

mod auto_fill;
mod kpi;

pub use auto_fill::{
    AutoAssigner, AutoFillReport, CandidatePool, NoFillReason, StagedAssignment, TemplateMatch,
};
pub use kpi::StaffingKpi;
