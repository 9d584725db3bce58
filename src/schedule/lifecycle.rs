//! Draft/publish lifecycle.
//!
//! Each (business unit, week start) is either `Published` or `Dirty`.
//! Any committed mutation turns its week `Dirty`; only an explicit
//! [`publish`] turns it back. Weeks that were never touched are `Published`.
//!
//! The status is an editing cue for the current session, not a durable fact:
//! navigating to another week resets that week's indicator.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Placement, ScheduleState};
use crate::models::start_of_week;

/// Publication state of a week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekStatus {
    /// Matches what was last published.
    #[default]
    Published,
    /// Modified since the last publish.
    Dirty,
}

/// Status board keyed by (business unit, week start).
#[derive(Debug, Clone, Default)]
pub struct PublishLifecycle {
    statuses: HashMap<(String, NaiveDate), WeekStatus>,
}

impl PublishLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of the week containing `date`.
    pub fn status(&self, business_unit: &str, date: NaiveDate) -> WeekStatus {
        self.statuses
            .get(&(business_unit.to_string(), start_of_week(date)))
            .copied()
            .unwrap_or_default()
    }

    /// Marks the week containing `date` as modified.
    pub fn mark_dirty(&mut self, business_unit: &str, date: NaiveDate) {
        self.set(business_unit, date, WeekStatus::Dirty);
    }

    /// Marks the week containing `date` as published.
    pub fn mark_published(&mut self, business_unit: &str, date: NaiveDate) {
        self.set(business_unit, date, WeekStatus::Published);
    }

    /// Weeks of a business unit currently dirty, in date order.
    pub fn dirty_weeks(&self, business_unit: &str) -> Vec<NaiveDate> {
        let mut weeks: Vec<NaiveDate> = self
            .statuses
            .iter()
            .filter(|((bu, _), status)| bu == business_unit && **status == WeekStatus::Dirty)
            .map(|((_, week), _)| *week)
            .collect();
        weeks.sort();
        weeks
    }

    fn set(&mut self, business_unit: &str, date: NaiveDate, status: WeekStatus) {
        self.statuses
            .insert((business_unit.to_string(), start_of_week(date)), status);
    }
}

/// Result of publishing a week.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    /// Week that was published.
    pub week_start: NaiveDate,
    /// Pending suggestions that were force-committed.
    pub committed_suggestions: usize,
    /// Status before publishing.
    pub previous_status: WeekStatus,
}

/// Publishes a week: commits its pending suggestions, then marks it `Published`.
pub fn publish(state: &mut ScheduleState, week_start: NaiveDate) -> PublishReport {
    let week_start = start_of_week(week_start);
    let business_unit = state.business_unit().to_string();
    let previous_status = state.lifecycle().status(&business_unit, week_start);

    let pending: Vec<Placement> = state
        .suggestions_in_week(week_start)
        .into_iter()
        .map(Placement::from_assignment)
        .collect();
    let committed_suggestions = pending.len();
    for placement in pending {
        state.upsert_assignment(placement);
    }

    state.lifecycle_mut().mark_published(&business_unit, week_start);
    info!(
        business_unit = %business_unit,
        week = %week_start,
        committed_suggestions,
        "week published"
    );

    PublishReport {
        week_start,
        committed_suggestions,
        previous_status,
    }
}
