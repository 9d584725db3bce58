//! Shift template model.
//!
//! A template is either fixed (a concrete [`ShiftWindow`]) or flexible
//! (minimum hours per day and days per week, no fixed clock times).
//! The two modes are variants of [`ShiftKind`], so a template can never
//! define both.

use serde::{Deserialize, Serialize};

use super::ShiftWindow;

/// How a template constrains working time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShiftKind {
    /// Fixed start and end times.
    Fixed(ShiftWindow),
    /// Flexible hours with weekly minimums.
    Flexible {
        /// Minimum hours worked on each scheduled day.
        min_hours_per_day: f64,
        /// Minimum scheduled days per week.
        min_days_per_week: u8,
    },
}

/// A reusable shift definition owned by a business unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftTemplate {
    /// Unique template identifier.
    pub id: String,
    /// Display name (e.g., "Morning").
    pub name: String,
    /// Owning business unit.
    pub business_unit: String,
    /// Fixed window or flexible rules.
    pub kind: ShiftKind,
    /// Unpaid break length (minutes).
    pub break_minutes: u32,
    /// Tolerated lateness before a clock-in counts as late (minutes).
    pub grace_minutes: u32,
    /// Display color (e.g., "#3b82f6").
    pub color: String,
}

impl ShiftTemplate {
    /// Creates a fixed template.
    pub fn fixed(id: impl Into<String>, business_unit: impl Into<String>, window: ShiftWindow) -> Self {
        Self::with_kind(id, business_unit, ShiftKind::Fixed(window))
    }

    /// Creates a flexible template.
    pub fn flexible(
        id: impl Into<String>,
        business_unit: impl Into<String>,
        min_hours_per_day: f64,
        min_days_per_week: u8,
    ) -> Self {
        Self::with_kind(
            id,
            business_unit,
            ShiftKind::Flexible {
                min_hours_per_day,
                min_days_per_week,
            },
        )
    }

    fn with_kind(id: impl Into<String>, business_unit: impl Into<String>, kind: ShiftKind) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            business_unit: business_unit.into(),
            kind,
            break_minutes: 0,
            grace_minutes: 0,
            color: String::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the break length.
    pub fn with_break(mut self, minutes: u32) -> Self {
        self.break_minutes = minutes;
        self
    }

    /// Sets the grace period.
    pub fn with_grace(mut self, minutes: u32) -> Self {
        self.grace_minutes = minutes;
        self
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Fixed window, or `None` for flexible templates.
    pub fn window(&self) -> Option<&ShiftWindow> {
        match &self.kind {
            ShiftKind::Fixed(window) => Some(window),
            ShiftKind::Flexible { .. } => None,
        }
    }

    #[inline]
    pub fn is_flexible(&self) -> bool {
        matches!(self.kind, ShiftKind::Flexible { .. })
    }

    /// Whether the fixed window starts and ends exactly at `window`.
    pub fn matches_window(&self, window: &ShiftWindow) -> bool {
        self.window().is_some_and(|w| w.matches(window))
    }

    /// Paid minutes per occurrence: window length minus break.
    /// Flexible templates report their daily minimum.
    pub fn paid_minutes(&self) -> i64 {
        match &self.kind {
            ShiftKind::Fixed(w) => (w.duration_minutes() - i64::from(self.break_minutes)).max(0),
            ShiftKind::Flexible {
                min_hours_per_day, ..
            } => (min_hours_per_day * 60.0).round() as i64,
        }
    }
}
