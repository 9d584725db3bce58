//! Service areas and staffing requirements.
//!
//! A [`ServiceArea`] is a physical or functional zone of a business unit
//! ("Reception", "Bar"). A [`StaffingRequirement`] says how many people
//! with a given role label an area needs on days of a given tier.

use serde::{Deserialize, Serialize};

use super::{DayType, ShiftWindow};

/// A zone of a business unit that needs staffing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceArea {
    /// Unique area identifier.
    pub id: String,
    /// Owning business unit.
    pub business_unit: String,
    /// Display name.
    pub name: String,
    /// Nominal capacity (guests, seats, beds).
    pub capacity: u32,
}

impl ServiceArea {
    /// Creates a new area.
    pub fn new(id: impl Into<String>, business_unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            business_unit: business_unit.into(),
            name: String::new(),
            capacity: 0,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the nominal capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Minimum headcount of one role in one area on one day-type tier.
///
/// `min_count` is signed so that bad input survives deserialization and
/// is reported by validation instead of failing opaquely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffingRequirement {
    /// Unique requirement identifier.
    pub id: String,
    /// Target area.
    pub area_id: String,
    /// Required role label.
    pub role: String,
    /// Tier this requirement applies to.
    pub day_type: DayType,
    /// Minimum headcount.
    pub min_count: i32,
    /// Canonical shift time for the requirement, if any.
    pub window: Option<ShiftWindow>,
}

impl StaffingRequirement {
    /// Creates a requirement without a time window.
    pub fn new(
        id: impl Into<String>,
        area_id: impl Into<String>,
        role: impl Into<String>,
        day_type: DayType,
        min_count: i32,
    ) -> Self {
        Self {
            id: id.into(),
            area_id: area_id.into(),
            role: role.into(),
            day_type,
            min_count,
            window: None,
        }
    }

    /// Sets the required time window.
    pub fn with_window(mut self, window: ShiftWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Minimum headcount clamped to zero.
    #[inline]
    pub fn required(&self) -> u32 {
        u32::try_from(self.min_count).unwrap_or(0)
    }
}
