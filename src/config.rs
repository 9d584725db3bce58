//! Engine configuration loaded from TOML.
//!
//! ```toml
//! known_roles = ["Bartender", "Host"]
//!
//! [day_types]
//! friday = "peak"
//! saturday = "super-peak"
//! sunday = "peak"
//!
//! [[holidays]]
//! date = "2024-12-25"
//! day_type = "super-peak"
//!
//! [hours]
//! monday = "00:00-00:00"   # closed
//! tuesday = "09:00-22:00"
//! saturday = "10:00-02:00" # closes after midnight
//! ```
//!
//! Missing weekdays in `[day_types]` keep the default tier. Missing or
//! equal-time entries in `[hours]` mean closed.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SchedulingError};
use crate::models::{DayType, HolidayCalendar, OperatingHours, WeekdayTiers};
use crate::validation::{ValidationError, ValidationErrorKind};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Day-type tier per weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayTypeTable {
    pub monday: DayType,
    pub tuesday: DayType,
    pub wednesday: DayType,
    pub thursday: DayType,
    pub friday: DayType,
    pub saturday: DayType,
    pub sunday: DayType,
}

impl Default for DayTypeTable {
    fn default() -> Self {
        Self {
            monday: DayType::OffPeak,
            tuesday: DayType::OffPeak,
            wednesday: DayType::OffPeak,
            thursday: DayType::OffPeak,
            friday: DayType::Peak,
            saturday: DayType::SuperPeak,
            sunday: DayType::Peak,
        }
    }
}

impl DayTypeTable {
    fn tiers(&self) -> [DayType; 7] {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
    }
}

/// A date forced into a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayOverride {
    pub date: NaiveDate,
    pub day_type: DayType,
}

/// Opening span per weekday as `"HH:MM-HH:MM"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoursTable {
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
    pub friday: Option<String>,
    pub saturday: Option<String>,
    pub sunday: Option<String>,
}

impl HoursTable {
    fn spans(&self) -> [Option<&str>; 7] {
        [
            self.monday.as_deref(),
            self.tuesday.as_deref(),
            self.wednesday.as_deref(),
            self.thursday.as_deref(),
            self.friday.as_deref(),
            self.saturday.as_deref(),
            self.sunday.as_deref(),
        ]
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Weekday tier table.
    pub day_types: DayTypeTable,
    /// Dated tier overrides.
    pub holidays: Vec<HolidayOverride>,
    /// Operating hours.
    pub hours: HoursTable,
    /// Role labels accepted in staffing requirements. Empty disables the check.
    pub known_roles: Vec<String>,
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        debug!(
            holidays = config.holidays.len(),
            known_roles = config.known_roles.len(),
            "engine configuration parsed"
        );
        Ok(config)
    }

    /// Day-type policy: weekday table plus holiday overrides.
    pub fn policy(&self) -> HolidayCalendar<WeekdayTiers> {
        let weekdays = WEEK
            .iter()
            .zip(self.day_types.tiers())
            .fold(WeekdayTiers::uniform(DayType::OffPeak), |tiers, (day, tier)| {
                tiers.with(*day, tier)
            });
        self.holidays
            .iter()
            .fold(HolidayCalendar::new(weekdays), |calendar, h| {
                calendar.with_override(h.date, h.day_type)
            })
    }

    /// Operating hours.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidConfiguration`] listing every malformed span.
    pub fn operating_hours(&self) -> Result<OperatingHours> {
        let mut hours = OperatingHours::closed();
        let mut errors = Vec::new();

        for (day, span) in WEEK.iter().zip(self.hours.spans()) {
            let Some(text) = span else { continue };
            match OperatingHours::parse_span(text) {
                Some(Some(window)) => hours = hours.with_day(*day, window.start, window.end),
                Some(None) => {}
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::MalformedWindow,
                    format!("Operating hours for {day} are not a HH:MM-HH:MM span: '{text}'"),
                )),
            }
        }

        if errors.is_empty() {
            Ok(hours)
        } else {
            Err(SchedulingError::InvalidConfiguration(errors))
        }
    }

    /// Known roles, `None` when unrestricted.
    pub fn known_roles(&self) -> Option<std::collections::HashSet<String>> {
        (!self.known_roles.is_empty()).then(|| self.known_roles.iter().cloned().collect())
    }
}
