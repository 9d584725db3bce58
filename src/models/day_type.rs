//! Day-type tiers and classification policies.
//!
//! Every calendar date belongs to exactly one [`DayType`]. Which tier a date
//! falls into is business policy, so classification goes through the
//! [`DayTypePolicy`] trait; gap analysis never hard-codes a weekday pattern.
//!
//! # Default policy
//!
//! | Weekday | Tier |
//! |---------|------|
//! | Mon–Thu | OffPeak |
//! | Fri, Sun | Peak |
//! | Sat | SuperPeak |

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Demand tier of a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayType {
    /// Regular, low-demand day.
    OffPeak,
    /// Busy day.
    Peak,
    /// Busiest day of the week.
    SuperPeak,
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::OffPeak => "off-peak",
            Self::Peak => "peak",
            Self::SuperPeak => "super-peak",
        };
        f.write_str(label)
    }
}

/// Classifies dates into day-type tiers.
///
/// Implementations must be deterministic: the same date always yields the
/// same tier for the lifetime of the policy.
pub trait DayTypePolicy: Send + Sync + Debug {
    /// Returns the tier of `date`.
    fn classify(&self, date: NaiveDate) -> DayType;
}

/// Weekday → tier lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayTiers {
    tiers: [DayType; 7],
}

impl WeekdayTiers {
    /// Every weekday gets the same tier.
    pub fn uniform(tier: DayType) -> Self {
        Self { tiers: [tier; 7] }
    }

    /// Overrides the tier of one weekday.
    pub fn with(mut self, weekday: Weekday, tier: DayType) -> Self {
        self.tiers[weekday.num_days_from_monday() as usize] = tier;
        self
    }

    /// Tier assigned to a weekday.
    pub fn tier_of(&self, weekday: Weekday) -> DayType {
        self.tiers[weekday.num_days_from_monday() as usize]
    }
}

impl Default for WeekdayTiers {
    fn default() -> Self {
        Self::uniform(DayType::OffPeak)
            .with(Weekday::Fri, DayType::Peak)
            .with(Weekday::Sat, DayType::SuperPeak)
            .with(Weekday::Sun, DayType::Peak)
    }
}

impl DayTypePolicy for WeekdayTiers {
    fn classify(&self, date: NaiveDate) -> DayType {
        self.tier_of(date.weekday())
    }
}

/// Date-specific overrides (holidays, events) layered on a base policy.
#[derive(Debug, Clone)]
pub struct HolidayCalendar<P> {
    base: P,
    overrides: BTreeMap<NaiveDate, DayType>,
}

impl<P: DayTypePolicy> HolidayCalendar<P> {
    /// Wraps a base policy with no overrides.
    pub fn new(base: P) -> Self {
        Self {
            base,
            overrides: BTreeMap::new(),
        }
    }

    /// Forces `date` into `tier` regardless of its weekday.
    pub fn with_override(mut self, date: NaiveDate, tier: DayType) -> Self {
        self.overrides.insert(date, tier);
        self
    }

    /// Number of dated overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl<P: DayTypePolicy> DayTypePolicy for HolidayCalendar<P> {
    fn classify(&self, date: NaiveDate) -> DayType {
        self.overrides
            .get(&date)
            .copied()
            .unwrap_or_else(|| self.base.classify(date))
    }
}

/// Adapts a plain function into a policy.
///
/// ```
/// use chrono::NaiveDate;
/// use u_workforce::models::{DayType, DayTypePolicy, FnPolicy};
///
/// let always_peak = FnPolicy::new(|_date: NaiveDate| DayType::Peak);
/// let d = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
/// assert_eq!(always_peak.classify(d), DayType::Peak);
/// ```
pub struct FnPolicy<F>(F);

impl<F> FnPolicy<F>
where
    F: Fn(NaiveDate) -> DayType + Send + Sync,
{
    /// Wraps a classification function.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Debug for FnPolicy<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnPolicy")
    }
}

impl<F> DayTypePolicy for FnPolicy<F>
where
    F: Fn(NaiveDate) -> DayType + Send + Sync,
{
    fn classify(&self, date: NaiveDate) -> DayType {
        (self.0)(date)
    }
}
