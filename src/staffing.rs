//! Staffing requirement index.
//!
//! A validated, read-only lookup from (service area, day type) to the
//! minimum headcounts of each role. The index is scoped to one business
//! unit and refuses to build from invalid configuration.
//!
//! # Role matching
//! Requirements name roles by free-text label and employees carry a free-text
//! position. The two vocabularies are matched by exact string equality.
//! Misspelled labels silently produce permanent gaps, so callers that own a
//! role catalogue should pass it to [`StaffingIndexBuilder::with_known_roles`]
//! to surface mismatches at load time.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{Result, SchedulingError};
use crate::models::{DayType, ServiceArea, StaffingRequirement};
use crate::validation::validate_staffing;

/// Validated staffing requirements of one business unit.
#[derive(Debug, Clone)]
pub struct StaffingIndex {
    business_unit: String,
    areas: Vec<ServiceArea>,
    /// Requirements grouped in area order, insertion order within an area.
    requirements: Vec<StaffingRequirement>,
}

/// Builder collecting index inputs before validation.
#[derive(Debug, Clone)]
pub struct StaffingIndexBuilder {
    business_unit: String,
    areas: Vec<ServiceArea>,
    requirements: Vec<StaffingRequirement>,
    known_roles: Option<HashSet<String>>,
}

impl StaffingIndexBuilder {
    /// Starts a builder for a business unit.
    pub fn new(business_unit: impl Into<String>) -> Self {
        Self {
            business_unit: business_unit.into(),
            areas: Vec::new(),
            requirements: Vec::new(),
            known_roles: None,
        }
    }

    /// Adds a service area.
    pub fn with_area(mut self, area: ServiceArea) -> Self {
        self.areas.push(area);
        self
    }

    /// Adds service areas.
    pub fn with_areas(mut self, areas: impl IntoIterator<Item = ServiceArea>) -> Self {
        self.areas.extend(areas);
        self
    }

    /// Adds a staffing requirement.
    pub fn with_requirement(mut self, requirement: StaffingRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Adds staffing requirements.
    pub fn with_requirements(
        mut self,
        requirements: impl IntoIterator<Item = StaffingRequirement>,
    ) -> Self {
        self.requirements.extend(requirements);
        self
    }

    /// Restricts requirement roles to a known catalogue.
    pub fn with_known_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    /// Validates the inputs and builds the index.
    pub fn build(self) -> Result<StaffingIndex> {
        validate_staffing(
            &self.business_unit,
            &self.areas,
            &self.requirements,
            self.known_roles.as_ref(),
        )
        .map_err(SchedulingError::InvalidConfiguration)?;

        // Only the business unit's own areas are kept; requirements already
        // point at them (validated above).
        let areas: Vec<ServiceArea> = self
            .areas
            .into_iter()
            .filter(|a| a.business_unit == self.business_unit)
            .collect();

        let mut requirements = Vec::with_capacity(self.requirements.len());
        for area in &areas {
            requirements.extend(
                self.requirements
                    .iter()
                    .filter(|r| r.area_id == area.id)
                    .cloned(),
            );
        }

        debug!(
            business_unit = %self.business_unit,
            areas = areas.len(),
            requirements = requirements.len(),
            "staffing index built"
        );

        Ok(StaffingIndex {
            business_unit: self.business_unit,
            areas,
            requirements,
        })
    }
}

impl StaffingIndex {
    /// Starts a builder.
    pub fn builder(business_unit: impl Into<String>) -> StaffingIndexBuilder {
        StaffingIndexBuilder::new(business_unit)
    }

    /// Validates and builds an index in one call.
    pub fn build(
        business_unit: impl Into<String>,
        areas: Vec<ServiceArea>,
        requirements: Vec<StaffingRequirement>,
    ) -> Result<Self> {
        StaffingIndexBuilder::new(business_unit)
            .with_areas(areas)
            .with_requirements(requirements)
            .build()
    }

    /// An index with no areas and no requirements.
    pub fn empty(business_unit: impl Into<String>) -> Self {
        Self {
            business_unit: business_unit.into(),
            areas: Vec::new(),
            requirements: Vec::new(),
        }
    }

    /// Business unit this index is scoped to.
    pub fn business_unit(&self) -> &str {
        &self.business_unit
    }

    /// Service areas in configuration order.
    pub fn areas(&self) -> &[ServiceArea] {
        &self.areas
    }

    /// Looks up an area.
    pub fn area(&self, area_id: &str) -> Option<&ServiceArea> {
        self.areas.iter().find(|a| a.id == area_id)
    }

    /// All requirements, area-major.
    pub fn requirements(&self) -> &[StaffingRequirement] {
        &self.requirements
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Requirements of one area on one tier. May be empty.
    pub fn requirements_for(&self, area_id: &str, day_type: DayType) -> Vec<&StaffingRequirement> {
        self.requirements
            .iter()
            .filter(|r| r.area_id == area_id && r.day_type == day_type)
            .collect()
    }

    /// Requirements of every area on one tier, in index order.
    pub fn requirements_on(&self, day_type: DayType) -> impl Iterator<Item = &StaffingRequirement> {
        self.requirements.iter().filter(move |r| r.day_type == day_type)
    }

    /// Areas whose requirements mention `role`, in area order.
    pub fn areas_for_role(&self, role: &str) -> Vec<&ServiceArea> {
        self.areas
            .iter()
            .filter(|a| {
                self.requirements
                    .iter()
                    .any(|r| r.area_id == a.id && r.role == role)
            })
            .collect()
    }

    /// Area an employee of `role` is assumed to work in when an assignment
    /// names none: the first area requiring that role.
    ///
    /// This is a many-to-one simplification for grouping views. A role that
    /// serves several areas is always attributed to the first one.
    pub fn infer_area_for_role(&self, role: &str) -> Option<&ServiceArea> {
        self.areas_for_role(role).into_iter().next()
    }

    /// Distinct role labels in requirement order.
    pub fn roles(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.requirements
            .iter()
            .map(|r| r.role.as_str())
            .filter(|role| seen.insert(*role))
            .collect()
    }
}
