//! Configuration validation for staffing data.
//!
//! Checks the structural integrity of service areas, staffing requirements,
//! and shift templates before any gap analysis runs. Detects:
//! - Duplicate IDs
//! - Requirements pointing at unknown areas or areas of another business unit
//! - Negative minimum headcounts
//! - Zero-length time windows
//! - Empty or (optionally) unknown role labels
//! - Two requirements for the same (area, role, tier)
//! - Flexible templates with impossible minimums
//!
//! All problems are collected; validation never stops at the first one.

use std::collections::HashSet;

use crate::models::{ServiceArea, ShiftKind, ShiftTemplate, StaffingRequirement};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A requirement references an area that doesn't exist.
    UnknownArea,
    /// A requirement's area belongs to a different business unit.
    ForeignBusinessUnit,
    /// A requirement's role label is not in the known-role list.
    UnknownRole,
    /// A requirement has an empty role label.
    EmptyRole,
    /// A requirement asks for a negative headcount.
    NegativeCount,
    /// A time window starts and ends at the same instant.
    MalformedWindow,
    /// Two requirements share (area, role, day type).
    DuplicateRequirement,
    /// A shift template is internally inconsistent.
    InvalidTemplate,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the staffing configuration of one business unit.
///
/// Checks:
/// 1. No duplicate area IDs
/// 2. No duplicate requirement IDs
/// 3. Every requirement's area exists and belongs to `business_unit`
/// 4. Role labels are non-empty (and known, when `known_roles` is given)
/// 5. Minimum headcounts are not negative
/// 6. Requirement windows are not zero-length
/// 7. No two requirements share (area, role, day type)
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_staffing(
    business_unit: &str,
    areas: &[ServiceArea],
    requirements: &[StaffingRequirement],
    known_roles: Option<&HashSet<String>>,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut area_ids = HashSet::new();
    for area in areas {
        if !area_ids.insert(area.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate area ID: {}", area.id),
            ));
        }
    }

    let mut requirement_ids = HashSet::new();
    let mut requirement_keys = HashSet::new();

    for req in requirements {
        if !requirement_ids.insert(req.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate requirement ID: {}", req.id),
            ));
        }

        match areas.iter().find(|a| a.id == req.area_id) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownArea,
                format!("Requirement '{}' references unknown area '{}'", req.id, req.area_id),
            )),
            Some(area) if area.business_unit != business_unit => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ForeignBusinessUnit,
                    format!(
                        "Requirement '{}' targets area '{}' of business unit '{}', expected '{}'",
                        req.id, area.id, area.business_unit, business_unit
                    ),
                ))
            }
            Some(_) => {}
        }

        if req.role.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyRole,
                format!("Requirement '{}' has an empty role", req.id),
            ));
        } else if let Some(roles) = known_roles {
            if !roles.contains(&req.role) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownRole,
                    format!("Requirement '{}' references unknown role '{}'", req.id, req.role),
                ));
            }
        }

        if req.min_count < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeCount,
                format!("Requirement '{}' has negative minimum {}", req.id, req.min_count),
            ));
        }

        if let Some(window) = &req.window {
            if !window.is_well_formed() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MalformedWindow,
                    format!("Requirement '{}' has zero-length window {}", req.id, window),
                ));
            }
        }

        if !requirement_keys.insert((req.area_id.as_str(), req.role.as_str(), req.day_type)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateRequirement,
                format!(
                    "Requirement '{}' repeats role '{}' in area '{}' on {} days",
                    req.id, req.role, req.area_id, req.day_type
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates shift templates.
///
/// Checks:
/// 1. No duplicate template IDs
/// 2. Fixed windows are not zero-length
/// 3. Flexible minimums are within a day / a week
pub fn validate_templates(templates: &[ShiftTemplate]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for template in templates {
        if !ids.insert(template.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate template ID: {}", template.id),
            ));
        }

        match &template.kind {
            ShiftKind::Fixed(window) if !window.is_well_formed() => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MalformedWindow,
                    format!("Template '{}' has zero-length window {}", template.id, window),
                ));
            }
            ShiftKind::Flexible {
                min_hours_per_day,
                min_days_per_week,
            } => {
                if !(*min_hours_per_day > 0.0 && *min_hours_per_day <= 24.0) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidTemplate,
                        format!(
                            "Template '{}' requires {} hours per day",
                            template.id, min_hours_per_day
                        ),
                    ));
                }
                if *min_days_per_week == 0 || *min_days_per_week > 7 {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidTemplate,
                        format!(
                            "Template '{}' requires {} days per week",
                            template.id, min_days_per_week
                        ),
                    ));
                }
            }
            ShiftKind::Fixed(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
