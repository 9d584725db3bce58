//! Greedy gap-filling heuristic.
//!
//! # Algorithm
//!
//! 1. Process gaps in their emitted (date-major) order.
//! 2. For each gap, scan the candidate pool in order and take the first
//!    employee who has the gap's role, has no entry on the gap's date (in the
//!    schedule state or staged earlier in this run), and is not on approved
//!    leave that day. Repeat until the gap's missing headcount is staged or
//!    the pool is exhausted. Headcount is counted per (date, role), so
//!    placements staged for an earlier gap of the same role and date count
//!    toward later ones.
//! 3. Pick the template whose window matches the gap's shift time exactly;
//!    otherwise fall back to the first template of the business unit and
//!    flag the placement as [`TemplateMatch::Fallback`].
//! 4. Commit every staged placement through
//!    [`ScheduleState::upsert_assignment`] in one batch.
//!
//! The heuristic is single-pass and order-dependent. It never backtracks,
//! does not maximize the number of filled slots, and does not balance load
//! across employees. It never double-books and never schedules over leave.
//!
//! # Complexity
//! O(g * c) where g=gaps, c=candidates.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::gaps::Gap;
use crate::models::{AssignmentOrigin, Employee, ShiftAssignment, ShiftTemplate};
use crate::schedule::{Placement, ScheduleState};
use crate::staffing::StaffingIndex;

/// Ordered set of employees eligible for auto-assignment.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool<'a> {
    employees: Vec<&'a Employee>,
}

impl<'a> CandidatePool<'a> {
    /// Active employees of a business unit, in roster order.
    pub fn business_unit(employees: &'a [Employee], business_unit: &str) -> Self {
        Self {
            employees: employees
                .iter()
                .filter(|e| e.is_active() && e.business_unit == business_unit)
                .collect(),
        }
    }

    /// Explicit pool, used as given.
    pub fn from_employees(employees: impl IntoIterator<Item = &'a Employee>) -> Self {
        Self {
            employees: employees.into_iter().collect(),
        }
    }

    /// Narrows the pool to one department (scoped managers).
    pub fn with_department(mut self, department: &str) -> Self {
        self.employees.retain(|e| e.department == department);
        self
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Employee> + '_ {
        self.employees.iter().copied()
    }
}

/// How well the chosen template matches the gap's shift time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateMatch {
    /// Start and end equal the requirement's window.
    Exact,
    /// The requirement has no window; any template satisfies it.
    Unconstrained,
    /// No template matches the window; an arbitrary one was used.
    Fallback,
}

/// Why an auto-fill run placed nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoFillReason {
    /// The business unit has no staffing requirements.
    NoRequirements,
    /// Every requirement is already met.
    NoOpenGaps,
    /// The business unit has no shift templates to assign.
    NoShiftTemplates,
    /// Nobody with a matching role is free on the gap dates.
    NoEligibleCandidates,
}

impl std::fmt::Display for NoFillReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NoRequirements => "no staffing requirements are configured for this business unit",
            Self::NoOpenGaps => "all staffing requirements are already met",
            Self::NoShiftTemplates => "no shift templates are available for this business unit",
            Self::NoEligibleCandidates => {
                "no available employee with a matching role was found for the open gaps"
            }
        };
        f.write_str(text)
    }
}

/// A placement made by the heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedAssignment {
    /// Requirement whose gap this placement closes.
    pub requirement_id: String,
    /// Committed assignment.
    pub assignment: ShiftAssignment,
    /// Template confidence.
    pub template_match: TemplateMatch,
}

/// Result of an auto-fill run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFillReport {
    /// Number of placements committed.
    pub filled_count: usize,
    /// Committed placements in staging order.
    pub assignments: Vec<StagedAssignment>,
    /// Gaps that remain open, with their remaining missing headcount.
    pub unfilled: Vec<Gap>,
    /// Set when `filled_count` is zero.
    pub reason: Option<NoFillReason>,
}

impl AutoFillReport {
    /// Placements made with a non-matching template.
    pub fn fallbacks(&self) -> impl Iterator<Item = &StagedAssignment> {
        self.assignments
            .iter()
            .filter(|s| s.template_match == TemplateMatch::Fallback)
    }
}

#[derive(Debug, Clone)]
struct Staged<'a> {
    gap: &'a Gap,
    employee: &'a Employee,
    template: &'a ShiftTemplate,
    template_match: TemplateMatch,
}

/// Greedy auto-assignment over a staffing index and its templates.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_workforce::gaps::GapAnalyzer;
/// use u_workforce::models::*;
/// use u_workforce::schedule::ScheduleState;
/// use u_workforce::scheduler::{AutoAssigner, CandidatePool};
/// use u_workforce::staffing::StaffingIndex;
///
/// let index = StaffingIndex::build(
///     "BU1",
///     vec![ServiceArea::new("BAR", "BU1")],
///     vec![StaffingRequirement::new("R1", "BAR", "Bartender", DayType::SuperPeak, 1)],
/// ).unwrap();
/// let templates = vec![ShiftTemplate::fixed("EVE", "BU1", ShiftWindow::from_hm(18, 0, 2, 0).unwrap())];
/// let employees = vec![Employee::new("E1", "Bartender", "BU1")];
/// let mut state = ScheduleState::new("BU1");
///
/// let policy = WeekdayTiers::default();
/// let week = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
/// let report = GapAnalyzer::new(&index, &policy).analyze_week(week, &state, &employees);
///
/// let pool = CandidatePool::business_unit(&employees, "BU1");
/// let filled = AutoAssigner::new(&index, &templates).run(&report.gaps, &pool, &mut state);
/// assert_eq!(filled.filled_count, 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AutoAssigner<'a> {
    index: &'a StaffingIndex,
    templates: &'a [ShiftTemplate],
}

impl<'a> AutoAssigner<'a> {
    pub fn new(index: &'a StaffingIndex, templates: &'a [ShiftTemplate]) -> Self {
        Self { index, templates }
    }

    /// Stages placements for `gaps`, commits them to `state`, and reports.
    pub fn run(
        &self,
        gaps: &[Gap],
        pool: &CandidatePool<'_>,
        state: &mut ScheduleState,
    ) -> AutoFillReport {
        let (staged, unfilled) = self.plan(gaps, pool, state);

        let assignments: Vec<StagedAssignment> = staged
            .into_iter()
            .map(|s| {
                if s.template_match == TemplateMatch::Fallback {
                    warn!(
                        employee = %s.employee.id,
                        date = %s.gap.date,
                        template = %s.template.id,
                        "no template matches the required shift time; using fallback"
                    );
                }
                let placement = Placement::for_employee(s.employee, s.gap.date, &s.template.id)
                    .with_area(&s.gap.area_id)
                    .with_origin(AssignmentOrigin::AutoFill);
                StagedAssignment {
                    requirement_id: s.gap.requirement_id.clone(),
                    assignment: state.upsert_assignment(placement),
                    template_match: s.template_match,
                }
            })
            .collect();

        let filled_count = assignments.len();
        let reason = (filled_count == 0).then(|| self.no_fill_reason(gaps));

        info!(
            business_unit = %self.index.business_unit(),
            gaps = gaps.len(),
            filled_count,
            unfilled = unfilled.len(),
            reason = ?reason,
            "auto-fill finished"
        );

        AutoFillReport {
            filled_count,
            assignments,
            unfilled,
            reason,
        }
    }

    fn plan<'g>(
        &'g self,
        gaps: &'g [Gap],
        pool: &CandidatePool<'g>,
        state: &ScheduleState,
    ) -> (Vec<Staged<'g>>, Vec<Gap>) {
        let mut staged = Vec::new();
        let mut unfilled = Vec::new();
        let mut used: HashSet<(&str, NaiveDate)> = HashSet::new();
        let mut staged_per_role: HashMap<(NaiveDate, &str), u32> = HashMap::new();

        for gap in gaps {
            let credited = staged_per_role
                .get(&(gap.date, gap.role.as_str()))
                .copied()
                .unwrap_or(0)
                .min(gap.missing);
            let need = gap.missing - credited;
            if need == 0 {
                debug!(
                    date = %gap.date,
                    requirement = %gap.requirement_id,
                    "gap closed by earlier placements"
                );
                continue;
            }

            let Some((template, template_match)) = self.resolve_template(gap) else {
                unfilled.push(remaining(gap, credited));
                continue;
            };

            let mut placed = 0u32;
            for employee in pool.iter() {
                if placed == need {
                    break;
                }
                if !employee.has_role(&gap.role)
                    || used.contains(&(employee.id.as_str(), gap.date))
                    || state.entry_for(&employee.id, gap.date).is_some()
                    || state.leave_covering(&employee.id, gap.date).is_some()
                {
                    continue;
                }

                used.insert((employee.id.as_str(), gap.date));
                debug!(
                    employee = %employee.id,
                    date = %gap.date,
                    requirement = %gap.requirement_id,
                    template = %template.id,
                    "staged placement"
                );
                staged.push(Staged {
                    gap,
                    employee,
                    template,
                    template_match,
                });
                placed += 1;
            }

            *staged_per_role.entry((gap.date, gap.role.as_str())).or_default() += placed;
            if placed < need {
                unfilled.push(remaining(gap, credited + placed));
            }
        }

        (staged, unfilled)
    }

    /// Business-unit templates in configuration order.
    fn own_templates(&self) -> impl Iterator<Item = &'a ShiftTemplate> + '_ {
        let business_unit = self.index.business_unit();
        self.templates
            .iter()
            .filter(move |t| t.business_unit == business_unit)
    }

    fn resolve_template(&self, gap: &Gap) -> Option<(&'a ShiftTemplate, TemplateMatch)> {
        if let Some(window) = &gap.shift_time {
            if let Some(exact) = self.own_templates().find(|t| t.matches_window(window)) {
                return Some((exact, TemplateMatch::Exact));
            }
        }

        let fallback = self
            .own_templates()
            .find(|t| !t.is_flexible())
            .or_else(|| self.own_templates().next())?;

        let template_match = if gap.shift_time.is_some() {
            TemplateMatch::Fallback
        } else {
            TemplateMatch::Unconstrained
        };
        Some((fallback, template_match))
    }

    fn no_fill_reason(&self, gaps: &[Gap]) -> NoFillReason {
        if self.index.is_empty() {
            NoFillReason::NoRequirements
        } else if gaps.is_empty() {
            NoFillReason::NoOpenGaps
        } else if self.own_templates().next().is_none() {
            NoFillReason::NoShiftTemplates
        } else {
            NoFillReason::NoEligibleCandidates
        }
    }
}

/// Gap left after `covered` headcount was staged against it.
fn remaining(gap: &Gap, covered: u32) -> Gap {
    let mut rest = gap.clone();
    rest.scheduled += covered;
    rest.missing -= covered;
    rest
}
