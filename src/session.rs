//! Scheduling sessions.
//!
//! A [`SchedulingSession`] is the working copy of one business unit around
//! one viewed week: validated reference data, the mutable
//! [`ScheduleState`], and the carry-over tracker. Every manager action goes
//! through it.
//!
//! A session only edits its viewed week. The prior and next weeks are
//! loaded for carry-over and reading; edits to them fail with
//! [`SchedulingError::OutsideWeek`].
//!
//! [`SessionRegistry`] hands out one session per (business unit, week).
//! Sessions for distinct keys touch disjoint weeks; calls on the same key
//! are serialized by the session's mutex. Registry sessions are pinned to
//! their key and cannot navigate.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::carry_over::{self, CarryOver, CarryOverOutcome, CopyReport};
use crate::config::EngineConfig;
use crate::coverage::{self, DayCoverage};
use crate::error::{Result, SchedulingError};
use crate::gaps::{GapAnalyzer, GapReport};
use crate::models::{in_week, start_of_week, DayTypePolicy, Employee, OperatingHours, ShiftAssignment, ShiftTemplate};
use crate::ports::{AssignmentSink, ScheduleSnapshot, SnapshotSource};
use crate::schedule::{self, DeleteOutcome, Placement, PublishReport, ScheduleState, WeekStatus};
use crate::scheduler::{AutoAssigner, AutoFillReport, CandidatePool, StaffingKpi};
use crate::staffing::StaffingIndex;
use crate::validation::validate_templates;

/// Working copy of one business unit's schedule.
#[derive(Debug)]
pub struct SchedulingSession {
    business_unit: String,
    week_start: NaiveDate,
    employees: Vec<Employee>,
    templates: Vec<ShiftTemplate>,
    index: StaffingIndex,
    policy: Box<dyn DayTypePolicy>,
    hours: OperatingHours,
    state: ScheduleState,
    carry_over: CarryOver,
    pinned: bool,
}

impl SchedulingSession {
    /// Validates a snapshot and opens a session on its week.
    ///
    /// Operating hours come from the snapshot; a snapshot with every day
    /// closed falls back to the configured hours.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidConfiguration`] when areas, requirements,
    /// templates, or configured hours are invalid.
    pub fn open(snapshot: ScheduleSnapshot, config: &EngineConfig) -> Result<Self> {
        let ScheduleSnapshot {
            business_unit,
            week_start,
            employees,
            templates,
            areas,
            requirements,
            assignments,
            leaves,
            hours,
        } = snapshot;

        let mut builder = StaffingIndex::builder(&business_unit)
            .with_areas(areas)
            .with_requirements(requirements);
        if let Some(roles) = config.known_roles() {
            builder = builder.with_known_roles(roles);
        }
        let index = builder.build()?;
        validate_templates(&templates).map_err(SchedulingError::InvalidConfiguration)?;

        let hours = if hours.open_days() == 0 {
            config.operating_hours()?
        } else {
            hours
        };

        let mut state = ScheduleState::new(&business_unit).with_leaves(leaves);
        let dropped = state.restore(assignments);

        let week_start = start_of_week(week_start);
        info!(
            business_unit = %business_unit,
            week = %week_start,
            employees = employees.len(),
            entries = state.entries().len(),
            dropped,
            "scheduling session opened"
        );

        Ok(Self {
            business_unit,
            week_start,
            employees,
            templates,
            index,
            policy: Box::new(config.policy()),
            hours,
            state,
            carry_over: CarryOver::new(),
            pinned: false,
        })
    }

    /// Loads a snapshot from `source` and opens a session on it.
    pub fn load(
        source: &dyn SnapshotSource,
        business_unit: &str,
        week_start: NaiveDate,
        config: &EngineConfig,
    ) -> Result<Self> {
        Self::open(source.load(business_unit, week_start)?, config)
    }

    /// Replaces the day-type policy.
    pub fn with_policy(mut self, policy: impl DayTypePolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn business_unit(&self) -> &str {
        &self.business_unit
    }

    /// Viewed week.
    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn templates(&self) -> &[ShiftTemplate] {
        &self.templates
    }

    pub fn index(&self) -> &StaffingIndex {
        &self.index
    }

    pub fn hours(&self) -> &OperatingHours {
        &self.hours
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == employee_id)
    }

    /// Whether the session is shared through a registry.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn ensure_in_week(&self, date: NaiveDate) -> Result<()> {
        if in_week(date, self.week_start) {
            Ok(())
        } else {
            Err(SchedulingError::OutsideWeek {
                date,
                week_start: self.week_start,
            })
        }
    }

    /// Gaps of the viewed week.
    pub fn gaps(&self) -> GapReport {
        self.gaps_for_week(self.week_start)
    }

    /// Gaps of any loaded week.
    pub fn gaps_for_week(&self, week_start: NaiveDate) -> GapReport {
        GapAnalyzer::new(&self.index, self.policy.as_ref()).analyze_week(
            week_start,
            &self.state,
            &self.employees,
        )
    }

    /// Opening and closing coverage of the viewed week.
    pub fn coverage(&self) -> [DayCoverage; 7] {
        coverage::validate_week(self.week_start, &self.state, &self.templates, &self.hours)
    }

    /// Staffing KPIs of the viewed week.
    pub fn kpi(&self) -> StaffingKpi {
        StaffingKpi::calculate(
            &self.gaps(),
            &self.index,
            self.policy.as_ref(),
            &self.state,
            &self.templates,
        )
    }

    /// Fills the viewed week's gaps from every active employee.
    pub fn auto_fill(&mut self) -> AutoFillReport {
        let report = self.gaps();
        let pool = CandidatePool::business_unit(&self.employees, &self.business_unit);
        AutoAssigner::new(&self.index, &self.templates).run(&report.gaps, &pool, &mut self.state)
    }

    /// Fills the viewed week's gaps from one department's employees.
    pub fn auto_fill_department(&mut self, department: &str) -> AutoFillReport {
        let report = self.gaps();
        let pool = CandidatePool::business_unit(&self.employees, &self.business_unit)
            .with_department(department);
        AutoAssigner::new(&self.index, &self.templates).run(&report.gaps, &pool, &mut self.state)
    }

    /// Places an employee on a shift, replacing their entry for that date.
    ///
    /// The employee's department is used when the placement has none. A
    /// placement without an area gets the first area requiring the
    /// employee's role.
    ///
    /// # Errors
    /// [`SchedulingError::OutsideWeek`] for a date outside the viewed week;
    /// [`SchedulingError::UnknownEmployee`] or
    /// [`SchedulingError::UnknownTemplate`] for references outside the
    /// session's reference data.
    pub fn upsert(&mut self, mut placement: Placement) -> Result<ShiftAssignment> {
        self.ensure_in_week(placement.date)?;
        let employee = self
            .employee(&placement.employee_id)
            .ok_or_else(|| SchedulingError::UnknownEmployee(placement.employee_id.clone()))?;
        if !self.templates.iter().any(|t| t.id == placement.template_id) {
            return Err(SchedulingError::UnknownTemplate(placement.template_id));
        }

        if placement.department.is_empty() {
            placement.department = employee.department.clone();
        }
        if placement.area_id.is_none() {
            placement.area_id = self
                .index
                .infer_area_for_role(&employee.role)
                .map(|area| area.id.clone());
        }
        Ok(self.state.upsert_assignment(placement))
    }

    /// Removes an assignment or suggestion of the viewed week.
    ///
    /// An unknown id is not an error; entries of other weeks are.
    pub fn delete(&mut self, assignment_id: &str) -> Result<DeleteOutcome> {
        if let Some(entry) = self.state.get(assignment_id) {
            self.ensure_in_week(entry.date)?;
        }
        Ok(self.state.delete_assignment(assignment_id))
    }

    /// Proposes the previous week for the viewed week when it is empty.
    pub fn suggest_carry_over(&mut self) -> CarryOverOutcome {
        self.carry_over.suggest(&mut self.state, self.week_start)
    }

    /// Commits one suggestion.
    pub fn accept_suggestion(&mut self, suggestion_id: &str) -> Result<ShiftAssignment> {
        if let Some(entry) = self.state.get(suggestion_id) {
            self.ensure_in_week(entry.date)?;
        }
        carry_over::accept(&mut self.state, suggestion_id)
    }

    /// Replaces the viewed week with a copy of the previous week.
    pub fn copy_previous_week(&mut self) -> CopyReport {
        carry_over::copy_previous_week(&mut self.state, self.week_start)
    }

    /// Replaces one employee's viewed week with their previous week.
    pub fn copy_employee_previous_week(&mut self, employee_id: &str) -> Result<CopyReport> {
        if self.employee(employee_id).is_none() {
            return Err(SchedulingError::UnknownEmployee(employee_id.to_string()));
        }
        Ok(carry_over::copy_employee_previous_week(
            &mut self.state,
            employee_id,
            self.week_start,
        ))
    }

    /// Publishes the viewed week.
    pub fn publish(&mut self) -> PublishReport {
        schedule::publish(&mut self.state, self.week_start)
    }

    /// Switches the viewed week. Its indicator starts out published.
    ///
    /// # Errors
    /// [`SchedulingError::SessionPinned`] for a registry session; open the
    /// other week through the registry instead.
    pub fn navigate_to(&mut self, week_start: NaiveDate) -> Result<()> {
        if self.pinned {
            return Err(SchedulingError::SessionPinned {
                business_unit: self.business_unit.clone(),
                week_start: self.week_start,
            });
        }
        self.week_start = start_of_week(week_start);
        self.state
            .lifecycle_mut()
            .mark_published(&self.business_unit, self.week_start);
        debug!(business_unit = %self.business_unit, week = %self.week_start, "navigated");
        Ok(())
    }

    /// Publish indicator of the viewed week.
    pub fn viewed_status(&self) -> WeekStatus {
        self.state.lifecycle().status(&self.business_unit, self.week_start)
    }

    /// Hands pending intents to `sink`. Intents are kept if the sink fails.
    pub fn persist(&mut self, sink: &dyn AssignmentSink) -> Result<usize> {
        let intents = self.state.pending_intents();
        if intents.is_empty() {
            return Ok(0);
        }
        let applied = sink.apply(intents)?;
        self.state.drain_intents();
        info!(business_unit = %self.business_unit, applied, "intents persisted");
        Ok(applied)
    }
}

/// Registry key: business unit and week start.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub business_unit: String,
    pub week_start: NaiveDate,
}

impl SessionKey {
    pub fn new(business_unit: impl Into<String>, week_start: NaiveDate) -> Self {
        Self {
            business_unit: business_unit.into(),
            week_start: start_of_week(week_start),
        }
    }
}

/// Shared handle to a session.
pub type SharedSession = Arc<Mutex<SchedulingSession>>;

/// Open sessions keyed by business unit and week.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    config: EngineConfig,
    sessions: DashMap<SessionKey, SharedSession>,
}

impl SessionRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the open session for the key, loading it on first use.
    pub fn get_or_open(
        &self,
        source: &dyn SnapshotSource,
        business_unit: &str,
        week_start: NaiveDate,
    ) -> Result<SharedSession> {
        let key = SessionKey::new(business_unit, week_start);
        if let Some(existing) = self.sessions.get(&key) {
            return Ok(existing.value().clone());
        }

        // Loaded outside the map lock; a concurrent opener's session wins.
        let mut session = SchedulingSession::load(source, business_unit, week_start, &self.config)?;
        session.pinned = true;
        let shared = self
            .sessions
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(session)))
            .value()
            .clone();
        Ok(shared)
    }

    pub fn get(&self, key: &SessionKey) -> Option<SharedSession> {
        self.sessions.get(key).map(|entry| entry.value().clone())
    }

    /// Drops a session from the registry.
    pub fn close(&self, key: &SessionKey) -> Option<SharedSession> {
        self.sessions.remove(key).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayType, ServiceArea, ShiftWindow, StaffingRequirement};
    use crate::ports::InMemoryRepository;
    use crate::validation::ValidationErrorKind;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn repository() -> InMemoryRepository {
        InMemoryRepository::new()
            .with_employees(vec![
                Employee::new("E1", "Bartender", "BU1").with_department("Bar"),
                Employee::new("E2", "Bartender", "BU1").with_department("Pool"),
                Employee::new("H1", "Host", "BU1"),
            ])
            .with_templates(vec![ShiftTemplate::fixed(
                "EVE",
                "BU1",
                ShiftWindow::from_hm(18, 0, 2, 0).unwrap(),
            )])
            .with_areas(vec![ServiceArea::new("BAR", "BU1"), ServiceArea::new("LOBBY", "BU1")])
            .with_requirements(vec![
                StaffingRequirement::new("B3", "BAR", "Bartender", DayType::SuperPeak, 2)
                    .with_window(ShiftWindow::from_hm(18, 0, 2, 0).unwrap()),
                StaffingRequirement::new("L1", "LOBBY", "Host", DayType::OffPeak, 0),
            ])
    }

    fn session() -> SchedulingSession {
        SchedulingSession::load(&repository(), "BU1", date(12), &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_open_normalizes_week() {
        let session = session();
        assert_eq!(session.week_start(), date(10));
        assert_eq!(session.gaps().len(), 1);
        assert_eq!(session.viewed_status(), WeekStatus::Published);
    }

    #[test]
    fn test_open_rejects_invalid_configuration() {
        let repo = repository().with_requirements(vec![StaffingRequirement::new(
            "BAD",
            "BAR",
            "Bartender",
            DayType::Peak,
            -1,
        )]);
        let err = SchedulingSession::load(&repo, "BU1", date(10), &EngineConfig::default()).unwrap_err();
        assert_eq!(err.validation_errors()[0].kind, ValidationErrorKind::NegativeCount);
    }

    #[test]
    fn test_known_roles_flag_typos() {
        let config = EngineConfig {
            known_roles: vec!["Bartender".into()],
            ..EngineConfig::default()
        };
        let err = SchedulingSession::load(&repository(), "BU1", date(10), &config).unwrap_err();
        assert_eq!(err.validation_errors()[0].kind, ValidationErrorKind::UnknownRole);
    }

    #[test]
    fn test_upsert_checks_references_and_infers_area() {
        let mut session = session();
        let err = session.upsert(Placement::new("NOBODY", date(15), "EVE")).unwrap_err();
        assert!(matches!(err, SchedulingError::UnknownEmployee(_)));
        let err = session.upsert(Placement::new("E1", date(15), "NOPE")).unwrap_err();
        assert!(matches!(err, SchedulingError::UnknownTemplate(_)));

        let a = session.upsert(Placement::new("E1", date(15), "EVE")).unwrap();
        assert_eq!(a.area_id.as_deref(), Some("BAR"));
        assert_eq!(a.department, "Bar");
        assert_eq!(session.viewed_status(), WeekStatus::Dirty);
        assert_eq!(session.gaps().total_missing(), 1);
    }

    #[test]
    fn test_auto_fill_department() {
        let mut session = session();
        let report = session.auto_fill_department("Pool");
        assert_eq!(report.filled_count, 1);
        assert_eq!(report.assignments[0].assignment.employee_id, "E2");
        assert_eq!(session.auto_fill().filled_count, 1);
        assert!(session.gaps().is_empty());
    }

    #[test]
    fn test_persist_and_reload() {
        let repo = repository();
        let mut session = SchedulingSession::load(&repo, "BU1", date(10), &EngineConfig::default()).unwrap();
        session.auto_fill();
        assert_eq!(session.persist(&repo).unwrap(), 2);
        assert!(session.state().pending_intents().is_empty());
        assert_eq!(session.persist(&repo).unwrap(), 0);

        let reloaded = SchedulingSession::load(&repo, "BU1", date(10), &EngineConfig::default()).unwrap();
        assert!(reloaded.gaps().is_empty());
    }

    #[test]
    fn test_navigate_resets_indicator() {
        let mut session = session();
        session.upsert(Placement::new("E1", date(11), "EVE")).unwrap();
        assert_eq!(session.viewed_status(), WeekStatus::Dirty);

        session.navigate_to(date(19)).unwrap();
        assert_eq!(session.week_start(), date(17));
        assert_eq!(session.viewed_status(), WeekStatus::Published);
        // Data is untouched.
        assert!(session.state().assignment_for("E1", date(11)).is_some());
        session.upsert(Placement::new("E1", date(18), "EVE")).unwrap();
        assert_eq!(session.viewed_status(), WeekStatus::Dirty);
    }

    #[test]
    fn test_edits_confined_to_viewed_week() {
        let mut session = session();
        let err = session.upsert(Placement::new("E1", date(18), "EVE")).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::OutsideWeek { week_start, .. } if week_start == date(10)
        ));

        let repo = repository().with_assignments(vec![
            ShiftAssignment::new("E1", "EVE", date(4), "BU1").with_id("PRIOR"),
            ShiftAssignment::new("E1", "EVE", date(11), "BU1").with_id("CURRENT"),
        ]);
        let mut session = SchedulingSession::load(&repo, "BU1", date(10), &EngineConfig::default()).unwrap();
        assert!(session.delete("PRIOR").is_err());
        assert!(session.state().get("PRIOR").is_some());
        assert!(session.delete("CURRENT").unwrap().is_deleted());
        assert_eq!(session.delete("MISSING").unwrap(), DeleteOutcome::NotFound);
    }

    #[test]
    fn test_registry_sessions_own_disjoint_weeks() {
        let repo = repository();
        let registry = SessionRegistry::new(EngineConfig::default());
        let this_week = registry.get_or_open(&repo, "BU1", date(10)).unwrap();
        let next_week = registry.get_or_open(&repo, "BU1", date(17)).unwrap();

        // Only the session keyed on the week may edit it.
        assert!(this_week.lock().upsert(Placement::new("E1", date(18), "EVE")).is_err());
        next_week.lock().upsert(Placement::new("E1", date(18), "EVE")).unwrap();
        assert!(matches!(
            this_week.lock().navigate_to(date(17)),
            Err(SchedulingError::SessionPinned { .. })
        ));
        assert!(this_week.lock().is_pinned());

        this_week.lock().persist(&repo).unwrap();
        next_week.lock().persist(&repo).unwrap();
        let stored = repo
            .assignments()
            .into_iter()
            .filter(|a| a.occupies("E1", date(18)))
            .count();
        assert_eq!(stored, 1);
    }

    #[test]
    fn test_copy_employee_unknown() {
        let mut session = session();
        assert!(session.copy_employee_previous_week("NOBODY").is_err());
        assert_eq!(session.copy_employee_previous_week("E1").unwrap().copied.len(), 0);
    }

    #[test]
    fn test_registry_reuses_sessions() {
        let repo = repository();
        let registry = SessionRegistry::new(EngineConfig::default());
        let a = registry.get_or_open(&repo, "BU1", date(10)).unwrap();
        let b = registry.get_or_open(&repo, "BU1", date(14)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);

        a.lock().upsert(Placement::new("E1", date(15), "EVE")).unwrap();
        assert_eq!(b.lock().gaps().total_missing(), 1);

        let key = SessionKey::new("BU1", date(16));
        assert!(registry.get(&key).is_some());
        assert!(registry.close(&key).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_parallel_business_units() {
        let repo = repository().with_employees(vec![Employee::new("X1", "Bartender", "BU2")]);
        let registry = SessionRegistry::new(EngineConfig::default());

        std::thread::scope(|scope| {
            for bu in ["BU1", "BU2"] {
                let (registry, repo) = (&registry, &repo);
                scope.spawn(move || {
                    let session = registry.get_or_open(repo, bu, date(10)).unwrap();
                    session.lock().auto_fill();
                });
            }
        });

        assert_eq!(registry.len(), 2);
        let bu1 = registry.get(&SessionKey::new("BU1", date(10))).unwrap();
        assert!(bu1.lock().gaps().is_empty());
    }
}
