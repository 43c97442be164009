//! Cycle aggregate - The root entity for evaluation cycles.
//!
//! A Cycle is a bounded evaluation period. It owns its schedule and the
//! status/phase state machines; every mutator validates the transition
//! before touching state, so a failed call leaves the aggregate unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{CycleId, StateMachine, Timestamp, ValidationError};

use super::validator::{validate_date_consistency, validate_phase_transition};
use super::{CycleError, CyclePhase, CycleSchedule, CycleStatus};

const MAX_NAME_LEN: usize = 100;

/// Human label of a cycle (e.g. "2025.1"). Unique across all cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CycleName(String);

impl CycleName {
    /// Creates a name, trimming surrounding whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::invalid_format(
                "name",
                format!("must be at most {} characters", MAX_NAME_LEN),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CycleName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CycleName::new(value)
    }
}

impl From<CycleName> for String {
    fn from(name: CycleName) -> Self {
        name.0
    }
}

impl fmt::Display for CycleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The Cycle aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    id: CycleId,
    name: CycleName,
    status: CycleStatus,
    /// Meaningful only while status is OPEN.
    phase: CyclePhase,
    #[serde(flatten)]
    schedule: CycleSchedule,
    /// Optimistic concurrency token, bumped by the store on every write.
    version: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Cycle {
    /// Creates a new UPCOMING cycle in the ASSESSMENTS phase.
    ///
    /// The schedule is not validated here; callers run
    /// `validate_date_consistency` first.
    pub fn new(name: CycleName, schedule: CycleSchedule, now: Timestamp) -> Self {
        Self {
            id: CycleId::new(),
            name,
            status: CycleStatus::Upcoming,
            phase: CyclePhase::Assessments,
            schedule,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes a cycle from persisted data.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: CycleId,
        name: CycleName,
        status: CycleStatus,
        phase: CyclePhase,
        schedule: CycleSchedule,
        version: u64,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            status,
            phase,
            schedule,
            version,
            created_at,
            updated_at,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> CycleId {
        self.id
    }

    pub fn name(&self) -> &CycleName {
        &self.name
    }

    pub fn status(&self) -> CycleStatus {
        self.status
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn schedule(&self) -> &CycleSchedule {
        &self.schedule
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    // ───────────────────────────────────────────────────────────────
    // Trigger predicates (used by the automation pass)
    // ───────────────────────────────────────────────────────────────

    /// UPCOMING and `start_date <= now`.
    pub fn is_due_for_activation(&self, now: Timestamp) -> bool {
        self.status == CycleStatus::Upcoming
            && self.schedule.start_date.map_or(false, |start| start <= now)
    }

    /// The next phase, if the current phase deadline has passed.
    ///
    /// Nothing leaves EQUALIZATION automatically.
    pub fn due_phase_advance(&self, now: Timestamp) -> Option<CyclePhase> {
        if !self.is_open() {
            return None;
        }
        let deadline = match self.phase {
            CyclePhase::Assessments => self.schedule.assessment_deadline,
            CyclePhase::ManagerReviews => self.schedule.manager_deadline,
            CyclePhase::Equalization => None,
        }?;
        if now > deadline {
            self.phase.next()
        } else {
            None
        }
    }

    /// OPEN and `now >= end_date`.
    pub fn is_due_for_closing(&self, now: Timestamp) -> bool {
        self.is_open() && self.schedule.end_date.map_or(false, |end| now >= end)
    }

    // ───────────────────────────────────────────────────────────────
    // Mutators
    // ───────────────────────────────────────────────────────────────

    /// Moves UPCOMING -> OPEN.
    ///
    /// `phase` overrides the stored phase when given. Callers are
    /// responsible for demoting any other OPEN cycle in the same commit.
    pub fn activate(&mut self, phase: Option<CyclePhase>, now: Timestamp) -> Result<(), CycleError> {
        self.ensure_status_transition(CycleStatus::Open)?;
        self.status = CycleStatus::Open;
        if let Some(phase) = phase {
            self.phase = phase;
        }
        self.touch(now);
        Ok(())
    }

    /// Moves UPCOMING -> OPEN with a replacement schedule.
    ///
    /// The status edge is checked first, then the schedule; the stored
    /// phase is kept.
    pub fn activate_with_schedule(
        &mut self,
        schedule: CycleSchedule,
        now: Timestamp,
    ) -> Result<(), CycleError> {
        self.ensure_status_transition(CycleStatus::Open)?;
        validate_date_consistency(&schedule)?;
        self.schedule = schedule;
        self.status = CycleStatus::Open;
        self.touch(now);
        Ok(())
    }

    /// Moves OPEN -> CLOSED.
    pub fn close(&mut self, now: Timestamp) -> Result<(), CycleError> {
        self.ensure_status_transition(CycleStatus::Closed)?;
        self.status = CycleStatus::Closed;
        self.touch(now);
        Ok(())
    }

    /// Advances the phase of an OPEN cycle by exactly one step.
    pub fn advance_phase(&mut self, requested: CyclePhase, now: Timestamp) -> Result<(), CycleError> {
        if !self.is_open() {
            return Err(CycleError::InvalidState {
                id: self.id,
                status: self.status,
            });
        }
        validate_phase_transition(self.phase, requested)?;
        self.phase = requested;
        self.touch(now);
        Ok(())
    }

    fn ensure_status_transition(&self, requested: CycleStatus) -> Result<(), CycleError> {
        if self.status == CycleStatus::Open && requested == CycleStatus::Open {
            return Err(CycleError::AlreadyActive(self.id));
        }
        if !self.status.can_transition_to(&requested) {
            return Err(CycleError::IllegalStatusTransition {
                current: self.status,
                requested,
            });
        }
        Ok(())
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }
}
