//! CycleLifecycleService - the public command/query surface of the engine.
//!
//! Bundles the per-command handlers over one set of ports so callers (an
//! admin API, other modules, tests) wire a single object.

use std::sync::Arc;

use crate::domain::cycle::{Cycle, CycleError, CyclePhase, CycleStatus, DeadlineReport};
use crate::domain::foundation::{CommandMetadata, CycleId, Timestamp};
use crate::ports::{Clock, CycleAccessChecker, CycleStore};

use super::automation::{AutomationReport, CycleAutomationPass};
use super::handlers::cycle::{
    ActivateCycleCommand, ActivateCycleHandler, ActiveCyclePhase, CreateCycleCommand,
    CreateCycleHandler, GetActiveCycleHandler, GetCycleHandler, GetDeadlineReportHandler,
    GetDeadlineReportQuery, ListCyclesHandler, ListCyclesQuery, PhaseGate,
    UpdateCyclePhaseCommand, UpdateCyclePhaseHandler, UpdateCycleStatusCommand,
    UpdateCycleStatusHandler, DEFAULT_END_DATE_GRACE_DAYS,
};

/// Facade over every cycle command and query.
pub struct CycleLifecycleService {
    create: CreateCycleHandler,
    activate: ActivateCycleHandler,
    update_status: UpdateCycleStatusHandler,
    update_phase: UpdateCyclePhaseHandler,
    get: GetCycleHandler,
    list: ListCyclesHandler,
    active: GetActiveCycleHandler,
    deadlines: GetDeadlineReportHandler,
    gate: PhaseGate,
    automation: CycleAutomationPass,
}

impl CycleLifecycleService {
    pub fn new(
        store: Arc<dyn CycleStore>,
        access_checker: Arc<dyn CycleAccessChecker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_end_date_grace_days(store, access_checker, clock, DEFAULT_END_DATE_GRACE_DAYS)
    }

    /// Like `new`, with the activation end date derived `end_date_grace_days`
    /// after the equalization deadline (clamped to a year).
    pub fn with_end_date_grace_days(
        store: Arc<dyn CycleStore>,
        access_checker: Arc<dyn CycleAccessChecker>,
        clock: Arc<dyn Clock>,
        end_date_grace_days: i64,
    ) -> Self {
        Self {
            create: CreateCycleHandler::new(store.clone(), access_checker.clone(), clock.clone()),
            activate: ActivateCycleHandler::new(store.clone(), access_checker.clone(), clock.clone())
                .with_end_date_grace_days(end_date_grace_days),
            update_status: UpdateCycleStatusHandler::new(
                store.clone(),
                access_checker.clone(),
                clock.clone(),
            ),
            update_phase: UpdateCyclePhaseHandler::new(store.clone(), access_checker, clock.clone()),
            get: GetCycleHandler::new(store.clone()),
            list: ListCyclesHandler::new(store.clone()),
            active: GetActiveCycleHandler::new(store.clone()),
            deadlines: GetDeadlineReportHandler::new(store.clone(), clock.clone()),
            gate: PhaseGate::new(store.clone()),
            automation: CycleAutomationPass::new(store, clock),
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Commands
    // ───────────────────────────────────────────────────────────────

    pub async fn create_cycle(
        &self,
        cmd: CreateCycleCommand,
        metadata: CommandMetadata,
    ) -> Result<Cycle, CycleError> {
        self.create.handle(cmd, metadata).await
    }

    pub async fn activate_cycle(
        &self,
        cmd: ActivateCycleCommand,
        metadata: CommandMetadata,
    ) -> Result<Cycle, CycleError> {
        self.activate.handle(cmd, metadata).await
    }

    pub async fn update_status(
        &self,
        cycle_id: CycleId,
        status: CycleStatus,
        metadata: CommandMetadata,
    ) -> Result<Cycle, CycleError> {
        self.update_status
            .handle(UpdateCycleStatusCommand { cycle_id, status }, metadata)
            .await
    }

    pub async fn update_phase(
        &self,
        cycle_id: CycleId,
        phase: CyclePhase,
        metadata: CommandMetadata,
    ) -> Result<Cycle, CycleError> {
        self.update_phase
            .handle(UpdateCyclePhaseCommand { cycle_id, phase }, metadata)
            .await
    }

    // ───────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────

    pub async fn get_active_cycle(&self) -> Result<Option<Cycle>, CycleError> {
        self.active.handle().await
    }

    pub async fn get_cycle_by_id(&self, id: CycleId) -> Result<Cycle, CycleError> {
        self.get.by_id(id).await
    }

    pub async fn get_cycle_by_name(&self, name: &str) -> Result<Option<Cycle>, CycleError> {
        self.get.by_name(name).await
    }

    pub async fn list_cycles(&self) -> Result<Vec<Cycle>, CycleError> {
        self.list.handle(ListCyclesQuery::default()).await
    }

    pub async fn get_deadline_report(&self, cycle_id: CycleId) -> Result<DeadlineReport, CycleError> {
        self.deadlines
            .handle(GetDeadlineReportQuery { cycle_id })
            .await
    }

    /// The guard other modules call before phase-bound writes.
    pub async fn validate_active_cycle_phase(
        &self,
        required: CyclePhase,
    ) -> Result<ActiveCyclePhase, CycleError> {
        self.gate.validate_active_cycle_phase(required).await
    }

    /// A clone of the phase gate, for modules that only need the guard.
    pub fn phase_gate(&self) -> PhaseGate {
        self.gate.clone()
    }

    // ───────────────────────────────────────────────────────────────
    // Automation
    // ───────────────────────────────────────────────────────────────

    /// Runs one automation pass immediately.
    pub async fn force_check(&self, now: Option<Timestamp>) -> AutomationReport {
        self.automation.force_check(now).await
    }
}
