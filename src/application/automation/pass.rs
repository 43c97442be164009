//! CycleAutomationPass - one time-driven sweep over every cycle.
//!
//! A pass runs three sweeps in order: activate due UPCOMING cycles, advance
//! OPEN cycles whose phase deadline has passed, close OPEN cycles whose end
//! date has been reached. Each cycle is re-read right before it is touched,
//! and every write carries the version it was read at, so a pass that
//! overlaps another pass (or an admin command) loses the race cleanly
//! instead of applying a transition twice.
//!
//! A failure on one cycle is logged and recorded in the report; the sweep
//! carries on with the rest.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::handlers::cycle::commit_exclusive_activation;
use crate::domain::cycle::{Cycle, CycleError, CyclePhase, CycleStatus};
use crate::domain::foundation::{CommandMetadata, CycleId, Timestamp};
use crate::ports::{Clock, CycleStore};

use super::report::{AutomationAction, AutomationFailure, AutomationReport, AutomationStep};

/// Upper bound on phase steps for one cycle in one pass.
const MAX_PHASE_STEPS: usize = 2;

/// The automation sweep.
pub struct CycleAutomationPass {
    store: Arc<dyn CycleStore>,
    clock: Arc<dyn Clock>,
}

impl CycleAutomationPass {
    pub fn new(store: Arc<dyn CycleStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Runs one pass as of `now`.
    ///
    /// Never fails: store errors while listing candidates are recorded as a
    /// failure of that sweep, per-cycle errors as failures of that cycle.
    pub async fn run_once(&self, now: Timestamp) -> AutomationReport {
        let run = CommandMetadata::scheduler();
        let run_id = run.correlation_id();
        debug!(run_id = %run_id, now = %now, "Automation pass started");

        let mut report = AutomationReport::new(now);
        self.activate_due(now, &mut report).await;
        self.advance_due_phases(now, &mut report).await;
        self.close_due(now, &mut report).await;

        if report.is_noop() && !report.has_failures() {
            debug!(run_id = %run_id, "Automation pass found nothing to do");
        } else {
            info!(
                run_id = %run_id,
                actions = report.actions.len(),
                failures = report.failures.len(),
                conflicts = report.conflicts.len(),
                "Automation pass finished"
            );
        }
        report
    }

    /// Runs one pass on demand, at `now` or the clock's current time.
    ///
    /// Identical to a scheduled tick.
    pub async fn force_check(&self, now: Option<Timestamp>) -> AutomationReport {
        let now = now.unwrap_or_else(|| self.clock.now());
        info!(now = %now, "Automation check forced");
        self.run_once(now).await
    }

    // ───────────────────────────────────────────────────────────────
    // Sweeps
    // ───────────────────────────────────────────────────────────────

    async fn activate_due(&self, now: Timestamp, report: &mut AutomationReport) {
        let Some(mut due) = self
            .candidates(CycleStatus::Upcoming, AutomationStep::Activate, report)
            .await
        else {
            return;
        };
        due.retain(|c| c.is_due_for_activation(now));
        // Earliest start first, so the latest-starting due cycle ends up OPEN.
        due.sort_by_key(|c| (c.schedule().start_date, c.created_at()));

        for cycle in due {
            let result = self.activate_one(cycle.id(), now, report).await;
            self.settle(cycle.id(), AutomationStep::Activate, result, report);
        }
    }

    async fn advance_due_phases(&self, now: Timestamp, report: &mut AutomationReport) {
        let Some(open) = self
            .candidates(CycleStatus::Open, AutomationStep::AdvancePhase, report)
            .await
        else {
            return;
        };

        for cycle in open {
            let result = self.advance_one(cycle.id(), now, report).await;
            self.settle(cycle.id(), AutomationStep::AdvancePhase, result, report);
        }
    }

    async fn close_due(&self, now: Timestamp, report: &mut AutomationReport) {
        let Some(open) = self
            .candidates(CycleStatus::Open, AutomationStep::Close, report)
            .await
        else {
            return;
        };

        for cycle in open.into_iter().filter(|c| c.is_due_for_closing(now)) {
            let result = self.close_one(cycle.id(), now, report).await;
            self.settle(cycle.id(), AutomationStep::Close, result, report);
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Per-cycle transitions
    // ───────────────────────────────────────────────────────────────

    async fn activate_one(
        &self,
        id: CycleId,
        now: Timestamp,
        report: &mut AutomationReport,
    ) -> Result<(), CycleError> {
        let Some(mut cycle) = self.reload(id, |c| c.is_due_for_activation(now)).await? else {
            return Ok(());
        };

        cycle.activate(Some(CyclePhase::Assessments), now)?;
        let outcome = commit_exclusive_activation(self.store.as_ref(), &cycle, now).await?;

        for demoted in outcome.demoted {
            report.record(AutomationAction::ClosedForActivation {
                cycle_id: demoted,
                replaced_by: id,
            });
        }
        report.record(AutomationAction::Activated { cycle_id: id });
        Ok(())
    }

    /// Advances one step at a time while a deadline is still behind `now`,
    /// so a single pass leaves nothing for the next one with the same `now`.
    async fn advance_one(
        &self,
        id: CycleId,
        now: Timestamp,
        report: &mut AutomationReport,
    ) -> Result<(), CycleError> {
        for _ in 0..MAX_PHASE_STEPS {
            let Some(mut cycle) = self.reload(id, |c| c.due_phase_advance(now).is_some()).await?
            else {
                return Ok(());
            };
            let from = cycle.phase();
            let Some(to) = cycle.due_phase_advance(now) else {
                return Ok(());
            };

            cycle.advance_phase(to, now)?;
            self.store.update(&cycle).await?;

            info!(cycle_id = %id, from = %from, to = %to, "Cycle phase advanced");
            report.record(AutomationAction::PhaseAdvanced {
                cycle_id: id,
                from,
                to,
            });
        }
        Ok(())
    }

    async fn close_one(
        &self,
        id: CycleId,
        now: Timestamp,
        report: &mut AutomationReport,
    ) -> Result<(), CycleError> {
        let Some(mut cycle) = self.reload(id, |c| c.is_due_for_closing(now)).await? else {
            return Ok(());
        };

        cycle.close(now)?;
        self.store.update(&cycle).await?;

        info!(cycle_id = %id, name = %cycle.name(), "Cycle closed at end date");
        report.record(AutomationAction::Closed { cycle_id: id });
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Helpers
    // ───────────────────────────────────────────────────────────────

    async fn candidates(
        &self,
        status: CycleStatus,
        step: AutomationStep,
        report: &mut AutomationReport,
    ) -> Option<Vec<Cycle>> {
        match self.store.find_by_status(status).await {
            Ok(cycles) => Some(cycles),
            Err(err) => {
                warn!(step = ?step, error = %err, "Automation sweep could not list cycles");
                report.record_failure(AutomationFailure::sweep(step, &err));
                None
            }
        }
    }

    /// Re-reads the cycle and returns it only if `still_due` holds on the
    /// current persisted state.
    async fn reload(
        &self,
        id: CycleId,
        still_due: impl Fn(&Cycle) -> bool,
    ) -> Result<Option<Cycle>, CycleError> {
        let current = self.store.find_by_id(&id).await?;
        Ok(match current {
            Some(cycle) if still_due(&cycle) => Some(cycle),
            _ => {
                debug!(cycle_id = %id, "Trigger no longer holds, skipping");
                None
            }
        })
    }

    fn settle(
        &self,
        id: CycleId,
        step: AutomationStep,
        result: Result<(), CycleError>,
        report: &mut AutomationReport,
    ) {
        match result {
            Ok(()) => {}
            Err(err) if err.is_concurrent_modification() => {
                debug!(cycle_id = %id, step = ?step, "Cycle changed underneath the pass, skipping");
                report.record_conflict(id);
            }
            Err(err) => {
                warn!(cycle_id = %id, step = ?step, error = %err, "Automation failed for cycle");
                report.record_failure(AutomationFailure::new(id, step, &err));
            }
        }
    }
}
