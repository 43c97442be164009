//! ActivateCycleHandler - Command handler for manually opening a cycle.
//!
//! Activation applies the admin's schedule overrides, derives the end date
//! from the equalization deadline unless told not to, and then swaps the
//! cycle in as the only OPEN one in a single store commit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::cycle::{Cycle, CycleError, CycleSchedule, ScheduleOverrides};
use crate::domain::foundation::{CommandMetadata, CycleId};
use crate::ports::{Clock, CycleAccessChecker, CycleStore};

use super::access::{commit_exclusive_activation, ensure_can_manage};

/// Days added to the equalization deadline when deriving the end date.
pub const DEFAULT_END_DATE_GRACE_DAYS: i64 = 7;

/// Upper bound for the grace period; larger values are clamped.
pub const MAX_END_DATE_GRACE_DAYS: i64 = 365;

/// Command to activate a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateCycleCommand {
    pub cycle_id: CycleId,
    #[serde(flatten)]
    pub overrides: ScheduleOverrides,
    /// `Some(false)` keeps the supplied end date; anything else derives it.
    #[serde(default)]
    pub auto_set_end_date: Option<bool>,
}

impl ActivateCycleCommand {
    pub fn new(cycle_id: CycleId) -> Self {
        Self {
            cycle_id,
            ..Default::default()
        }
    }

    pub fn with_overrides(mut self, overrides: ScheduleOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_auto_set_end_date(mut self, enabled: bool) -> Self {
        self.auto_set_end_date = Some(enabled);
        self
    }
}

/// Handler for activating cycles.
pub struct ActivateCycleHandler {
    store: Arc<dyn CycleStore>,
    access_checker: Arc<dyn CycleAccessChecker>,
    clock: Arc<dyn Clock>,
    end_date_grace_days: i64,
}

impl ActivateCycleHandler {
    pub fn new(
        store: Arc<dyn CycleStore>,
        access_checker: Arc<dyn CycleAccessChecker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            access_checker,
            clock,
            end_date_grace_days: DEFAULT_END_DATE_GRACE_DAYS,
        }
    }

    /// Overrides the grace period used for the end date derivation.
    ///
    /// Clamped to `0..=MAX_END_DATE_GRACE_DAYS`.
    pub fn with_end_date_grace_days(mut self, days: i64) -> Self {
        self.end_date_grace_days = days.clamp(0, MAX_END_DATE_GRACE_DAYS);
        self
    }

    /// Opens the cycle, closing whichever cycle was OPEN before.
    ///
    /// # Errors
    ///
    /// - `AccessDenied` if the user may not manage cycles
    /// - `NotFound` if the cycle doesn't exist
    /// - `AlreadyActive` if the cycle is already OPEN
    /// - `IllegalStatusTransition` if the cycle is CLOSED
    /// - `InvalidDateOrdering` if the merged schedule is out of order
    pub async fn handle(
        &self,
        cmd: ActivateCycleCommand,
        metadata: CommandMetadata,
    ) -> Result<Cycle, CycleError> {
        ensure_can_manage(self.access_checker.as_ref(), &metadata).await?;

        let mut cycle = self
            .store
            .find_by_id(&cmd.cycle_id)
            .await?
            .ok_or(CycleError::NotFound(cmd.cycle_id))?;

        let schedule = derive_activation_schedule(
            cycle.schedule(),
            &cmd.overrides,
            cmd.auto_set_end_date,
            self.end_date_grace_days,
        );

        let now = self.clock.now();
        cycle.activate_with_schedule(schedule, now)?;
        commit_exclusive_activation(self.store.as_ref(), &cycle, now).await?;

        self.store
            .find_by_id(&cmd.cycle_id)
            .await?
            .ok_or(CycleError::NotFound(cmd.cycle_id))
    }
}

/// Merges the overrides and applies the end date derivation.
///
/// With the derivation enabled, a present equalization deadline always wins
/// over any supplied end date. `grace_days` is clamped like the handler's
/// setting, and a deadline too close to the calendar limit keeps its end date.
pub fn derive_activation_schedule(
    current: &CycleSchedule,
    overrides: &ScheduleOverrides,
    auto_set_end_date: Option<bool>,
    grace_days: i64,
) -> CycleSchedule {
    let mut merged = current.merged_with(overrides);
    if auto_set_end_date != Some(false) {
        if let Some(equalization) = merged.equalization_deadline {
            let grace_days = grace_days.clamp(0, MAX_END_DATE_GRACE_DAYS);
            if let Some(end) = equalization.checked_plus_days(grace_days) {
                merged.end_date = Some(end);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryCycleStore;
    use crate::application::handlers::cycle::test_support::*;
    use crate::domain::cycle::{CyclePhase, CycleStatus};
    use crate::domain::foundation::{ErrorCode, Timestamp};

    fn handler(store: Arc<InMemoryCycleStore>) -> ActivateCycleHandler {
        ActivateCycleHandler::new(store, allow_all(), clock_at(day(2024, 12, 20)))
    }

    #[tokio::test]
    async fn activation_closes_previous_open_cycle() {
        let previous = open_cycle("2024.2", q4_2024_schedule());
        let next = upcoming_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([previous.clone(), next.clone()]));

        let activated = handler(store.clone())
            .handle(ActivateCycleCommand::new(next.id()), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(activated.status(), CycleStatus::Open);
        assert_eq!(activated.phase(), CyclePhase::Assessments);
        assert_eq!(activated.version(), next.version() + 1);
        let previous_now = store.find_by_id(&previous.id()).await.unwrap().unwrap();
        assert_eq!(previous_now.status(), CycleStatus::Closed);
        assert_eq!(store.find_open().await.unwrap().unwrap().id(), next.id());
    }

    #[tokio::test]
    async fn end_date_is_derived_from_equalization_deadline() {
        let next = upcoming_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([next.clone()]));
        let cmd = ActivateCycleCommand::new(next.id()).with_overrides(ScheduleOverrides {
            end_date: Some(day(2025, 4, 30)),
            ..Default::default()
        });

        let activated = handler(store)
            .handle(cmd, CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(activated.schedule().end_date, Some(day(2025, 3, 22)));
    }

    #[tokio::test]
    async fn explicit_opt_out_keeps_supplied_end_date() {
        let next = upcoming_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([next.clone()]));
        let cmd = ActivateCycleCommand::new(next.id())
            .with_overrides(ScheduleOverrides {
                end_date: Some(day(2025, 4, 30)),
                ..Default::default()
            })
            .with_auto_set_end_date(false);

        let activated = handler(store)
            .handle(cmd, CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(activated.schedule().end_date, Some(day(2025, 4, 30)));
    }

    #[tokio::test]
    async fn grace_days_are_configurable() {
        let next = upcoming_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([next.clone()]));

        let activated = handler(store)
            .with_end_date_grace_days(10)
            .handle(ActivateCycleCommand::new(next.id()), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(activated.schedule().end_date, Some(day(2025, 3, 25)));
    }

    #[tokio::test]
    async fn out_of_range_grace_days_are_clamped() {
        let next = upcoming_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([next.clone()]));

        let activated = handler(store)
            .with_end_date_grace_days(i64::MAX)
            .handle(ActivateCycleCommand::new(next.id()), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(
            activated.schedule().end_date,
            Some(day(2025, 3, 15).plus_days(MAX_END_DATE_GRACE_DAYS))
        );
    }

    #[test]
    fn derivation_clamps_negative_grace_and_survives_calendar_limit() {
        let schedule = q1_schedule();
        let derived = derive_activation_schedule(
            &schedule,
            &ScheduleOverrides::default(),
            None,
            i64::MIN,
        );
        assert_eq!(derived.end_date, Some(day(2025, 3, 15)));

        let far = Timestamp::from_datetime(chrono::DateTime::<chrono::Utc>::MAX_UTC);
        let edge = CycleSchedule {
            equalization_deadline: Some(far),
            ..CycleSchedule::default()
        };
        let derived = derive_activation_schedule(&edge, &ScheduleOverrides::default(), None, 7);
        assert_eq!(derived.end_date, None);
    }

    #[tokio::test]
    async fn already_open_cycle_is_rejected() {
        let open = open_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([open.clone()]));

        let result = handler(store)
            .handle(ActivateCycleCommand::new(open.id()), CommandMetadata::test_fixture())
            .await;

        assert_eq!(result, Err(CycleError::AlreadyActive(open.id())));
    }

    #[tokio::test]
    async fn missing_cycle_is_not_found() {
        let store = Arc::new(InMemoryCycleStore::new());
        let id = CycleId::new();

        let result = handler(store)
            .handle(ActivateCycleCommand::new(id), CommandMetadata::test_fixture())
            .await;

        assert_eq!(result, Err(CycleError::NotFound(id)));
    }

    #[tokio::test]
    async fn closed_cycle_cannot_be_reactivated() {
        let closed = closed_cycle("2024.1", CycleSchedule::default());
        let store = Arc::new(InMemoryCycleStore::with_cycles([closed.clone()]));

        let err = handler(store)
            .handle(ActivateCycleCommand::new(closed.id()), CommandMetadata::test_fixture())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidCycleState);
    }

    #[tokio::test]
    async fn bad_override_writes_nothing() {
        let previous = open_cycle("2024.2", q4_2024_schedule());
        let next = upcoming_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([previous.clone(), next.clone()]));
        let cmd = ActivateCycleCommand::new(next.id()).with_overrides(ScheduleOverrides {
            manager_deadline: Some(day(2025, 2, 1)),
            ..Default::default()
        });

        let result = handler(store.clone())
            .handle(cmd, CommandMetadata::test_fixture())
            .await;

        assert!(matches!(result, Err(CycleError::InvalidDateOrdering(_))));
        assert_eq!(store.find_open().await.unwrap().unwrap().id(), previous.id());
        assert_eq!(store.find_by_id(&next.id()).await.unwrap(), Some(next));
    }

    #[test]
    fn derivation_without_equalization_deadline_keeps_end_date() {
        let current = CycleSchedule::default()
            .with_start(day(2025, 1, 1))
            .with_end(day(2025, 3, 31));
        let schedule = derive_activation_schedule(&current, &ScheduleOverrides::default(), None, 7);
        assert_eq!(schedule.end_date, Some(day(2025, 3, 31)));
    }

    #[test]
    fn command_deserializes_with_flat_overrides() {
        let id = CycleId::new();
        let json = format!(
            r#"{{"cycle_id":"{}","manager_deadline":"2025-03-05T00:00:00Z","auto_set_end_date":false}}"#,
            id
        );
        let cmd: ActivateCycleCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd.cycle_id, id);
        assert_eq!(cmd.overrides.manager_deadline, Some(day(2025, 3, 5)));
        assert_eq!(cmd.auto_set_end_date, Some(false));
    }
}
