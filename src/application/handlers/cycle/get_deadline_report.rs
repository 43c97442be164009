//! GetDeadlineReportHandler - Query handler for the deadline report.
//!
//! Only a missing cycle or a store failure is an error. Bad stored dates
//! show up in the report's `inconsistencies` list.

use std::sync::Arc;

use tracing::warn;

use crate::domain::cycle::{CycleError, DeadlineReport};
use crate::domain::foundation::CycleId;
use crate::ports::{Clock, CycleStore};

/// Query for one cycle's deadline report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDeadlineReportQuery {
    pub cycle_id: CycleId,
}

/// Handler for deadline reports.
pub struct GetDeadlineReportHandler {
    store: Arc<dyn CycleStore>,
    clock: Arc<dyn Clock>,
}

impl GetDeadlineReportHandler {
    pub fn new(store: Arc<dyn CycleStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn handle(&self, query: GetDeadlineReportQuery) -> Result<DeadlineReport, CycleError> {
        let cycle = self
            .store
            .find_by_id(&query.cycle_id)
            .await?
            .ok_or(CycleError::NotFound(query.cycle_id))?;

        let report = DeadlineReport::build(&cycle, self.clock.now());
        for issue in &report.inconsistencies {
            warn!(cycle_id = %cycle.id(), issue = %issue, "Stored cycle schedule is inconsistent");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryCycleStore;
    use crate::application::handlers::cycle::test_support::*;
    use crate::domain::cycle::{CyclePhase, CycleSchedule, DeadlineStatus};

    #[tokio::test]
    async fn tags_each_present_deadline() {
        let open = open_cycle("2025.1", q1_schedule());
        let store = Arc::new(InMemoryCycleStore::with_cycles([open.clone()]));
        let handler = GetDeadlineReportHandler::new(store, clock_at(day(2025, 2, 26)));

        let report = handler
            .handle(GetDeadlineReportQuery { cycle_id: open.id() })
            .await
            .unwrap();

        let tags: Vec<(CyclePhase, i64, DeadlineStatus)> = report
            .deadlines
            .iter()
            .map(|d| (d.phase, d.days_until, d.status))
            .collect();
        assert_eq!(
            tags,
            vec![
                (CyclePhase::Assessments, -11, DeadlineStatus::Overdue),
                (CyclePhase::ManagerReviews, 3, DeadlineStatus::Urgent),
                (CyclePhase::Equalization, 17, DeadlineStatus::Ok),
            ]
        );
        assert!(report.inconsistencies.is_empty());
        assert_eq!(report.generated_at, day(2025, 2, 26));
    }

    #[tokio::test]
    async fn stored_bad_dates_are_reported_not_raised() {
        let bad = CycleSchedule::default()
            .with_start(day(2025, 3, 1))
            .with_deadlines(day(2025, 2, 15), day(2025, 3, 10), day(2025, 3, 20));
        let cycle = upcoming_cycle("legacy", bad);
        let store = Arc::new(InMemoryCycleStore::with_cycles([cycle.clone()]));
        let handler = GetDeadlineReportHandler::new(store, clock_at(day(2025, 1, 1)));

        let report = handler
            .handle(GetDeadlineReportQuery { cycle_id: cycle.id() })
            .await
            .unwrap();

        assert_eq!(report.deadlines.len(), 3);
        assert_eq!(report.inconsistencies.len(), 1);
        assert!(report.inconsistencies[0].contains("assessment_deadline"));
    }

    #[tokio::test]
    async fn missing_cycle_is_not_found() {
        let handler = GetDeadlineReportHandler::new(
            Arc::new(InMemoryCycleStore::new()),
            clock_at(day(2025, 1, 1)),
        );
        let id = CycleId::new();

        let result = handler.handle(GetDeadlineReportQuery { cycle_id: id }).await;
        assert_eq!(result, Err(CycleError::NotFound(id)));
    }
}
