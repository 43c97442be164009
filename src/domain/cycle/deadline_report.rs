//! Deadline report - read-only view of how close each phase deadline is.
//!
//! Building a report never fails. A stored schedule that violates the date
//! ordering rules is surfaced in `inconsistencies` instead.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CycleId, Timestamp};

use super::validator::validate_date_consistency;
use super::{Cycle, CyclePhase};

/// Days-until threshold at or below which a deadline is urgent.
pub const URGENT_WITHIN_DAYS: i64 = 3;

/// Urgency tag of a single deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeadlineStatus {
    Overdue,
    Urgent,
    Ok,
}

impl DeadlineStatus {
    pub fn from_days_until(days_until: i64) -> Self {
        if days_until < 0 {
            DeadlineStatus::Overdue
        } else if days_until <= URGENT_WITHIN_DAYS {
            DeadlineStatus::Urgent
        } else {
            DeadlineStatus::Ok
        }
    }
}

/// One deadline line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineEntry {
    /// Phase whose end this deadline marks.
    pub phase: CyclePhase,
    pub deadline: Timestamp,
    pub days_until: i64,
    pub status: DeadlineStatus,
}

/// Deadlines of one cycle relative to a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineReport {
    pub cycle_id: CycleId,
    pub generated_at: Timestamp,
    pub deadlines: Vec<DeadlineEntry>,
    pub inconsistencies: Vec<String>,
}

impl DeadlineReport {
    /// Builds the report for `cycle` as seen at `now`.
    pub fn build(cycle: &Cycle, now: Timestamp) -> Self {
        let schedule = cycle.schedule();
        let deadlines = [
            (CyclePhase::Assessments, schedule.assessment_deadline),
            (CyclePhase::ManagerReviews, schedule.manager_deadline),
            (CyclePhase::Equalization, schedule.equalization_deadline),
        ]
        .into_iter()
        .filter_map(|(phase, deadline)| {
            let deadline = deadline?;
            let days_until = now.days_until(&deadline);
            Some(DeadlineEntry {
                phase,
                deadline,
                days_until,
                status: DeadlineStatus::from_days_until(days_until),
            })
        })
        .collect();

        let inconsistencies = match validate_date_consistency(schedule) {
            Ok(()) => Vec::new(),
            Err(err) => vec![err.to_string()],
        };

        Self {
            cycle_id: cycle.id(),
            generated_at: now,
            deadlines,
            inconsistencies,
        }
    }

    /// Returns true if any present deadline has passed.
    pub fn has_overdue(&self) -> bool {
        self.deadlines
            .iter()
            .any(|d| d.status == DeadlineStatus::Overdue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::{CycleName, CycleSchedule, CycleStatus};

    fn day(m: u32, d: u32) -> Timestamp {
        Timestamp::from_ymd(2025, m, d).unwrap()
    }

    fn cycle_with(schedule: CycleSchedule) -> Cycle {
        Cycle::reconstitute(
            CycleId::new(),
            CycleName::new("2025.1").unwrap(),
            CycleStatus::Open,
            CyclePhase::Assessments,
            schedule,
            3,
            day(1, 1),
            day(1, 1),
        )
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(DeadlineStatus::from_days_until(-1), DeadlineStatus::Overdue);
        assert_eq!(DeadlineStatus::from_days_until(0), DeadlineStatus::Urgent);
        assert_eq!(DeadlineStatus::from_days_until(3), DeadlineStatus::Urgent);
        assert_eq!(DeadlineStatus::from_days_until(4), DeadlineStatus::Ok);
    }

    #[test]
    fn reports_each_present_deadline_in_phase_order() {
        let schedule = CycleSchedule::default()
            .with_start(day(1, 1))
            .with_end(day(3, 31))
            .with_deadlines(day(2, 15), day(3, 1), day(3, 15));
        let report = DeadlineReport::build(&cycle_with(schedule), day(2, 13));

        assert_eq!(report.deadlines.len(), 3);
        assert_eq!(report.deadlines[0].phase, CyclePhase::Assessments);
        assert_eq!(report.deadlines[0].days_until, 2);
        assert_eq!(report.deadlines[0].status, DeadlineStatus::Urgent);
        assert_eq!(report.deadlines[1].days_until, 16);
        assert_eq!(report.deadlines[1].status, DeadlineStatus::Ok);
        assert!(report.inconsistencies.is_empty());
        assert!(!report.has_overdue());
    }

    #[test]
    fn past_deadline_is_overdue() {
        let schedule = CycleSchedule {
            assessment_deadline: Some(day(2, 15)),
            ..Default::default()
        };
        let report = DeadlineReport::build(&cycle_with(schedule), day(2, 17));
        assert_eq!(report.deadlines[0].days_until, -2);
        assert!(report.has_overdue());
    }

    #[test]
    fn missing_deadlines_are_omitted() {
        let report = DeadlineReport::build(&cycle_with(CycleSchedule::default()), day(2, 1));
        assert!(report.deadlines.is_empty());
        assert!(report.inconsistencies.is_empty());
    }

    #[test]
    fn bad_stored_dates_are_reported_not_raised() {
        let schedule = CycleSchedule {
            start_date: Some(day(3, 1)),
            assessment_deadline: Some(day(2, 15)),
            ..Default::default()
        };
        let report = DeadlineReport::build(&cycle_with(schedule), day(2, 1));
        assert_eq!(report.deadlines.len(), 1);
        assert_eq!(report.inconsistencies.len(), 1);
        assert!(report.inconsistencies[0].contains("assessment_deadline"));
    }
}
