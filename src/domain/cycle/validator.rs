//! Pure validation rules for cycle schedules and transitions.
//!
//! Nothing here touches the store or the clock; the same input always
//! produces the same verdict.

use crate::domain::foundation::{StateMachine, Timestamp};

use super::{CycleError, CyclePhase, CycleSchedule, DateWindow};

/// Checks that present dates are strictly increasing in schedule order.
///
/// Order is `start_date`, `assessment_deadline`, `manager_deadline`,
/// `equalization_deadline`, `end_date`. Absent dates are skipped, so a
/// deadline is still compared against the nearest present neighbours and
/// every deadline ends up inside `[start_date, end_date]`. Fails on the first
/// violation in that order.
pub fn validate_date_consistency(schedule: &CycleSchedule) -> Result<(), CycleError> {
    let ordered: [(&str, Option<Timestamp>); 5] = [
        ("start_date", schedule.start_date),
        ("assessment_deadline", schedule.assessment_deadline),
        ("manager_deadline", schedule.manager_deadline),
        ("equalization_deadline", schedule.equalization_deadline),
        ("end_date", schedule.end_date),
    ];

    let mut previous: Option<(&str, Timestamp)> = None;
    for (field, value) in ordered {
        let Some(at) = value else { continue };
        if let Some((prev_field, prev_at)) = previous {
            if at <= prev_at {
                return Err(CycleError::InvalidDateOrdering(format!(
                    "{} ({}) must be after {} ({})",
                    field, at, prev_field, prev_at
                )));
            }
        }
        previous = Some((field, at));
    }
    Ok(())
}

/// Checks that `requested` is the single phase allowed after `current`.
pub fn validate_phase_transition(
    current: CyclePhase,
    requested: CyclePhase,
) -> Result<(), CycleError> {
    if current.can_transition_to(&requested) {
        Ok(())
    } else {
        Err(CycleError::IllegalPhaseTransition { current, requested })
    }
}

/// Checks that a candidate schedule does not intersect the active window.
///
/// Skipped when the active cycle lacks either end or the candidate has no
/// start date. A candidate without an end date occupies its start instant.
pub fn validate_no_overlap(
    candidate: &CycleSchedule,
    active: &CycleSchedule,
) -> Result<(), CycleError> {
    let Some(active_window) = active.window() else {
        return Ok(());
    };
    let Some(start) = candidate.start_date else {
        return Ok(());
    };
    let candidate_window = DateWindow {
        start,
        end: candidate.end_date.unwrap_or(start),
    };

    if candidate_window.intersects(&active_window) {
        return Err(CycleError::OverlappingWindow {
            candidate: candidate_window,
            active: active_window,
        });
    }
    Ok(())
}
