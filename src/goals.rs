//! Goal progress: completed-vs-total ratios over weekly and monthly windows,
//! plus the dashboard status counts.
//!
//! Windows are derived from an explicit reference date, never from the clock,
//! so every query here is deterministic and testable.

use chrono::{Datelike, NaiveDate};

use crate::error::Error;
use crate::fields::{GoalPeriod, Status};
use crate::recur::{month_bounds, week_bounds};
use crate::reconcile::effective_occurrences;
use crate::store::Store;

/// Completed-vs-total occurrence counts for a goal window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// `completed / total`, or `0.0` when the window holds no occurrences.
    pub ratio: f64,
}

/// Progress against a stored goal target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub target: u32,
    pub completed: usize,
    /// `completed / target`, capped at `1.0`.
    pub ratio: f64,
}

/// The window a goal period spans around `reference_date`: Monday–Sunday for
/// weekly, the full calendar month for monthly.
pub fn period_window(
    period: GoalPeriod,
    reference_date: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), Error> {
    match period {
        GoalPeriod::Weekly => Ok(week_bounds(reference_date)),
        GoalPeriod::Monthly => month_bounds(reference_date.year(), reference_date.month())
            .ok_or_else(|| Error::InvalidRecurrenceRule("date out of range".into())),
    }
}

/// Completed-vs-total ratio over the period window containing
/// `reference_date`, across all templates.
pub fn progress(
    store: &Store,
    period: GoalPeriod,
    reference_date: NaiveDate,
) -> Result<Progress, Error> {
    let (window_start, window_end) = period_window(period, reference_date)?;

    let mut completed = 0;
    let mut total = 0;
    for template in &store.templates {
        let overrides = store.get_overrides(template.id, window_start, window_end);
        for occ in effective_occurrences(template, window_start, window_end, &overrides)? {
            total += 1;
            if occ.status == Status::Completed {
                completed += 1;
            }
        }
    }

    // A window with nothing scheduled is 0.0 by policy, not an error.
    let ratio = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    };
    Ok(Progress { completed, total, ratio })
}

/// Progress against the stored target for `period`, if one is set.
pub fn goal_progress(
    store: &Store,
    period: GoalPeriod,
    reference_date: NaiveDate,
) -> Result<Option<GoalProgress>, Error> {
    let Some(goal) = store.goal(period) else {
        return Ok(None);
    };
    let target = goal.target_count;
    let completed = progress(store, period, reference_date)?.completed;
    let ratio = if target == 0 {
        0.0
    } else {
        (completed as f64 / target as f64).min(1.0)
    };
    Ok(Some(GoalProgress { target, completed, ratio }))
}

/// Occurrence counts by status over `[range_start, range_end]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub completed: usize,
    pub skipped: usize,
    /// Pending occurrences dated before the reference date.
    pub overdue: usize,
}

/// Dashboard counts over a window, with overdue measured against
/// `reference_date`.
pub fn status_counts(
    store: &Store,
    range_start: NaiveDate,
    range_end: NaiveDate,
    reference_date: NaiveDate,
) -> Result<StatusCounts, Error> {
    let mut counts = StatusCounts::default();
    for template in &store.templates {
        let overrides = store.get_overrides(template.id, range_start, range_end);
        for occ in effective_occurrences(template, range_start, range_end, &overrides)? {
            match occ.status {
                Status::Pending => {
                    counts.pending += 1;
                    if occ.date < reference_date {
                        counts.overdue += 1;
                    }
                }
                Status::Completed => counts.completed += 1,
                Status::Skipped => counts.skipped += 1,
            }
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Priority, Recurrence};
    use crate::task::TaskTemplate;
    use chrono::Weekday;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn template(id: u64, recurrence: Recurrence, start: &str) -> TaskTemplate {
        TaskTemplate {
            id,
            title: format!("task {id}"),
            description: None,
            priority: Priority::Medium,
            recurrence,
            start_date: date(start),
            end_date: None,
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    #[test]
    fn empty_window_yields_zero_ratio_not_an_error() {
        let store = Store::default();
        let p = progress(&store, GoalPeriod::Weekly, date("2024-01-10")).unwrap();
        assert_eq!(p.total, 0);
        assert_eq!(p.completed, 0);
        assert_eq!(p.ratio, 0.0);
    }

    #[test]
    fn weekly_window_scenario_end_to_end() {
        // Weekly Mondays from 2024-01-01; completing Jan 8 makes the week of
        // Jan 10 fully done (the 8th is the only occurrence in that window).
        let mut store = Store::default();
        store
            .templates
            .push(template(1, Recurrence::Weekly(Weekday::Mon), "2024-01-01"));
        store
            .set_status(1, date("2024-01-08"), Status::Completed, 1_704_700_000)
            .unwrap();

        let p = progress(&store, GoalPeriod::Weekly, date("2024-01-10")).unwrap();
        assert_eq!(p.completed, 1);
        assert_eq!(p.total, 1);
        assert_eq!(p.ratio, 1.0);
    }

    #[test]
    fn monthly_window_counts_the_whole_month() {
        let mut store = Store::default();
        store.templates.push(template(1, Recurrence::Daily, "2024-01-01"));
        store
            .set_status(1, date("2024-04-01"), Status::Completed, 1_711_900_000)
            .unwrap();
        let p = progress(&store, GoalPeriod::Monthly, date("2024-04-15")).unwrap();
        assert_eq!(p.total, 30);
        assert_eq!(p.completed, 1);
        assert!((p.ratio - 1.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn period_windows_match_reference_date() {
        let (ws, we) = period_window(GoalPeriod::Weekly, date("2024-01-10")).unwrap();
        assert_eq!((ws, we), (date("2024-01-08"), date("2024-01-14")));
        let (ms, me) = period_window(GoalPeriod::Monthly, date("2024-02-10")).unwrap();
        assert_eq!((ms, me), (date("2024-02-01"), date("2024-02-29")));
    }

    #[test]
    fn goal_progress_caps_ratio_at_one() {
        let mut store = Store::default();
        store.templates.push(template(1, Recurrence::Daily, "2024-01-01"));
        store.set_goal(GoalPeriod::Weekly, 2);
        for day in ["2024-01-08", "2024-01-09", "2024-01-10"] {
            store
                .set_status(1, date(day), Status::Completed, 1_704_700_000)
                .unwrap();
        }
        let gp = goal_progress(&store, GoalPeriod::Weekly, date("2024-01-10"))
            .unwrap()
            .unwrap();
        assert_eq!(gp.target, 2);
        assert_eq!(gp.completed, 3);
        assert_eq!(gp.ratio, 1.0);
    }

    #[test]
    fn goal_progress_is_none_without_a_stored_goal() {
        let store = Store::default();
        let gp = goal_progress(&store, GoalPeriod::Monthly, date("2024-01-10")).unwrap();
        assert!(gp.is_none());
    }

    #[test]
    fn status_counts_track_overdue_pending() {
        let mut store = Store::default();
        store.templates.push(template(1, Recurrence::Daily, "2024-01-01"));
        store
            .set_status(1, date("2024-01-02"), Status::Completed, 1_704_200_000)
            .unwrap();
        store
            .set_status(1, date("2024-01-03"), Status::Skipped, 1_704_200_000)
            .unwrap();

        let counts =
            status_counts(&store, date("2024-01-01"), date("2024-01-05"), date("2024-01-04"))
                .unwrap();
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.pending, 3);
        // Jan 1 is pending and before the reference date; Jan 4/5 are not.
        assert_eq!(counts.overdue, 1);
    }
}
