//! Occurrence reconciler: merges engine-generated candidate dates with stored
//! override records into the effective view of a template's occurrences.
//!
//! Reconciliation is a pure read. Status mutation goes through
//! [`crate::store::Store::set_status`], which upserts the single override
//! record for a `(template, date)` pair.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::error::Error;
use crate::fields::Status;
use crate::recur::generate_occurrence_dates;
use crate::store::Store;
use crate::task::{Occurrence, TaskTemplate};

/// Effective occurrences for one template within `[range_start, range_end]`,
/// ascending by date.
///
/// Each candidate date the recurrence rule generates is taken from `overrides`
/// when a stored record exists for it, and synthesized as Pending otherwise.
/// Override records with no matching candidate (say, a completed date from
/// before the template's rule was edited) are surfaced as well; history is
/// never silently dropped.
pub fn effective_occurrences(
    template: &TaskTemplate,
    range_start: NaiveDate,
    range_end: NaiveDate,
    overrides: &[Occurrence],
) -> Result<Vec<Occurrence>, Error> {
    let candidates = generate_occurrence_dates(template, range_start, range_end)?;

    let mut by_date: BTreeMap<NaiveDate, Occurrence> = BTreeMap::new();
    for o in overrides {
        if o.template_id == template.id && o.date >= range_start && o.date <= range_end {
            by_date.insert(o.date, o.clone());
        }
    }
    for date in candidates {
        by_date
            .entry(date)
            .or_insert_with(|| Occurrence::pending(template.id, date));
    }

    Ok(by_date.into_values().collect())
}

/// Pending occurrences falling due within `horizon_days` of `reference_date`,
/// for handoff to a notification collaborator.
///
/// Ordered by date, then priority descending, then title. Delivery mechanics
/// are not this crate's concern.
pub fn due_soon(
    store: &Store,
    reference_date: NaiveDate,
    horizon_days: i64,
) -> Result<Vec<(TaskTemplate, NaiveDate)>, Error> {
    if horizon_days < 0 {
        return Err(Error::InvalidRecurrenceRule(format!(
            "horizon must be non-negative, got {horizon_days}"
        )));
    }
    let window_end = reference_date + Duration::days(horizon_days);

    let mut due = Vec::new();
    for template in &store.templates {
        if !template.active_in(reference_date, window_end) {
            continue;
        }
        let overrides = store.get_overrides(template.id, reference_date, window_end);
        let effective =
            effective_occurrences(template, reference_date, window_end, &overrides)?;
        for occ in effective {
            if occ.status == Status::Pending {
                due.push((template.clone(), occ.date));
            }
        }
    }
    due.sort_by(|(ta, da), (tb, db)| {
        da.cmp(db)
            .then(tb.priority.cmp(&ta.priority))
            .then(ta.title.cmp(&tb.title))
    });
    Ok(due)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Priority, Recurrence, Status};

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
    fn candidates_without_overrides_are_pending() {
        let t = template(1, Recurrence::Daily, "2024-01-01");
        let occs =
            effective_occurrences(&t, date("2024-01-01"), date("2024-01-03"), &[]).unwrap();
        assert_eq!(occs.len(), 3);
        assert!(occs.iter().all(|o| o.status == Status::Pending));
        assert!(occs.iter().all(|o| o.completed_at_utc.is_none()));
    }

    #[test]
    fn stored_override_replaces_synthesized_occurrence() {
        let t = template(1, Recurrence::Daily, "2024-01-01");
        let override_rec = Occurrence {
            template_id: 1,
            date: date("2024-01-02"),
            status: Status::Completed,
            completed_at_utc: Some(1_704_200_000),
        };
        let occs = effective_occurrences(
            &t,
            date("2024-01-01"),
            date("2024-01-03"),
            &[override_rec.clone()],
        )
        .unwrap();
        assert_eq!(occs.len(), 3);
        assert_eq!(occs[1], override_rec);
        assert_eq!(occs[0].status, Status::Pending);
        assert_eq!(occs[2].status, Status::Pending);
    }

    #[test]
    fn orphan_override_is_still_surfaced() {
        // Weekly Mondays, but a completed record exists on a Wednesday (the
        // rule was edited after the fact). The record must survive.
        let t = template(1, Recurrence::Weekly(chrono::Weekday::Mon), "2024-01-01");
        let orphan = Occurrence {
            template_id: 1,
            date: date("2024-01-03"),
            status: Status::Completed,
            completed_at_utc: Some(1_704_300_000),
        };
        let occs = effective_occurrences(
            &t,
            date("2024-01-01"),
            date("2024-01-08"),
            &[orphan.clone()],
        )
        .unwrap();
        assert_eq!(
            occs.iter().map(|o| o.date).collect::<Vec<_>>(),
            vec![date("2024-01-01"), date("2024-01-03"), date("2024-01-08")]
        );
        assert_eq!(occs[1], orphan);
    }

    #[test]
    fn overrides_for_other_templates_are_ignored() {
        let t = template(1, Recurrence::Daily, "2024-01-01");
        let other = Occurrence {
            template_id: 2,
            date: date("2024-01-01"),
            status: Status::Completed,
            completed_at_utc: Some(1),
        };
        let occs =
            effective_occurrences(&t, date("2024-01-01"), date("2024-01-01"), &[other]).unwrap();
        assert_eq!(occs.len(), 1);
        assert_eq!(occs[0].status, Status::Pending);
    }

    #[test]
    fn due_soon_skips_completed_and_skipped_dates() {
        let mut store = Store::default();
        store.templates.push(template(1, Recurrence::Daily, "2024-01-01"));
        store
            .set_status(1, date("2024-01-10"), Status::Completed, 1_704_900_000)
            .unwrap();
        store
            .set_status(1, date("2024-01-11"), Status::Skipped, 1_704_900_000)
            .unwrap();

        let due = due_soon(&store, date("2024-01-10"), 2).unwrap();
        assert_eq!(
            due.iter().map(|(_, d)| *d).collect::<Vec<_>>(),
            vec![date("2024-01-12")]
        );
    }

    #[test]
    fn due_soon_orders_by_date_then_priority() {
        let mut store = Store::default();
        let mut low = template(1, Recurrence::Daily, "2024-01-01");
        low.priority = Priority::Low;
        low.title = "alpha".into();
        let mut high = template(2, Recurrence::Daily, "2024-01-01");
        high.priority = Priority::High;
        high.title = "beta".into();
        store.templates.push(low);
        store.templates.push(high);

        let due = due_soon(&store, date("2024-01-05"), 1).unwrap();
        let order: Vec<(u64, NaiveDate)> = due.iter().map(|(t, d)| (t.id, *d)).collect();
        assert_eq!(
            order,
            vec![
                (2, date("2024-01-05")),
                (1, date("2024-01-05")),
                (2, date("2024-01-06")),
                (1, date("2024-01-06")),
            ]
        );
    }

    #[test]
    fn negative_horizon_is_rejected() {
        let store = Store::default();
        let err = due_soon(&store, date("2024-01-01"), -1).unwrap_err();
        assert!(matches!(err, Error::InvalidRecurrenceRule(_)));
    }
}
