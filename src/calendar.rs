//! Calendar aggregator: groups effective occurrences by date over a month.
//!
//! Every date of the month is present as a key, with an empty list where
//! nothing falls due. That keeps the rendering contract trivial for whatever
//! consumes the view.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};

use crate::error::Error;
use crate::recur::month_bounds;
use crate::reconcile::effective_occurrences;
use crate::store::Store;
use crate::task::Occurrence;

/// Effective occurrences for every day of the given month, keyed by date.
///
/// Each day's occurrences are sorted by priority descending, then template
/// title. Reconciliation runs per template, so stored history (including
/// orphan overrides from since-edited rules) is surfaced alongside generated
/// candidates.
pub fn calendar_view(
    store: &Store,
    year: i32,
    month: u32,
) -> Result<BTreeMap<NaiveDate, Vec<Occurrence>>, Error> {
    let (first, last) = month_bounds(year, month).ok_or_else(|| {
        Error::InvalidRecurrenceRule(format!("invalid calendar month {year}-{month:02}"))
    })?;

    let mut days: BTreeMap<NaiveDate, Vec<Occurrence>> = BTreeMap::new();
    let mut d = first;
    while d <= last {
        days.insert(d, Vec::new());
        d += Duration::days(1);
    }

    for template in &store.templates {
        let overrides = store.get_overrides(template.id, first, last);
        for occ in effective_occurrences(template, first, last, &overrides)? {
            days.entry(occ.date).or_default().push(occ);
        }
    }

    let by_id: HashMap<u64, _> = store.templates.iter().map(|t| (t.id, t)).collect();
    for occs in days.values_mut() {
        occs.sort_by(|a, b| {
            let ta = by_id.get(&a.template_id);
            let tb = by_id.get(&b.template_id);
            let pa = ta.map(|t| t.priority);
            let pb = tb.map(|t| t.priority);
            pb.cmp(&pa)
                .then_with(|| ta.map(|t| t.title.as_str()).cmp(&tb.map(|t| t.title.as_str())))
        });
    }

    Ok(days)
}
