//! Task template and occurrence data structures.
//!
//! A `TaskTemplate` is the stored definition of a one-off or recurring task.
//! An `Occurrence` is a single dated instance of a template: synthesized as
//! Pending by the recurrence engine, and persisted only when the user deviates
//! from the generated state (completing, skipping or reopening a date).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::fields::{GoalPeriod, Priority, Recurrence, Status};

/// A stored task definition, including its recurrence rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub recurrence: Recurrence,
    /// First date the template is active.
    pub start_date: NaiveDate,
    /// Last active date; `None` means the recurrence is unbounded. The engine
    /// only ever materializes occurrences inside a bounded query window.
    pub end_date: Option<NaiveDate>,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

impl TaskTemplate {
    /// Check the template's field invariants.
    ///
    /// A monthly day of month must be in 1–31 and `end_date`, when set, must
    /// not precede `start_date`. Violations are reported, never corrected.
    pub fn validate(&self) -> Result<(), Error> {
        if let Recurrence::Monthly(day) = self.recurrence {
            if !(1..=31).contains(&day) {
                return Err(Error::InvalidRecurrenceRule(format!(
                    "day of month must be 1-31, got {day}"
                )));
            }
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(Error::InvalidRecurrenceRule(format!(
                    "end date {end} precedes start date {}",
                    self.start_date
                )));
            }
        }
        Ok(())
    }

    /// Whether the template's active span overlaps `[range_start, range_end]`.
    pub fn active_in(&self, range_start: NaiveDate, range_end: NaiveDate) -> bool {
        self.start_date <= range_end && self.end_date.map_or(true, |end| end >= range_start)
    }

    /// Whether `date` falls inside the template's active span.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }
}

/// A single dated instance of a template.
///
/// At most one record is ever stored per `(template_id, date)` pair; a stored
/// record is an override of the engine-generated Pending state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occurrence {
    pub template_id: u64,
    pub date: NaiveDate,
    pub status: Status,
    /// Set iff `status` is `Completed`.
    pub completed_at_utc: Option<i64>,
}

impl Occurrence {
    /// Synthesize the default (Pending, never persisted) occurrence for a
    /// generated candidate date.
    pub fn pending(template_id: u64, date: NaiveDate) -> Self {
        Occurrence {
            template_id,
            date,
            status: Status::Pending,
            completed_at_utc: None,
        }
    }
}

/// A stored completion target for a goal period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Goal {
    pub period: GoalPeriod,
    pub target_count: u32,
}
