//! Error taxonomy for the engine and store operations.
//!
//! Failures are surfaced synchronously to the caller and never corrected or
//! swallowed; a silently miscalculated recurrence would corrupt every
//! downstream calendar and goal view.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Malformed template fields or query bounds: a day of month outside
    /// 1–31, an inverted date range, a negative horizon.
    #[error("invalid recurrence rule: {0}")]
    InvalidRecurrenceRule(String),

    /// An operation referenced a template id that does not exist.
    #[error("template {0} not found")]
    TemplateNotFound(u64),

    /// A status change targeted a date outside the template's active span.
    #[error("invalid status transition for template {template_id} on {date}: {reason}")]
    InvalidStatusTransition {
        template_id: u64,
        date: NaiveDate,
        reason: String,
    },
}
