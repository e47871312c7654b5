//! Recurrence engine: expands a template's rule into concrete dated
//! occurrences within a bounded query window.
//!
//! Generation is a pure function of `(template, range)`: no clock access, no
//! hidden state, identical inputs always yield the identical ascending,
//! duplicate-free date sequence. Date-window helpers (week bounds, month
//! bounds) shared by the calendar and goal aggregators also live here.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::Error;
use crate::fields::Recurrence;
use crate::task::TaskTemplate;

/// Generate the occurrence dates a template's rule produces within
/// `[range_start, range_end]`, ascending.
///
/// Daily/weekly/monthly rules are clipped to the template's active span
/// (`start_date` and, if set, `end_date`). A one-time template emits its
/// `start_date` when the window covers it. A monthly day past the end of a
/// short month is clipped to that month's last valid day, so day 31 in
/// February yields the 28th (29th in a leap year).
pub fn generate_occurrence_dates(
    template: &TaskTemplate,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Result<Vec<NaiveDate>, Error> {
    if range_start > range_end {
        return Err(Error::InvalidRecurrenceRule(format!(
            "range start {range_start} is after range end {range_end}"
        )));
    }
    template.validate()?;

    // One-time tasks ignore end_date: the template is its own occurrence.
    if let Recurrence::None = template.recurrence {
        if template.start_date >= range_start && template.start_date <= range_end {
            return Ok(vec![template.start_date]);
        }
        return Ok(Vec::new());
    }

    let lo = range_start.max(template.start_date);
    let hi = match template.end_date {
        Some(end) => range_end.min(end),
        None => range_end,
    };
    if lo > hi {
        return Ok(Vec::new());
    }

    let mut dates = Vec::new();
    match template.recurrence {
        Recurrence::None => unreachable!("one-time handled above"),
        Recurrence::Daily => {
            let mut d = lo;
            while d <= hi {
                dates.push(d);
                d += Duration::days(1);
            }
        }
        Recurrence::Weekly(weekday) => {
            let ahead = (weekday.num_days_from_monday() + 7
                - lo.weekday().num_days_from_monday())
                % 7;
            let mut d = lo + Duration::days(ahead as i64);
            while d <= hi {
                dates.push(d);
                d += Duration::days(7);
            }
        }
        Recurrence::Monthly(day) => {
            let (mut year, mut month) = (lo.year(), lo.month());
            loop {
                let first = NaiveDate::from_ymd_opt(year, month, 1)
                    .ok_or_else(|| Error::InvalidRecurrenceRule("date out of range".into()))?;
                if first > hi {
                    break;
                }
                // Clip to the last valid day of a shorter month.
                let date = NaiveDate::from_ymd_opt(year, month, day)
                    .or_else(|| last_day_of_month(year, month))
                    .ok_or_else(|| Error::InvalidRecurrenceRule("date out of range".into()))?;
                if date >= lo && date <= hi {
                    dates.push(date);
                }
                (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
            }
        }
    }
    Ok(dates)
}

/// Last day of the given calendar month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(first_of_next - Duration::days(1))
}

/// First and last day of the given calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = last_day_of_month(year, month)?;
    Some((first, last))
}

/// Start and end of the ISO week (Monday to Sunday) containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = date.weekday().num_days_from_monday() as i64;
    let start = date - Duration::days(weekday);
    (start, start + Duration::days(6))
}
