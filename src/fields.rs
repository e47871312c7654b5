//! Enumerations and field types for the task dashboard.
//!
//! This module defines the closed data types used to categorise tasks:
//! priority levels, recurrence rules, occurrence status values, and
//! goal-tracking periods.

use chrono::Weekday;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority classification for task importance.
///
/// Ordered so that `High > Medium > Low`, which lets calendar views sort
/// occurrences by descending priority directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
}

/// How (and whether) a task template repeats.
///
/// `Weekly` carries the target weekday; `Monthly` carries the target day of
/// month (1–31). A day of month past the end of a short month is clipped to
/// that month's last valid day when occurrences are generated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Recurrence {
    None,
    Daily,
    Weekly(Weekday),
    Monthly(u32),
}

/// Completion status of a single dated occurrence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Completed")]
    Completed,
    #[serde(alias = "Skipped")]
    Skipped,
}

/// Aggregation window for goal progress.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GoalPeriod {
    Weekly,
    Monthly,
}

/// Recurrence kind selector for CLI arguments. The payload (weekday or day
/// of month) is passed as a separate flag.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RecurKind {
    None,
    Daily,
    Weekly,
    Monthly,
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
    }
}

/// Format an occurrence status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Pending => "Pending",
        Status::Completed => "Completed",
        Status::Skipped => "Skipped",
    }
}

/// Format a recurrence rule for display, e.g. `"weekly (Mon)"`.
pub fn format_recurrence(r: Recurrence) -> String {
    match r {
        Recurrence::None => "one-time".into(),
        Recurrence::Daily => "daily".into(),
        Recurrence::Weekly(wd) => format!("weekly ({wd})"),
        Recurrence::Monthly(day) => format!("monthly (day {day})"),
    }
}

/// Format a goal period for display.
pub fn format_period(p: GoalPeriod) -> &'static str {
    match p {
        GoalPeriod::Weekly => "Weekly",
        GoalPeriod::Monthly => "Monthly",
    }
}
