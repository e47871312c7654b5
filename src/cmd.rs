//! Command implementations for the CLI interface.
//!
//! This module contains all the command handlers, from template CRUD through
//! the calendar, goal-progress and due-soon queries. Handlers are the only
//! place the clock is read; everything below them takes explicit dates.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Datelike, Duration, Local, NaiveDate, Utc, Weekday};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::calendar::calendar_view;
use crate::cli::Cli;
use crate::fields::*;
use crate::goals::{goal_progress, period_window, progress, status_counts};
use crate::reconcile::{due_soon, effective_occurrences};
use crate::store::{parse_date_input, Store};
use crate::task::TaskTemplate;

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task template.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Recurrence kind: none | daily | weekly | monthly.
        #[arg(long, value_enum, default_value_t = RecurKind::None)]
        recur: RecurKind,
        /// Weekday for weekly recurrence, e.g. "mon" or "monday".
        #[arg(long)]
        weekday: Option<String>,
        /// Day of month (1-31) for monthly recurrence.
        #[arg(long)]
        day_of_month: Option<u32>,
        /// First active date: YYYY-MM-DD, "today", "tomorrow", or "in Nd". Defaults to today.
        #[arg(long)]
        start: Option<String>,
        /// Last active date; omit for an unbounded recurrence.
        #[arg(long)]
        end: Option<String>,
    },

    /// List task templates.
    List {
        /// Only show templates active on this date.
        #[arg(long)]
        active: Option<String>,
    },

    /// View a template and its upcoming occurrences.
    View {
        /// Template ID.
        id: u64,
        /// How many days ahead to preview.
        #[arg(long, default_value_t = 14)]
        ahead: u32,
    },

    /// Update fields on a template.
    Update {
        /// Template ID.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// New recurrence kind (pair with --weekday / --day-of-month).
        #[arg(long, value_enum)]
        recur: Option<RecurKind>,
        #[arg(long)]
        weekday: Option<String>,
        #[arg(long)]
        day_of_month: Option<u32>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Clear the end date (make the recurrence unbounded).
        #[arg(long)]
        clear_end: bool,
    },

    /// Delete a template and all its occurrence records.
    Delete {
        /// Template ID.
        id: u64,
    },

    /// Mark an occurrence completed.
    Complete {
        /// Template ID.
        id: u64,
        /// Occurrence date. Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Mark an occurrence skipped.
    Skip {
        /// Template ID.
        id: u64,
        /// Occurrence date. Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Reset an occurrence back to pending.
    Reopen {
        /// Template ID.
        id: u64,
        /// Occurrence date. Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the effective tasks for a single day.
    Day {
        /// Date to show. Defaults to today.
        date: Option<String>,
    },

    /// Show a month of tasks grouped by date.
    Calendar {
        /// Month as YYYY-MM. Defaults to the current month.
        month: Option<String>,
    },

    /// Show completed-vs-total progress for a goal window.
    Progress {
        /// Goal period: weekly | monthly.
        #[arg(value_enum, default_value_t = GoalPeriod::Weekly)]
        period: GoalPeriod,
        /// Reference date inside the window. Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Set a completion target for a goal period.
    Goal {
        /// Goal period: weekly | monthly.
        #[arg(value_enum)]
        period: GoalPeriod,
        /// Target number of completed tasks for the window.
        target: u32,
    },

    /// Show pending/completed/overdue counts for the current month.
    Stats {
        /// Reference date. Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// List pending occurrences falling due soon (notification feed).
    Due {
        /// Reference date. Defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// Horizon in days beyond the reference date.
        #[arg(long, default_value_t = 1)]
        horizon: i64,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Resolve a CLI date argument, defaulting to `today`, exiting on bad input.
fn resolve_date(input: Option<String>, today: NaiveDate) -> NaiveDate {
    match input {
        None => today,
        Some(s) => match parse_date_input(&s, today) {
            Some(d) => d,
            None => {
                eprintln!("Unrecognised date '{s}'. Use YYYY-MM-DD, today, tomorrow, or 'in Nd'.");
                std::process::exit(1);
            }
        },
    }
}

/// Build a recurrence rule from the CLI kind + payload flags.
fn resolve_recurrence(
    kind: RecurKind,
    weekday: Option<String>,
    day_of_month: Option<u32>,
) -> Recurrence {
    match kind {
        RecurKind::None => Recurrence::None,
        RecurKind::Daily => Recurrence::Daily,
        RecurKind::Weekly => {
            let Some(raw) = weekday else {
                eprintln!("Weekly recurrence needs --weekday (e.g. --weekday mon).");
                std::process::exit(1);
            };
            match raw.parse::<Weekday>() {
                Ok(wd) => Recurrence::Weekly(wd),
                Err(_) => {
                    eprintln!("Unrecognised weekday '{raw}'.");
                    std::process::exit(1);
                }
            }
        }
        RecurKind::Monthly => {
            let Some(day) = day_of_month else {
                eprintln!("Monthly recurrence needs --day-of-month (1-31).");
                std::process::exit(1);
            };
            Recurrence::Monthly(day)
        }
    }
}

fn persist(store: &Store, path: &Path) {
    if let Err(e) = store.save(path) {
        eprintln!("Failed to save store: {e}");
        std::process::exit(1);
    }
}

/// Add a new task template.
pub fn cmd_add(
    store: &mut Store,
    path: &Path,
    title: String,
    desc: Option<String>,
    priority: Priority,
    recur: RecurKind,
    weekday: Option<String>,
    day_of_month: Option<u32>,
    start: Option<String>,
    end: Option<String>,
) {
    let today = Local::now().date_naive();
    let start_date = resolve_date(start, today);
    let end_date = end.map(|s| resolve_date(Some(s), today));
    let recurrence = resolve_recurrence(recur, weekday, day_of_month);
    let now_utc = Utc::now().timestamp();

    let template = TaskTemplate {
        id: 0,
        title,
        description: desc,
        priority,
        recurrence,
        start_date,
        end_date,
        created_at_utc: now_utc,
        updated_at_utc: now_utc,
    };
    match store.create_template(template) {
        Ok(id) => {
            let t = store.get(id).expect("just created");
            println!("Added task {id}: {} ({})", t.title, format_recurrence(t.recurrence));
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
    persist(store, path);
}

/// List templates in a formatted table.
pub fn cmd_list(store: &Store, active: Option<String>) {
    let today = Local::now().date_naive();
    let templates: Vec<&TaskTemplate> = match active {
        Some(s) => store.list_templates(resolve_date(Some(s), today)),
        None => store.templates.iter().collect(),
    };
    println!(
        "{:<5} {:<8} {:<18} {:<12} {:<12} Title",
        "ID", "Pri", "Recurrence", "Start", "End"
    );
    for t in templates {
        let end = t.end_date.map_or("-".to_string(), |d| d.to_string());
        println!(
            "{:<5} {:<8} {:<18} {:<12} {:<12} {}",
            t.id,
            format_priority(t.priority),
            format_recurrence(t.recurrence),
            t.start_date.to_string(),
            end,
            t.title
        );
    }
}

/// View one template plus its upcoming occurrences.
pub fn cmd_view(store: &Store, id: u64, ahead: u32) {
    let Some(t) = store.get(id) else {
        eprintln!("Template {id} not found");
        std::process::exit(1);
    };
    println!("Task {}: {}", t.id, t.title);
    if let Some(desc) = &t.description {
        println!("  Description: {desc}");
    }
    println!("  Priority:   {}", format_priority(t.priority));
    println!("  Recurrence: {}", format_recurrence(t.recurrence));
    println!("  Start:      {}", t.start_date);
    if let Some(end) = t.end_date {
        println!("  End:        {end}");
    }

    let today = Local::now().date_naive();
    let until = today + Duration::days(ahead as i64);
    let overrides = store.get_overrides(id, today, until);
    match effective_occurrences(t, today, until, &overrides) {
        Ok(occs) if occs.is_empty() => println!("  No occurrences in the next {ahead} days."),
        Ok(occs) => {
            println!("  Next {ahead} days:");
            for o in occs {
                println!("    {}  {}", o.date, format_status(o.status));
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Update fields on a template.
pub fn cmd_update(
    store: &mut Store,
    path: &Path,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    priority: Option<Priority>,
    recur: Option<RecurKind>,
    weekday: Option<String>,
    day_of_month: Option<u32>,
    start: Option<String>,
    end: Option<String>,
    clear_end: bool,
) {
    let today = Local::now().date_naive();
    let recurrence = recur.map(|kind| resolve_recurrence(kind, weekday, day_of_month));
    let start_date = start.map(|s| resolve_date(Some(s), today));
    let end_date = end.map(|s| resolve_date(Some(s), today));

    let result = store.update_template(id, Utc::now().timestamp(), |t| {
        if let Some(v) = title {
            t.title = v;
        }
        if let Some(v) = desc {
            t.description = Some(v);
        }
        if let Some(v) = priority {
            t.priority = v;
        }
        if let Some(v) = recurrence {
            t.recurrence = v;
        }
        if let Some(v) = start_date {
            t.start_date = v;
        }
        if let Some(v) = end_date {
            t.end_date = Some(v);
        }
        if clear_end {
            t.end_date = None;
        }
    });
    match result {
        Ok(()) => println!("Updated task {id}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
    persist(store, path);
}

/// Delete a template, cascading into its occurrence records.
pub fn cmd_delete(store: &mut Store, path: &Path, id: u64) {
    match store.delete_template(id) {
        Ok(()) => println!("Deleted task {id} and its occurrence history"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
    persist(store, path);
}

/// Set the status of one occurrence (complete / skip / reopen).
pub fn cmd_set_status(store: &mut Store, path: &Path, id: u64, date: Option<String>, status: Status) {
    let today = Local::now().date_naive();
    let date = resolve_date(date, today);
    match store.set_status(id, date, status, Utc::now().timestamp()) {
        Ok(occ) => println!("Task {id} on {}: {}", occ.date, format_status(occ.status)),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
    persist(store, path);
}

/// Show the effective tasks for a single day.
pub fn cmd_day(store: &Store, date: Option<String>) {
    let today = Local::now().date_naive();
    let date = resolve_date(date, today);
    let by_id: HashMap<u64, &TaskTemplate> = store.templates.iter().map(|t| (t.id, t)).collect();

    let mut rows = Vec::new();
    for t in &store.templates {
        let overrides = store.get_overrides(t.id, date, date);
        match effective_occurrences(t, date, date, &overrides) {
            Ok(occs) => rows.extend(occs),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
    rows.sort_by(|a, b| {
        let pa = by_id.get(&a.template_id).map(|t| t.priority);
        let pb = by_id.get(&b.template_id).map(|t| t.priority);
        pb.cmp(&pa)
    });

    println!("Tasks for {date}:");
    if rows.is_empty() {
        println!("  (none)");
        return;
    }
    for o in rows {
        let title = by_id.get(&o.template_id).map_or("?", |t| t.title.as_str());
        let pri = by_id
            .get(&o.template_id)
            .map_or("-", |t| format_priority(t.priority));
        println!("  [{:<9}] {:<7} {}", format_status(o.status), pri, title);
    }
}

/// Show a month of tasks grouped by date.
pub fn cmd_calendar(store: &Store, month: Option<String>) {
    let today = Local::now().date_naive();
    let (year, month) = match month {
        None => (today.year(), today.month()),
        Some(s) => match parse_month(&s) {
            Some(ym) => ym,
            None => {
                eprintln!("Unrecognised month '{s}'. Use YYYY-MM.");
                std::process::exit(1);
            }
        },
    };

    let view = match calendar_view(store, year, month) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let by_id: HashMap<u64, &TaskTemplate> = store.templates.iter().map(|t| (t.id, t)).collect();

    println!("Calendar for {year}-{month:02}:");
    for (date, occs) in view {
        if occs.is_empty() {
            println!("{date}  -");
            continue;
        }
        let entries: Vec<String> = occs
            .iter()
            .map(|o| {
                let title = by_id.get(&o.template_id).map_or("?", |t| t.title.as_str());
                format!("{title} [{}]", format_status(o.status))
            })
            .collect();
        println!("{date}  {}", entries.join(", "));
    }
}

/// Show completed-vs-total progress for a goal window.
pub fn cmd_progress(store: &Store, period: GoalPeriod, date: Option<String>) {
    let today = Local::now().date_naive();
    let reference = resolve_date(date, today);

    let (window_start, window_end) = match period_window(period, reference) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    match progress(store, period, reference) {
        Ok(p) => {
            println!(
                "{} window {window_start} to {window_end}: {} of {} completed ({}%)",
                format_period(period),
                p.completed,
                p.total,
                (p.ratio * 100.0).round() as i64
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
    match goal_progress(store, period, reference) {
        Ok(Some(gp)) => {
            println!(
                "Goal: {} of {} ({}%)",
                gp.completed,
                gp.target,
                (gp.ratio * 100.0).round() as i64
            );
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Set a completion target for a goal period.
pub fn cmd_goal(store: &mut Store, path: &Path, period: GoalPeriod, target: u32) {
    store.set_goal(period, target);
    println!("{} goal set: {target} tasks", format_period(period));
    persist(store, path);
}

/// Show pending/completed/overdue counts for the month of the reference date.
pub fn cmd_stats(store: &Store, date: Option<String>) {
    let today = Local::now().date_naive();
    let reference = resolve_date(date, today);
    let (first, last) = match period_window(GoalPeriod::Monthly, reference) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    match status_counts(store, first, last, reference) {
        Ok(c) => {
            println!("Stats for {first} to {last}:");
            println!("  Completed: {}", c.completed);
            println!("  Pending:   {}", c.pending);
            println!("  Skipped:   {}", c.skipped);
            println!("  Overdue:   {}", c.overdue);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// List pending occurrences falling due within the horizon.
pub fn cmd_due(store: &Store, date: Option<String>, horizon: i64) {
    let today = Local::now().date_naive();
    let reference = resolve_date(date, today);
    match due_soon(store, reference, horizon) {
        Ok(due) if due.is_empty() => println!("Nothing due through {} days ahead.", horizon),
        Ok(due) => {
            for (t, d) in due {
                println!("{d}  {:<7} {}", format_priority(t.priority), t.title);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "td", &mut std::io::stdout());
}

/// Parse a YYYY-MM month argument.
fn parse_month(s: &str) -> Option<(i32, u32)> {
    let (y, m) = s.split_once('-')?;
    let year = y.parse::<i32>().ok()?;
    let month = m.parse::<u32>().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}
