//! # TD - To-Do Dashboard CLI
//!
//! A personal task dashboard with recurring tasks, per-date completion
//! tracking, calendar views and goal progress.
//!
//! ## Key Features
//!
//! - **Recurring Tasks**: one-time, daily, weekly (by weekday) and monthly
//!   (by day of month, clipped in short months) templates
//! - **Per-Date Completion**: completing or skipping one occurrence never
//!   touches the template or any other date
//! - **Calendar View**: a full month of effective tasks, every day present
//! - **Goal Tracking**: completed-vs-total ratios over weekly/monthly
//!   windows, with optional stored targets
//! - **Due-Soon Feed**: pending occurrences within a horizon, ready to hand
//!   to a notification channel
//! - **Local File Storage**: a single JSON file, written atomically
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a weekly task
//! td add "Water the plants" --recur weekly --weekday sat
//!
//! # Mark today's occurrence done
//! td complete 1
//!
//! # See the month and this week's progress
//! td calendar
//! td progress weekly
//! ```
//!
//! Data is stored locally in `~/.taskdash/tasks.json`. We recommend you back
//! this file up periodically.

use std::path::PathBuf;

use clap::Parser;

pub mod calendar;
pub mod cli;
pub mod cmd;
pub mod error;
pub mod fields;
pub mod goals;
pub mod reconcile;
pub mod recur;
pub mod store;
pub mod task;

use cli::Cli;
use cmd::*;
use fields::Status;
use store::Store;

fn main() {
    let cli = Cli::parse();

    // Completions need no store at all.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let dir = PathBuf::from(home).join(".taskdash");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Failed to create data directory {}: {}", dir.display(), e);
            std::process::exit(1);
        }
        dir.join("tasks.json")
    });

    let mut store = Store::load(&db_path);

    match cli.command {
        Commands::Completions { .. } => unreachable!("handled above"),

        Commands::Add { title, desc, priority, recur, weekday, day_of_month, start, end } =>
            cmd_add(&mut store, &db_path, title, desc, priority, recur, weekday,
                    day_of_month, start, end),

        Commands::List { active } => cmd_list(&store, active),

        Commands::View { id, ahead } => cmd_view(&store, id, ahead),

        Commands::Update { id, title, desc, priority, recur, weekday, day_of_month,
                           start, end, clear_end } =>
            cmd_update(&mut store, &db_path, id, title, desc, priority, recur, weekday,
                       day_of_month, start, end, clear_end),

        Commands::Delete { id } => cmd_delete(&mut store, &db_path, id),

        Commands::Complete { id, date } =>
            cmd_set_status(&mut store, &db_path, id, date, Status::Completed),

        Commands::Skip { id, date } =>
            cmd_set_status(&mut store, &db_path, id, date, Status::Skipped),

        Commands::Reopen { id, date } =>
            cmd_set_status(&mut store, &db_path, id, date, Status::Pending),

        Commands::Day { date } => cmd_day(&store, date),

        Commands::Calendar { month } => cmd_calendar(&store, month),

        Commands::Progress { period, date } => cmd_progress(&store, period, date),

        Commands::Goal { period, target } => cmd_goal(&mut store, &db_path, period, target),

        Commands::Stats { date } => cmd_stats(&store, date),

        Commands::Due { date, horizon } => cmd_due(&store, date, horizon),
    }
}
