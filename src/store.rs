//! Durable storage and utility functions for the task dashboard.
//!
//! This module provides the `Store` struct holding task templates, their
//! override occurrence records, and goal targets, along with date-input
//! parsing for the CLI. Storage is a single JSON file written atomically
//! (temp file + rename).

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::fields::{GoalPeriod, Recurrence, Status};
use crate::task::{Goal, Occurrence, TaskTemplate};

/// In-memory store for templates, occurrence overrides and goals.
///
/// Templates own their override records: deleting a template cascades into
/// every override for its id. At most one override exists per
/// `(template_id, date)` pair; absence means "Pending, as generated".
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Store {
    pub templates: Vec<TaskTemplate>,
    #[serde(default)]
    pub overrides: Vec<Occurrence>,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl Store {
    /// Load the store from a JSON file, starting empty if the file doesn't
    /// exist or can't be parsed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Store::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error parsing store, starting fresh: {e}");
                    Store::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading store, starting fresh: {e}");
                Store::default()
            }
        }
    }

    /// Save the store to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).expect("store serializes");
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate the next available template ID.
    pub fn next_id(&self) -> u64 {
        self.templates.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Get a template by ID.
    pub fn get(&self, id: u64) -> Option<&TaskTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Validate and insert a new template, assigning its ID.
    pub fn create_template(&mut self, mut template: TaskTemplate) -> Result<u64, Error> {
        template.validate()?;
        let id = self.next_id();
        template.id = id;
        self.templates.push(template);
        Ok(id)
    }

    /// Apply an edit to a template, bumping its updated-at stamp.
    ///
    /// The edit is validated before it is written back, so a rejected update
    /// leaves the stored template untouched. Existing override records are
    /// kept even when the new rule no longer generates their dates; the
    /// reconciler surfaces them as history.
    pub fn update_template<F>(&mut self, id: u64, now_utc: i64, apply: F) -> Result<(), Error>
    where
        F: FnOnce(&mut TaskTemplate),
    {
        let idx = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::TemplateNotFound(id))?;
        let mut updated = self.templates[idx].clone();
        apply(&mut updated);
        updated.id = id;
        updated.updated_at_utc = now_utc;
        updated.validate()?;
        self.templates[idx] = updated;
        Ok(())
    }

    /// Delete a template, cascading into all its override records.
    pub fn delete_template(&mut self, id: u64) -> Result<(), Error> {
        if self.get(id).is_none() {
            return Err(Error::TemplateNotFound(id));
        }
        self.templates.retain(|t| t.id != id);
        self.overrides.retain(|o| o.template_id != id);
        Ok(())
    }

    /// Templates whose active span covers the given date.
    pub fn list_templates(&self, active_as_of: NaiveDate) -> Vec<&TaskTemplate> {
        self.templates
            .iter()
            .filter(|t| t.contains(active_as_of))
            .collect()
    }

    /// Override records for one template within `[range_start, range_end]`,
    /// sorted by date.
    pub fn get_overrides(
        &self,
        template_id: u64,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Vec<Occurrence> {
        let mut found: Vec<Occurrence> = self
            .overrides
            .iter()
            .filter(|o| {
                o.template_id == template_id && o.date >= range_start && o.date <= range_end
            })
            .cloned()
            .collect();
        found.sort_by_key(|o| o.date);
        found
    }

    /// Upsert the override record for `(template_id, date)`.
    ///
    /// `completed_at_utc` is stamped with `now_utc` only on a transition into
    /// `Completed` (re-completing keeps the original stamp) and cleared on any
    /// other status. Fails for an unknown template or a date outside the
    /// template's active span.
    pub fn set_status(
        &mut self,
        template_id: u64,
        date: NaiveDate,
        status: Status,
        now_utc: i64,
    ) -> Result<Occurrence, Error> {
        let template = self
            .get(template_id)
            .ok_or(Error::TemplateNotFound(template_id))?;
        if !template.contains(date) {
            return Err(Error::InvalidStatusTransition {
                template_id,
                date,
                reason: "date is outside the template's active range".into(),
            });
        }
        if template.recurrence == Recurrence::None && date != template.start_date {
            return Err(Error::InvalidStatusTransition {
                template_id,
                date,
                reason: "a one-time task only occurs on its start date".into(),
            });
        }

        let existing = self
            .overrides
            .iter_mut()
            .find(|o| o.template_id == template_id && o.date == date);
        let record = match existing {
            Some(o) => {
                o.completed_at_utc = match status {
                    Status::Completed if o.status == Status::Completed => o.completed_at_utc,
                    Status::Completed => Some(now_utc),
                    _ => None,
                };
                o.status = status;
                o.clone()
            }
            None => {
                let record = Occurrence {
                    template_id,
                    date,
                    status,
                    completed_at_utc: (status == Status::Completed).then_some(now_utc),
                };
                self.overrides.push(record.clone());
                record
            }
        };
        Ok(record)
    }

    /// Upsert the stored target for a goal period.
    pub fn set_goal(&mut self, period: GoalPeriod, target_count: u32) {
        match self.goals.iter_mut().find(|g| g.period == period) {
            Some(g) => g.target_count = target_count,
            None => self.goals.push(Goal { period, target_count }),
        }
    }

    /// The stored goal for a period, if any.
    pub fn goal(&self, period: GoalPeriod) -> Option<&Goal> {
        self.goals.iter().find(|g| g.period == period)
    }
}

/// Parse human-readable date input against an explicit `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" format
pub fn parse_date_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}
