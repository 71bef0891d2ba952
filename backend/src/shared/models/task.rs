use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

use crate::task_priority::TaskPriority;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// The stored task document.
///
/// Invariant kept by every write path: `completed_at` is `Some` exactly
/// when `completed` is true. `is_overdue` and `days_until_due` are derived
/// at read time and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[validate(length(min = 1, max = 200, message = "title is required and must be at most 200 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub completed: bool,
    pub priority: TaskPriority,
    pub category: Option<Uuid>,
    pub tags: Vec<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[validate(nested)]
    pub subtasks: Vec<Subtask>,
    #[validate(nested)]
    pub notes: Vec<Note>,
    #[validate(nested)]
    pub recurrence: Recurrence,
    pub is_archived: bool,
    /// Never set or filtered on; deletes are hard deletes.
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[validate(length(min = 1, max = 100, message = "subtask title is required and must be at most 100 characters"))]
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[validate(length(min = 1, max = 500, message = "note content is required and must be at most 500 characters"))]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Recurrence settings. Stored and returned, never acted upon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub enabled: bool,
    pub pattern: Option<RecurrencePattern>,
    #[validate(range(min = 1, message = "recurrence interval must be at least 1"))]
    pub interval: u32,
    pub end_date: Option<DateTime<Utc>>,
}

impl Default for Recurrence {
    fn default() -> Self {
        Self {
            enabled: false,
            pattern: None,
            interval: 1,
            end_date: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Task {
    /// A fresh, incomplete, medium-priority task with no references.
    pub fn new(title: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.trim().to_string(),
            description: None,
            completed: false,
            priority: TaskPriority::default(),
            category: None,
            tags: Vec::new(),
            due_date: None,
            completed_at: None,
            subtasks: Vec::new(),
            notes: Vec::new(),
            recurrence: Recurrence::default(),
            is_archived: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bookkeeping run before any write: bump `updated_at` and bring
    /// `completed_at` in line with `completed`. An existing completion
    /// timestamp is kept while the task stays completed.
    pub fn prepare_save(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        if self.completed && self.completed_at.is_none() {
            self.completed_at = Some(now);
        } else if !self.completed && self.completed_at.is_some() {
            self.completed_at = None;
        }
    }

    /// Force the completion state. Completing always restamps `completed_at`.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = completed.then_some(now);
        self.updated_at = now;
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }

    /// Whole days until the due date, rounded up. Negative once overdue.
    pub fn days_until_due(&self, now: DateTime<Utc>) -> Option<i64> {
        self.due_date.map(|due| {
            let millis = (due - now).num_milliseconds() as f64;
            (millis / MILLIS_PER_DAY).ceil() as i64
        })
    }

    /// Copy of this task under a new id, titled "<title> (Copy)", incomplete
    /// and created at `now`. Everything else carries over.
    pub fn duplicate(&self, now: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::now_v7(),
            title: format!("{} (Copy)", self.title),
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Case-insensitive substring match on title or description.
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }

    /// Drop tag references not in `existing`. Returns true if any were dropped.
    pub fn retain_tags(&mut self, existing: &HashSet<Uuid>, now: DateTime<Utc>) -> bool {
        let before = self.tags.len();
        self.tags.retain(|id| existing.contains(id));
        let changed = self.tags.len() != before;
        if changed {
            self.updated_at = now;
        }
        changed
    }

    /// Pull a single tag id out of `tags`. Returns true if it was present.
    pub fn remove_tag(&mut self, tag_id: Uuid, now: DateTime<Utc>) -> bool {
        let before = self.tags.len();
        self.tags.retain(|id| *id != tag_id);
        let changed = self.tags.len() != before;
        if changed {
            self.updated_at = now;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(hours: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000, 0).unwrap() + Duration::hours(hours)
    }

    #[test]
    fn prepare_save_stamps_completion_once() {
        let mut task = Task::new("Write report", at(0));
        task.completed = true;
        task.prepare_save(at(1));
        assert_eq!(task.completed_at, Some(at(1)));
        assert_eq!(task.updated_at, at(1));

        task.prepare_save(at(2));
        assert_eq!(task.completed_at, Some(at(1)), "stays stamped while completed");

        task.completed = false;
        task.prepare_save(at(3));
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn set_completed_restamps() {
        let mut task = Task::new("Ship it", at(0));
        task.set_completed(true, at(1));
        task.set_completed(true, at(2));
        assert_eq!(task.completed_at, Some(at(2)));

        task.set_completed(false, at(3));
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn overdue_requires_past_due_date_and_incomplete() {
        let mut task = Task::new("Pay rent", at(0));
        assert!(!task.is_overdue(at(10)));

        task.due_date = Some(at(5));
        assert!(task.is_overdue(at(10)));
        assert!(!task.is_overdue(at(4)));

        task.set_completed(true, at(6));
        assert!(!task.is_overdue(at(10)));
    }

    #[test]
    fn days_until_due_rounds_up() {
        let mut task = Task::new("Renew passport", at(0));
        assert_eq!(task.days_until_due(at(0)), None);

        task.due_date = Some(at(25));
        assert_eq!(task.days_until_due(at(0)), Some(2));
        assert_eq!(task.days_until_due(at(1)), Some(1));

        task.due_date = Some(at(-30));
        assert_eq!(task.days_until_due(at(0)), Some(-1));
    }

    #[test]
    fn duplicate_resets_identity_and_completion() {
        let mut source = Task::new("Plan trip", at(0));
        source.description = Some("Book flights".into());
        source.priority = TaskPriority::High;
        source.tags = vec![Uuid::now_v7()];
        source.is_archived = true;
        source.set_completed(true, at(1));

        let copy = source.duplicate(at(2));
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.title, "Plan trip (Copy)");
        assert!(!copy.completed);
        assert_eq!(copy.completed_at, None);
        assert_eq!(copy.created_at, at(2));
        assert_eq!(copy.description, source.description);
        assert_eq!(copy.priority, source.priority);
        assert_eq!(copy.tags, source.tags);
        assert_eq!(copy.is_archived, source.is_archived);
    }

    #[test]
    fn search_matches_title_or_description_ignoring_case() {
        let mut task = Task::new("Buy MILK", at(0));
        assert!(task.matches_search("milk"));
        assert!(!task.matches_search("bread"));

        task.description = Some("and Bread too".into());
        assert!(task.matches_search("bread"));
    }

    #[test]
    fn retain_tags_reports_changes() {
        let keep = Uuid::now_v7();
        let gone = Uuid::now_v7();
        let mut task = Task::new("Tagged", at(0));
        task.tags = vec![keep, gone];

        let existing = HashSet::from([keep]);
        assert!(task.retain_tags(&existing, at(1)));
        assert_eq!(task.tags, vec![keep]);
        assert!(!task.retain_tags(&existing, at(2)));
        assert_eq!(task.updated_at, at(1));
    }

    #[test]
    fn validation_limits() {
        let mut task = Task::new("   ", at(0));
        assert!(task.validate().is_err(), "blank title is rejected");

        task.title = "x".repeat(200);
        assert!(task.validate().is_ok());
        task.title.push('x');
        assert!(task.validate().is_err());

        task.title = "ok".into();
        task.recurrence.interval = 0;
        assert!(task.validate().is_err());

        task.recurrence.interval = 1;
        task.notes.push(Note {
            id: Uuid::now_v7(),
            content: String::new(),
            created_at: at(0),
        });
        assert!(task.validate().is_err());
    }
}
