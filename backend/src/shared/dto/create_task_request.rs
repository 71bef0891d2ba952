use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::{
    task::{Note, Recurrence, RecurrencePattern, Subtask, Task},
    task_priority::TaskPriority,
};

/// Body of `POST /tasks` and each entry of a bulk create.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Option<TaskPriority>,
    #[serde(deserialize_with = "optional_reference")]
    pub category: Option<Uuid>,
    pub tags: Vec<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub subtasks: Vec<SubtaskInput>,
    pub notes: Vec<NoteInput>,
    pub recurrence: Option<RecurrenceInput>,
    pub is_archived: bool,
}

/// A subtask as sent by the client. Existing subtasks are echoed back with
/// their `_id` and `createdAt`; new ones carry neither.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubtaskInput {
    #[serde(rename = "_id")]
    pub id: Option<Uuid>,
    pub title: String,
    pub completed: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteInput {
    #[serde(rename = "_id")]
    pub id: Option<Uuid>,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecurrenceInput {
    pub enabled: bool,
    pub pattern: Option<RecurrencePattern>,
    pub interval: Option<u32>,
    pub end_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Build the document to insert. Not yet validated or prepared for save.
    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        let mut task = Task::new(&self.title, now);
        task.description = trimmed(self.description);
        task.completed = self.completed;
        task.priority = self.priority.unwrap_or_default();
        task.category = self.category;
        task.tags = self.tags;
        task.due_date = self.due_date;
        task.subtasks = self.subtasks.iter().map(|s| s.to_subtask(now)).collect();
        task.notes = self.notes.iter().map(|n| n.to_note(now)).collect();
        task.recurrence = self.recurrence.map(|r| r.to_recurrence()).unwrap_or_default();
        task.is_archived = self.is_archived;
        task
    }
}

impl SubtaskInput {
    pub fn to_subtask(&self, now: DateTime<Utc>) -> Subtask {
        Subtask {
            id: self.id.unwrap_or_else(Uuid::now_v7),
            title: self.title.trim().to_string(),
            completed: self.completed,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

impl NoteInput {
    pub fn to_note(&self, now: DateTime<Utc>) -> Note {
        Note {
            id: self.id.unwrap_or_else(Uuid::now_v7),
            content: self.content.clone(),
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

impl RecurrenceInput {
    pub fn to_recurrence(&self) -> Recurrence {
        Recurrence {
            enabled: self.enabled,
            pattern: self.pattern,
            interval: self.interval.unwrap_or(1),
            end_date: self.end_date,
        }
    }
}

/// Trim, and treat an all-blank string as absent.
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A weak reference id where `null` and `""` both mean "none".
pub(crate) fn optional_reference<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => Uuid::parse_str(id)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
