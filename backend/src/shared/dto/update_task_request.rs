use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::{
    create_task_request::{optional_reference, trimmed, NoteInput, RecurrenceInput, SubtaskInput},
    task::Task,
    task_priority::TaskPriority,
};

/// Field set for `PUT /tasks/:id`, `PATCH /tasks/:id` and bulk update.
/// Absent fields are left alone; `null` clears nullable fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<TaskPriority>,
    #[serde(deserialize_with = "nullable_reference")]
    pub category: Option<Option<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
    #[serde(deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub subtasks: Option<Vec<SubtaskInput>>,
    pub notes: Option<Vec<NoteInput>>,
    pub recurrence: Option<RecurrenceInput>,
    pub is_archived: Option<bool>,
}

impl UpdateTaskRequest {
    /// Copy the supplied fields onto `task`. Bookkeeping (`updatedAt`,
    /// `completedAt`) is left to the caller's save step.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = trimmed(description.clone());
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(tags) = &self.tags {
            task.tags = tags.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(subtasks) = &self.subtasks {
            task.subtasks = subtasks.iter().map(|s| s.to_subtask(now)).collect();
        }
        if let Some(notes) = &self.notes {
            task.notes = notes.iter().map(|n| n.to_note(now)).collect();
        }
        if let Some(recurrence) = &self.recurrence {
            task.recurrence = recurrence.to_recurrence();
        }
        if let Some(is_archived) = self.is_archived {
            task.is_archived = is_archived;
        }
    }
}

/// Present-but-null becomes `Some(None)`; absent stays `None` via `default`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn nullable_reference<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_reference(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> UpdateTaskRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn absent_fields_leave_the_task_alone() {
        let now = Utc::now();
        let mut task = Task::new("Original", now);
        task.description = Some("kept".into());
        task.category = Some(Uuid::now_v7());
        let before = task.clone();

        request(json!({})).apply_to(&mut task, now);
        assert_eq!(task, before);
    }

    #[test]
    fn null_and_empty_clear_nullable_fields() {
        let now = Utc::now();
        let mut task = Task::new("Original", now);
        task.description = Some("gone".into());
        task.category = Some(Uuid::now_v7());
        task.due_date = Some(now);

        request(json!({ "description": null, "category": "", "dueDate": null })).apply_to(&mut task, now);
        assert_eq!(task.description, None);
        assert_eq!(task.category, None);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn supplied_fields_are_applied() {
        let now = Utc::now();
        let tag = Uuid::now_v7();
        let mut task = Task::new("Original", now);

        request(json!({
            "title": " Renamed ",
            "completed": true,
            "priority": "urgent",
            "tags": [tag],
            "isArchived": true
        }))
        .apply_to(&mut task, now);

        assert_eq!(task.title, "Renamed");
        assert!(task.completed);
        assert_eq!(task.priority, TaskPriority::Urgent);
        assert_eq!(task.tags, vec![tag]);
        assert!(task.is_archived);
    }
}
