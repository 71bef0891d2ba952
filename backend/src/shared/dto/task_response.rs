use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    category::Category,
    tag::Tag,
    task::{Note, Recurrence, Subtask, Task},
    task_priority::TaskPriority,
};

/// A task with its category and tags resolved, plus the derived
/// `isOverdue` / `daysUntilDue` fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub priority: TaskPriority,
    pub category: Option<CategoryRef>,
    pub tags: Vec<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub subtasks: Vec<Subtask>,
    pub notes: Vec<Note>,
    pub recurrence: Recurrence,
    pub is_archived: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_overdue: bool,
    pub days_until_due: Option<i64>,
}

/// The stored task with unresolved category/tag ids, plus the derived
/// fields. Returned by create, bulk create and `PATCH`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTaskResponse {
    #[serde(flatten)]
    pub task: Task,
    pub is_overdue: bool,
    pub days_until_due: Option<i64>,
}

impl StoredTaskResponse {
    pub fn new(task: Task, now: DateTime<Utc>) -> Self {
        Self {
            is_overdue: task.is_overdue(now),
            days_until_due: task.days_until_due(now),
            task,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

impl From<&Tag> for TagRef {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
            color: tag.color.clone(),
        }
    }
}

impl TaskResponse {
    pub fn new(task: Task, category: Option<CategoryRef>, tags: Vec<TagRef>, now: DateTime<Utc>) -> Self {
        let is_overdue = task.is_overdue(now);
        let days_until_due = task.days_until_due(now);
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            priority: task.priority,
            category,
            tags,
            due_date: task.due_date,
            completed_at: task.completed_at,
            subtasks: task.subtasks,
            notes: task.notes,
            recurrence: task.recurrence,
            is_archived: task.is_archived,
            is_deleted: task.is_deleted,
            created_at: task.created_at,
            updated_at: task.updated_at,
            is_overdue,
            days_until_due,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn stored_response_keeps_raw_ids_and_adds_derived_fields() {
        let now = DateTime::from_timestamp(1_760_000_000, 0).unwrap();
        let tag_id = Uuid::now_v7();
        let mut task = Task::new("Pay rent", now - Duration::days(3));
        task.tags = vec![tag_id];
        task.due_date = Some(now - Duration::hours(1));

        let value = serde_json::to_value(StoredTaskResponse::new(task.clone(), now)).unwrap();
        assert_eq!(value["_id"], json!(task.id.to_string()));
        assert_eq!(value["tags"], json!([tag_id.to_string()]));
        assert_eq!(value["isOverdue"], json!(true));
        assert_eq!(value["daysUntilDue"], json!(0));
        assert!(value.get("task").is_none());
    }
}
