use serde::Serialize;

use crate::task_priority::TaskPriority;

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct TaskStatsResponse {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
}

/// One row of `GET /tasks/stats/priority`.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PriorityCount {
    #[serde(rename = "_id")]
    pub priority: TaskPriority,
    pub count: usize,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct RecentCountResponse {
    pub count: usize,
    pub days: i64,
}
