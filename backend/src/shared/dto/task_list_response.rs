use serde::Serialize;

use crate::task_response::TaskResponse;

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Requested page, 1-based.
    pub current: usize,
    /// Number of pages.
    pub total: usize,
    /// Tasks on this page.
    pub count: usize,
    pub total_items: usize,
}
