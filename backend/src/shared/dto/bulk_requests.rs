use serde::Deserialize;
use uuid::Uuid;

use crate::{create_task_request::CreateTaskRequest, update_task_request::UpdateTaskRequest};

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub tasks: Vec<CreateTaskRequest>,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    pub ids: Vec<Uuid>,
    pub update: UpdateTaskRequest,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}
