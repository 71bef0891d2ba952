use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    app_state::SharedState,
    bulk_requests::{BulkCreateRequest, BulkDeleteRequest, BulkUpdateRequest},
    create_task_request::CreateTaskRequest,
    error::{ApiError, ApiResult},
    message_response::{BulkDeleteResponse, BulkUpdateResponse, CleanupResponse, MessageResponse},
    services::{tag_service, task_mutation, task_query},
    stats_response::{PriorityCount, RecentCountResponse, TaskStatsResponse},
    task_list_query::{DueRangeQuery, RecentQuery, TaskListQuery},
    task_list_response::TaskListResponse,
    task_priority::TaskPriority,
    task_response::{StoredTaskResponse, TaskResponse},
    update_task_request::UpdateTaskRequest,
    web_api::extractors::{ApiJson, ApiPath},
};

pub struct TaskController {}

impl TaskController {
    pub async fn list(
        State(state): State<SharedState>,
        Query(query): Query<TaskListQuery>) -> ApiResult<Json<TaskListResponse>> {
        task_query::list_tasks(&state.data_context, &query.parse(), Utc::now()).map(Json)
    }

    pub async fn get(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<TaskResponse>> {
        task_query::get_task(&state.data_context, id, Utc::now()).map(Json)
    }

    pub async fn create(
        State(state): State<SharedState>,
        ApiJson(body): ApiJson<CreateTaskRequest>) -> ApiResult<(StatusCode, Json<StoredTaskResponse>)> {
        let now = Utc::now();
        let task = task_mutation::create_task(&state.data_context, body, now)?;
        Ok((StatusCode::CREATED, Json(StoredTaskResponse::new(task, now))))
    }

    pub async fn update(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>,
        ApiJson(body): ApiJson<UpdateTaskRequest>) -> ApiResult<Json<TaskResponse>> {
        task_mutation::update_task(&state.data_context, id, &body, Utc::now()).map(Json)
    }

    pub async fn patch(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>,
        ApiJson(body): ApiJson<UpdateTaskRequest>) -> ApiResult<Json<StoredTaskResponse>> {
        let now = Utc::now();
        let task = task_mutation::patch_task(&state.data_context, id, &body, now)?;
        Ok(Json(StoredTaskResponse::new(task, now)))
    }

    pub async fn delete(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<MessageResponse>> {
        task_mutation::delete_task(&state.data_context, id).map(Json)
    }

    pub async fn complete(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<TaskResponse>> {
        task_mutation::complete_task(&state.data_context, id, Utc::now()).map(Json)
    }

    pub async fn incomplete(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<TaskResponse>> {
        task_mutation::incomplete_task(&state.data_context, id, Utc::now()).map(Json)
    }

    pub async fn toggle(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<TaskResponse>> {
        task_mutation::toggle_task(&state.data_context, id, Utc::now()).map(Json)
    }

    pub async fn duplicate(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
        let copy = task_mutation::duplicate_task(&state.data_context, id, Utc::now())?;
        Ok((StatusCode::CREATED, Json(copy)))
    }

    pub async fn bulk_create(
        State(state): State<SharedState>,
        ApiJson(body): ApiJson<BulkCreateRequest>) -> ApiResult<(StatusCode, Json<Vec<StoredTaskResponse>>)> {
        let now = Utc::now();
        let tasks = task_mutation::bulk_create(&state.data_context, body.tasks, now)?;
        let created = tasks.into_iter().map(|t| StoredTaskResponse::new(t, now)).collect();
        Ok((StatusCode::CREATED, Json(created)))
    }

    pub async fn bulk_update(
        State(state): State<SharedState>,
        ApiJson(body): ApiJson<BulkUpdateRequest>) -> ApiResult<Json<BulkUpdateResponse>> {
        task_mutation::bulk_update(&state.data_context, &body.ids, &body.update, Utc::now()).map(Json)
    }

    pub async fn bulk_delete(
        State(state): State<SharedState>,
        ApiJson(body): ApiJson<BulkDeleteRequest>) -> ApiResult<Json<BulkDeleteResponse>> {
        task_mutation::bulk_delete(&state.data_context, &body.ids).map(Json)
    }

    pub async fn stats_overview(State(state): State<SharedState>) -> ApiResult<Json<TaskStatsResponse>> {
        task_query::stats_overview(&state.data_context).map(Json)
    }

    pub async fn stats_by_priority(State(state): State<SharedState>) -> ApiResult<Json<Vec<PriorityCount>>> {
        task_query::stats_by_priority(&state.data_context).map(Json)
    }

    pub async fn stats_recent(
        State(state): State<SharedState>,
        Query(query): Query<RecentQuery>) -> ApiResult<Json<RecentCountResponse>> {
        task_query::recent_count(&state.data_context, query.days(), Utc::now()).map(Json)
    }

    pub async fn due_range(
        State(state): State<SharedState>,
        Query(query): Query<DueRangeQuery>) -> ApiResult<Json<Vec<TaskResponse>>> {
        let (start, end) = query.bounds()?;
        task_query::tasks_due_between(&state.data_context, start, end, Utc::now()).map(Json)
    }

    pub async fn overdue(State(state): State<SharedState>) -> ApiResult<Json<Vec<TaskResponse>>> {
        task_query::overdue_tasks(&state.data_context, Utc::now()).map(Json)
    }

    pub async fn by_priority(
        State(state): State<SharedState>,
        ApiPath(level): ApiPath<String>) -> ApiResult<Json<Vec<TaskResponse>>> {
        let priority = level.parse::<TaskPriority>().map_err(ApiError::InvalidInput)?;
        task_query::tasks_by_priority(&state.data_context, priority, Utc::now()).map(Json)
    }

    pub async fn cleanup_orphaned_tags(State(state): State<SharedState>) -> ApiResult<Json<CleanupResponse>> {
        tag_service::cleanup_orphaned_tags(&state.data_context, Utc::now()).map(Json)
    }
}
