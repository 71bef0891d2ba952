//! Task Mutation Engine.
//!
//! Every write goes through `prepare_save` and validation before it reaches
//! the store, so `completedAt` tracks `completed` and `updatedAt` is bumped
//! on every path: create, full update, partial update and bulk update.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    create_task_request::CreateTaskRequest,
    data_access::data_context::DataContext,
    error::{ApiError, ApiResult},
    message_response::{BulkDeleteResponse, BulkUpdateResponse, MessageResponse},
    services::task_query::resolve_one,
    task::Task,
    task_response::TaskResponse,
    update_task_request::UpdateTaskRequest,
};

fn load(ctx: &DataContext, id: Uuid) -> ApiResult<Task> {
    ctx.find_by_id::<Task>(id)?.ok_or(ApiError::NotFound("Task"))
}

/// Write back an existing task. The document may have been deleted since
/// it was read, in which case this is a NotFound.
fn save(ctx: &DataContext, task: &mut Task, now: DateTime<Utc>) -> ApiResult<()> {
    task.prepare_save(now);
    task.validate()?;
    if ctx.replace(task)? {
        Ok(())
    } else {
        Err(ApiError::NotFound("Task"))
    }
}

pub fn create_task(ctx: &DataContext, request: CreateTaskRequest, now: DateTime<Utc>) -> ApiResult<Task> {
    let mut task = request.into_task(now);
    task.prepare_save(now);
    task.validate()?;
    ctx.insert(&task)?;
    tracing::info!(task_id = %task.id, "task created");
    Ok(task)
}

/// `PUT /tasks/:id`: apply the payload and return the resolved task.
pub fn update_task(
    ctx: &DataContext,
    id: Uuid,
    request: &UpdateTaskRequest,
    now: DateTime<Utc>,
) -> ApiResult<TaskResponse> {
    let task = patch_task(ctx, id, request, now)?;
    resolve_one(ctx, task, now)
}

/// `PATCH /tasks/:id`: same write as a full update, but the stored document
/// is returned as-is with unresolved references.
pub fn patch_task(
    ctx: &DataContext,
    id: Uuid,
    request: &UpdateTaskRequest,
    now: DateTime<Utc>,
) -> ApiResult<Task> {
    let mut task = load(ctx, id)?;
    request.apply_to(&mut task, now);
    save(ctx, &mut task, now)?;
    tracing::debug!(task_id = %id, "task updated");
    Ok(task)
}

pub fn delete_task(ctx: &DataContext, id: Uuid) -> ApiResult<MessageResponse> {
    if !ctx.remove::<Task>(id)? {
        return Err(ApiError::NotFound("Task"));
    }
    tracing::info!(task_id = %id, "task deleted");
    Ok(MessageResponse::new("Task deleted"))
}

pub fn complete_task(ctx: &DataContext, id: Uuid, now: DateTime<Utc>) -> ApiResult<TaskResponse> {
    transition(ctx, id, now, |_| true)
}

pub fn incomplete_task(ctx: &DataContext, id: Uuid, now: DateTime<Utc>) -> ApiResult<TaskResponse> {
    transition(ctx, id, now, |_| false)
}

/// Read, flip, write. Concurrent toggles on one task are last-write-wins.
pub fn toggle_task(ctx: &DataContext, id: Uuid, now: DateTime<Utc>) -> ApiResult<TaskResponse> {
    transition(ctx, id, now, |completed| !completed)
}

fn transition(
    ctx: &DataContext,
    id: Uuid,
    now: DateTime<Utc>,
    next: impl FnOnce(bool) -> bool,
) -> ApiResult<TaskResponse> {
    let mut task = load(ctx, id)?;
    task.set_completed(next(task.completed), now);
    save(ctx, &mut task, now)?;
    tracing::debug!(task_id = %id, completed = task.completed, "task completion changed");
    resolve_one(ctx, task, now)
}

pub fn duplicate_task(ctx: &DataContext, id: Uuid, now: DateTime<Utc>) -> ApiResult<TaskResponse> {
    let source = load(ctx, id)?;
    let mut copy = source.duplicate(now);
    copy.prepare_save(now);
    copy.validate()?;
    ctx.insert(&copy)?;
    tracing::info!(source_id = %id, task_id = %copy.id, "task duplicated");
    resolve_one(ctx, copy, now)
}

/// Insert every task or none. A payload that fails validation rejects the
/// whole batch before anything is written.
pub fn bulk_create(
    ctx: &DataContext,
    requests: Vec<CreateTaskRequest>,
    now: DateTime<Utc>,
) -> ApiResult<Vec<Task>> {
    let mut tasks = Vec::with_capacity(requests.len());
    for (i, request) in requests.into_iter().enumerate() {
        let mut task = request.into_task(now);
        task.prepare_save(now);
        task.validate()
            .map_err(|e| ApiError::InvalidInput(format!("tasks[{i}]: {e}")))?;
        tasks.push(task);
    }
    ctx.insert_many(&tasks)
        .map_err(|e| ApiError::from(e).into_bulk())?;
    tracing::info!(count = tasks.len(), "tasks bulk created");
    Ok(tasks)
}

/// Apply one field set to every listed task. Unknown ids are skipped and
/// not counted.
pub fn bulk_update(
    ctx: &DataContext,
    ids: &[Uuid],
    update: &UpdateTaskRequest,
    now: DateTime<Utc>,
) -> ApiResult<BulkUpdateResponse> {
    let modified_count = ctx
        .update_many::<Task, ApiError, _>(ids, |task| {
            update.apply_to(task, now);
            task.prepare_save(now);
            task.validate()?;
            Ok(())
        })
        .map_err(ApiError::into_bulk)?;
    tracing::info!(requested = ids.len(), modified_count, "tasks bulk updated");
    Ok(BulkUpdateResponse {
        message: "Tasks updated".to_string(),
        modified_count,
    })
}

pub fn bulk_delete(ctx: &DataContext, ids: &[Uuid]) -> ApiResult<BulkDeleteResponse> {
    let deleted_count = ctx
        .delete_many::<Task>(ids)
        .map_err(|e| ApiError::from(e).into_bulk())?;
    tracing::info!(requested = ids.len(), deleted_count, "tasks bulk deleted");
    Ok(BulkDeleteResponse {
        message: "Tasks deleted".to_string(),
        deleted_count,
    })
}
