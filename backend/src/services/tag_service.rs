//! Tag CRUD, the delete cascade and orphaned-reference cleanup.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

use crate::{
    data_access::data_context::{DataContext, StoreError},
    error::{ApiError, ApiResult},
    message_response::{CleanupResponse, MessageResponse},
    tag::Tag,
    tag_requests::{TagCreateRequest, TagUpdateRequest},
    task::Task,
};

/// All tags, by name ascending.
pub fn list_tags(ctx: &DataContext) -> ApiResult<Vec<Tag>> {
    let mut tags = ctx.find_all::<Tag>()?;
    tags.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(tags)
}

pub fn get_tag(ctx: &DataContext, id: Uuid) -> ApiResult<Tag> {
    ctx.find_by_id::<Tag>(id)?.ok_or(ApiError::NotFound("Tag"))
}

pub fn create_tag(ctx: &DataContext, request: &TagCreateRequest, now: DateTime<Utc>) -> ApiResult<Tag> {
    let tag = Tag::new(&request.name, &request.color, now);
    tag.validate()?;
    ctx.insert(&tag)?;
    tracing::info!(tag_id = %tag.id, name = %tag.name, "tag created");
    Ok(tag)
}

pub fn update_tag(
    ctx: &DataContext,
    id: Uuid,
    request: &TagUpdateRequest,
    now: DateTime<Utc>,
) -> ApiResult<Tag> {
    let mut tag = get_tag(ctx, id)?;
    if let Some(name) = &request.name {
        tag.name = name.trim().to_string();
    }
    if let Some(color) = &request.color {
        tag.color = color.trim().to_string();
    }
    tag.updated_at = now;
    tag.validate()?;
    if !ctx.replace(&tag)? {
        return Err(ApiError::NotFound("Tag"));
    }
    Ok(tag)
}

/// Remove the tag, then pull its id out of every task. The two steps are
/// separate writes; [`cleanup_orphaned_tags`] repairs anything the second
/// step misses.
pub fn delete_tag(ctx: &DataContext, id: Uuid, now: DateTime<Utc>) -> ApiResult<MessageResponse> {
    if !ctx.remove::<Tag>(id)? {
        return Err(ApiError::NotFound("Tag"));
    }
    let updated = ctx.update_where::<Task, StoreError, _>(|task| Ok(task.remove_tag(id, now)))?;
    tracing::info!(tag_id = %id, updated_tasks = updated, "tag deleted");
    Ok(MessageResponse::new("Tag deleted"))
}

/// Drop every task tag reference that no longer resolves to a tag.
pub fn cleanup_orphaned_tags(ctx: &DataContext, now: DateTime<Utc>) -> ApiResult<CleanupResponse> {
    let existing: HashSet<Uuid> = ctx.find_all::<Tag>()?.into_iter().map(|t| t.id).collect();
    let updated_tasks = ctx.update_where::<Task, StoreError, _>(|task| {
        Ok(!task.tags.is_empty() && task.retain_tags(&existing, now))
    })?;
    tracing::info!(updated_tasks, "orphaned tag references cleaned up");
    Ok(CleanupResponse {
        message: format!("Cleaned up orphaned tags in {updated_tasks} tasks"),
        updated_tasks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(hours: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000, 0).unwrap() + Duration::hours(hours)
    }

    fn tag(ctx: &DataContext, name: &str) -> Tag {
        let request = TagCreateRequest {
            name: name.to_string(),
            color: "#ff0000".to_string(),
        };
        create_tag(ctx, &request, at(0)).unwrap()
    }

    fn task_with(ctx: &DataContext, title: &str, tags: Vec<Uuid>) -> Task {
        let mut task = Task::new(title, at(0));
        task.tags = tags;
        ctx.insert(&task).unwrap();
        task
    }

    #[test]
    fn list_is_sorted_by_name() {
        let ctx = DataContext::open_in_memory().unwrap();
        tag(&ctx, "work");
        tag(&ctx, "errand");
        tag(&ctx, "home");
        let names: Vec<String> = list_tags(&ctx).unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["errand", "home", "work"]);
    }

    #[test]
    fn create_requires_name_and_color() {
        let ctx = DataContext::open_in_memory().unwrap();
        let missing_color = TagCreateRequest {
            name: "x".into(),
            color: " ".into(),
        };
        assert!(matches!(create_tag(&ctx, &missing_color, at(0)), Err(ApiError::Validation(_))));
        let long_name = TagCreateRequest {
            name: "n".repeat(51),
            color: "#000".into(),
        };
        assert!(matches!(create_tag(&ctx, &long_name, at(0)), Err(ApiError::Validation(_))));
    }

    #[test]
    fn update_changes_only_supplied_fields() {
        let ctx = DataContext::open_in_memory().unwrap();
        let original = tag(&ctx, "urgent");
        let request = TagUpdateRequest {
            name: None,
            color: Some(" #00ff00 ".into()),
        };
        let updated = update_tag(&ctx, original.id, &request, at(1)).unwrap();
        assert_eq!(updated.name, "urgent");
        assert_eq!(updated.color, "#00ff00");
        assert_eq!(updated.updated_at, at(1));
        assert_eq!(get_tag(&ctx, original.id).unwrap(), updated);

        let missing = update_tag(&ctx, Uuid::now_v7(), &request, at(1));
        assert!(matches!(missing, Err(ApiError::NotFound("Tag"))));
    }

    #[test]
    fn delete_cascades_into_tasks() {
        let ctx = DataContext::open_in_memory().unwrap();
        let doomed = tag(&ctx, "doomed");
        let kept = tag(&ctx, "kept");
        let both = task_with(&ctx, "both", vec![doomed.id, kept.id]);
        let untouched = task_with(&ctx, "untouched", vec![kept.id]);

        assert_eq!(delete_tag(&ctx, doomed.id, at(1)).unwrap().message, "Tag deleted");

        let both = ctx.find_by_id::<Task>(both.id).unwrap().unwrap();
        assert_eq!(both.tags, vec![kept.id]);
        assert_eq!(both.updated_at, at(1));
        assert_eq!(ctx.find_by_id::<Task>(untouched.id).unwrap().unwrap(), untouched);
        assert!(matches!(get_tag(&ctx, doomed.id), Err(ApiError::NotFound("Tag"))));
    }

    #[test]
    fn delete_missing_tag_is_not_found() {
        let ctx = DataContext::open_in_memory().unwrap();
        assert!(matches!(delete_tag(&ctx, Uuid::now_v7(), at(0)), Err(ApiError::NotFound("Tag"))));
    }

    #[test]
    fn cleanup_removes_dangling_references_and_is_idempotent() {
        let ctx = DataContext::open_in_memory().unwrap();
        let live = tag(&ctx, "live");
        let dangling = Uuid::now_v7();
        let stale = task_with(&ctx, "stale", vec![dangling, live.id]);
        task_with(&ctx, "clean", vec![live.id]);
        task_with(&ctx, "untagged", vec![]);

        let first = cleanup_orphaned_tags(&ctx, at(1)).unwrap();
        assert_eq!(first.updated_tasks, 1);
        assert_eq!(ctx.find_by_id::<Task>(stale.id).unwrap().unwrap().tags, vec![live.id]);

        let second = cleanup_orphaned_tags(&ctx, at(2)).unwrap();
        assert_eq!(second.updated_tasks, 0);
    }
}
