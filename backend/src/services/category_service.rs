//! Category CRUD. Deleting a category leaves task references dangling;
//! they resolve to `null` on read.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    category::Category,
    category_requests::{CategoryCreateRequest, CategoryUpdateRequest},
    data_access::data_context::DataContext,
    error::{ApiError, ApiResult},
    message_response::MessageResponse,
};

/// All categories in store order.
pub fn list_categories(ctx: &DataContext) -> ApiResult<Vec<Category>> {
    Ok(ctx.find_all::<Category>()?)
}

pub fn get_category(ctx: &DataContext, id: Uuid) -> ApiResult<Category> {
    ctx.find_by_id::<Category>(id)?
        .ok_or(ApiError::NotFound("Category"))
}

pub fn create_category(
    ctx: &DataContext,
    request: &CategoryCreateRequest,
    now: DateTime<Utc>,
) -> ApiResult<Category> {
    let category = Category::new(&request.name, now);
    category.validate()?;
    ctx.insert(&category)?;
    tracing::info!(category_id = %category.id, name = %category.name, "category created");
    Ok(category)
}

pub fn update_category(
    ctx: &DataContext,
    id: Uuid,
    request: &CategoryUpdateRequest,
    now: DateTime<Utc>,
) -> ApiResult<Category> {
    let mut category = get_category(ctx, id)?;
    match &request.name {
        Some(name) => category.rename(name, now),
        None => category.updated_at = now,
    }
    category.validate()?;
    if !ctx.replace(&category)? {
        return Err(ApiError::NotFound("Category"));
    }
    Ok(category)
}

pub fn delete_category(ctx: &DataContext, id: Uuid) -> ApiResult<MessageResponse> {
    if !ctx.remove::<Category>(id)? {
        return Err(ApiError::NotFound("Category"));
    }
    tracing::info!(category_id = %id, "category deleted");
    Ok(MessageResponse::new("Category deleted"))
}
