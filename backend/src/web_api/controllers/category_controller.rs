use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    app_state::SharedState,
    category::Category,
    category_requests::{CategoryCreateRequest, CategoryUpdateRequest},
    error::ApiResult,
    message_response::MessageResponse,
    services::category_service,
    web_api::extractors::{ApiJson, ApiPath},
};

pub struct CategoryController {}

impl CategoryController {
    pub async fn get_all(State(state): State<SharedState>) -> ApiResult<Json<Vec<Category>>> {
        category_service::list_categories(&state.data_context).map(Json)
    }

    pub async fn get(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<Category>> {
        category_service::get_category(&state.data_context, id).map(Json)
    }

    pub async fn add(
        State(state): State<SharedState>,
        ApiJson(body): ApiJson<CategoryCreateRequest>) -> ApiResult<(StatusCode, Json<Category>)> {
        let category = category_service::create_category(&state.data_context, &body, Utc::now())?;
        Ok((StatusCode::CREATED, Json(category)))
    }

    pub async fn edit(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>,
        ApiJson(body): ApiJson<CategoryUpdateRequest>) -> ApiResult<Json<Category>> {
        category_service::update_category(&state.data_context, id, &body, Utc::now()).map(Json)
    }

    pub async fn delete(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<MessageResponse>> {
        category_service::delete_category(&state.data_context, id).map(Json)
    }
}
