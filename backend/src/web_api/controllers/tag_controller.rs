use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    app_state::SharedState,
    error::ApiResult,
    message_response::MessageResponse,
    services::tag_service,
    tag::Tag,
    tag_requests::{TagCreateRequest, TagUpdateRequest},
    web_api::extractors::{ApiJson, ApiPath},
};

pub struct TagController {}

impl TagController {
    pub async fn get_all(State(state): State<SharedState>) -> ApiResult<Json<Vec<Tag>>> {
        tag_service::list_tags(&state.data_context).map(Json)
    }

    pub async fn get(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<Tag>> {
        tag_service::get_tag(&state.data_context, id).map(Json)
    }

    pub async fn add(
        State(state): State<SharedState>,
        ApiJson(body): ApiJson<TagCreateRequest>) -> ApiResult<(StatusCode, Json<Tag>)> {
        let tag = tag_service::create_tag(&state.data_context, &body, Utc::now())?;
        Ok((StatusCode::CREATED, Json(tag)))
    }

    pub async fn edit(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>,
        ApiJson(body): ApiJson<TagUpdateRequest>) -> ApiResult<Json<Tag>> {
        tag_service::update_tag(&state.data_context, id, &body, Utc::now()).map(Json)
    }

    pub async fn delete(
        State(state): State<SharedState>,
        ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<MessageResponse>> {
        tag_service::delete_tag(&state.data_context, id, Utc::now()).map(Json)
    }
}
