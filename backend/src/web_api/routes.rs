pub mod category_routes;
pub mod health_routes;
pub mod tag_routes;
pub mod task_routes;

use axum::Router;

use crate::app_state::SharedState;

pub const API_PREFIX: &str = "/api";

pub fn map_routes(app_state: SharedState) -> Router {
    let api = Router::new()
        .merge(health_routes::get_router())
        .merge(task_routes::get_router(app_state.clone()))
        .merge(category_routes::get_router(app_state.clone()))
        .merge(tag_routes::get_router(app_state));

    Router::new().nest(API_PREFIX, api)
}
