use axum::{Router, routing::get};
use crate::{app_state::SharedState, tag_controller::TagController};

pub const ROUTER_PATH: &str = "/tags";

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route(ROUTER_PATH, get(TagController::get_all).post(TagController::add))
        .route(
            format!("{}/:id", ROUTER_PATH).as_str(),
            get(TagController::get)
                .put(TagController::edit)
                .delete(TagController::delete),
        )
        .with_state(app_state)
}
