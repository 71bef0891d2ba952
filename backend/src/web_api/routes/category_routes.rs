use axum::{Router, routing::get};
use crate::{app_state::SharedState, category_controller::CategoryController};

pub const ROUTER_PATH: &str = "/categories";

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route(ROUTER_PATH, get(CategoryController::get_all).post(CategoryController::add))
        .route(
            format!("{}/:id", ROUTER_PATH).as_str(),
            get(CategoryController::get)
                .put(CategoryController::edit)
                .delete(CategoryController::delete),
        )
        .with_state(app_state)
}
