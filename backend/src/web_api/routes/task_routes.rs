use axum::{Router, routing::{get, post, put}};
use crate::{app_state::SharedState, task_controller::TaskController};

pub const ROUTER_PATH: &str = "/tasks";

/// Fixed sub-paths are registered ahead of `/:id` so they never reach the
/// id extractor.
pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route(ROUTER_PATH, get(TaskController::list).post(TaskController::create))
        .route(
            format!("{}/bulk", ROUTER_PATH).as_str(),
            post(TaskController::bulk_create)
                .put(TaskController::bulk_update)
                .delete(TaskController::bulk_delete),
        )
        .route(format!("{}/stats/overview", ROUTER_PATH).as_str(), get(TaskController::stats_overview))
        .route(format!("{}/stats/priority", ROUTER_PATH).as_str(), get(TaskController::stats_by_priority))
        .route(format!("{}/stats/recent", ROUTER_PATH).as_str(), get(TaskController::stats_recent))
        .route(format!("{}/due-range", ROUTER_PATH).as_str(), get(TaskController::due_range))
        .route(format!("{}/overdue", ROUTER_PATH).as_str(), get(TaskController::overdue))
        .route(format!("{}/priority/:level", ROUTER_PATH).as_str(), get(TaskController::by_priority))
        .route(
            format!("{}/cleanup/orphaned-tags", ROUTER_PATH).as_str(),
            post(TaskController::cleanup_orphaned_tags),
        )
        .route(format!("{}/:id/complete", ROUTER_PATH).as_str(), put(TaskController::complete))
        .route(format!("{}/:id/incomplete", ROUTER_PATH).as_str(), put(TaskController::incomplete))
        .route(format!("{}/:id/toggle", ROUTER_PATH).as_str(), put(TaskController::toggle))
        .route(format!("{}/:id/duplicate", ROUTER_PATH).as_str(), post(TaskController::duplicate))
        .route(
            format!("{}/:id", ROUTER_PATH).as_str(),
            get(TaskController::get)
                .put(TaskController::update)
                .patch(TaskController::patch)
                .delete(TaskController::delete),
        )
        .with_state(app_state)
}
