use axum::Json;

use crate::message_response::HealthResponse;

pub struct HealthController {}

impl HealthController {
    pub async fn get() -> Json<HealthResponse> {
        Json(HealthResponse {
            message: "Task Manager API is running".to_string(),
            status: "healthy".to_string(),
        })
    }
}
