use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse, SystemStatus};

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database_ok = state.store().ping().await.is_ok();
    let total_users = state.store().count_users().await.unwrap_or(0);
    let total_ideas = state.store().count_ideas().await.unwrap_or(0);

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database_ok,
        completion_configured: state.expansion().is_configured(),
        total_users,
        total_ideas,
    })))
}

/// GET /system/test-completion (admin)
pub async fn test_completion(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .expansion()
        .test_connection()
        .await
        .map_err(|e| ApiError::completion_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Completion service connection successful".to_string(),
    })))
}
