use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::{validate_email, validate_name, validate_password};
use super::{ApiError, ApiResponse, AppState, MessageResponse, UserDto};
use crate::domain::Role;

const SESSION_USER_ID: &str = "user_id";
const SESSION_ROLE: &str = "role";

// ============================================================================
// Request types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

// ============================================================================
// Session helpers & middleware
// ============================================================================

/// The logged-in identity carried by the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser {
    pub id: i32,
    pub role: Role,
}

/// Reads the session, erroring when nobody is logged in.
pub async fn current_user(session: &Session) -> Result<SessionUser, ApiError> {
    let id = session
        .get::<i32>(SESSION_USER_ID)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let role = session
        .get::<String>(SESSION_ROLE)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .as_deref()
        .and_then(Role::parse)
        .unwrap_or_default();

    Ok(SessionUser { id, role })
}

async fn establish_session(session: &Session, id: i32, role: Role) -> Result<(), ApiError> {
    session
        .insert(SESSION_USER_ID, id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(SESSION_ROLE, role.as_str().to_string())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    Ok(())
}

/// Gate for user-facing routes: a logged-in session is required.
pub async fn require_auth(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    current_user(&session).await?;
    Ok(next.run(request).await)
}

/// Gate for the admin console: logged-in and role "admin".
pub async fn require_admin(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let user = current_user(&session).await?;

    if !user.role.is_admin() {
        return Err(ApiError::Forbidden(
            "Admin privileges required".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let name = validate_name(&payload.name)?;
    let email = validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    if payload.password != payload.password_confirm {
        return Err(ApiError::validation("Passwords do not match"));
    }

    let user = state.auth().register(name, email, &payload.password).await?;

    tracing::info!(user_id = user.id, "New account registered");
    establish_session(&session, user.id, user.role).await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Please provide email and password"));
    }

    let user = state.auth().login(&payload.email, &payload.password).await?;

    establish_session(&session, user.id, user.role).await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = current_user(&session).await?;
    let user = state.auth().get_user(user.id).await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// PUT /auth/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let session_user = current_user(&session).await?;

    let name = validate_name(&payload.name)?;
    let email = validate_email(&payload.email)?;

    let user = state
        .auth()
        .update_profile(session_user.id, name, email)
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let session_user = current_user(&session).await?;

    validate_password(&payload.new_password)?;

    if payload.new_password != payload.new_password_confirm {
        return Err(ApiError::validation("New passwords do not match"));
    }

    state
        .auth()
        .change_password(
            session_user.id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    tracing::info!(user_id = session_user.id, "Password changed");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}

/// POST /auth/forgot-password
///
/// Always answers with the same message so the response never discloses
/// whether an account exists.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Please provide your email address"));
    }

    if let Some(issued) = state.auth().forgot_password(&payload.email).await? {
        // Mail delivery is out of scope; surface the link in the server log.
        tracing::info!(
            expires_at = %issued.expires_at,
            "Password reset requested, reset path: /reset-password/{}",
            issued.token
        );
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "If an account exists with that email, you will receive a password reset link shortly."
            .to_string(),
    })))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.token.trim().is_empty() {
        return Err(ApiError::validation("Invalid reset token"));
    }

    validate_password(&payload.password)?;

    if payload.password != payload.password_confirm {
        return Err(ApiError::validation("Passwords do not match"));
    }

    state
        .auth()
        .reset_password(&payload.token, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password has been reset successfully. You can now login with your new password."
            .to_string(),
    })))
}
