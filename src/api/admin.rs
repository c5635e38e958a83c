use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::current_user;
use super::{
    AdminDashboardDto, AdminIdeaDto, AdminIdeaListDto, AdminStatisticsDto, AdminUserDto,
    AdminUserListDto, ApiError, ApiResponse, AppState, MessageResponse,
};
use crate::db::User;
use crate::models::Idea;

const PAGE_SIZE: u64 = 20;
const RECENT_LIMIT: u64 = 5;

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

fn admin_user_dto(user: User, idea_count: u64) -> AdminUserDto {
    AdminUserDto {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role.as_str().to_string(),
        is_active: user.is_active,
        idea_count,
        created_at: user.created_at,
    }
}

fn admin_idea_dto(idea: Idea, user: Option<User>) -> AdminIdeaDto {
    AdminIdeaDto {
        id: idea.id,
        title: idea.title,
        status: idea.status.as_str().to_string(),
        user_name: user.as_ref().map(|u| u.name.clone()),
        user_email: user.map(|u| u.email),
        created_at: idea.created_at,
    }
}

fn total_pages(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE).max(1)
}

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AdminDashboardDto>>, ApiError> {
    let now = chrono::Utc::now();
    let week_ago = (now - chrono::Duration::days(7)).to_rfc3339();
    let month_ago = (now - chrono::Duration::days(30)).to_rfc3339();
    let today_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().to_rfc3339())
        .unwrap_or_else(|| now.to_rfc3339());

    let store = state.store();

    let total_users = store.count_users().await?;
    let total_ideas = store.count_ideas().await?;
    let active_users_week = store.distinct_idea_authors_since(&week_ago).await?;
    let new_users_month = store.count_users_created_since(&month_ago).await?;
    let ideas_today = store.count_ideas_created_since(&today_start).await?;

    let recent_users = store
        .recent_users(RECENT_LIMIT)
        .await?
        .into_iter()
        .map(|u| admin_user_dto(u, 0))
        .collect();

    let recent_ideas = store
        .recent_ideas_with_users(RECENT_LIMIT)
        .await?
        .into_iter()
        .map(|(idea, user)| admin_idea_dto(idea, user))
        .collect();

    Ok(Json(ApiResponse::success(AdminDashboardDto {
        total_users,
        total_ideas,
        active_users_week,
        new_users_month,
        ideas_today,
        recent_users,
        recent_ideas,
    })))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageQuery>,
) -> Result<Json<ApiResponse<AdminUserListDto>>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let offset = (page - 1) * PAGE_SIZE;

    let (users, total) = state.store().list_users_paginated(PAGE_SIZE, offset).await?;

    Ok(Json(ApiResponse::success(AdminUserListDto {
        users: users
            .into_iter()
            .map(|(user, idea_count)| admin_user_dto(user, idea_count))
            .collect(),
        total,
        page,
        total_pages: total_pages(total),
    })))
}

/// POST /admin/users/{id}/toggle
pub async fn toggle_user_status(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<AdminUserDto>>, ApiError> {
    let admin = current_user(&session).await?;

    if admin.id == user_id {
        return Err(ApiError::validation("You cannot disable your own account"));
    }

    let user = state
        .store()
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(user_id))?;

    let updated = state
        .store()
        .set_user_active(user_id, !user.is_active)
        .await?
        .ok_or_else(|| ApiError::user_not_found(user_id))?;

    tracing::info!(
        user_id,
        is_active = updated.is_active,
        "Admin toggled account status"
    );

    Ok(Json(ApiResponse::success(admin_user_dto(updated, 0))))
}

/// DELETE /admin/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let admin = current_user(&session).await?;

    if admin.id == user_id {
        return Err(ApiError::validation("You cannot delete your own account"));
    }

    let removed = state.store().delete_user(user_id).await?;

    if !removed {
        return Err(ApiError::user_not_found(user_id));
    }

    tracing::info!(user_id, "Admin deleted account");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "User deleted successfully".to_string(),
    })))
}

/// GET /admin/ideas
pub async fn list_ideas(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageQuery>,
) -> Result<Json<ApiResponse<AdminIdeaListDto>>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let offset = (page - 1) * PAGE_SIZE;

    let (ideas, total) = state
        .store()
        .list_all_ideas_paginated(PAGE_SIZE, offset)
        .await?;

    Ok(Json(ApiResponse::success(AdminIdeaListDto {
        ideas: ideas
            .into_iter()
            .map(|(idea, user)| admin_idea_dto(idea, user))
            .collect(),
        total,
        page,
        total_pages: total_pages(total),
    })))
}

/// DELETE /admin/ideas/{id}
pub async fn delete_idea(
    State(state): State<Arc<AppState>>,
    Path(idea_id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let removed = state.store().delete_idea_any(idea_id).await?;

    if !removed {
        return Err(ApiError::idea_not_found(idea_id));
    }

    tracing::info!(idea_id, "Admin deleted idea");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Idea deleted successfully".to_string(),
    })))
}

/// GET /admin/statistics
pub async fn statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AdminStatisticsDto>>, ApiError> {
    let users = state.store().user_breakdown().await?;
    let ideas = state.store().idea_breakdown().await?;

    Ok(Json(ApiResponse::success(AdminStatisticsDto {
        users,
        ideas,
    })))
}
