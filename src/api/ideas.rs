use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::current_user;
use super::validation::{clamp_limit, validate_idea_content, validate_idea_title};
use super::{
    ApiError, ApiResponse, AppState, ExpandIdeaDto, ExpandPromptDto, IdeaDto, IdeaListDto,
    StatsDto,
};
use crate::db::{IdeaChanges, IdeaFilter};
use crate::domain::{IdeaId, IdeaStatus};

#[derive(Deserialize)]
pub struct CreateIdeaRequest {
    pub title: String,
    pub raw_idea: String,
}

#[derive(Deserialize)]
pub struct UpdateIdeaRequest {
    pub title: Option<String>,
    pub raw_idea: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    /// Re-run the expansion after applying the update.
    #[serde(default)]
    pub re_expand: bool,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Deserialize)]
pub struct ExpandPromptRequest {
    pub prompt: String,
}

/// POST /ideas
pub async fn create_idea(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateIdeaRequest>,
) -> Result<Json<ApiResponse<IdeaDto>>, ApiError> {
    let user = current_user(&session).await?;

    let title = validate_idea_title(&payload.title)?;
    let raw_idea = validate_idea_content(&payload.raw_idea)?;

    let idea = state.ideas().create(user.id, title, raw_idea).await?;

    Ok(Json(ApiResponse::success(IdeaDto::from(idea))))
}

/// GET /ideas
pub async fn list_ideas(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(params): Query<ListQuery>,
) -> Result<Json<ApiResponse<IdeaListDto>>, ApiError> {
    let user = current_user(&session).await?;

    let status = match params.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            IdeaStatus::parse(raw)
                .ok_or_else(|| ApiError::validation(format!("Invalid status filter: {raw}")))?,
        ),
    };

    let filter = IdeaFilter {
        status,
        search: params.search,
        limit: clamp_limit(params.limit),
        offset: params.offset.unwrap_or(0),
    };

    let page = state.ideas().list(user.id, filter).await?;

    Ok(Json(ApiResponse::success(IdeaListDto {
        items: page.items.into_iter().map(IdeaDto::from).collect(),
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    })))
}

/// GET /ideas/{id}
pub async fn get_idea(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<IdeaDto>>, ApiError> {
    let user = current_user(&session).await?;

    let idea = state.ideas().get(IdeaId::new(id), user.id).await?;

    Ok(Json(ApiResponse::success(IdeaDto::from(idea))))
}

/// PUT /ideas/{id}
pub async fn update_idea(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateIdeaRequest>,
) -> Result<Json<ApiResponse<IdeaDto>>, ApiError> {
    let user = current_user(&session).await?;

    let title = payload
        .title
        .as_deref()
        .map(validate_idea_title)
        .transpose()?
        .map(str::to_string);
    let raw_idea = payload
        .raw_idea
        .as_deref()
        .map(validate_idea_content)
        .transpose()?
        .map(str::to_string);
    let status = match payload.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            IdeaStatus::parse(raw)
                .ok_or_else(|| ApiError::validation(format!("Invalid status: {raw}")))?,
        ),
    };

    let changes = IdeaChanges {
        title,
        raw_idea,
        tags: payload.tags,
        status,
    };

    let idea = state
        .ideas()
        .update(IdeaId::new(id), user.id, changes)
        .await?;

    // Optional immediate re-expansion over the freshly saved text.
    let idea = if payload.re_expand {
        state
            .expansion()
            .expand_idea(IdeaId::new(id), user.id)
            .await?
            .idea
    } else {
        idea
    };

    Ok(Json(ApiResponse::success(IdeaDto::from(idea))))
}

/// DELETE /ideas/{id}
pub async fn delete_idea(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<super::MessageResponse>>, ApiError> {
    let user = current_user(&session).await?;

    state.ideas().delete(IdeaId::new(id), user.id).await?;

    Ok(Json(ApiResponse::success(super::MessageResponse {
        message: "Idea deleted successfully".to_string(),
    })))
}

/// POST /ideas/{id}/expand
pub async fn expand_idea(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ExpandIdeaDto>>, ApiError> {
    let user = current_user(&session).await?;

    let expanded = state
        .expansion()
        .expand_idea(IdeaId::new(id), user.id)
        .await?;

    Ok(Json(ApiResponse::success(ExpandIdeaDto {
        idea: IdeaDto::from(expanded.idea),
        usage: expanded.usage,
    })))
}

/// POST /ideas/{id}/favorite
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<IdeaDto>>, ApiError> {
    let user = current_user(&session).await?;

    let idea = state
        .ideas()
        .toggle_favorite(IdeaId::new(id), user.id)
        .await?;

    Ok(Json(ApiResponse::success(IdeaDto::from(idea))))
}

/// GET /ideas/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<StatsDto>>, ApiError> {
    let user = current_user(&session).await?;

    let stats = state.ideas().stats(user.id).await?;

    Ok(Json(ApiResponse::success(StatsDto::from(stats))))
}

/// POST /expand-prompt
///
/// Free-form companion to the structured expansion, used by the follow-up
/// prompt suggestions.
pub async fn expand_prompt(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ExpandPromptRequest>,
) -> Result<Json<ApiResponse<ExpandPromptDto>>, ApiError> {
    current_user(&session).await?;

    let prompt = payload.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::validation("Prompt is required"));
    }

    let completion = state.expansion().expand_prompt(prompt).await?;

    Ok(Json(ApiResponse::success(ExpandPromptDto {
        result: completion.content,
        usage: completion.usage,
    })))
}
