use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use time;

use crate::config::Config;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
mod ideas;
mod system;
mod types;
pub mod validation;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn ideas(&self) -> &Arc<dyn crate::services::IdeaService> {
        &self.shared.idea_service
    }

    #[must_use]
    pub fn expansion(&self) -> &Arc<crate::services::ExpansionService> {
        &self.shared.expansion
    }
}

pub async fn create_app_state(shared: Arc<SharedState>) -> anyhow::Result<Arc<AppState>> {
    Ok(Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    }))
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_minutes) = {
        let config = state.config();
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_minutes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_router())
        .merge(admin_router())
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/profile", put(auth::update_profile))
        .route("/auth/password", put(auth::change_password))
        .route("/ideas", post(ideas::create_idea))
        .route("/ideas", get(ideas::list_ideas))
        .route("/ideas/stats", get(ideas::get_stats))
        .route("/ideas/{id}", get(ideas::get_idea))
        .route("/ideas/{id}", put(ideas::update_idea))
        .route("/ideas/{id}", delete(ideas::delete_idea))
        .route("/ideas/{id}/expand", post(ideas::expand_idea))
        .route("/ideas/{id}/favorite", post(ideas::toggle_favorite))
        .route("/expand-prompt", post(ideas::expand_prompt))
        .route("/system/status", get(system::get_status))
        .route_layer(middleware::from_fn(auth::require_auth))
}

fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/toggle", post(admin::toggle_user_status))
        .route("/admin/users/{id}", delete(admin::delete_user))
        .route("/admin/ideas", get(admin::list_ideas))
        .route("/admin/ideas/{id}", delete(admin::delete_idea))
        .route("/admin/statistics", get(admin::statistics))
        .route("/system/test-completion", get(system::test_completion))
        .route_layer(middleware::from_fn(auth::require_admin))
}
