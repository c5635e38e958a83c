use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::models::{FollowUpPrompt, Idea, IdeaStats};
use crate::parser::ParsedSections;

pub mod migrator;
pub mod repositories;

pub use repositories::idea::{IdeaBreakdown, IdeaChanges, IdeaFilter};
pub use repositories::user::{User, UserBreakdown};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn idea_repo(&self) -> repositories::idea::IdeaRepository {
        repositories::idea::IdeaRepository::new(self.conn.clone())
    }

    fn reset_token_repo(&self) -> repositories::reset_token::ResetTokenRepository {
        repositories::reset_token::ResetTokenRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn email_taken(&self, email: &str, exclude_id: Option<i32>) -> Result<bool> {
        self.user_repo().email_taken(email, exclude_id).await
    }

    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
        security: Option<&SecurityConfig>,
    ) -> Result<User> {
        self.user_repo()
            .create(email, name, password, role, security)
            .await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn verify_user_password_by_id(&self, id: i32, password: &str) -> Result<bool> {
        self.user_repo().verify_password_by_id(id, password).await
    }

    pub async fn update_user_last_login(&self, id: i32) -> Result<()> {
        self.user_repo().update_last_login(id).await
    }

    pub async fn update_user_profile(&self, id: i32, name: &str, email: &str) -> Result<User> {
        self.user_repo().update_profile(id, name, email).await
    }

    pub async fn update_user_password(
        &self,
        id: i32,
        new_password: &str,
        security: Option<&SecurityConfig>,
    ) -> Result<()> {
        self.user_repo()
            .update_password(id, new_password, security)
            .await
    }

    pub async fn set_user_active(&self, id: i32, is_active: bool) -> Result<Option<User>> {
        self.user_repo().set_active(id, is_active).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count_all().await
    }

    pub async fn count_users_created_since(&self, cutoff: &str) -> Result<u64> {
        self.user_repo().count_created_since(cutoff).await
    }

    pub async fn user_breakdown(&self) -> Result<UserBreakdown> {
        self.user_repo().breakdown().await
    }

    pub async fn list_users_paginated(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<(User, u64)>, u64)> {
        self.user_repo().list_paginated(limit, offset).await
    }

    pub async fn recent_users(&self, limit: u64) -> Result<Vec<User>> {
        self.user_repo().recent(limit).await
    }

    // ------------------------------------------------------------------
    // Ideas
    // ------------------------------------------------------------------

    pub async fn create_idea(&self, user_id: i32, title: &str, raw_idea: &str) -> Result<Idea> {
        self.idea_repo().create(user_id, title, raw_idea).await
    }

    pub async fn get_idea(&self, id: i32, user_id: i32) -> Result<Option<Idea>> {
        self.idea_repo().get(id, user_id).await
    }

    pub async fn get_idea_any(&self, id: i32) -> Result<Option<Idea>> {
        self.idea_repo().get_any(id).await
    }

    pub async fn list_ideas(&self, user_id: i32, filter: &IdeaFilter) -> Result<(Vec<Idea>, u64)> {
        self.idea_repo().list(user_id, filter).await
    }

    pub async fn update_idea(
        &self,
        id: i32,
        user_id: i32,
        changes: &IdeaChanges,
    ) -> Result<Option<Idea>> {
        self.idea_repo().update(id, user_id, changes).await
    }

    pub async fn toggle_idea_favorite(&self, id: i32, user_id: i32) -> Result<Option<Idea>> {
        self.idea_repo().toggle_favorite(id, user_id).await
    }

    pub async fn delete_idea(&self, id: i32, user_id: i32) -> Result<bool> {
        self.idea_repo().delete(id, user_id).await
    }

    pub async fn delete_idea_any(&self, id: i32) -> Result<bool> {
        self.idea_repo().delete_any(id).await
    }

    pub async fn save_idea_expansion(
        &self,
        id: i32,
        user_id: i32,
        expanded_content: &str,
        sections: &ParsedSections,
        prompts: &[FollowUpPrompt],
    ) -> Result<Option<Idea>> {
        self.idea_repo()
            .save_expansion(id, user_id, expanded_content, sections, prompts)
            .await
    }

    pub async fn idea_stats(&self, user_id: i32) -> Result<IdeaStats> {
        self.idea_repo().stats(user_id).await
    }

    pub async fn count_ideas(&self) -> Result<u64> {
        self.idea_repo().count_all().await
    }

    pub async fn count_ideas_created_since(&self, cutoff: &str) -> Result<u64> {
        self.idea_repo().count_created_since(cutoff).await
    }

    pub async fn distinct_idea_authors_since(&self, cutoff: &str) -> Result<u64> {
        self.idea_repo().distinct_authors_since(cutoff).await
    }

    pub async fn list_all_ideas_paginated(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<(Idea, Option<User>)>, u64)> {
        self.idea_repo().list_all_paginated(limit, offset).await
    }

    pub async fn recent_ideas_with_users(&self, limit: u64) -> Result<Vec<(Idea, Option<User>)>> {
        self.idea_repo().recent_with_users(limit).await
    }

    pub async fn idea_breakdown(&self) -> Result<IdeaBreakdown> {
        self.idea_repo().status_breakdown().await
    }

    // ------------------------------------------------------------------
    // Password reset tokens
    // ------------------------------------------------------------------

    pub async fn create_reset_token(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: &str,
    ) -> Result<()> {
        self.reset_token_repo()
            .create(user_id, token_hash, expires_at)
            .await
    }

    pub async fn find_valid_reset_token(
        &self,
        token_hash: &str,
        now: &str,
    ) -> Result<Option<crate::entities::password_reset_tokens::Model>> {
        self.reset_token_repo().find_valid(token_hash, now).await
    }

    pub async fn mark_reset_token_used(&self, id: i32) -> Result<()> {
        self.reset_token_repo().mark_used(id).await
    }
}
