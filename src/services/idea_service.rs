//! Domain service for idea management operations.

use thiserror::Error;

use crate::db::{IdeaChanges, IdeaFilter};
use crate::domain::IdeaId;
use crate::models::{Idea, IdeaStats};

/// Domain errors for idea operations.
#[derive(Debug, Error)]
pub enum IdeaError {
    /// Covers both "does not exist" and "belongs to someone else"; the two
    /// are deliberately indistinguishable.
    #[error("Idea not found: {0}")]
    NotFound(IdeaId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for IdeaError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for IdeaError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// One page of a user's ideas.
#[derive(Debug, Clone)]
pub struct IdeaPage {
    pub items: Vec<Idea>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Domain service trait for idea CRUD. All operations are scoped to the
/// owning user; expansion lives in `ExpansionService`.
#[async_trait::async_trait]
pub trait IdeaService: Send + Sync {
    /// Creates a draft idea.
    async fn create(&self, user_id: i32, title: &str, raw_idea: &str) -> Result<Idea, IdeaError>;

    /// Fetches one idea with its ordered sections.
    async fn get(&self, id: IdeaId, user_id: i32) -> Result<Idea, IdeaError>;

    /// Lists ideas newest-first with optional status filter and free-text
    /// search over title and raw text.
    async fn list(&self, user_id: i32, filter: IdeaFilter) -> Result<IdeaPage, IdeaError>;

    /// Applies a partial update. The only status change accepted here is
    /// archiving; there is no path back from archived to draft.
    async fn update(&self, id: IdeaId, user_id: i32, changes: IdeaChanges)
    -> Result<Idea, IdeaError>;

    /// Deletes from any state, cascading to sections.
    async fn delete(&self, id: IdeaId, user_id: i32) -> Result<(), IdeaError>;

    async fn toggle_favorite(&self, id: IdeaId, user_id: i32) -> Result<Idea, IdeaError>;

    async fn stats(&self, user_id: i32) -> Result<IdeaStats, IdeaError>;
}
