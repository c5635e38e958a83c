//! `SeaORM` implementation of the `IdeaService` trait.

use async_trait::async_trait;

use crate::db::{IdeaChanges, IdeaFilter, Store};
use crate::domain::{IdeaId, IdeaStatus};
use crate::models::{Idea, IdeaStats};
use crate::services::idea_service::{IdeaError, IdeaPage, IdeaService};

pub struct SeaOrmIdeaService {
    store: Store,
}

impl SeaOrmIdeaService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdeaService for SeaOrmIdeaService {
    async fn create(&self, user_id: i32, title: &str, raw_idea: &str) -> Result<Idea, IdeaError> {
        let idea = self
            .store
            .create_idea(user_id, title.trim(), raw_idea.trim())
            .await?;

        tracing::info!(idea_id = idea.id, user_id, "Created draft idea");
        Ok(idea)
    }

    async fn get(&self, id: IdeaId, user_id: i32) -> Result<Idea, IdeaError> {
        self.store
            .get_idea(id.value(), user_id)
            .await?
            .ok_or(IdeaError::NotFound(id))
    }

    async fn list(&self, user_id: i32, filter: IdeaFilter) -> Result<IdeaPage, IdeaError> {
        let (items, total) = self.store.list_ideas(user_id, &filter).await?;

        Ok(IdeaPage {
            items,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    async fn update(
        &self,
        id: IdeaId,
        user_id: i32,
        mut changes: IdeaChanges,
    ) -> Result<Idea, IdeaError> {
        if let Some(status) = changes.status {
            if status != IdeaStatus::Archived {
                return Err(IdeaError::Validation(
                    "Status can only be changed to archived".to_string(),
                ));
            }
        }

        if let Some(title) = changes.title.as_mut() {
            *title = title.trim().to_string();
        }
        if let Some(raw_idea) = changes.raw_idea.as_mut() {
            *raw_idea = raw_idea.trim().to_string();
        }

        self.store
            .update_idea(id.value(), user_id, &changes)
            .await?
            .ok_or(IdeaError::NotFound(id))
    }

    async fn delete(&self, id: IdeaId, user_id: i32) -> Result<(), IdeaError> {
        let removed = self.store.delete_idea(id.value(), user_id).await?;

        if removed {
            tracing::info!(idea_id = id.value(), user_id, "Deleted idea");
            Ok(())
        } else {
            Err(IdeaError::NotFound(id))
        }
    }

    async fn toggle_favorite(&self, id: IdeaId, user_id: i32) -> Result<Idea, IdeaError> {
        self.store
            .toggle_idea_favorite(id.value(), user_id)
            .await?
            .ok_or(IdeaError::NotFound(id))
    }

    async fn stats(&self, user_id: i32) -> Result<IdeaStats, IdeaError> {
        Ok(self.store.idea_stats(user_id).await?)
    }
}
