use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::db::repositories::user::User;
use crate::domain::IdeaStatus;
use crate::entities::{idea_sections, ideas, users};
use crate::models::{FollowUpPrompt, Idea, IdeaSection, IdeaStats};
use crate::parser::ParsedSections;

/// Filters for a user's idea listing.
#[derive(Debug, Clone, Default)]
pub struct IdeaFilter {
    pub status: Option<IdeaStatus>,
    pub search: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct IdeaChanges {
    pub title: Option<String>,
    pub raw_idea: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<IdeaStatus>,
}

/// Idea counters per status for the admin statistics view.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct IdeaBreakdown {
    pub total: u64,
    pub drafts: u64,
    pub expanded: u64,
    pub archived: u64,
}

pub struct IdeaRepository {
    conn: DatabaseConnection,
}

impl IdeaRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: ideas::Model, sections: Vec<idea_sections::Model>) -> Idea {
        Idea {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            raw_idea: model.raw_idea,
            expanded_content: model.expanded_content,
            sections_parsed: model
                .sections_parsed
                .as_deref()
                .and_then(ParsedSections::from_json),
            suggested_prompts: model
                .suggested_prompts
                .as_deref()
                .and_then(|s| serde_json::from_str::<Vec<FollowUpPrompt>>(s).ok())
                .unwrap_or_default(),
            status: IdeaStatus::parse(&model.status).unwrap_or_default(),
            is_favorite: model.is_favorite,
            tags: model
                .tags
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or_default(),
            sections: sections.into_iter().filter_map(Self::map_section).collect(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    fn map_section(model: idea_sections::Model) -> Option<IdeaSection> {
        Some(IdeaSection {
            section_type: crate::domain::SectionType::parse(&model.section_type)?,
            content: model.content,
            order_index: model.order_index,
        })
    }

    pub async fn create(&self, user_id: i32, title: &str, raw_idea: &str) -> Result<Idea> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = ideas::ActiveModel {
            user_id: Set(user_id),
            title: Set(title.to_string()),
            raw_idea: Set(raw_idea.to_string()),
            status: Set(IdeaStatus::Draft.as_str().to_string()),
            is_favorite: Set(false),
            tags: Set(Some("[]".to_string())),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert idea")?;

        Ok(Self::map_model(model, Vec::new()))
    }

    /// Owner-scoped fetch with ordered sections. A foreign or unknown id is
    /// simply `None`.
    pub async fn get(&self, id: i32, user_id: i32) -> Result<Option<Idea>> {
        let model = ideas::Entity::find_by_id(id)
            .filter(ideas::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query idea")?;

        let Some(model) = model else {
            return Ok(None);
        };

        let sections = self.sections_for(model.id).await?;
        Ok(Some(Self::map_model(model, sections)))
    }

    /// Unscoped fetch for the admin console.
    pub async fn get_any(&self, id: i32) -> Result<Option<Idea>> {
        let model = ideas::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query idea")?;

        let Some(model) = model else {
            return Ok(None);
        };

        let sections = self.sections_for(model.id).await?;
        Ok(Some(Self::map_model(model, sections)))
    }

    pub async fn sections_for(&self, idea_id: i32) -> Result<Vec<idea_sections::Model>> {
        Ok(idea_sections::Entity::find()
            .filter(idea_sections::Column::IdeaId.eq(idea_id))
            .order_by_asc(idea_sections::Column::OrderIndex)
            .all(&self.conn)
            .await
            .context("Failed to query idea sections")?)
    }

    pub async fn list(&self, user_id: i32, filter: &IdeaFilter) -> Result<(Vec<Idea>, u64)> {
        let mut query = ideas::Entity::find().filter(ideas::Column::UserId.eq(user_id));

        if let Some(status) = filter.status {
            query = query.filter(ideas::Column::Status.eq(status.as_str()));
        }

        if let Some(search) = filter.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            query = query.filter(
                Condition::any()
                    .add(ideas::Column::Title.contains(search))
                    .add(ideas::Column::RawIdea.contains(search)),
            );
        }

        let total = query.clone().count(&self.conn).await?;

        let rows = query
            .order_by_desc(ideas::Column::CreatedAt)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.conn)
            .await
            .context("Failed to list ideas")?;

        let items = rows
            .into_iter()
            .map(|model| Self::map_model(model, Vec::new()))
            .collect();

        Ok((items, total))
    }

    pub async fn update(
        &self,
        id: i32,
        user_id: i32,
        changes: &IdeaChanges,
    ) -> Result<Option<Idea>> {
        let model = ideas::Entity::find_by_id(id)
            .filter(ideas::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query idea for update")?;

        let Some(model) = model else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();
        let idea_id = model.id;

        let mut active: ideas::ActiveModel = model.into();
        if let Some(title) = &changes.title {
            active.title = Set(title.clone());
        }
        if let Some(raw_idea) = &changes.raw_idea {
            active.raw_idea = Set(raw_idea.clone());
        }
        if let Some(tags) = &changes.tags {
            active.tags = Set(Some(serde_json::to_string(tags)?));
        }
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }
        active.updated_at = Set(now);

        let updated = active.update(&self.conn).await?;

        let sections = self.sections_for(idea_id).await?;
        Ok(Some(Self::map_model(updated, sections)))
    }

    pub async fn toggle_favorite(&self, id: i32, user_id: i32) -> Result<Option<Idea>> {
        let model = ideas::Entity::find_by_id(id)
            .filter(ideas::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query idea for favorite toggle")?;

        let Some(model) = model else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();
        let is_favorite = model.is_favorite;
        let idea_id = model.id;

        let mut active: ideas::ActiveModel = model.into();
        active.is_favorite = Set(!is_favorite);
        active.updated_at = Set(now);
        let updated = active.update(&self.conn).await?;

        let sections = self.sections_for(idea_id).await?;
        Ok(Some(Self::map_model(updated, sections)))
    }

    /// Owner-scoped delete; sections go in the same transaction.
    pub async fn delete(&self, id: i32, user_id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let exists = ideas::Entity::find_by_id(id)
            .filter(ideas::Column::UserId.eq(user_id))
            .count(&txn)
            .await?
            > 0;

        if !exists {
            return Ok(false);
        }

        idea_sections::Entity::delete_many()
            .filter(idea_sections::Column::IdeaId.eq(id))
            .exec(&txn)
            .await?;

        let result = ideas::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    /// Admin delete, any owner.
    pub async fn delete_any(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        idea_sections::Entity::delete_many()
            .filter(idea_sections::Column::IdeaId.eq(id))
            .exec(&txn)
            .await?;

        let result = ideas::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    /// Applies the full result of a successful expansion in one transaction:
    /// content, parsed sections, follow-up prompts, status flip, and the
    /// delete-and-recreate of the section rows. Nothing is written on the
    /// failure paths before this point, so a failed completion call leaves
    /// the idea exactly as it was.
    pub async fn save_expansion(
        &self,
        id: i32,
        user_id: i32,
        expanded_content: &str,
        sections: &ParsedSections,
        prompts: &[FollowUpPrompt],
    ) -> Result<Option<Idea>> {
        let txn = self.conn.begin().await?;

        let model = ideas::Entity::find_by_id(id)
            .filter(ideas::Column::UserId.eq(user_id))
            .one(&txn)
            .await
            .context("Failed to query idea for expansion save")?;

        let Some(model) = model else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();
        let idea_id = model.id;

        let mut active: ideas::ActiveModel = model.into();
        active.expanded_content = Set(Some(expanded_content.to_string()));
        active.sections_parsed = Set(Some(sections.to_json()?));
        active.suggested_prompts = Set(Some(serde_json::to_string(prompts)?));
        active.status = Set(IdeaStatus::Expanded.as_str().to_string());
        active.updated_at = Set(now.clone());
        let updated = active.update(&txn).await?;

        // Re-expansion replaces prior rows instead of merging.
        idea_sections::Entity::delete_many()
            .filter(idea_sections::Column::IdeaId.eq(idea_id))
            .exec(&txn)
            .await?;

        let rows: Vec<idea_sections::ActiveModel> = sections
            .non_empty()
            .map(|(section, content)| idea_sections::ActiveModel {
                idea_id: Set(idea_id),
                section_type: Set(section.as_str().to_string()),
                content: Set(content.trim().to_string()),
                order_index: Set(section.order_index()),
                created_at: Set(now.clone()),
                ..Default::default()
            })
            .collect();

        if !rows.is_empty() {
            idea_sections::Entity::insert_many(rows).exec(&txn).await?;
        }

        txn.commit().await?;

        let sections_rows = self.sections_for(idea_id).await?;
        Ok(Some(Self::map_model(updated, sections_rows)))
    }

    pub async fn stats(&self, user_id: i32) -> Result<IdeaStats> {
        let base = ideas::Entity::find().filter(ideas::Column::UserId.eq(user_id));

        let total = base.clone().count(&self.conn).await?;
        let expanded = base
            .clone()
            .filter(ideas::Column::Status.eq(IdeaStatus::Expanded.as_str()))
            .count(&self.conn)
            .await?;
        let drafts = base
            .clone()
            .filter(ideas::Column::Status.eq(IdeaStatus::Draft.as_str()))
            .count(&self.conn)
            .await?;
        let favorites = base
            .filter(ideas::Column::IsFavorite.eq(true))
            .count(&self.conn)
            .await?;

        Ok(IdeaStats {
            total,
            expanded,
            drafts,
            favorites,
        })
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(ideas::Entity::find().count(&self.conn).await?)
    }

    pub async fn count_created_since(&self, cutoff: &str) -> Result<u64> {
        Ok(ideas::Entity::find()
            .filter(ideas::Column::CreatedAt.gte(cutoff))
            .count(&self.conn)
            .await?)
    }

    /// Number of distinct users who created an idea since the cutoff.
    pub async fn distinct_authors_since(&self, cutoff: &str) -> Result<u64> {
        let authors: Vec<i32> = ideas::Entity::find()
            .filter(ideas::Column::CreatedAt.gte(cutoff))
            .select_only()
            .column(ideas::Column::UserId)
            .distinct()
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(authors.len() as u64)
    }

    /// Newest-first page across all users, with the owning user attached.
    pub async fn list_all_paginated(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<(Idea, Option<User>)>, u64)> {
        let total = ideas::Entity::find().count(&self.conn).await?;

        let rows = ideas::Entity::find()
            .order_by_desc(ideas::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list ideas with users")?;

        let items = rows
            .into_iter()
            .map(|(idea, user)| (Self::map_model(idea, Vec::new()), user.map(User::from)))
            .collect();

        Ok((items, total))
    }

    pub async fn recent_with_users(&self, limit: u64) -> Result<Vec<(Idea, Option<User>)>> {
        let rows = ideas::Entity::find()
            .order_by_desc(ideas::Column::CreatedAt)
            .limit(limit)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list recent ideas")?;

        Ok(rows
            .into_iter()
            .map(|(idea, user)| (Self::map_model(idea, Vec::new()), user.map(User::from)))
            .collect())
    }

    pub async fn status_breakdown(&self) -> Result<IdeaBreakdown> {
        let total = ideas::Entity::find().count(&self.conn).await?;
        let drafts = ideas::Entity::find()
            .filter(ideas::Column::Status.eq(IdeaStatus::Draft.as_str()))
            .count(&self.conn)
            .await?;
        let expanded = ideas::Entity::find()
            .filter(ideas::Column::Status.eq(IdeaStatus::Expanded.as_str()))
            .count(&self.conn)
            .await?;

        Ok(IdeaBreakdown {
            total,
            drafts,
            expanded,
            archived: total - drafts - expanded,
        })
    }
}
