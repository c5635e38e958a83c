use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::entities::password_reset_tokens;

pub struct ResetTokenRepository {
    conn: DatabaseConnection,
}

impl ResetTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Stores the digest of a freshly issued token.
    pub async fn create(&self, user_id: i32, token_hash: &str, expires_at: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = password_reset_tokens::ActiveModel {
            user_id: Set(user_id),
            token: Set(token_hash.to_string()),
            expires_at: Set(expires_at.to_string()),
            used: Set(false),
            created_at: Set(now),
            ..Default::default()
        };

        active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert password reset token")?;

        Ok(())
    }

    /// Looks up an unused, unexpired token by its digest.
    pub async fn find_valid(
        &self,
        token_hash: &str,
        now: &str,
    ) -> Result<Option<password_reset_tokens::Model>> {
        let token = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::Token.eq(token_hash))
            .filter(password_reset_tokens::Column::Used.eq(false))
            .filter(password_reset_tokens::Column::ExpiresAt.gt(now))
            .one(&self.conn)
            .await
            .context("Failed to query password reset token")?;

        Ok(token)
    }

    /// Tokens are single-use; this flips the consumed flag.
    pub async fn mark_used(&self, id: i32) -> Result<()> {
        let token = password_reset_tokens::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query password reset token")?
            .ok_or_else(|| anyhow::anyhow!("Reset token not found: {id}"))?;

        let mut active: password_reset_tokens::ActiveModel = token.into();
        active.used = Set(true);
        active.update(&self.conn).await?;

        Ok(())
    }
}
