use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::entities::{idea_sections, ideas, password_reset_tokens, users};

/// User data returned from the repository (without the password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: Role::parse(&model.role).unwrap_or_default(),
            is_active: model.is_active,
            last_login: model.last_login,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Role/activity counters for the admin statistics view.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct UserBreakdown {
    pub total: u64,
    pub admins: u64,
    pub regular_users: u64,
    pub active: u64,
    pub inactive: u64,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn email_taken(&self, email: &str, exclude_id: Option<i32>) -> Result<bool> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = exclude_id {
            query = query.filter(users::Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to check email uniqueness")?;

        Ok(count > 0)
    }

    /// Creates a user with a freshly hashed password.
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
        security: Option<&SecurityConfig>,
    ) -> Result<User> {
        let password = password.to_string();
        let security = security.cloned();
        let password_hash =
            task::spawn_blocking(move || hash_password(&password, security.as_ref()))
                .await
                .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let active_model = users::ActiveModel {
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            is_active: Set(true),
            last_login: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    /// Verify password for a user.
    /// Note: this uses `spawn_blocking` because Argon2 verification is
    /// CPU-intensive and would block the async runtime if run directly.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<bool> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        verify_hash(user.password_hash, password.to_string()).await
    }

    pub async fn verify_password_by_id(&self, id: i32, password: &str) -> Result<bool> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        verify_hash(user.password_hash, password.to_string()).await
    }

    pub async fn update_last_login(&self, id: i32) -> Result<()> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for login update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.last_login = Set(Some(now.clone()));
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn update_profile(&self, id: i32, name: &str, email: &str) -> Result<User> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.name = Set(name.to_string());
        active.email = Set(email.to_string());
        active.updated_at = Set(now);
        let model = active.update(&self.conn).await?;

        Ok(User::from(model))
    }

    /// Update password for a user (hashes the new password)
    pub async fn update_password(
        &self,
        id: i32,
        new_password: &str,
        security: Option<&SecurityConfig>,
    ) -> Result<()> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let password = new_password.to_string();
        let security = security.cloned();
        let new_hash = task::spawn_blocking(move || hash_password(&password, security.as_ref()))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn set_active(&self, id: i32, is_active: bool) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for status toggle")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(now);
        let model = active.update(&self.conn).await?;

        Ok(Some(User::from(model)))
    }

    /// Removes a user and everything they own in one transaction.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let idea_ids: Vec<i32> = ideas::Entity::find()
            .filter(ideas::Column::UserId.eq(id))
            .select_only()
            .column(ideas::Column::Id)
            .into_tuple()
            .all(&txn)
            .await?;

        if !idea_ids.is_empty() {
            idea_sections::Entity::delete_many()
                .filter(idea_sections::Column::IdeaId.is_in(idea_ids))
                .exec(&txn)
                .await?;
        }

        ideas::Entity::delete_many()
            .filter(ideas::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        password_reset_tokens::Entity::delete_many()
            .filter(password_reset_tokens::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        let result = users::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(users::Entity::find().count(&self.conn).await?)
    }

    pub async fn count_created_since(&self, cutoff: &str) -> Result<u64> {
        Ok(users::Entity::find()
            .filter(users::Column::CreatedAt.gte(cutoff))
            .count(&self.conn)
            .await?)
    }

    pub async fn breakdown(&self) -> Result<UserBreakdown> {
        let total = users::Entity::find().count(&self.conn).await?;
        let admins = users::Entity::find()
            .filter(users::Column::Role.eq(Role::Admin.as_str()))
            .count(&self.conn)
            .await?;
        let active = users::Entity::find()
            .filter(users::Column::IsActive.eq(true))
            .count(&self.conn)
            .await?;

        Ok(UserBreakdown {
            total,
            admins,
            regular_users: total - admins,
            active,
            inactive: total - active,
        })
    }

    /// Newest-first page of users together with their idea counts.
    pub async fn list_paginated(&self, limit: u64, offset: u64) -> Result<(Vec<(User, u64)>, u64)> {
        let total = users::Entity::find().count(&self.conn).await?;

        let page = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        let ids: Vec<i32> = page.iter().map(|u| u.id).collect();
        let counts: Vec<(i32, i64)> = if ids.is_empty() {
            Vec::new()
        } else {
            ideas::Entity::find()
                .filter(ideas::Column::UserId.is_in(ids))
                .select_only()
                .column(ideas::Column::UserId)
                .column_as(ideas::Column::Id.count(), "count")
                .group_by(ideas::Column::UserId)
                .into_tuple()
                .all(&self.conn)
                .await?
        };

        let count_for = |id: i32| -> u64 {
            counts
                .iter()
                .find(|(user_id, _)| *user_id == id)
                .map_or(0, |(_, c)| *c as u64)
        };

        let users = page
            .into_iter()
            .map(|model| {
                let count = count_for(model.id);
                (User::from(model), count)
            })
            .collect();

        Ok((users, total))
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<User>> {
        let rows = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list recent users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}

async fn verify_hash(password_hash: String, password: String) -> Result<bool> {
    // Run CPU-intensive password verification in a blocking task
    let is_valid = task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        let argon2 = Argon2::default();
        Ok::<bool, anyhow::Error>(
            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")??;

    Ok(is_valid)
}

/// Hash a password using Argon2id with optional custom params.
pub fn hash_password(password: &str, security: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = security {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
