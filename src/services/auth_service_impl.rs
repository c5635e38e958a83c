//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::config::SecurityConfig;
use crate::db::{Store, User};
use crate::domain::Role;
use crate::services::auth_service::{AuthError, AuthService, IssuedResetToken};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Self::normalize_email(email);

        if self.store.email_taken(&email, None).await? {
            return Err(AuthError::EmailTaken);
        }

        let user = self
            .store
            .create_user(&email, name.trim(), password, Role::User, Some(&self.security))
            .await?;

        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Self::normalize_email(email);

        let Some(user) = self.store.get_user_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        let is_valid = self.store.verify_user_password(&email, password).await?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.store.update_user_last_login(user.id).await?;

        self.store
            .get_user_by_id(user.id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn get_user(&self, id: i32) -> Result<User, AuthError> {
        self.store
            .get_user_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn update_profile(&self, id: i32, name: &str, email: &str) -> Result<User, AuthError> {
        let email = Self::normalize_email(email);

        if self.store.email_taken(&email, Some(id)).await? {
            return Err(AuthError::EmailTaken);
        }

        let user = self.store.update_user_profile(id, name.trim(), &email).await?;
        Ok(user)
    }

    async fn change_password(
        &self,
        id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let is_valid = self
            .store
            .verify_user_password_by_id(id, current_password)
            .await?;

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(id, new_password, Some(&self.security))
            .await?;

        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<Option<IssuedResetToken>, AuthError> {
        let email = Self::normalize_email(email);

        let Some(user) = self.store.get_user_by_email(&email).await? else {
            return Ok(None);
        };

        let token = generate_reset_token();
        let token_hash = sha256_hex(&token);
        let expires_at = (chrono::Utc::now()
            + chrono::Duration::minutes(self.security.reset_token_minutes))
        .to_rfc3339();

        self.store
            .create_reset_token(user.id, &token_hash, &expires_at)
            .await?;

        Ok(Some(IssuedResetToken { token, expires_at }))
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let token_hash = sha256_hex(token.trim());
        let now = chrono::Utc::now().to_rfc3339();

        let Some(record) = self.store.find_valid_reset_token(&token_hash, &now).await? else {
            return Err(AuthError::Validation(
                "Password reset token is invalid or has expired".to_string(),
            ));
        };

        self.store
            .update_user_password(record.user_id, new_password, Some(&self.security))
            .await?;

        self.store.mark_reset_token_used(record.id).await?;

        Ok(())
    }
}

/// Random 64-character hex token.
#[must_use]
pub fn generate_reset_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[must_use]
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_tokens_are_unique_hex() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
