//! Domain service for authentication and account management.
//!
//! Handles registration, login, profile maintenance, and the password reset
//! flow. Session handling itself stays at the HTTP layer.

use thiserror::Error;

use crate::db::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDisabled,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Raw password-reset token handed back to the caller for delivery.
///
/// Only the SHA-256 digest is persisted; this value exists exactly once, in
/// memory, on the way to the reset link.
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    pub token: String,
    pub expires_at: String,
}

/// Domain service trait for authentication and account management.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a regular account. The email must be unused.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] for duplicate emails.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError>;

    /// Verifies credentials, refuses deactivated accounts, updates the
    /// last-login timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password (deliberately indistinguishable).
    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Fetches the account behind a session.
    async fn get_user(&self, id: i32) -> Result<User, AuthError>;

    /// Updates name/email; email uniqueness is re-checked.
    async fn update_profile(&self, id: i32, name: &str, email: &str) -> Result<User, AuthError>;

    /// Changes a password after verifying the current one.
    async fn change_password(
        &self,
        id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Issues a reset token if the email belongs to an account. Returns
    /// `None` for unknown emails so callers can answer uniformly without
    /// disclosing account existence.
    async fn forgot_password(&self, email: &str) -> Result<Option<IssuedResetToken>, AuthError>;

    /// Consumes a reset token and sets the new password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for unknown, expired, or already
    /// used tokens.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;
}
