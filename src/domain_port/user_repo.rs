use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub refresh_token_hash: Option<String>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.user_id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `AuthError::UserExists` when the email is taken.
    async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<UserRecord, AuthError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError>;

    /// The user only if `refresh_token_hash` currently equals `token_hash`.
    async fn get_by_refresh_hash(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> Result<Option<UserRecord>, AuthError>;

    /// Overwrite the stored refresh hash unconditionally; `None` clears it.
    async fn set_refresh_hash(
        &self,
        user_id: UserId,
        token_hash: Option<&str>,
    ) -> Result<(), AuthError>;

    /// Compare-and-swap of the refresh hash. `false` means the stored value
    /// no longer equals `expected`.
    async fn rotate_refresh_hash(
        &self,
        user_id: UserId,
        expected: &str,
        next: &str,
    ) -> Result<bool, AuthError>;

    async fn set_reset_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// The user holding `token_hash` whose reset expiry is after `now`.
    async fn get_by_reset_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserRecord>, AuthError>;

    /// Store the new password and clear both reset fields, provided the token
    /// is still held and unexpired. `false` means it was already consumed.
    async fn consume_reset_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, AuthError>;
}
