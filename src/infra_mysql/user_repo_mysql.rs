use super::util::is_dup_key;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

macro_rules! select_user {
    ($condition:literal) => {
        concat!(
            "SELECT user_id, email, name, password_hash, refresh_token_hash, ",
            "reset_token_hash, reset_token_expires_at, created_at, updated_at ",
            "FROM app_user WHERE ",
            $condition
        )
    };
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: UserId,
    email: String,
    name: String,
    password_hash: String,
    refresh_token_hash: Option<String>,
    reset_token_hash: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            user_id: row.user_id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            refresh_token_hash: row.refresh_token_hash,
            reset_token_hash: row.reset_token_hash,
            reset_token_expires_at: row.reset_token_expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn store_err(e: sqlx::Error) -> AuthError {
    AuthError::Store(e.to_string())
}

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<UserRecord, AuthError> {
        let user_id = UserId::new_v4();
        let now = now_millis();
        sqlx::query(
            r#"
INSERT INTO app_user (user_id, email, name, password_hash, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(user_id)
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                AuthError::UserExists
            } else {
                store_err(e)
            }
        })?;

        Ok(UserRecord {
            user_id,
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            refresh_token_hash: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(select_user!("email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(UserRecord::from))
    }

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(select_user!("user_id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(UserRecord::from))
    }

    async fn get_by_refresh_hash(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(select_user!(
            "user_id = ? AND refresh_token_hash = ?"
        ))
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(row.map(UserRecord::from))
    }

    async fn set_refresh_hash(
        &self,
        user_id: UserId,
        token_hash: Option<&str>,
    ) -> Result<(), AuthError> {
        sqlx::query("UPDATE app_user SET refresh_token_hash = ?, updated_at = ? WHERE user_id = ?")
            .bind(token_hash)
            .bind(now_millis())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn rotate_refresh_hash(
        &self,
        user_id: UserId,
        expected: &str,
        next: &str,
    ) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
UPDATE app_user
SET refresh_token_hash = ?, updated_at = ?
WHERE user_id = ? AND refresh_token_hash = ?
"#,
        )
        .bind(next)
        .bind(now_millis())
        .bind(user_id)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_reset_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        sqlx::query(
            r#"
UPDATE app_user
SET reset_token_hash = ?, reset_token_expires_at = ?, updated_at = ?
WHERE user_id = ?
"#,
        )
        .bind(token_hash)
        .bind(expires_at)
        .bind(now_millis())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn get_by_reset_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(select_user!(
            "reset_token_hash = ? AND reset_token_expires_at > ?"
        ))
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(row.map(UserRecord::from))
    }

    async fn consume_reset_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
UPDATE app_user
SET password_hash = ?, reset_token_hash = NULL, reset_token_expires_at = NULL, updated_at = ?
WHERE user_id = ? AND reset_token_hash = ? AND reset_token_expires_at > ?
"#,
        )
        .bind(password_hash)
        .bind(now_millis())
        .bind(user_id)
        .bind(token_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(result.rows_affected() == 1)
    }
}
