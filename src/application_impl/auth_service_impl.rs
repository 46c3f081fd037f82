use crate::application_impl::token_digest::{generate_reset_token, hash_token};
use crate::application_port::*;
use crate::domain_model::{UserId, UserSummary};
use crate::domain_port::{ResetNotifier, UserRecord, UserRepo};
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_RESET_TTL: Duration = Duration::from_secs(60 * 60);
const MIN_PASSWORD_LEN: usize = 6;

pub struct RealAuthService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_codec: Arc<dyn TokenCodec>,
    reset_notifier: Arc<dyn ResetNotifier>,
    reset_ttl: Duration,
    min_password_len: usize,
}

impl RealAuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
        reset_notifier: Arc<dyn ResetNotifier>,
        reset_ttl: Duration,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
            token_codec,
            reset_notifier,
            reset_ttl,
            min_password_len: MIN_PASSWORD_LEN,
        }
    }

    fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_password_len {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {} characters",
                self.min_password_len
            )));
        }
        Ok(())
    }

    fn validate_email(email: &str) -> Result<(), AuthError> {
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(AuthError::InvalidInput("a valid email is required".to_string())),
        }
    }

    /// Mint a token pair for `rec`. Returns the pair and the digest of the
    /// refresh token, which is what gets persisted.
    fn issue_session(&self, rec: &UserRecord) -> Result<(LoginResult, String), AuthError> {
        let (access_token, access_exp) = self.token_codec.issue_access_token(rec.user_id)?;
        let (refresh_token, refresh_exp) = self.token_codec.issue_refresh_token(rec.user_id)?;
        let refresh_hash = hash_token(&refresh_token.0);
        Ok((
            LoginResult {
                user: rec.summary(),
                tokens: AuthTokens {
                    access_token,
                    refresh_token,
                    access_token_expires_at: access_exp,
                    refresh_token_expires_at: refresh_exp,
                },
            },
            refresh_hash,
        ))
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn create_user(&self, request: SignupInput) -> Result<UserSummary, AuthError> {
        let SignupInput {
            email,
            name,
            password,
        } = request;
        let email = email.trim();
        let name = name.trim();

        Self::validate_email(email)?;
        if name.is_empty() {
            return Err(AuthError::InvalidInput("name is required".to_string()));
        }
        self.validate_password(&password)?;

        if self.user_repo.get_by_email(email).await?.is_some() {
            return Err(AuthError::UserExists);
        }
        let password_hash = self.credential_hasher.hash_password(&password).await?;
        let rec = self.user_repo.create(email, name, &password_hash).await?;

        info!(user_id = %rec.user_id, "user created");
        Ok(rec.summary())
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { email, password } = request;
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "email and password are required".to_string(),
            ));
        }

        let rec = self
            .user_repo
            .get_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(&password, &rec.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let (result, refresh_hash) = self.issue_session(&rec)?;
        self.user_repo
            .set_refresh_hash(rec.user_id, Some(&refresh_hash))
            .await?;

        info!(user_id = %rec.user_id, "user logged in");
        Ok(result)
    }

    async fn authenticate(&self, access_token: &str) -> Result<UserSummary, AuthError> {
        let claims = self.token_codec.verify_access_token(access_token)?;

        let rec = self
            .user_repo
            .get_by_id(claims.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(rec.summary())
    }

    async fn refresh_token(&self, refresh_token: Option<&str>) -> Result<LoginResult, AuthError> {
        let token = refresh_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::RefreshTokenMissing)?;

        let claims = self.token_codec.verify_refresh_token(token).map_err(|e| {
            debug!(error = %e, "refresh token rejected");
            AuthError::RefreshTokenInvalid
        })?;

        // only the most recently issued refresh token is honoured
        let presented = hash_token(token);
        let rec = self
            .user_repo
            .get_by_refresh_hash(claims.user_id, &presented)
            .await?
            .ok_or(AuthError::SessionExpired)?;

        let (result, next) = self.issue_session(&rec)?;
        if !self
            .user_repo
            .rotate_refresh_hash(rec.user_id, &presented, &next)
            .await?
        {
            warn!(user_id = %rec.user_id, "refresh token reused concurrently");
            return Err(AuthError::SessionExpired);
        }

        debug!(user_id = %rec.user_id, "refresh token rotated");
        Ok(result)
    }

    async fn logout(&self, user_id: UserId) -> Result<(), AuthError> {
        self.user_repo.set_refresh_hash(user_id, None).await?;
        info!(%user_id, "user logged out");
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::InvalidInput("email is required".to_string()));
        }

        let Some(rec) = self.user_repo.get_by_email(email).await? else {
            debug!("password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_reset_token();
        let ttl = TimeDelta::from_std(self.reset_ttl)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        let expires_at = Utc::now() + ttl;
        self.user_repo
            .set_reset_token(rec.user_id, &hash_token(&token), expires_at)
            .await?;

        self.reset_notifier
            .send_reset_token(&rec.email, &token)
            .await
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        info!(user_id = %rec.user_id, %expires_at, "password reset token issued");
        Ok(())
    }

    async fn reset_password(&self, request: ResetPasswordInput) -> Result<(), AuthError> {
        let ResetPasswordInput {
            token,
            new_password,
        } = request;
        self.validate_password(&new_password)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::ResetTokenInvalid);
        }

        let token_hash = hash_token(token);
        let now = Utc::now();
        let rec = self
            .user_repo
            .get_by_reset_hash(&token_hash, now)
            .await?
            .ok_or(AuthError::ResetTokenInvalid)?;

        let password_hash = self.credential_hasher.hash_password(&new_password).await?;
        if !self
            .user_repo
            .consume_reset_token(rec.user_id, &token_hash, now, &password_hash)
            .await?
        {
            return Err(AuthError::ResetTokenInvalid);
        }

        info!(user_id = %rec.user_id, "password reset");
        Ok(())
    }
}
