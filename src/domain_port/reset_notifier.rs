/// Delivers a password-reset token to the account owner.
#[async_trait::async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn send_reset_token(&self, email: &str, token: &str) -> anyhow::Result<()>;
}
