use crate::domain_port::ResetNotifier;
use crate::logger::*;

/// Default reset delivery: log the link the account owner would receive.
pub struct LogResetNotifier {
    frontend_url: String,
}

impl LogResetNotifier {
    pub fn new(frontend_url: &str) -> Self {
        LogResetNotifier {
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }
}

#[async_trait::async_trait]
impl ResetNotifier for LogResetNotifier {
    async fn send_reset_token(&self, email: &str, token: &str) -> anyhow::Result<()> {
        info!(%email, link = %self.reset_link(token), "password reset link");
        Ok(())
    }
}
