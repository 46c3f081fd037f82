use crate::domain_port::ResetNotifier;
use dashmap::DashMap;

/// Keeps the last reset token sent to each address instead of delivering it.
#[derive(Default)]
pub struct MemoryResetNotifier {
    sent: DashMap<String, String>,
}

impl MemoryResetNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent.get(email).map(|token| token.clone())
    }
}

#[async_trait::async_trait]
impl ResetNotifier for MemoryResetNotifier {
    async fn send_reset_token(&self, email: &str, token: &str) -> anyhow::Result<()> {
        self.sent.insert(email.to_string(), token.to_string());
        Ok(())
    }
}
