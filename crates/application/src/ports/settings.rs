use async_trait::async_trait;
use fathom_domain::Settings;

/// Effective settings for the requesting user.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn current(&self) -> Settings;
}
