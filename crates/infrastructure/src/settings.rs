use async_trait::async_trait;
use fathom_application::ports::SettingsProvider;
use fathom_domain::config::SearchConfig;
use fathom_domain::Settings;

/// Settings provider backed by the static server configuration. A real
/// deployment would resolve per-user overrides here; the port is async
/// for that reason.
pub struct StaticSettingsProvider {
    settings: Settings,
}

impl StaticSettingsProvider {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            settings: Settings {
                max_search_results: config.max_search_results,
            },
        }
    }
}

#[async_trait]
impl SettingsProvider for StaticSettingsProvider {
    async fn current(&self) -> Settings {
        self.settings.clone()
    }
}
