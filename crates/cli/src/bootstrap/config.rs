use fathom_domain::{CliOverrides, Config, ConfigError};
use std::path::Path;
use tracing::warn;

pub fn load_config(path: &Path, overrides: &CliOverrides) -> Result<Config, ConfigError> {
    let mut config = Config::load_or_default(path)?;
    config.apply_overrides(overrides);
    if config.search.roots.is_empty() {
        warn!("no repository roots configured; every search will come up empty");
    }
    Ok(config)
}
