use fathom_domain::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. The configured level is the baseline;
/// `RUST_LOG` directives override it when set.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(level = %config.logging.level, "logging initialized");
}
