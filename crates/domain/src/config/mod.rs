//! Configuration module for Fathom
//!
//! Configuration structures organized by concern:
//! - `root`: Main configuration and CLI overrides
//! - `server`: HTTP binding
//! - `search`: Repository roots and search limits
//! - `streaming`: Event-stream cadences and buffer sizes
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod logging;
pub mod root;
pub mod search;
pub mod server;
pub mod streaming;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use search::SearchConfig;
pub use server::ServerConfig;
pub use streaming::StreamingConfig;
