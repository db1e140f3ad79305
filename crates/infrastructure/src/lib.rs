//! Fathom Infrastructure Layer
//!
//! Concrete implementations of the application ports: the query planner,
//! the filesystem-backed repository store, the local search executor and
//! the settings provider.
pub mod search;
pub mod settings;

pub use search::{DefaultQueryPlanner, FilesystemRepoStore, LocalSearchExecutor};
pub use settings::StaticSettingsProvider;
