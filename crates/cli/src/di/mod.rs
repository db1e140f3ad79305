//! Dependency wiring: infrastructure implementations behind the
//! application ports, assembled into the API state.

use fathom_api::{AppState, StreamingMetrics};
use fathom_domain::Config;
use fathom_infrastructure::{
    DefaultQueryPlanner, FilesystemRepoStore, LocalSearchExecutor, StaticSettingsProvider,
};
use std::sync::Arc;

pub fn build_state(config: &Config) -> std::io::Result<AppState> {
    let store = Arc::new(FilesystemRepoStore::discover(&config.search.roots)?);
    Ok(AppState {
        planner: Arc::new(DefaultQueryPlanner::new()),
        executor: Arc::new(LocalSearchExecutor::new(
            Arc::clone(&store),
            config.search.max_file_size_bytes,
        )),
        settings: Arc::new(StaticSettingsProvider::from_config(&config.search)),
        repo_metadata: Arc::clone(&store) as _,
        repo_namer: store as _,
        streaming: config.streaming.clone(),
        metrics: Arc::new(StreamingMetrics::new()),
    })
}
