use crate::metrics::StreamingMetrics;
use fathom_application::ports::{
    QueryPlanner, RepoMetadataSource, RepoNamer, SearchExecutor, SettingsProvider,
};
use fathom_domain::config::StreamingConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<dyn QueryPlanner>,
    pub executor: Arc<dyn SearchExecutor>,
    pub settings: Arc<dyn SettingsProvider>,
    pub repo_metadata: Arc<dyn RepoMetadataSource>,
    pub repo_namer: Arc<dyn RepoNamer>,
    pub streaming: StreamingConfig,
    pub metrics: Arc<StreamingMetrics>,
}
