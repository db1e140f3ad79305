#![allow(dead_code)]

use fathom_api::{create_api_routes, AppState, StreamingMetrics};
use fathom_domain::config::StreamingConfig;
use fathom_infrastructure::{
    DefaultQueryPlanner, FilesystemRepoStore, LocalSearchExecutor, StaticSettingsProvider,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A Fathom server on an ephemeral port, serving the given repo roots.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(roots: Vec<PathBuf>) -> std::io::Result<Self> {
        let store = Arc::new(FilesystemRepoStore::discover(&roots)?);
        let state = AppState {
            planner: Arc::new(DefaultQueryPlanner::new()),
            executor: Arc::new(LocalSearchExecutor::new(Arc::clone(&store), 1024 * 1024)),
            settings: Arc::new(StaticSettingsProvider::new(Default::default())),
            repo_metadata: Arc::clone(&store) as _,
            repo_namer: store as _,
            streaming: StreamingConfig::default(),
            metrics: Arc::new(StreamingMetrics::new()),
        };
        let router = create_api_routes(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(Self { addr, handle })
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
