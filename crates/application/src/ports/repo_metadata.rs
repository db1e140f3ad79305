use async_trait::async_trait;
use fathom_domain::{RepoId, RepoMetadata};
use std::collections::HashMap;

/// Batch lookup of repository display attributes.
#[async_trait]
pub trait RepoMetadataSource: Send + Sync {
    /// Fetch metadata for the given repositories in one call. Ids absent
    /// from the returned map are unknown to the store; matches carrying
    /// them are dropped as an authorization safety net.
    async fn fetch(&self, ids: &[RepoId]) -> HashMap<RepoId, RepoMetadata>;
}

/// Repo-id to display-name resolution for progress snapshots. May perform
/// I/O; called only at snapshot time, never on the per-batch hot path.
pub trait RepoNamer: Send + Sync {
    fn name(&self, id: RepoId) -> Option<String>;
}
