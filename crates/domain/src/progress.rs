use serde::{Deserialize, Serialize};

/// Wire shape of a `progress` event.
///
/// `match_count` counts every result the backends produced, including ones
/// the display limit truncated away; it never decreases across the
/// snapshots of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub done: bool,
    pub match_count: u64,
    pub duration_ms: u64,
    pub repositories_count: u64,
    pub skipped: Vec<Skipped>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// A structured reason why some result source was not fully consulted,
/// with optional remediation the client can offer as a one-click query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skipped {
    pub reason: SkippedReason,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested: Option<Suggested>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkippedReason {
    #[serde(rename = "shard-timeout")]
    ShardTimeout,
    #[serde(rename = "repository-cloning")]
    RepositoryCloning,
    #[serde(rename = "repository-missing")]
    RepositoryMissing,
    #[serde(rename = "backend-missing")]
    BackendMissing,
    #[serde(rename = "index-unavailable")]
    IndexUnavailable,
    #[serde(rename = "repo-limit-hit")]
    RepoLimitHit,
    #[serde(rename = "display-limit")]
    DisplayLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggested {
    pub title: String,
    pub query_expression: String,
}
