use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Stable identifier of a repository within one deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoId(pub u32);

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Repository reference carried on a match: the id plus the name the match
/// was produced under. The name is re-checked against the metadata cache
/// before anything reaches the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub id: RepoId,
    pub name: Arc<str>,
}

impl RepoRef {
    pub fn new(id: RepoId, name: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Display attributes of a repository, fetched per request and keyed by
/// [`RepoId`]. The `name` here is authoritative: a match whose own name
/// disagrees with it is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoMetadata {
    pub name: Arc<str>,
    pub stars: u64,
    pub last_fetched: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub fork: bool,
    pub archived: bool,
    pub private: bool,
    pub key_value_pairs: HashMap<String, String>,
}

impl RepoMetadata {
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            stars: 0,
            last_fetched: None,
            description: None,
            fork: false,
            archived: false,
            private: false,
            key_value_pairs: HashMap::new(),
        }
    }
}
