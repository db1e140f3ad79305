use super::text::Range;
use crate::repo::RepoRef;
use chrono::{DateTime, Utc};

/// Author or committer identity on a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

/// A hit on a commit: the query matched the commit message or diff.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitMatch {
    pub repo: RepoRef,
    pub oid: String,
    pub author: Signature,
    pub committer: Option<Signature>,
    /// Full message body the highlight ranges refer to.
    pub message: String,
    pub message_matches: Vec<Range>,
    /// Precomputed by the backend so conversion stays string assembly.
    pub url: String,
    pub label: String,
    pub detail: String,
}
