//! Wire schemas of the streamed events.
//!
//! Every match record is a JSON object with a mandatory `type`
//! discriminator; clients dispatch on it and never guess structurally.

use chrono::{DateTime, Utc};
use fathom_domain::RepoId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const EVENT_MATCHES: &str = "matches";
pub const EVENT_FILTERS: &str = "filters";
pub const EVENT_PROGRESS: &str = "progress";
pub const EVENT_ALERT: &str = "alert";
pub const EVENT_ERROR: &str = "error";
pub const EVENT_DONE: &str = "done";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchRecord {
    #[serde(rename = "content")]
    Content(ContentRecord),
    #[serde(rename = "path")]
    Path(PathRecord),
    #[serde(rename = "symbol")]
    Symbol(SymbolRecord),
    #[serde(rename = "repo")]
    Repo(RepoRecord),
    #[serde(rename = "commit")]
    Commit(CommitRecord),
    #[serde(rename = "person")]
    Person(PersonRecord),
    #[serde(rename = "team")]
    Team(TeamRecord),
}

/// Attributes shared by every repo-scoped record, lifted out of the
/// per-request metadata cache at conversion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoAttrs {
    pub repository: String,
    pub repository_id: RepoId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_stars: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_last_fetched: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[serde(flatten)]
    pub repo: RepoAttrs,
    pub path: String,
    pub commit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    /// Populated when the request enabled chunk matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_matches: Option<Vec<ChunkMatchRecord>>,
    /// Line-oriented projection, sent when chunk matches are disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_matches: Option<Vec<LineMatchRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRecord {
    #[serde(flatten)]
    pub repo: RepoAttrs,
    pub path: String,
    pub commit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolRecord {
    #[serde(flatten)]
    pub repo: RepoAttrs,
    pub path: String,
    pub commit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    pub symbols: Vec<SymbolEntryRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolEntryRecord {
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    /// Upper-cased LSP symbol kind, or `"UNKNOWN"`.
    pub kind: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoRecord {
    #[serde(flatten)]
    pub repo: RepoAttrs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub fork: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub archived: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub private: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub repository_matches: Vec<RangeRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub description_matches: Vec<RangeRecord>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    #[serde(flatten)]
    pub repo: RepoAttrs,
    pub oid: String,
    pub url: String,
    pub author: SignatureRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer: Option<SignatureRecord>,
    pub message: String,
    /// Highlighted body the ranges refer to.
    pub content: String,
    /// `[line, character, length]` triples over `content`.
    pub ranges: Vec<[u32; 3]>,
    pub label: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRecord {
    pub start: LocationRecord,
    pub end: LocationRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMatchRecord {
    pub content: String,
    pub content_start: LocationRecord,
    pub ranges: Vec<RangeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineMatchRecord {
    pub preview: String,
    pub line_number: u32,
    /// `[offset, length]` pairs within the line, ascending by offset.
    pub offset_and_lengths: Vec<[u32; 2]>,
}

/// Body of an `error` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
