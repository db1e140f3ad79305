use super::text::ChunkMatch;
use crate::repo::RepoRef;

/// A hit inside a file: content ranges, symbols, or just the path.
///
/// Classification happens at conversion time with symbol results taking
/// priority over content, and content over path-only.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMatch {
    pub repo: RepoRef,
    pub path: String,
    /// Commit the file was read at.
    pub commit_id: String,
    /// The revision the query asked for, when one was given. Surfaces on
    /// the wire as a single-element `branches` list.
    pub input_rev: Option<String>,
    pub symbols: Vec<SymbolEntry>,
    pub chunks: Vec<ChunkMatch>,
    /// Backend-specific scoring/debug blob, passed through verbatim.
    pub debug: Option<String>,
}

impl FileMatch {
    pub fn path_only(repo: RepoRef, path: impl Into<String>, commit_id: impl Into<String>) -> Self {
        Self {
            repo,
            path: path.into(),
            commit_id: commit_id.into(),
            input_rev: None,
            symbols: Vec::new(),
            chunks: Vec::new(),
            debug: None,
        }
    }
}

/// A symbol definition found in a file.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub name: String,
    pub container_name: Option<String>,
    /// LSP symbol kind as a lower-case string ("function", "struct", ...).
    /// Absent when the backend could not classify the symbol.
    pub kind: Option<String>,
    /// 0-based line of the definition.
    pub line: u32,
    pub url: String,
}
