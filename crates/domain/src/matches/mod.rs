//! Search result types.
//!
//! A [`Match`] is one hit produced by a search backend. The variants form a
//! closed set; wire conversion dispatches on the variant tag alone.

pub mod commit;
pub mod file;
pub mod owner;
pub mod text;

pub use commit::{CommitMatch, Signature};
pub use file::{FileMatch, SymbolEntry};
pub use owner::{OwnerMatch, PersonOwner, TeamOwner, UserProfile};
pub use text::{ChunkMatch, Location, Range};

use crate::repo::{RepoId, RepoRef};

/// One search hit, of one of four kinds.
///
/// `File` covers path-only, content and symbol results; the distinction is
/// made at conversion time from which sub-collections are populated.
#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    File(FileMatch),
    Repo(RepoMatch),
    Commit(CommitMatch),
    Owner(OwnerMatch),
}

impl Match {
    /// The repository the match belongs to, if any. Owner matches are not
    /// repo-scoped.
    pub fn repo(&self) -> Option<&RepoRef> {
        match self {
            Match::File(m) => Some(&m.repo),
            Match::Repo(m) => Some(&m.repo),
            Match::Commit(m) => Some(&m.repo),
            Match::Owner(_) => None,
        }
    }

    pub fn repo_id(&self) -> Option<RepoId> {
        self.repo().map(|r| r.id)
    }

    pub fn repo_name(&self) -> Option<&str> {
        self.repo().map(|r| r.name.as_ref())
    }
}

/// A repository-level hit: the query matched the repository itself rather
/// than any of its content.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoMatch {
    pub repo: RepoRef,
    pub rev: Option<String>,
    /// Highlight ranges over the repository name.
    pub name_matches: Vec<Range>,
    /// Highlight ranges over the repository description.
    pub description_matches: Vec<Range>,
}
