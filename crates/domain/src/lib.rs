//! Fathom Domain Layer
pub mod alert;
pub mod config;
pub mod errors;
pub mod filters;
pub mod matches;
pub mod progress;
pub mod query;
pub mod repo;
pub mod search_event;

pub use alert::{Alert, ProposedQuery};
pub use config::{CliOverrides, Config, ConfigError};
pub use errors::{QueryError, SearchError};
pub use filters::{FilterKind, FilterSuggestion};
pub use matches::{
    ChunkMatch, CommitMatch, FileMatch, Location, Match, OwnerMatch, PersonOwner, Range,
    RepoMatch, Signature, SymbolEntry, TeamOwner, UserProfile,
};
pub use progress::{Progress, Severity, Skipped, SkippedReason, Suggested};
pub use query::{PatternType, ResultKind, SearchInputs, SearchMode, Settings};
pub use repo::{RepoId, RepoMetadata, RepoRef};
pub use search_event::{SearchEvent, Stats};
