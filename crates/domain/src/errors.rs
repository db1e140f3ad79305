use crate::alert::ProposedQuery;
use thiserror::Error;

/// A malformed or semantically invalid query. Recovered locally: converted
/// into an `alert` event, after which the stream still ends with `done`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct QueryError {
    pub message: String,
    pub proposed_queries: Vec<ProposedQuery>,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            proposed_queries: Vec::new(),
        }
    }

    pub fn with_proposal(
        mut self,
        description: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        self.proposed_queries.push(ProposedQuery {
            description: description.into(),
            query: query.into(),
        });
        self
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    /// Invalid query; carries user-facing text and proposed rewrites.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The client went away or the transport failed. Only the first such
    /// error per request is recorded; later ones are swallowed.
    #[error("stream write failed: {0}")]
    Write(String),

    /// A search backend failed after streaming began.
    #[error("search backend error: {0}")]
    Backend(String),

    /// A match could not be converted to a wire record.
    #[error("invalid match: {0}")]
    Conversion(String),

    #[error("search canceled")]
    Canceled,
}

impl SearchError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, SearchError::Canceled)
    }
}
