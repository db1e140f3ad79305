use fathom_domain::{PatternType, SearchError, SearchInputs, SearchMode, Settings};

/// Everything the planner needs to turn a raw query string into
/// [`SearchInputs`].
#[derive(Debug, Clone)]
pub struct PlanRequest<'a> {
    pub query: &'a str,
    /// Protocol version from the request (`v` parameter).
    pub version: &'a str,
    /// Pattern type from the request, when the client sent one. The query
    /// itself may still override it.
    pub pattern_type: Option<PatternType>,
    pub search_mode: SearchMode,
    pub settings: &'a Settings,
}

pub trait QueryPlanner: Send + Sync {
    /// Plan a query. A [`SearchError::Query`] return carries user-facing
    /// text and becomes an `alert` event; any other error is internal.
    fn plan(&self, request: &PlanRequest<'_>) -> Result<SearchInputs, SearchError>;
}
