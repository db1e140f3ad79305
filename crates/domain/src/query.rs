use serde::{Deserialize, Serialize};

/// How the search pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternType {
    #[default]
    Literal,
    Regexp,
}

impl std::str::FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "literal" | "standard" => Ok(PatternType::Literal),
            "regexp" => Ok(PatternType::Regexp),
            other => Err(format!("unknown pattern type {other:?}")),
        }
    }
}

/// Search execution mode, as sent by clients in the `sm` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Precise,
    Smart,
}

impl SearchMode {
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(SearchMode::Precise),
            1 => Some(SearchMode::Smart),
            _ => None,
        }
    }
}

/// Result kinds a query selects with `type:`. An empty selection means the
/// default of content plus path results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Content,
    Path,
    Repo,
    Symbol,
    Commit,
}

/// The planned query: everything the executor needs, produced by the
/// planner from the raw query string and the effective settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchInputs {
    /// The query exactly as the user typed it.
    pub original_query: String,
    pub pattern: String,
    pub pattern_type: PatternType,
    pub case_sensitive: bool,
    pub repo_include: Vec<String>,
    pub repo_exclude: Vec<String>,
    pub file_include: Vec<String>,
    pub file_exclude: Vec<String>,
    pub lang_include: Vec<String>,
    /// Commit-author constraints; only meaningful for `type:commit`.
    pub author_include: Vec<String>,
    pub rev: Option<String>,
    pub result_kinds: Vec<ResultKind>,
    /// Hard cap on matches the executor will produce.
    pub max_results: u64,
    pub search_mode: SearchMode,
}

impl SearchInputs {
    pub fn wants(&self, kind: ResultKind) -> bool {
        if self.result_kinds.is_empty() {
            matches!(kind, ResultKind::Content | ResultKind::Path)
        } else {
            self.result_kinds.contains(&kind)
        }
    }
}

/// Effective per-user settings, loaded once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_max_search_results")]
    pub max_search_results: u64,
}

fn default_max_search_results() -> u64 {
    500
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_search_results: default_max_search_results(),
        }
    }
}
