use serde::{Deserialize, Serialize};

/// Field a filter suggestion refines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterKind {
    #[serde(rename = "repo")]
    Repo,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "lang")]
    Lang,
    #[serde(rename = "symbol-type")]
    SymbolType,
    #[serde(rename = "commit-author")]
    CommitAuthor,
    #[serde(rename = "utility")]
    Utility,
}

/// A proposed query refinement derived from observed results.
///
/// `count` is approximate (and `exhaustive` false) until the search is
/// finished; the final `filters` event carries settled numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSuggestion {
    pub value: String,
    pub label: String,
    pub count: u64,
    pub exhaustive: bool,
    pub kind: FilterKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_kebab() {
        assert_eq!(
            serde_json::to_string(&FilterKind::SymbolType).unwrap(),
            "\"symbol-type\""
        );
        assert_eq!(serde_json::to_string(&FilterKind::Repo).unwrap(), "\"repo\"");
    }
}
