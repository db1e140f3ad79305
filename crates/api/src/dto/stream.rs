use fathom_domain::{PatternType, SearchMode};
use serde::Deserialize;

/// Raw query-string parameters of `GET /search/stream`. Everything
/// arrives as text so that malformed values produce descriptive 400s
/// instead of axum's generic rejection.
#[derive(Debug, Default, Deserialize)]
pub struct StreamParams {
    pub q: Option<String>,
    pub v: Option<String>,
    pub t: Option<String>,
    pub display: Option<String>,
    pub cm: Option<String>,
    pub sm: Option<String>,
}

/// Validated request parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamQuery {
    pub query: String,
    pub version: String,
    pub pattern_type: Option<PatternType>,
    /// Requested display limit; negative means "up to the hard limit".
    pub display: i64,
    pub chunk_matches: bool,
    pub search_mode: SearchMode,
}

impl StreamParams {
    pub fn parse(self) -> Result<StreamQuery, String> {
        let query = match self.q {
            Some(q) if !q.trim().is_empty() => q,
            _ => return Err("no query found".to_string()),
        };

        let version = self.v.unwrap_or_else(|| "V3".to_string());

        let pattern_type = match self.t.as_deref() {
            None | Some("") => None,
            Some(t) => Some(
                t.parse::<PatternType>()
                    .map_err(|e| format!("invalid t parameter: {e}"))?,
            ),
        };

        let display = match self.display.as_deref() {
            None | Some("") => -1,
            Some(d) => d
                .parse::<i64>()
                .map_err(|_| format!("invalid display parameter {d:?}, expected an integer"))?,
        };

        let chunk_matches = match self.cm.as_deref() {
            None | Some("") => false,
            Some("true" | "t" | "1") => true,
            Some("false" | "f" | "0") => false,
            Some(other) => {
                return Err(format!(
                    "invalid cm parameter {other:?}, expected a boolean"
                ))
            }
        };

        let search_mode = match self.sm.as_deref() {
            None | Some("") => SearchMode::Precise,
            Some(raw) => {
                let n: i32 = raw
                    .parse()
                    .map_err(|_| format!("invalid sm parameter {raw:?}, expected an integer"))?;
                SearchMode::from_i32(n)
                    .ok_or_else(|| format!("invalid sm parameter: unknown search mode {n}"))?
            }
        };

        Ok(StreamQuery {
            query,
            version,
            pattern_type,
            display,
            chunk_matches,
            search_mode,
        })
    }
}
