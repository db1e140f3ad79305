//! Query planning: raw query string to [`SearchInputs`].

use fathom_application::ports::{PlanRequest, QueryPlanner};
use fathom_domain::{PatternType, QueryError, ResultKind, SearchError, SearchInputs};
use regex::Regex;

/// Effective limit for `count:all`.
const COUNT_ALL: u64 = 999_999;

/// Parses the `field:value` query syntax and validates patterns up front,
/// so everything past planning can assume well-formed inputs.
pub struct DefaultQueryPlanner;

impl DefaultQueryPlanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultQueryPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryPlanner for DefaultQueryPlanner {
    fn plan(&self, request: &PlanRequest<'_>) -> Result<SearchInputs, SearchError> {
        if !matches!(request.version, "V2" | "V3") {
            return Err(QueryError::new(format!(
                "unsupported protocol version {:?}",
                request.version
            ))
            .into());
        }

        let tokens = tokenize(request.query)?;

        let mut pattern_parts: Vec<String> = Vec::new();
        let mut pattern_type = request.pattern_type.unwrap_or_default();
        let mut case_sensitive = false;
        let mut repo_include = Vec::new();
        let mut repo_exclude = Vec::new();
        let mut file_include = Vec::new();
        let mut file_exclude = Vec::new();
        let mut lang_include = Vec::new();
        let mut author_include = Vec::new();
        let mut rev = None;
        let mut result_kinds = Vec::new();
        let mut count: Option<u64> = None;

        for token in &tokens {
            let Some((field, value)) = split_filter(token) else {
                pattern_parts.push(token.clone());
                continue;
            };
            match field.as_str() {
                "repo" | "r" => repo_include.push(validated_regex(&value, "repo")?),
                "-repo" | "-r" => repo_exclude.push(validated_regex(&value, "-repo")?),
                "file" | "f" => file_include.push(validated_regex(&value, "file")?),
                "-file" | "-f" => file_exclude.push(validated_regex(&value, "-file")?),
                "lang" | "language" => lang_include.push(value.to_lowercase()),
                "author" => author_include.push(value),
                "rev" | "revision" => rev = Some(value),
                "case" => case_sensitive = parse_bool_filter("case", &value)?,
                "count" => count = Some(parse_count(&value)?),
                "type" => result_kinds.push(parse_result_kind(&value)?),
                "patterntype" => {
                    pattern_type = value.parse::<PatternType>().map_err(QueryError::new)?
                }
                other => {
                    return Err(QueryError::new(format!("unknown filter {other:?}"))
                        .with_proposal(
                            "search for the text instead",
                            format!("\"{token}\""),
                        )
                        .into());
                }
            }
        }

        let pattern = pattern_parts.join(" ");
        if pattern.is_empty()
            && repo_include.is_empty()
            && file_include.is_empty()
            && lang_include.is_empty()
            && result_kinds.is_empty()
        {
            return Err(QueryError::new("query is empty").into());
        }

        if pattern_type == PatternType::Regexp && !pattern.is_empty() {
            if let Err(e) = Regex::new(&pattern) {
                return Err(QueryError::new(format!("invalid regular expression: {e}"))
                    .with_proposal(
                        "search literally instead",
                        format!("{} patterntype:literal", request.query),
                    )
                    .into());
            }
        }

        Ok(SearchInputs {
            original_query: request.query.to_string(),
            pattern,
            pattern_type,
            case_sensitive,
            repo_include,
            repo_exclude,
            file_include,
            file_exclude,
            lang_include,
            author_include,
            rev,
            result_kinds,
            max_results: count.unwrap_or(request.settings.max_search_results),
            search_mode: request.search_mode,
        })
    }
}

/// Split the query into whitespace-separated tokens, honoring double
/// quotes inside filter values (`author:"a b"`).
fn tokenize(query: &str) -> Result<Vec<String>, QueryError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in query.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        return Err(QueryError::new("unbalanced quotes in query"));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// `field:value` when the token is a filter; `None` when it is pattern
/// text. A leading `-` negates the field. URL-ish (`https://`) and
/// scope-ish (`std::mem`) tokens stay pattern text.
fn split_filter(token: &str) -> Option<(String, String)> {
    let (field, value) = token.split_once(':')?;
    if field.is_empty() || value.is_empty() {
        return None;
    }
    let bare = field.strip_prefix('-').unwrap_or(field);
    if !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    if value.starts_with('/') || value.starts_with(':') {
        return None;
    }
    Some((field.to_lowercase(), value.to_string()))
}

fn validated_regex(value: &str, field: &str) -> Result<String, QueryError> {
    Regex::new(value).map_err(|e| {
        QueryError::new(format!("invalid regular expression in {field}: {e}"))
    })?;
    Ok(value.to_string())
}

fn parse_bool_filter(field: &str, value: &str) -> Result<bool, QueryError> {
    match value {
        "yes" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        other => Err(QueryError::new(format!(
            "invalid value {other:?} for {field}:, expected yes or no"
        ))),
    }
}

fn parse_count(value: &str) -> Result<u64, QueryError> {
    if value == "all" {
        return Ok(COUNT_ALL);
    }
    let n: u64 = value
        .parse()
        .map_err(|_| QueryError::new(format!("invalid value {value:?} for count:")))?;
    if n == 0 {
        return Err(QueryError::new("count: must be positive"));
    }
    Ok(n)
}

fn parse_result_kind(value: &str) -> Result<ResultKind, QueryError> {
    match value {
        "file" | "content" => Ok(ResultKind::Content),
        "path" => Ok(ResultKind::Path),
        "repo" => Ok(ResultKind::Repo),
        "symbol" => Ok(ResultKind::Symbol),
        "commit" => Ok(ResultKind::Commit),
        other => Err(QueryError::new(format!(
            "type:{other} is not supported"
        ))),
    }
}
