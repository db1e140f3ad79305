//! Compiled form of the planned query, shared by all repo search tasks.

use fathom_domain::{PatternType, QueryError, SearchError, SearchInputs};
use regex::{Regex, RegexBuilder};

#[derive(Debug)]
pub struct PatternMatcher {
    /// Compiled content pattern; `None` for filter-only queries.
    content: Option<Regex>,
    file_include: Vec<Regex>,
    file_exclude: Vec<Regex>,
    /// File extensions implied by `lang:` filters.
    lang_exts: Option<Vec<&'static str>>,
}

impl PatternMatcher {
    pub fn compile(inputs: &SearchInputs) -> Result<Self, SearchError> {
        let content = if inputs.pattern.is_empty() {
            None
        } else {
            let source = match inputs.pattern_type {
                PatternType::Literal => regex::escape(&inputs.pattern),
                PatternType::Regexp => inputs.pattern.clone(),
            };
            Some(build(&source, !inputs.case_sensitive)?)
        };

        let lang_exts = if inputs.lang_include.is_empty() {
            None
        } else {
            let mut exts = Vec::new();
            for lang in &inputs.lang_include {
                let known = extensions_for(lang).ok_or_else(|| {
                    SearchError::Query(QueryError::new(format!("unknown language {lang:?}")))
                })?;
                exts.extend_from_slice(known);
            }
            Some(exts)
        };

        Ok(Self {
            content,
            file_include: build_all(&inputs.file_include, !inputs.case_sensitive)?,
            file_exclude: build_all(&inputs.file_exclude, !inputs.case_sensitive)?,
            lang_exts,
        })
    }

    pub fn has_content_pattern(&self) -> bool {
        self.content.is_some()
    }

    /// Byte spans of every pattern occurrence in one line.
    pub fn find_in_line(&self, line: &str) -> Vec<(usize, usize)> {
        match &self.content {
            Some(re) => re.find_iter(line).map(|m| (m.start(), m.end())).collect(),
            None => Vec::new(),
        }
    }

    /// Whether the pattern occurs in free-form text (paths, repo names).
    /// An empty pattern matches everything, so filter-only queries still
    /// select repositories.
    pub fn matches_text(&self, text: &str) -> bool {
        match &self.content {
            Some(re) => re.is_match(text),
            None => true,
        }
    }

    /// Spans of pattern occurrences in free-form text, for highlights.
    pub fn find_in_text(&self, text: &str) -> Vec<(usize, usize)> {
        self.find_in_line(text)
    }

    /// Whether a repo-relative path passes the file and lang filters.
    pub fn allows_path(&self, path: &str) -> bool {
        if let Some(exts) = &self.lang_exts {
            let ext = path.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
            if !exts.contains(&ext) {
                return false;
            }
        }
        self.file_include.iter().all(|re| re.is_match(path))
            && !self.file_exclude.iter().any(|re| re.is_match(path))
    }
}

fn build(source: &str, case_insensitive: bool) -> Result<Regex, SearchError> {
    RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| SearchError::Backend(format!("pattern failed to compile: {e}")))
}

fn build_all(patterns: &[String], case_insensitive: bool) -> Result<Vec<Regex>, SearchError> {
    patterns
        .iter()
        .map(|p| build(p, case_insensitive))
        .collect()
}

/// Extensions searched for a `lang:` filter value (lower-cased).
fn extensions_for(lang: &str) -> Option<&'static [&'static str]> {
    let exts: &'static [&'static str] = match lang {
        "rust" => &["rs"],
        "go" => &["go"],
        "python" => &["py"],
        "javascript" => &["js", "jsx"],
        "typescript" => &["ts", "tsx"],
        "java" => &["java"],
        "c" => &["c", "h"],
        "c++" | "cpp" => &["cc", "cpp", "cxx", "hpp"],
        "c#" | "csharp" => &["cs"],
        "ruby" => &["rb"],
        "php" => &["php"],
        "swift" => &["swift"],
        "kotlin" => &["kt", "kts"],
        "scala" => &["scala"],
        "shell" | "bash" => &["sh", "bash"],
        "haskell" => &["hs"],
        "ocaml" => &["ml", "mli"],
        "elixir" => &["ex", "exs"],
        "erlang" => &["erl"],
        "lua" => &["lua"],
        "markdown" => &["md", "markdown"],
        "json" => &["json"],
        "yaml" => &["yaml", "yml"],
        "toml" => &["toml"],
        "html" => &["html", "htm"],
        "css" => &["css"],
        "sql" => &["sql"],
        "zig" => &["zig"],
        _ => return None,
    };
    Some(exts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_domain::{SearchMode, Settings};

    fn inputs(pattern: &str, pattern_type: PatternType) -> SearchInputs {
        SearchInputs {
            original_query: pattern.to_string(),
            pattern: pattern.to_string(),
            pattern_type,
            case_sensitive: false,
            repo_include: vec![],
            repo_exclude: vec![],
            file_include: vec![],
            file_exclude: vec![],
            lang_include: vec![],
            author_include: vec![],
            rev: None,
            result_kinds: vec![],
            max_results: Settings::default().max_search_results,
            search_mode: SearchMode::Precise,
        }
    }

    #[test]
    fn literal_patterns_match_metacharacters_verbatim() {
        let m = PatternMatcher::compile(&inputs("vec.push(", PatternType::Literal)).unwrap();
        assert_eq!(m.find_in_line("    vec.push(item);"), vec![(4, 13)]);
        assert!(m.find_in_line("vecXpush(").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive_by_default() {
        let m = PatternMatcher::compile(&inputs("readme", PatternType::Literal)).unwrap();
        assert!(m.matches_text("README.md"));

        let mut sensitive = inputs("readme", PatternType::Literal);
        sensitive.case_sensitive = true;
        let m = PatternMatcher::compile(&sensitive).unwrap();
        assert!(!m.matches_text("README.md"));
    }

    #[test]
    fn lang_filter_gates_paths() {
        let mut i = inputs("foo", PatternType::Literal);
        i.lang_include = vec!["rust".to_string()];
        let m = PatternMatcher::compile(&i).unwrap();
        assert!(m.allows_path("src/main.rs"));
        assert!(!m.allows_path("src/main.go"));
    }

    #[test]
    fn unknown_lang_is_a_query_error() {
        let mut i = inputs("foo", PatternType::Literal);
        i.lang_include = vec!["klingon".to_string()];
        assert!(matches!(
            PatternMatcher::compile(&i).unwrap_err(),
            SearchError::Query(_)
        ));
    }

    #[test]
    fn file_filters_combine() {
        let mut i = inputs("foo", PatternType::Literal);
        i.file_include = vec!["^src/".to_string()];
        i.file_exclude = vec!["_test\\.".to_string()];
        let m = PatternMatcher::compile(&i).unwrap();
        assert!(m.allows_path("src/lib.rs"));
        assert!(!m.allows_path("docs/lib.rs"));
        assert!(!m.allows_path("src/lib_test.rs"));
    }

    #[test]
    fn empty_pattern_matches_all_text() {
        let mut i = inputs("", PatternType::Literal);
        i.repo_include = vec!["acme".to_string()];
        let m = PatternMatcher::compile(&i).unwrap();
        assert!(!m.has_content_pattern());
        assert!(m.matches_text("anything"));
        assert!(m.find_in_line("anything").is_empty());
    }
}
