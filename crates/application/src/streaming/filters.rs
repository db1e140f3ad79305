//! Filter suggestion accumulation.

use fathom_domain::{FilterKind, FilterSuggestion, Match, OwnerMatch};
use std::collections::HashMap;

/// Most suggestions kept per kind in a computed snapshot.
const MAX_PER_KIND: usize = 50;

/// Derives per-field query refinements from observed matches.
///
/// Counts accumulate in a map keyed by `(kind, value)`; they are
/// approximate until the search finishes.
#[derive(Default)]
pub struct FilterAggregator {
    counts: HashMap<(FilterKind, String), Entry>,
    revision: u64,
}

struct Entry {
    label: String,
    count: u64,
}

impl FilterAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonically increasing counter bumped on every change; lets the
    /// flush timer skip re-emitting an unchanged snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn update(&mut self, results: &[Match]) {
        for m in results {
            if let Some(name) = m.repo_name() {
                self.add(
                    FilterKind::Repo,
                    format!("repo:^{}$", escape_regex(name)),
                    name.to_string(),
                    1,
                );
            }
            match m {
                Match::File(fm) => {
                    if let Some(lang) = language_of_path(&fm.path) {
                        self.add(
                            FilterKind::Lang,
                            format!("lang:{}", lang.to_lowercase()),
                            lang.to_string(),
                            1,
                        );
                    }
                    if let Some(dir) = fm.path.split('/').next().filter(|d| *d != fm.path) {
                        self.add(
                            FilterKind::File,
                            format!("file:^{}/", escape_regex(dir)),
                            format!("{dir}/"),
                            1,
                        );
                    }
                    for symbol in &fm.symbols {
                        if let Some(kind) = &symbol.kind {
                            self.add(
                                FilterKind::SymbolType,
                                format!("select:symbol.{}", kind.to_lowercase()),
                                kind.to_lowercase(),
                                1,
                            );
                        }
                    }
                }
                Match::Commit(cm) => {
                    self.add(
                        FilterKind::CommitAuthor,
                        format!("author:\"{}\"", cm.author.name),
                        cm.author.name.clone(),
                        1,
                    );
                }
                Match::Repo(_) => {}
                Match::Owner(om) => {
                    let handle = match om {
                        OwnerMatch::Person(p) => &p.handle,
                        OwnerMatch::Team(t) => &t.handle,
                    };
                    self.add(
                        FilterKind::Utility,
                        format!("file:has.owner({handle})"),
                        handle.clone(),
                        1,
                    );
                }
            }
        }
    }

    fn add(&mut self, kind: FilterKind, value: String, label: String, n: u64) {
        self.counts
            .entry((kind, value))
            .or_insert(Entry { label, count: 0 })
            .count += n;
        self.revision += 1;
    }

    /// Snapshot the current suggestions: at most [`MAX_PER_KIND`] per
    /// kind, ordered by count descending then value ascending.
    pub fn compute(&self, exhaustive: bool) -> Vec<FilterSuggestion> {
        let mut by_kind: HashMap<FilterKind, Vec<FilterSuggestion>> = HashMap::new();
        for ((kind, value), entry) in &self.counts {
            by_kind.entry(*kind).or_default().push(FilterSuggestion {
                value: value.clone(),
                label: entry.label.clone(),
                count: entry.count,
                exhaustive,
                kind: *kind,
            });
        }

        let mut out = Vec::new();
        for (_, mut suggestions) in by_kind {
            suggestions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
            suggestions.truncate(MAX_PER_KIND);
            out.extend(suggestions);
        }
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        out
    }
}

/// Escape regex metacharacters so a literal name can be embedded in an
/// anchored filter value.
fn escape_regex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// File extension to language, for `lang:` suggestions.
fn language_of_path(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.').map(|(_, e)| e)?;
    let lang = match ext {
        "rs" => "Rust",
        "go" => "Go",
        "py" => "Python",
        "js" | "jsx" => "JavaScript",
        "ts" | "tsx" => "TypeScript",
        "java" => "Java",
        "c" | "h" => "C",
        "cc" | "cpp" | "cxx" | "hpp" => "C++",
        "cs" => "C#",
        "rb" => "Ruby",
        "php" => "PHP",
        "swift" => "Swift",
        "kt" | "kts" => "Kotlin",
        "scala" => "Scala",
        "sh" | "bash" => "Shell",
        "pl" => "Perl",
        "lua" => "Lua",
        "hs" => "Haskell",
        "ml" | "mli" => "OCaml",
        "ex" | "exs" => "Elixir",
        "erl" => "Erlang",
        "md" | "markdown" => "Markdown",
        "json" => "JSON",
        "yaml" | "yml" => "YAML",
        "toml" => "TOML",
        "html" | "htm" => "HTML",
        "css" => "CSS",
        "sql" => "SQL",
        "proto" => "Protocol Buffer",
        "zig" => "Zig",
        _ => return None,
    };
    Some(lang)
}
