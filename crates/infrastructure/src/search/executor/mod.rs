//! Local search executor: a demo-scale backend over the filesystem store.
//!
//! One task per candidate repository, all sharing the hard-limit budget.
//! Each task emits per-repo batches into the provided stream and folds
//! its outcome into that batch's stats.

pub mod matcher;

pub use matcher::PatternMatcher;

use super::repo_store::{FilesystemRepoStore, StoredRepo};
use async_trait::async_trait;
use fathom_application::ports::{SearchEventStream, SearchExecutor};
use fathom_domain::{
    Alert, ChunkMatch, FileMatch, Location, Match, Range, RepoMatch, RepoRef, ResultKind,
    SearchError, SearchEvent, SearchInputs, Stats,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Results per intermediate batch sent while a repo is still being
/// walked.
const BATCH_SIZE: usize = 30;

/// Chunks kept per file before moving on; keeps one enormous file from
/// dominating a batch.
const MAX_CHUNKS_PER_FILE: usize = 50;

/// Bytes sniffed for a NUL before a file is treated as binary.
const BINARY_SNIFF_BYTES: usize = 1024;

/// Commit id reported for content served from a plain directory tree.
const WORKING_TREE: &str = "HEAD";

pub struct LocalSearchExecutor {
    store: Arc<FilesystemRepoStore>,
    max_file_size: u64,
}

impl LocalSearchExecutor {
    pub fn new(store: Arc<FilesystemRepoStore>, max_file_size: u64) -> Self {
        Self {
            store,
            max_file_size,
        }
    }
}

#[async_trait]
impl SearchExecutor for LocalSearchExecutor {
    async fn execute(
        &self,
        stream: Arc<dyn SearchEventStream>,
        inputs: &SearchInputs,
        cancel: CancellationToken,
    ) -> Result<Option<Alert>, SearchError> {
        let matcher = Arc::new(PatternMatcher::compile(inputs)?);
        let candidates = self
            .store
            .select(&inputs.repo_include, &inputs.repo_exclude)?;
        if candidates.is_empty() {
            return Ok(Some(Alert::new(
                "No repositories matched your query",
                "Adjust or remove the repo: filters and try again.",
            )));
        }

        let budget = Arc::new(AtomicI64::new(
            inputs.max_results.min(i64::MAX as u64) as i64
        ));
        let mut tasks = JoinSet::new();
        for repo in candidates {
            let task = RepoSearch {
                repo: repo.clone(),
                matcher: Arc::clone(&matcher),
                stream: Arc::clone(&stream),
                budget: Arc::clone(&budget),
                cancel: cancel.clone(),
                rev: inputs.rev.clone(),
                wants_content: inputs.wants(ResultKind::Content),
                wants_path: inputs.wants(ResultKind::Path),
                wants_repo: inputs.wants(ResultKind::Repo),
                max_file_size: self.max_file_size,
            };
            tasks.spawn(task.run());
        }

        // contain panics from repo tasks; they must never reach the
        // runtime or leave the stream in use after we return
        let mut backends_lost = 0u64;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    error!(error = %e, "repository search task panicked");
                    backends_lost += 1;
                }
            }
        }
        if backends_lost > 0 {
            stream
                .send(SearchEvent::new(
                    vec![],
                    Stats {
                        backends_missing: backends_lost,
                        ..Stats::default()
                    },
                ))
                .await;
        }

        if cancel.is_cancelled() {
            return Err(SearchError::Canceled);
        }
        Ok(None)
    }
}

struct RepoSearch {
    repo: StoredRepo,
    matcher: Arc<PatternMatcher>,
    stream: Arc<dyn SearchEventStream>,
    budget: Arc<AtomicI64>,
    cancel: CancellationToken,
    rev: Option<String>,
    wants_content: bool,
    wants_path: bool,
    wants_repo: bool,
    max_file_size: u64,
}

impl RepoSearch {
    async fn run(self) {
        let mut stats = Stats::default();
        let mut batch: Vec<Match> = Vec::new();
        let repo_ref = RepoRef::new(self.repo.id, Arc::clone(&self.repo.name));

        if self.wants_repo && self.matcher.matches_text(&self.repo.name) {
            if self.take_budget(&mut stats) {
                batch.push(self.repo_match(&repo_ref));
            }
        }

        if (self.wants_content || self.wants_path) && !stats.limit_hit {
            self.search_files(&repo_ref, &mut batch, &mut stats).await;
        }

        stats.repos_searched = 1;
        self.stream.send(SearchEvent::new(batch, stats)).await;
    }

    fn repo_match(&self, repo_ref: &RepoRef) -> Match {
        let name_matches = spans_to_ranges(self.matcher.find_in_text(&self.repo.name));
        let description_matches = self
            .repo
            .metadata
            .description
            .as_deref()
            .map(|d| spans_to_ranges(self.matcher.find_in_text(d)))
            .unwrap_or_default();
        Match::Repo(RepoMatch {
            repo: repo_ref.clone(),
            rev: self.rev.clone(),
            name_matches,
            description_matches,
        })
    }

    async fn search_files(&self, repo_ref: &RepoRef, batch: &mut Vec<Match>, stats: &mut Stats) {
        let root = self.repo.path.clone();
        let files = match tokio::task::spawn_blocking(move || walk_files(&root)).await {
            Ok(Ok(files)) => files,
            Ok(Err(e)) => {
                debug!(repo = %self.repo.name, error = %e, "repository vanished mid-walk");
                stats.missing.push(self.repo.id);
                return;
            }
            Err(_) => {
                stats.missing.push(self.repo.id);
                return;
            }
        };

        for (path, size) in files {
            if self.cancel.is_cancelled() {
                break;
            }
            let Some(rel) = relative_path(&self.repo.path, &path) else {
                continue;
            };
            if !self.matcher.allows_path(&rel) {
                continue;
            }
            if size > self.max_file_size {
                continue;
            }

            let mut produced = None;
            if self.wants_content && self.matcher.has_content_pattern() {
                produced = self.content_match(repo_ref, &path, &rel).await;
            }
            if produced.is_none() && self.wants_path && self.matcher.matches_text(&rel) {
                produced = Some(self.path_match(repo_ref, &rel));
            }

            if let Some(m) = produced {
                if !self.take_budget(stats) {
                    break;
                }
                batch.push(m);
                if batch.len() >= BATCH_SIZE {
                    let full = std::mem::take(batch);
                    self.stream.send(SearchEvent::new(full, Stats::default())).await;
                }
            }
        }
    }

    async fn content_match(&self, repo_ref: &RepoRef, path: &Path, rel: &str) -> Option<Match> {
        let bytes = tokio::fs::read(path).await.ok()?;
        if bytes
            .iter()
            .take(BINARY_SNIFF_BYTES)
            .any(|b| *b == 0)
        {
            return None;
        }
        let text = String::from_utf8_lossy(&bytes);

        let mut chunks = Vec::new();
        let mut line_start = 0usize;
        for (line_number, line) in text.split('\n').enumerate() {
            let spans = self.matcher.find_in_line(line);
            if !spans.is_empty() {
                let ranges = spans
                    .iter()
                    .map(|(start, end)| {
                        Range::new(
                            Location::new(line_start + start, line_number as u32, *start as u32),
                            Location::new(line_start + end, line_number as u32, *end as u32),
                        )
                    })
                    .collect();
                chunks.push(ChunkMatch {
                    content: line.to_string(),
                    content_start: Location::new(line_start, line_number as u32, 0),
                    ranges,
                });
                if chunks.len() >= MAX_CHUNKS_PER_FILE {
                    break;
                }
            }
            line_start += line.len() + 1;
        }

        if chunks.is_empty() {
            return None;
        }
        Some(Match::File(FileMatch {
            input_rev: self.rev.clone(),
            chunks,
            ..FileMatch::path_only(repo_ref.clone(), rel, WORKING_TREE)
        }))
    }

    fn path_match(&self, repo_ref: &RepoRef, rel: &str) -> Match {
        Match::File(FileMatch {
            input_rev: self.rev.clone(),
            ..FileMatch::path_only(repo_ref.clone(), rel, WORKING_TREE)
        })
    }

    /// Claim one result from the shared budget; latches `limit_hit` once
    /// the budget is exhausted.
    fn take_budget(&self, stats: &mut Stats) -> bool {
        if self.budget.fetch_sub(1, Ordering::SeqCst) > 0 {
            true
        } else {
            stats.limit_hit = true;
            false
        }
    }
}

fn spans_to_ranges(spans: Vec<(usize, usize)>) -> Vec<Range> {
    spans
        .into_iter()
        .map(|(start, end)| {
            Range::new(
                Location::new(start, 0, start as u32),
                Location::new(end, 0, end as u32),
            )
        })
        .collect()
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let s = rel.to_str()?;
    if std::path::MAIN_SEPARATOR == '/' {
        Some(s.to_string())
    } else {
        Some(s.replace(std::path::MAIN_SEPARATOR, "/"))
    }
}

/// Recursively list regular files under `root`, hidden entries skipped,
/// sorted for deterministic result order.
fn walk_files(root: &Path) -> std::io::Result<Vec<(PathBuf, u64)>> {
    let mut out = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let size = entry.metadata()?.len();
                out.push((path, size));
            }
        }
    }
    out.sort();
    Ok(out)
}
