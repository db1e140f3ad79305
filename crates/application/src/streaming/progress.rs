//! Progress accounting for one request.

use crate::ports::RepoNamer;
use fathom_domain::{
    Progress, RepoId, SearchEvent, Severity, Skipped, SkippedReason, Stats, Suggested,
};
use std::sync::Arc;
use std::time::Instant;

/// Names listed before a skipped-repos message is elided.
const MAX_NAMED_REPOS: usize = 5;

/// Folds batch stats into running counters and produces progress
/// snapshots on demand.
///
/// The aggregator tracks the full match count, including results the
/// display limit truncated away; the display budget lives with the event
/// handler, not here.
pub struct ProgressAggregator {
    start: Instant,
    limit: u64,
    display_limit: u64,
    match_count: u64,
    stats: Stats,
    namer: Arc<dyn RepoNamer>,
    trace_url: Option<String>,
}

impl ProgressAggregator {
    pub fn new(limit: u64, display_limit: u64, namer: Arc<dyn RepoNamer>) -> Self {
        Self {
            start: Instant::now(),
            limit,
            display_limit,
            match_count: 0,
            stats: Stats::default(),
            namer,
            trace_url: None,
        }
    }

    pub fn with_trace_url(mut self, url: impl Into<String>) -> Self {
        self.trace_url = Some(url.into());
        self
    }

    pub fn update(&mut self, event: &SearchEvent) {
        self.stats.merge(&event.stats);
        self.match_count += event.results.len() as u64;
    }

    pub fn match_count(&self) -> u64 {
        self.match_count
    }

    /// Running snapshot, `done=false`.
    pub fn current(&self) -> Progress {
        self.build(false)
    }

    /// Terminal snapshot, `done=true`.
    pub fn finalize(&self) -> Progress {
        self.build(true)
    }

    fn build(&self, done: bool) -> Progress {
        Progress {
            done,
            match_count: self.match_count.min(self.limit),
            duration_ms: self.start.elapsed().as_millis() as u64,
            repositories_count: self.stats.repos_searched,
            skipped: self.build_skipped(),
            trace: self.trace_url.clone(),
        }
    }

    /// Project the accumulated stats into severity-tagged skipped
    /// entries, most severe first. Repo names resolve through the namer
    /// here, at snapshot time, never on the per-batch path.
    fn build_skipped(&self) -> Vec<Skipped> {
        let mut skipped = Vec::new();

        if !self.stats.timed_out.is_empty() {
            skipped.push(Skipped {
                reason: SkippedReason::ShardTimeout,
                title: "Search timed out".to_string(),
                message: format!(
                    "Search timed out before finishing in: {}.",
                    self.name_repos(&self.stats.timed_out)
                ),
                severity: Severity::Warn,
                suggested: Some(Suggested {
                    title: "increase timeout".to_string(),
                    query_expression: "timeout:30s".to_string(),
                }),
            });
        }

        if !self.stats.cloning.is_empty() {
            skipped.push(Skipped {
                reason: SkippedReason::RepositoryCloning,
                title: format!("{} cloning", repos_phrase(self.stats.cloning.len())),
                message: format!(
                    "Not yet available for searching: {}.",
                    self.name_repos(&self.stats.cloning)
                ),
                severity: Severity::Info,
                suggested: None,
            });
        }

        if !self.stats.missing.is_empty() {
            skipped.push(Skipped {
                reason: SkippedReason::RepositoryMissing,
                title: format!("{} missing", repos_phrase(self.stats.missing.len())),
                message: format!(
                    "Could not be found on any backend: {}.",
                    self.name_repos(&self.stats.missing)
                ),
                severity: Severity::Info,
                suggested: None,
            });
        }

        if self.stats.index_unavailable {
            skipped.push(Skipped {
                reason: SkippedReason::IndexUnavailable,
                title: "Index unavailable".to_string(),
                message: "Some indexed shards were unreachable; results may be incomplete."
                    .to_string(),
                severity: Severity::Warn,
                suggested: None,
            });
        }

        if self.stats.backends_missing > 0 {
            skipped.push(Skipped {
                reason: SkippedReason::BackendMissing,
                title: "Backends unreachable".to_string(),
                message: format!(
                    "{} search backend(s) did not respond.",
                    self.stats.backends_missing
                ),
                severity: Severity::Warn,
                suggested: None,
            });
        }

        if self.stats.limit_hit {
            skipped.push(Skipped {
                reason: SkippedReason::RepoLimitHit,
                title: "Result limit hit".to_string(),
                message: "Not all results have been returned; the search stopped at the result limit."
                    .to_string(),
                severity: Severity::Info,
                suggested: Some(Suggested {
                    title: "increase limit".to_string(),
                    query_expression: "count:all".to_string(),
                }),
            });
        }

        if self.display_limit < self.match_count.min(self.limit) {
            skipped.push(Skipped {
                reason: SkippedReason::DisplayLimit,
                title: "Display limit hit".to_string(),
                message: "We only display a limited number of results; more matched on the backend."
                    .to_string(),
                severity: Severity::Info,
                suggested: None,
            });
        }

        skipped.sort_by(|a, b| b.severity.cmp(&a.severity));
        skipped
    }

    fn name_repos(&self, ids: &[RepoId]) -> String {
        let mut names: Vec<String> = ids
            .iter()
            .take(MAX_NAMED_REPOS)
            .map(|id| self.namer.name(*id).unwrap_or_else(|| format!("repo {id}")))
            .collect();
        if ids.len() > MAX_NAMED_REPOS {
            names.push(format!("{} more", ids.len() - MAX_NAMED_REPOS));
        }
        names.join(", ")
    }
}

fn repos_phrase(n: usize) -> String {
    if n == 1 {
        "1 repository".to_string()
    } else {
        format!("{n} repositories")
    }
}
