use crate::matches::Match;
use crate::repo::RepoId;

/// One batch handed from the executor to the streaming pipeline: a group of
/// matches plus the stats delta observed while producing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchEvent {
    pub results: Vec<Match>,
    pub stats: Stats,
}

impl SearchEvent {
    pub fn new(results: Vec<Match>, stats: Stats) -> Self {
        Self { results, stats }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.stats == Stats::default()
    }

    /// Fold another batch into this one, preserving result order.
    pub fn merge(&mut self, other: SearchEvent) {
        self.results.extend(other.results);
        self.stats.merge(&other.stats);
    }
}

/// Repo-scoped counters accumulated across all batches of one request.
///
/// Merging is monotonic: counts only grow, flags only latch on, and the
/// repo lists only gain entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    /// Repositories fully searched so far.
    pub repos_searched: u64,
    /// Repositories skipped because a clone is still in progress.
    pub cloning: Vec<RepoId>,
    /// Repositories that could not be found on any backend.
    pub missing: Vec<RepoId>,
    /// Repositories whose shard timed out before finishing.
    pub timed_out: Vec<RepoId>,
    /// The hard result limit was reached and the search stopped early.
    pub limit_hit: bool,
    /// At least one index shard was unreachable.
    pub index_unavailable: bool,
    /// Number of backends that did not answer at all.
    pub backends_missing: u64,
}

impl Stats {
    pub fn merge(&mut self, other: &Stats) {
        self.repos_searched += other.repos_searched;
        merge_repo_list(&mut self.cloning, &other.cloning);
        merge_repo_list(&mut self.missing, &other.missing);
        merge_repo_list(&mut self.timed_out, &other.timed_out);
        self.limit_hit |= other.limit_hit;
        self.index_unavailable |= other.index_unavailable;
        self.backends_missing += other.backends_missing;
    }

    pub fn is_zero(&self) -> bool {
        *self == Stats::default()
    }
}

fn merge_repo_list(into: &mut Vec<RepoId>, from: &[RepoId]) {
    for id in from {
        if !into.contains(id) {
            into.push(*id);
        }
    }
}
