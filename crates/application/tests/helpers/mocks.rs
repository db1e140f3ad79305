#![allow(dead_code)]

use async_trait::async_trait;
use fathom_application::ports::{EventSink, Frame, RepoMetadataSource, RepoNamer};
use fathom_domain::{
    ChunkMatch, FileMatch, Location, Match, Range, RepoId, RepoMetadata, RepoRef, SearchError,
    SearchEvent, Stats,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// Recording sink
// ============================================================================

/// Captures every frame the pipeline writes; can be told to start failing
/// after a number of successful writes, simulating a client disconnect.
pub struct RecordingSink {
    frames: Mutex<Vec<Frame>>,
    fail_after: Mutex<Option<usize>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            frames: Mutex::new(Vec::new()),
            fail_after: Mutex::new(None),
        })
    }

    pub fn failing_after(writes: usize) -> Arc<Self> {
        Arc::new(Self {
            frames: Mutex::new(Vec::new()),
            fail_after: Mutex::new(Some(writes)),
        })
    }

    pub async fn frames(&self) -> Vec<Frame> {
        self.frames.lock().await.clone()
    }

    pub async fn frame_names(&self) -> Vec<&'static str> {
        self.frames.lock().await.iter().map(|f| f.name).collect()
    }

    /// Parsed payload of the `index`-th frame with the given name.
    pub async fn payload(&self, name: &str, index: usize) -> Option<serde_json::Value> {
        self.frames
            .lock()
            .await
            .iter()
            .filter(|f| f.name == name)
            .nth(index)
            .map(|f| serde_json::from_str(&f.data).expect("frame payload is valid JSON"))
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn write(&self, frame: Frame) -> Result<(), SearchError> {
        let mut fail_after = self.fail_after.lock().await;
        if let Some(remaining) = fail_after.as_mut() {
            if *remaining == 0 {
                return Err(SearchError::Write("connection reset by peer".into()));
            }
            *remaining -= 1;
        }
        drop(fail_after);
        self.frames.lock().await.push(frame);
        Ok(())
    }
}

// ============================================================================
// Static repo metadata
// ============================================================================

pub struct StaticRepoMetadata {
    entries: HashMap<RepoId, RepoMetadata>,
}

impl StaticRepoMetadata {
    pub fn new(entries: Vec<(RepoId, RepoMetadata)>) -> Arc<Self> {
        Arc::new(Self {
            entries: entries.into_iter().collect(),
        })
    }

    pub fn single(id: RepoId, name: &str) -> Arc<Self> {
        Self::new(vec![(id, RepoMetadata::named(name))])
    }

    pub fn empty() -> Arc<Self> {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl RepoMetadataSource for StaticRepoMetadata {
    async fn fetch(&self, ids: &[RepoId]) -> HashMap<RepoId, RepoMetadata> {
        ids.iter()
            .filter_map(|id| self.entries.get(id).map(|m| (*id, m.clone())))
            .collect()
    }
}

impl RepoNamer for StaticRepoMetadata {
    fn name(&self, id: RepoId) -> Option<String> {
        self.entries.get(&id).map(|m| m.name.to_string())
    }
}

// ============================================================================
// Fixture builders
// ============================================================================

pub fn repo(id: u32, name: &str) -> RepoRef {
    RepoRef::new(RepoId(id), name)
}

pub fn content_match(repo: RepoRef, path: &str, line: &str, at: usize, len: usize) -> Match {
    Match::File(FileMatch {
        chunks: vec![ChunkMatch {
            content: line.to_string(),
            content_start: Location::new(0, 0, 0),
            ranges: vec![Range::new(
                Location::new(at, 0, at as u32),
                Location::new(at + len, 0, (at + len) as u32),
            )],
        }],
        ..FileMatch::path_only(repo, path, "cafe")
    })
}

pub fn path_match(repo: RepoRef, path: &str) -> Match {
    Match::File(FileMatch::path_only(repo, path, "cafe"))
}

pub fn event(results: Vec<Match>) -> SearchEvent {
    SearchEvent::new(results, Stats::default())
}

pub fn event_with_stats(results: Vec<Match>, stats: Stats) -> SearchEvent {
    SearchEvent::new(results, stats)
}
