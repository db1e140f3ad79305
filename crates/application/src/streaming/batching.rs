//! Upstream batch coalescing.

use crate::ports::SearchEventStream;
use async_trait::async_trait;
use fathom_domain::SearchEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Coalesces upstream events within a small window before handing them to
/// the downstream stream, amortizing the handler lock and per-flush cost.
///
/// The window starts at the first event of a cycle, so a steady stream
/// still flushes once per window instead of starving. A single batch at
/// or above `max_results` bypasses the window entirely.
pub struct BatchingStream {
    inner: Arc<dyn SearchEventStream>,
    window: Duration,
    max_results: usize,
    state: Arc<Mutex<BatchState>>,
}

struct BatchState {
    pending: Option<SearchEvent>,
    /// Bumped on every flush; a window timer only delivers when the
    /// generation it was armed with is still current.
    generation: u64,
    done: bool,
}

impl BatchingStream {
    pub fn new(
        inner: Arc<dyn SearchEventStream>,
        window: Duration,
        max_results: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner,
            window,
            max_results,
            state: Arc::new(Mutex::new(BatchState {
                pending: None,
                generation: 0,
                done: false,
            })),
        })
    }

    fn arm_window(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let inner = Arc::clone(&self.inner);
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let batch = {
                let mut state = state.lock().await;
                if state.generation != generation || state.done {
                    return;
                }
                state.generation += 1;
                state.pending.take()
            };
            if let Some(batch) = batch {
                inner.send(batch).await;
            }
        });
    }
}

#[async_trait]
impl SearchEventStream for BatchingStream {
    async fn send(&self, event: SearchEvent) {
        let to_deliver = {
            let mut state = self.state.lock().await;
            if state.done {
                // contract violation by the caller; deliver rather than lose
                Some(event)
            } else {
                match state.pending.take() {
                    Some(mut pending) => {
                        pending.merge(event);
                        state.pending = Some(pending);
                    }
                    None => {
                        state.pending = Some(event);
                        self.arm_window(state.generation);
                    }
                }
                let oversized = state
                    .pending
                    .as_ref()
                    .is_some_and(|p| p.results.len() >= self.max_results);
                if oversized {
                    state.generation += 1;
                    state.pending.take()
                } else {
                    None
                }
            }
        };
        if let Some(batch) = to_deliver {
            self.inner.send(batch).await;
        }
    }

    /// Deliver anything still buffered, synchronously. Does not forward
    /// `done` to the downstream stream; its lifecycle belongs to the
    /// request handler.
    async fn done(&self) {
        let batch = {
            let mut state = self.state.lock().await;
            state.done = true;
            state.generation += 1;
            state.pending.take()
        };
        if let Some(batch) = batch {
            self.inner.send(batch).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_domain::{FileMatch, Match, RepoId, RepoRef, Stats};
    use tokio::sync::Mutex as TokioMutex;

    struct Recorder {
        batches: TokioMutex<Vec<SearchEvent>>,
    }

    #[async_trait]
    impl SearchEventStream for Recorder {
        async fn send(&self, event: SearchEvent) {
            self.batches.lock().await.push(event);
        }

        async fn done(&self) {}
    }

    fn one_match(path: &str) -> Match {
        Match::File(FileMatch::path_only(
            RepoRef::new(RepoId(1), "acme/widgets"),
            path,
            "cafe",
        ))
    }

    fn event_with(paths: &[&str]) -> SearchEvent {
        SearchEvent::new(paths.iter().map(|p| one_match(p)).collect(), Stats::default())
    }

    #[tokio::test(start_paused = true)]
    async fn coalesces_within_the_window() {
        let recorder = Arc::new(Recorder {
            batches: TokioMutex::new(Vec::new()),
        });
        let stream = BatchingStream::new(recorder.clone(), Duration::from_millis(50), 2_048);

        stream.send(event_with(&["a.rs"])).await;
        stream.send(event_with(&["b.rs"])).await;
        assert!(recorder.batches.lock().await.is_empty());

        tokio::time::sleep(Duration::from_millis(60)).await;
        let batches = recorder.batches.lock().await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].results.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn window_is_anchored_at_the_first_event() {
        let recorder = Arc::new(Recorder {
            batches: TokioMutex::new(Vec::new()),
        });
        let stream = BatchingStream::new(recorder.clone(), Duration::from_millis(50), 2_048);

        // a steady drip must still flush one window after the first event
        stream.send(event_with(&["a.rs"])).await;
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            stream.send(event_with(&["b.rs"])).await;
        }
        let batches = recorder.batches.lock().await;
        assert!(!batches.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_batch_bypasses_the_window() {
        let recorder = Arc::new(Recorder {
            batches: TokioMutex::new(Vec::new()),
        });
        let stream = BatchingStream::new(recorder.clone(), Duration::from_millis(50), 3);

        stream.send(event_with(&["a.rs", "b.rs", "c.rs"])).await;
        let batches = recorder.batches.lock().await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].results.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn done_flushes_synchronously_and_disarms_the_timer() {
        let recorder = Arc::new(Recorder {
            batches: TokioMutex::new(Vec::new()),
        });
        let stream = BatchingStream::new(recorder.clone(), Duration::from_millis(50), 2_048);

        stream.send(event_with(&["a.rs"])).await;
        stream.done().await;
        assert_eq!(recorder.batches.lock().await.len(), 1);

        // the armed window fires later and must not double-deliver
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(recorder.batches.lock().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stats_merge_across_coalesced_events() {
        let recorder = Arc::new(Recorder {
            batches: TokioMutex::new(Vec::new()),
        });
        let stream = BatchingStream::new(recorder.clone(), Duration::from_millis(50), 2_048);

        let mut first = event_with(&[]);
        first.stats.repos_searched = 1;
        let mut second = event_with(&[]);
        second.stats.repos_searched = 2;
        second.stats.limit_hit = true;

        stream.send(first).await;
        stream.send(second).await;
        stream.done().await;

        let batches = recorder.batches.lock().await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].stats.repos_searched, 3);
        assert!(batches[0].stats.limit_hit);
    }
}
