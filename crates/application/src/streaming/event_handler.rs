//! The central event multiplexer for one streaming request.

use super::convert::{convert_match, ConvertOptions};
use super::filters::FilterAggregator;
use super::progress::ProgressAggregator;
use super::wire::{ErrorBody, EVENT_ALERT, EVENT_DONE, EVENT_ERROR, EVENT_FILTERS, EVENT_PROGRESS};
use super::writer::EventWriter;
use crate::ports::{RepoMetadataSource, SearchEventStream};
use async_trait::async_trait;
use fathom_domain::{Alert, RepoId, RepoMetadata, SearchError, SearchEvent};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct EventHandlerConfig {
    pub flush_interval: Duration,
    pub keepalive_interval: Duration,
    /// Maximum number of match records delivered to the client.
    pub display_limit: u64,
    pub chunk_matches: bool,
}

/// Invoked once, with the elapsed time, when the first results reach the
/// wire.
pub type FirstResultsCallback = Box<dyn FnOnce(Duration) + Send>;

/// Serializes all stream events for one request.
///
/// One mutex guards every piece of mutable state: the writer and its
/// match buffer, both aggregators, the display budget, the first-results
/// flag and the done/terminated sentinels. Timer tasks re-acquire the
/// mutex and check the sentinels before doing any work, which closes the
/// race between a fired-but-not-yet-run tick and `done()`.
pub struct EventHandler {
    state: Mutex<HandlerState>,
    /// Cancels the two timer tasks. Cancelled under the state lock in
    /// `done()` so a late tick observes the sentinel instead of writing.
    timers: CancellationToken,
    /// The request token; cancelled by the handler when a write fails so
    /// upstream producers stop.
    cancel: CancellationToken,
}

struct HandlerState {
    writer: EventWriter,
    progress: ProgressAggregator,
    filters: FilterAggregator,
    filters_emitted_revision: u64,
    progress_dirty: bool,
    display_remaining: i64,
    first_results_sent: bool,
    on_first_results: Option<FirstResultsCallback>,
    metadata: Arc<dyn RepoMetadataSource>,
    repo_cache: HashMap<RepoId, RepoMetadata>,
    convert: ConvertOptions,
    started: Instant,
    done: bool,
    /// Terminal: an `error` event went out or a write failed. Nothing is
    /// emitted past this point.
    terminated: bool,
    write_error: Option<SearchError>,
}

impl EventHandler {
    /// Create the handler and start its flush and keepalive timers.
    pub fn start(
        writer: EventWriter,
        progress: ProgressAggregator,
        metadata: Arc<dyn RepoMetadataSource>,
        config: EventHandlerConfig,
        cancel: CancellationToken,
        on_first_results: Option<FirstResultsCallback>,
    ) -> Arc<Self> {
        let handler = Arc::new(Self {
            state: Mutex::new(HandlerState {
                writer,
                progress,
                filters: FilterAggregator::new(),
                filters_emitted_revision: 0,
                progress_dirty: false,
                display_remaining: config.display_limit as i64,
                first_results_sent: false,
                on_first_results,
                metadata,
                repo_cache: HashMap::new(),
                convert: ConvertOptions {
                    chunk_matches: config.chunk_matches,
                },
                started: Instant::now(),
                done: false,
                terminated: false,
                write_error: None,
            }),
            timers: CancellationToken::new(),
            cancel,
        });
        handler.spawn_flush_timer(config.flush_interval);
        handler.spawn_keepalive_timer(config.keepalive_interval);
        handler
    }

    /// Deliver one batch. All work happens synchronously under the
    /// handler mutex; a blocked transport write holds the lock and is the
    /// intended backpressure path.
    pub async fn send(&self, event: SearchEvent) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.done || state.terminated {
            return;
        }

        state.progress.update(&event);
        state.progress_dirty = true;
        state.filters.update(&event.results);

        // display budget: truncate mid-batch, keep the accounting exact
        let budget = state.display_remaining.max(0) as usize;
        let take = event.results.len().min(budget);
        state.display_remaining -= take as i64;
        if take == 0 {
            return;
        }
        let results = &event.results[..take];

        // one metadata call per batch, for repos not already cached
        let mut missing: Vec<RepoId> = Vec::new();
        for m in results {
            if let Some(id) = m.repo_id() {
                if !state.repo_cache.contains_key(&id) && !missing.contains(&id) {
                    missing.push(id);
                }
            }
        }
        if !missing.is_empty() {
            let fetched = state.metadata.fetch(&missing).await;
            state.repo_cache.extend(fetched);
        }

        let mut delivered = false;
        for m in results {
            let meta = match m.repo_id() {
                Some(id) => match state.repo_cache.get(&id) {
                    None => {
                        debug!(repo = %id, "dropping match for unknown repository");
                        continue;
                    }
                    Some(meta) => {
                        if m.repo_name() != Some(meta.name.as_ref()) {
                            debug!(repo = %id, "dropping match with stale repository name");
                            continue;
                        }
                        Some(meta)
                    }
                },
                None => None,
            };
            match convert_match(m, meta, state.convert) {
                Ok(record) => {
                    if let Err(e) = state.writer.push_match(&record).await {
                        self.fail(state, e);
                        return;
                    }
                    delivered = true;
                }
                Err(e) => warn!(error = %e, "dropping match that failed conversion"),
            }
        }

        if delivered && !state.first_results_sent {
            state.first_results_sent = true;
            if let Err(e) = state.emit_filters(false).await {
                self.fail(state, e);
                return;
            }
            if let Err(e) = state.writer.flush_matches().await {
                self.fail(state, e);
                return;
            }
            if let Some(cb) = state.on_first_results.take() {
                cb(state.started.elapsed());
            }
        }
    }

    /// Emit an `alert` event. At most one alert is sent per request; the
    /// caller owns that contract.
    pub async fn alert(&self, alert: &Alert) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.done || state.terminated {
            return;
        }
        if let Err(e) = state.writer.event(EVENT_ALERT, alert).await {
            self.fail(state, e);
        }
    }

    /// Emit a terminal `error` event. No further events follow, `done`
    /// included.
    pub async fn error(&self, err: &SearchError) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.done || state.terminated {
            return;
        }
        state.terminated = true;
        self.timers.cancel();
        let body = ErrorBody {
            message: err.to_string(),
        };
        if let Err(e) = state.writer.event(EVENT_ERROR, &body).await {
            state.record_write_failure(e);
            self.cancel.cancel();
        }
    }

    /// Finish the stream: stop the timers, then emit the deterministic
    /// tail: final `filters`, final `matches` flush, final `progress`
    /// with `done=true`, and the empty `done` marker. Calling `done()` on
    /// an already-done handler is a no-op.
    pub async fn done(&self) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.done {
            return;
        }
        state.done = true;
        self.timers.cancel();
        if state.terminated {
            return;
        }

        if let Err(e) = state.emit_filters(true).await {
            self.fail(state, e);
            return;
        }
        if let Err(e) = state.writer.flush_matches().await {
            self.fail(state, e);
            return;
        }
        let progress = state.progress.finalize();
        if let Err(e) = state.writer.event(EVENT_PROGRESS, &progress).await {
            self.fail(state, e);
            return;
        }
        if let Err(e) = state.writer.event(EVENT_DONE, &serde_json::json!({})).await {
            self.fail(state, e);
        }
    }

    /// Total matches the backends produced, display truncation included.
    pub async fn observed_match_count(&self) -> u64 {
        self.state.lock().await.progress.match_count()
    }

    /// The first write failure, when one occurred.
    pub async fn write_failure(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .write_error
            .as_ref()
            .map(|e| e.to_string())
    }

    fn fail(&self, state: &mut HandlerState, err: SearchError) {
        state.record_write_failure(err);
        self.timers.cancel();
        self.cancel.cancel();
    }

    fn spawn_flush_timer(self: &Arc<Self>, period: Duration) {
        let handler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = handler.timers.cancelled() => break,
                    _ = interval.tick() => {
                        let mut state = handler.state.lock().await;
                        if state.done || state.terminated {
                            break;
                        }
                        if let Err(e) = state.flush_pending().await {
                            handler.fail(&mut state, e);
                            break;
                        }
                    }
                }
            }
        });
    }

    fn spawn_keepalive_timer(self: &Arc<Self>, period: Duration) {
        let handler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = handler.timers.cancelled() => break,
                    _ = interval.tick() => {
                        let mut state = handler.state.lock().await;
                        if state.done || state.terminated {
                            break;
                        }
                        // unconditional: this doubles as the keepalive
                        if let Err(e) = state.emit_progress(true).await {
                            handler.fail(&mut state, e);
                            break;
                        }
                    }
                }
            }
        });
    }
}

impl HandlerState {
    async fn emit_filters(&mut self, exhaustive: bool) -> Result<(), SearchError> {
        if self.filters.is_empty() {
            return Ok(());
        }
        if !exhaustive && self.filters.revision() == self.filters_emitted_revision {
            return Ok(());
        }
        let snapshot = self.filters.compute(exhaustive);
        self.writer.event(EVENT_FILTERS, &snapshot).await?;
        self.filters_emitted_revision = self.filters.revision();
        Ok(())
    }

    async fn emit_progress(&mut self, force: bool) -> Result<(), SearchError> {
        if !force && !self.progress_dirty {
            return Ok(());
        }
        let progress = self.progress.current();
        self.writer.event(EVENT_PROGRESS, &progress).await?;
        self.progress_dirty = false;
        Ok(())
    }

    /// One flush tick: filters when changed, buffered matches, progress
    /// when dirty.
    async fn flush_pending(&mut self) -> Result<(), SearchError> {
        self.emit_filters(false).await?;
        self.writer.flush_matches().await?;
        self.emit_progress(false).await
    }

    fn record_write_failure(&mut self, err: SearchError) {
        if self.write_error.is_none() {
            warn!(error = %err, "stream write failed; entering terminal state");
            self.write_error = Some(err);
        }
        self.terminated = true;
    }
}

#[async_trait]
impl SearchEventStream for EventHandler {
    async fn send(&self, event: SearchEvent) {
        EventHandler::send(self, event).await;
    }

    async fn done(&self) {
        EventHandler::done(self).await;
    }
}
