//! `GET /search/stream`: the streaming search endpoint.

use crate::dto::{StreamParams, StreamQuery};
use crate::sse::{sse_response, SseEventSink};
use crate::state::AppState;
use crate::utils::request_source;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use fathom_application::ports::{PlanRequest, SearchEventStream};
use fathom_application::streaming::{
    BatchingStream, EventHandler, EventHandlerConfig, EventWriter, ProgressAggregator,
};
use fathom_domain::{Alert, QueryError, SearchError, SearchInputs};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

#[instrument(skip_all, name = "search_stream")]
pub async fn search_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<StreamParams>,
) -> Response {
    let parsed = match params.parse() {
        Ok(parsed) => parsed,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };
    let source = request_source::classify(
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
    );

    let settings = state.settings.current().await;
    let plan = state.planner.plan(&PlanRequest {
        query: &parsed.query,
        version: &parsed.version,
        pattern_type: parsed.pattern_type,
        search_mode: parsed.search_mode,
        settings: &settings,
    });
    let plan = match plan {
        Ok(inputs) => Ok(inputs),
        // a query error still streams: it becomes an alert, then done
        Err(SearchError::Query(qe)) => Err(qe),
        Err(e) => {
            error!(error = %e, query = %parsed.query, "query planning failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to plan query").into_response();
        }
    };

    let (sink, rx) = SseEventSink::channel();
    tokio::spawn(drive_search(state, Arc::new(sink), parsed, plan, source));
    sse_response(rx)
}

/// Run the search against the streaming pipeline and finish the stream on
/// every exit path, so nothing spawned below can write to a released
/// response.
async fn drive_search(
    state: AppState,
    sink: Arc<SseEventSink>,
    parsed: StreamQuery,
    plan: Result<SearchInputs, QueryError>,
    source: String,
) {
    let started = Instant::now();
    let cancel = CancellationToken::new();

    let (limit, display_limit) = match &plan {
        Ok(inputs) => (inputs.max_results, effective_display(&parsed, inputs)),
        Err(_) => (0, 0),
    };

    let writer = EventWriter::new(sink, state.streaming.matches_buffer_bytes);
    let progress = ProgressAggregator::new(limit, display_limit, Arc::clone(&state.repo_namer));
    let metrics = Arc::clone(&state.metrics);
    let metric_source = source.clone();
    let handler = EventHandler::start(
        writer,
        progress,
        Arc::clone(&state.repo_metadata),
        EventHandlerConfig {
            flush_interval: state.streaming.flush_interval(),
            keepalive_interval: state.streaming.keepalive_interval(),
            display_limit,
            chunk_matches: parsed.chunk_matches,
        },
        cancel.clone(),
        Some(Box::new(move |elapsed| {
            metrics.observe_first_result(&metric_source, elapsed);
        })),
    );

    let mut alert: Option<Alert> = None;
    let mut terminal_error: Option<SearchError> = None;
    let mut canceled = false;

    match plan {
        Ok(inputs) => {
            let batching: Arc<dyn SearchEventStream> = BatchingStream::new(
                handler.clone(),
                state.streaming.batch_window(),
                state.streaming.max_batched_results,
            );
            let result = state
                .executor
                .execute(Arc::clone(&batching), &inputs, cancel.clone())
                .await;
            batching.done().await;
            match result {
                Ok(found_alert) => alert = found_alert,
                Err(e) if e.is_canceled() => canceled = true,
                Err(e) => terminal_error = Some(e),
            }
        }
        Err(qe) => {
            alert = Some(Alert {
                title: "Unable to process query".to_string(),
                description: Some(qe.message.clone()),
                kind: Some("query-error".to_string()),
                proposed_queries: qe.proposed_queries,
            });
        }
    }

    if let Some(alert) = &alert {
        handler.alert(alert).await;
    }
    if let Some(err) = &terminal_error {
        handler.error(err).await;
    }
    handler.done().await;

    let match_count = handler.observed_match_count().await;
    let write_error = handler.write_failure().await;
    let status = if terminal_error.is_some() {
        "error"
    } else if canceled || write_error.is_some() {
        "canceled"
    } else if alert.is_some() {
        "alert"
    } else {
        "success"
    };
    state.metrics.record_request(&source, status);
    info!(
        query = %parsed.query,
        source = %source,
        status,
        duration_ms = started.elapsed().as_millis() as u64,
        match_count,
        error = terminal_error.as_ref().map(|e| e.to_string()),
        write_error,
        alert = alert.as_ref().map(|a| a.title.as_str()),
        "search stream finished"
    );
}

/// `display` clamped to the hard limit; negative means "send everything
/// up to the hard limit".
fn effective_display(parsed: &StreamQuery, inputs: &SearchInputs) -> u64 {
    if parsed.display < 0 {
        inputs.max_results
    } else {
        (parsed.display as u64).min(inputs.max_results)
    }
}
