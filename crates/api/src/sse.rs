//! SSE transport: the event-sink implementation and response assembly.

use async_trait::async_trait;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use fathom_application::ports::{EventSink, Frame};
use fathom_domain::SearchError;
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::mpsc;

/// Frames buffered between the pipeline and the HTTP body. Kept small:
/// a slow client should push back into the handler lock, not into an
/// unbounded queue.
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Event-sink half of the SSE channel. A failed send means the response
/// stream (and so the client) is gone; the pipeline treats that as its
/// terminal write error.
pub struct SseEventSink {
    tx: mpsc::Sender<Event>,
}

impl SseEventSink {
    pub fn channel() -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for SseEventSink {
    async fn write(&self, frame: Frame) -> Result<(), SearchError> {
        let event = Event::default().event(frame.name).data(frame.data);
        self.tx
            .send(event)
            .await
            .map_err(|_| SearchError::Write("client disconnected".to_string()))
    }
}

/// Build the streaming response from the receiving half of the channel.
/// Headers are flushed as soon as axum returns the response.
pub fn sse_response(rx: mpsc::Receiver<Event>) -> Response {
    let stream = event_stream(rx);
    let mut response = Sse::new(stream).into_response();
    response.headers_mut().insert(
        axum::http::header::CACHE_CONTROL,
        axum::http::HeaderValue::from_static("no-store"),
    );
    response
}

fn event_stream(rx: mpsc::Receiver<Event>) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok(event), rx))
    })
}
