//! Buffered event framing over the transport sink.

use super::wire::{MatchRecord, EVENT_MATCHES};
use crate::ports::{EventSink, Frame};
use fathom_domain::SearchError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;

/// Serializes events for one response.
///
/// Typed single events go straight to the sink. Match records accumulate
/// in a comma-separated JSON array buffer that flushes when it would grow
/// past `flush_threshold` bytes or when asked to, keeping individual
/// `matches` frames below the reader's maximum token size.
pub struct EventWriter {
    sink: Arc<dyn EventSink>,
    buf: String,
    buffered: usize,
    flush_threshold: usize,
}

impl EventWriter {
    pub fn new(sink: Arc<dyn EventSink>, flush_threshold: usize) -> Self {
        Self {
            sink,
            buf: String::new(),
            buffered: 0,
            flush_threshold,
        }
    }

    /// Write one typed event.
    pub async fn event<T: Serialize + ?Sized>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), SearchError> {
        let data =
            serde_json::to_string(value).map_err(|e| SearchError::Conversion(e.to_string()))?;
        self.write_frame(name, data).await
    }

    /// Append one match record to the array buffer, flushing first when
    /// the buffer would outgrow the threshold.
    pub async fn push_match(&mut self, record: &MatchRecord) -> Result<(), SearchError> {
        let json =
            serde_json::to_string(record).map_err(|e| SearchError::Conversion(e.to_string()))?;
        if !self.buf.is_empty() && self.buf.len() + json.len() + 1 > self.flush_threshold {
            self.flush_matches().await?;
        }
        if !self.buf.is_empty() {
            self.buf.push(',');
        }
        self.buf.push_str(&json);
        self.buffered += 1;
        Ok(())
    }

    /// Emit one `matches` frame with everything buffered. No-op when the
    /// buffer is empty.
    pub async fn flush_matches(&mut self) -> Result<(), SearchError> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let mut payload = String::with_capacity(self.buf.len() + 2);
        payload.push('[');
        payload.push_str(&self.buf);
        payload.push(']');
        self.buf.clear();
        self.buffered = 0;
        self.write_frame(EVENT_MATCHES, payload).await
    }

    pub fn buffered_matches(&self) -> usize {
        self.buffered
    }

    async fn write_frame(&self, name: &'static str, data: String) -> Result<(), SearchError> {
        let started = Instant::now();
        let bytes = data.len();
        let result = self.sink.write(Frame { name, data }).await;
        match &result {
            Ok(()) => trace!(
                event = name,
                bytes,
                duration_us = started.elapsed().as_micros() as u64,
                "stream event written"
            ),
            Err(e) => trace!(
                event = name,
                bytes,
                duration_us = started.elapsed().as_micros() as u64,
                error = %e,
                "stream event write failed"
            ),
        }
        result
    }
}
