use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cadences and buffer sizes of the streaming pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamingConfig {
    /// Cadence of match/filter flushes to the client.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Cadence of unconditional progress emissions; doubles as the
    /// connection keepalive.
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,

    /// Coalescing window of the batching stream in front of the event
    /// handler.
    #[serde(default = "default_batch_window_ms")]
    pub batch_window_ms: u64,

    /// Flush threshold of the serialized `matches` array buffer. Kept
    /// below common reader token limits so frames stay reassemblable.
    #[serde(default = "default_matches_buffer_bytes")]
    pub matches_buffer_bytes: usize,

    /// A single upstream batch at or above this many results bypasses the
    /// coalescing window and is delivered immediately.
    #[serde(default = "default_max_batched_results")]
    pub max_batched_results: usize,
}

fn default_flush_interval_ms() -> u64 {
    100
}

fn default_keepalive_interval_ms() -> u64 {
    5_000
}

fn default_batch_window_ms() -> u64 {
    50
}

fn default_matches_buffer_bytes() -> usize {
    32 * 1024
}

fn default_max_batched_results() -> usize {
    2_048
}

impl StreamingConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms)
    }

    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms)
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: default_flush_interval_ms(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
            batch_window_ms: default_batch_window_ms(),
            matches_buffer_bytes: default_matches_buffer_bytes(),
            max_batched_results: default_max_batched_results(),
        }
    }
}
