use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Streaming request metrics.
///
/// Thread-safe via atomics and per-key maps; observed through the app
/// state so the streaming core itself stays free of metric concerns.
#[derive(Default)]
pub struct StreamingMetrics {
    total_requests: AtomicU64,

    /// Requests by `(source, status)`.
    requests: DashMap<(String, &'static str), u64>,

    /// First-result latency sums by request source.
    first_result: DashMap<String, LatencyAgg>,
}

#[derive(Default)]
struct LatencyAgg {
    count: u64,
    total_us: u64,
}

impl StreamingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, source: &str, status: &'static str) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        *self
            .requests
            .entry((source.to_string(), status))
            .or_insert(0) += 1;
    }

    pub fn observe_first_result(&self, source: &str, elapsed: Duration) {
        let mut agg = self.first_result.entry(source.to_string()).or_default();
        agg.count += 1;
        agg.total_us += elapsed.as_micros() as u64;
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn requests_for(&self, source: &str, status: &'static str) -> u64 {
        self.requests
            .get(&(source.to_string(), status))
            .map(|v| *v)
            .unwrap_or(0)
    }

    pub fn first_result_count(&self, source: &str) -> u64 {
        self.first_result.get(source).map(|a| a.count).unwrap_or(0)
    }

    pub fn avg_first_result_ms(&self, source: &str) -> f64 {
        match self.first_result.get(source) {
            Some(agg) if agg.count > 0 => agg.total_us as f64 / agg.count as f64 / 1000.0,
            _ => 0.0,
        }
    }
}
