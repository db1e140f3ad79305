use async_trait::async_trait;
use fathom_domain::SearchEvent;

/// Downstream of a result producer: accepts match batches until the
/// producer is finished.
#[async_trait]
pub trait SearchEventStream: Send + Sync {
    /// Deliver one batch. Never fails from the caller's point of view;
    /// transport problems surface through the request's cancellation
    /// token instead.
    async fn send(&self, event: SearchEvent);

    /// Signal that no further `send` calls follow and flush any buffered
    /// state. Callers invoke this exactly once.
    async fn done(&self);
}
