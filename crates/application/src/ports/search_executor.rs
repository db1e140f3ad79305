use super::event_stream::SearchEventStream;
use async_trait::async_trait;
use fathom_domain::{Alert, SearchError, SearchInputs};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The search backend driver. Owns deadline semantics; the streaming core
/// only observes cancellation.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Run the search, emitting batches into `stream` as they are
    /// produced. Must stop promptly once `cancel` fires. May return an
    /// alert for the user even on success.
    async fn execute(
        &self,
        stream: Arc<dyn SearchEventStream>,
        inputs: &SearchInputs,
        cancel: CancellationToken,
    ) -> Result<Option<Alert>, SearchError>;
}
