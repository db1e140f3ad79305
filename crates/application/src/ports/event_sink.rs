use async_trait::async_trait;
use fathom_domain::SearchError;

/// One framed server-push event, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub name: &'static str,
    pub data: String,
}

impl Frame {
    pub fn new(name: &'static str, data: impl Into<String>) -> Self {
        Self {
            name,
            data: data.into(),
        }
    }
}

/// The transport the streaming pipeline writes to.
///
/// There is exactly one writer per response; implementations may assume
/// calls are serialized. A blocking `write` is the pipeline's backpressure
/// point: while it waits, the handler lock stays held and upstream
/// producers queue up behind it.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn write(&self, frame: Frame) -> Result<(), SearchError>;
}
