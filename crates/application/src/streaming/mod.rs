//! The streaming event pipeline.
//!
//! Batches of matches enter through [`BatchingStream`], funnel into the
//! mutex-guarded [`EventHandler`], and leave as typed frames through the
//! [`EventWriter`] adapter over the transport sink. Aggregators keep the
//! running `progress` and `filters` pictures; conversion turns each match
//! into exactly one wire record.

pub mod batching;
pub mod convert;
pub mod event_handler;
pub mod filters;
pub mod progress;
pub mod wire;
pub mod writer;

pub use batching::BatchingStream;
pub use convert::{convert_match, ConvertOptions};
pub use event_handler::{EventHandler, EventHandlerConfig};
pub use filters::FilterAggregator;
pub use progress::ProgressAggregator;
pub use wire::MatchRecord;
pub use writer::EventWriter;
