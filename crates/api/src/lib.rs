pub mod dto;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod sse;
pub mod state;
pub mod utils;

pub use metrics::StreamingMetrics;
pub use routes::create_api_routes;
pub use state::AppState;
