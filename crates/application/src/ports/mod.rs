pub mod event_sink;
pub mod event_stream;
pub mod query_planner;
pub mod repo_metadata;
pub mod search_executor;
pub mod settings;

pub use event_sink::{EventSink, Frame};
pub use event_stream::SearchEventStream;
pub use query_planner::{PlanRequest, QueryPlanner};
pub use repo_metadata::{RepoMetadataSource, RepoNamer};
pub use search_executor::SearchExecutor;
pub use settings::SettingsProvider;
