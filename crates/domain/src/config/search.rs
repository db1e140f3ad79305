use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Directories whose immediate subdirectories are served as
    /// repositories.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Files larger than this are skipped by the content searcher.
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Default hard result limit when the query carries no `count:`.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: u64,
}

fn default_max_file_size_bytes() -> u64 {
    1024 * 1024
}

fn default_max_search_results() -> u64 {
    500
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            max_file_size_bytes: default_max_file_size_bytes(),
            max_search_results: default_max_search_results(),
        }
    }
}
