//! Filesystem-backed repository store.
//!
//! Each immediate subdirectory of a configured root is served as a
//! repository. Discovery happens once at startup; ids are the stable
//! discovery order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fathom_application::ports::{RepoMetadataSource, RepoNamer};
use fathom_domain::{RepoId, RepoMetadata, SearchError};
use regex::RegexBuilder;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct StoredRepo {
    pub id: RepoId,
    pub name: Arc<str>,
    pub path: PathBuf,
    pub metadata: RepoMetadata,
}

pub struct FilesystemRepoStore {
    repos: Vec<StoredRepo>,
    by_id: HashMap<RepoId, usize>,
}

impl FilesystemRepoStore {
    /// Walk the roots and register every immediate subdirectory.
    pub fn discover(roots: &[PathBuf]) -> std::io::Result<Self> {
        let mut repos = Vec::new();
        for root in roots {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(root)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            entries.sort();
            for path in entries {
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    warn!(path = %path.display(), "skipping repository with non-UTF-8 name");
                    continue;
                };
                if name.starts_with('.') {
                    continue;
                }
                let id = RepoId(repos.len() as u32 + 1);
                let metadata = RepoMetadata {
                    name: name.into(),
                    stars: 0,
                    last_fetched: dir_mtime(&path),
                    description: read_description(&path),
                    fork: false,
                    archived: false,
                    private: false,
                    key_value_pairs: HashMap::new(),
                };
                debug!(repo = name, id = %id, "registered repository");
                repos.push(StoredRepo {
                    id,
                    name: name.into(),
                    path,
                    metadata,
                });
            }
        }
        info!(count = repos.len(), "repository discovery finished");
        let by_id = repos.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        Ok(Self { repos, by_id })
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn get(&self, id: RepoId) -> Option<&StoredRepo> {
        self.by_id.get(&id).map(|i| &self.repos[*i])
    }

    /// Repositories whose name passes the include/exclude filters. The
    /// filter patterns were validated at plan time; matching is
    /// case-insensitive like the rest of the query language.
    pub fn select(
        &self,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<&StoredRepo>, SearchError> {
        let include = compile_all(include)?;
        let exclude = compile_all(exclude)?;
        Ok(self
            .repos
            .iter()
            .filter(|r| include.iter().all(|re| re.is_match(&r.name)))
            .filter(|r| !exclude.iter().any(|re| re.is_match(&r.name)))
            .collect())
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<regex::Regex>, SearchError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| SearchError::Backend(format!("repo filter {p:?}: {e}")))
        })
        .collect()
}

fn dir_mtime(path: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// First non-empty line of a README, when the repository has one.
fn read_description(path: &Path) -> Option<String> {
    for candidate in ["README.md", "README", "README.txt"] {
        let Ok(file) = std::fs::File::open(path.join(candidate)) else {
            continue;
        };
        for line in BufReader::new(file).lines().map_while(Result::ok) {
            let line = line.trim_start_matches(['#', ' ']).trim();
            if !line.is_empty() {
                return Some(line.to_string());
            }
        }
    }
    None
}

#[async_trait]
impl RepoMetadataSource for FilesystemRepoStore {
    async fn fetch(&self, ids: &[RepoId]) -> HashMap<RepoId, RepoMetadata> {
        ids.iter()
            .filter_map(|id| self.get(*id).map(|r| (*id, r.metadata.clone())))
            .collect()
    }
}

impl RepoNamer for FilesystemRepoStore {
    fn name(&self, id: RepoId) -> Option<String> {
        self.get(id).map(|r| r.name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, FilesystemRepoStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, readme) in [
            ("gadgets", None),
            ("widgets", Some("# Widgets\n\nA widget factory.\n")),
            (".hidden", None),
        ] {
            let repo = dir.path().join(name);
            std::fs::create_dir(&repo).unwrap();
            if let Some(content) = readme {
                std::fs::write(repo.join("README.md"), content).unwrap();
            }
        }
        let store = FilesystemRepoStore::discover(&[dir.path().to_path_buf()]).unwrap();
        (dir, store)
    }

    #[test]
    fn discovery_skips_hidden_and_orders_by_name() {
        let (_dir, store) = fixture();
        assert_eq!(store.len(), 2);
        assert_eq!(store.name(RepoId(1)).as_deref(), Some("gadgets"));
        assert_eq!(store.name(RepoId(2)).as_deref(), Some("widgets"));
    }

    #[test]
    fn description_comes_from_the_readme() {
        let (_dir, store) = fixture();
        let widgets = store.get(RepoId(2)).unwrap();
        assert_eq!(widgets.metadata.description.as_deref(), Some("Widgets"));
        assert!(store.get(RepoId(1)).unwrap().metadata.description.is_none());
    }

    #[test]
    fn select_applies_include_and_exclude() {
        let (_dir, store) = fixture();
        let all = store.select(&[], &[]).unwrap();
        assert_eq!(all.len(), 2);

        let widgets = store.select(&["WID".to_string()], &[]).unwrap();
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].name.as_ref(), "widgets");

        let none = store
            .select(&["widgets".to_string()], &["wid".to_string()])
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn metadata_fetch_returns_only_known_ids() {
        let (_dir, store) = fixture();
        let map = store.fetch(&[RepoId(1), RepoId(99)]).await;
        assert_eq!(map.len(), 1);
        assert_eq!(map[&RepoId(1)].name.as_ref(), "gadgets");
    }
}
