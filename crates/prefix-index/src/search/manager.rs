//! PrefixIndexManager - main API for the prefix index.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use super::engine::{fetch_subtree, list_prefix_names, search_prefixes};
use super::results::{IndexStatus, PrefixNamesResult, SearchResults, SubtreeResult};
use crate::config::IndexConfig;
use crate::error::{RebuildError, Result};
use crate::indexer::{
    build_node_store, unix_now_secs, IndexBuildState, IndexGeneration, SharedPrefixIndex,
};
use crate::query::SubtreeRequest;
use crate::source::NameSource;
use crate::storage::NodeStore;
use crate::types::Gender;

/// Owns the serving index generation and answers queries against it.
///
/// Queries run concurrently and never block each other. A rebuild prepares
/// the next generation off to the side and swaps it in atomically; at most
/// one rebuild runs at a time.
pub struct PrefixIndexManager {
    source: Arc<dyn NameSource>,
    config: IndexConfig,
    shared: Arc<SharedPrefixIndex>,
}

impl std::fmt::Debug for PrefixIndexManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixIndexManager")
            .field("source", &"<name source>")
            .field("config", &self.config)
            .field("shared", &self.shared)
            .finish()
    }
}

impl PrefixIndexManager {
    /// Creates a manager serving an empty index until the first rebuild.
    pub fn new(source: Arc<dyn NameSource>, config: IndexConfig) -> Self {
        Self {
            source,
            config,
            shared: Arc::new(SharedPrefixIndex::default()),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Generation currently serving reads. Hold it to run several queries
    /// against one consistent build.
    pub fn snapshot(&self) -> Arc<IndexGeneration> {
        self.shared.snapshot()
    }

    /// Bounded subtree fetch with filters and highlighting.
    pub fn subtree(&self, request: &SubtreeRequest) -> Result<SubtreeResult> {
        let generation = self.snapshot();
        Ok(fetch_subtree(
            &generation,
            request,
            &self.config,
            self.source.as_ref(),
        ))
    }

    /// Complete names under `prefix` plus the prefix's statistics.
    pub fn prefix_names(
        &self,
        prefix: &str,
        limit: Option<usize>,
        gender: Option<Gender>,
        origin_country: Option<&str>,
    ) -> Result<PrefixNamesResult> {
        let generation = self.snapshot();
        list_prefix_names(
            &generation,
            prefix,
            limit,
            gender,
            origin_country,
            &self.config,
            self.source.as_ref(),
        )
    }

    /// Free-text prefix search.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<SearchResults> {
        let generation = self.snapshot();
        search_prefixes(
            &generation,
            query,
            limit,
            &self.config,
            self.source.as_ref(),
        )
    }

    /// Rebuilds the index from the current name source snapshot.
    ///
    /// Returns the node count of the new generation. On any failure the
    /// serving generation is left untouched.
    pub fn rebuild(&self) -> std::result::Result<usize, RebuildError> {
        let Some(_lane) = self.shared.try_rebuild_lane() else {
            return Err(RebuildError::InProgress);
        };

        let started = Instant::now();
        IndexBuildState::Building.store(&self.shared.build_state);
        self.shared.build_progress.reset_for_build(unix_now_secs());
        *self.shared.build_last_error.lock() = None;

        let outcome = self.build_next_store();
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(store) => {
                let generation = self.shared.install(store);
                self.shared
                    .build_progress
                    .record_finish(unix_now_secs(), duration_ms, true);
                IndexBuildState::Ready.store(&self.shared.build_state);
                log::info!(
                    "prefix index rebuilt generation={} nodes={} names={} duration_ms={}",
                    generation.generation,
                    generation.store.len(),
                    generation.names(),
                    duration_ms,
                );
                Ok(generation.store.len())
            }
            Err(error) => {
                self.shared
                    .build_progress
                    .record_finish(unix_now_secs(), duration_ms, false);
                *self.shared.build_last_error.lock() = Some(error.to_string());
                IndexBuildState::Error.store(&self.shared.build_state);
                log::warn!(
                    "prefix index rebuild failed after {duration_ms}ms, keeping generation {}: {error}",
                    self.shared.snapshot().generation,
                );
                Err(error)
            }
        }
    }

    fn build_next_store(&self) -> std::result::Result<NodeStore, RebuildError> {
        // Panics in the source or the builder surface as `RebuildError::Panicked`.
        let result = catch_unwind(AssertUnwindSafe(|| {
            let corpus = self.source.list_all().map_err(RebuildError::Source)?;
            build_node_store(corpus, &self.config).map_err(RebuildError::from)
        }));
        match result {
            Ok(result) => result,
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "build panicked".to_string()
                };
                Err(RebuildError::Panicked(panic_msg))
            }
        }
    }

    /// Current build state and serving generation summary.
    pub fn status(&self) -> IndexStatus {
        let generation = self.snapshot();
        let progress = self.shared.build_progress.snapshot();
        IndexStatus {
            state: self.shared.state().as_str().to_string(),
            generation: generation.generation,
            total_nodes: generation.store.len(),
            total_names: generation.names(),
            built_at: generation.built_at,
            started_at: progress.started_at,
            finished_at: progress.finished_at,
            last_duration_ms: progress.last_duration_ms,
            completed_builds: progress.completed_builds,
            failed_builds: progress.failed_builds,
            last_error: self.shared.last_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BuildError, SourceError};
    use crate::source::MemoryNameSource;
    use crate::types::{NameId, NameRecord};

    fn manager_with(records: Vec<NameRecord>) -> (PrefixIndexManager, Arc<MemoryNameSource>) {
        let source = Arc::new(MemoryNameSource::from_records(records));
        let manager = PrefixIndexManager::new(source.clone(), IndexConfig::default());
        (manager, source)
    }

    struct DownSource;

    impl NameSource for DownSource {
        fn list_all(&self) -> std::result::Result<Vec<NameRecord>, SourceError> {
            Err(SourceError::Unavailable("database offline".into()))
        }

        fn get_by_id(&self, _id: NameId) -> std::result::Result<Option<NameRecord>, SourceError> {
            Ok(None)
        }
    }

    struct PanickingSource;

    impl NameSource for PanickingSource {
        fn list_all(&self) -> std::result::Result<Vec<NameRecord>, SourceError> {
            panic!("corrupt page");
        }

        fn get_by_id(&self, _id: NameId) -> std::result::Result<Option<NameRecord>, SourceError> {
            Ok(None)
        }
    }

    #[test]
    fn serves_empty_index_before_first_rebuild() {
        let (manager, _) = manager_with(vec![NameRecord::new(1, "Ava", Gender::Female, 0.5)]);
        let status = manager.status();
        assert_eq!(status.state, "idle");
        assert_eq!(status.generation, 0);
        assert_eq!(status.total_nodes, 0);
        assert!(status.built_at.is_none());
        assert_eq!(manager.search("a", None).unwrap().total_results, 0);
    }

    #[test]
    fn rebuild_publishes_new_generation() {
        let (manager, _) = manager_with(vec![
            NameRecord::new(1, "Ava", Gender::Female, 0.5),
            NameRecord::new(2, "Abe", Gender::Male, 0.2),
        ]);
        assert_eq!(manager.rebuild().unwrap(), 5);

        let status = manager.status();
        assert_eq!(status.state, "ready");
        assert_eq!(status.generation, 1);
        assert_eq!(status.total_nodes, 5);
        assert_eq!(status.total_names, 2);
        assert_eq!(status.completed_builds, 1);
        assert!(status.last_duration_ms.is_some());
        assert!(status.built_at.is_some());
        assert!(status.last_error.is_none());
    }

    #[test]
    fn failed_rebuild_keeps_serving_generation() {
        let (manager, source) = manager_with(vec![NameRecord::new(1, "Ava", Gender::Female, 0.5)]);
        manager.rebuild().unwrap();
        source.insert(NameRecord::new(2, "AVA", Gender::Female, 0.1));

        let error = manager.rebuild().unwrap_err();
        assert!(matches!(
            error,
            RebuildError::Build(BuildError::DuplicateName { .. })
        ));

        let status = manager.status();
        assert_eq!(status.state, "error");
        assert_eq!(status.generation, 1);
        assert_eq!(status.total_nodes, 3);
        assert_eq!(status.failed_builds, 1);
        assert!(status.last_error.unwrap().contains("duplicate"));
        assert!(manager.prefix_names("av", None, None, None).is_ok());
    }

    #[test]
    fn empty_corpus_rebuild_fails() {
        let (manager, _) = manager_with(Vec::new());
        assert_eq!(
            manager.rebuild().unwrap_err(),
            RebuildError::Build(BuildError::EmptyCorpus)
        );
        assert_eq!(manager.snapshot().generation, 0);
    }

    #[test]
    fn source_failure_is_reported() {
        let manager = PrefixIndexManager::new(Arc::new(DownSource), IndexConfig::default());
        assert!(matches!(
            manager.rebuild(),
            Err(RebuildError::Source(SourceError::Unavailable(_)))
        ));
    }

    #[test]
    fn panic_during_rebuild_is_contained() {
        let manager = PrefixIndexManager::new(Arc::new(PanickingSource), IndexConfig::default());
        match manager.rebuild() {
            Err(RebuildError::Panicked(message)) => assert!(message.contains("corrupt page")),
            other => panic!("expected panic error, got {other:?}"),
        }
        assert_eq!(manager.status().state, "error");
        // The lane is released after a panic.
        assert!(matches!(manager.rebuild(), Err(RebuildError::Panicked(_))));
    }

    #[test]
    fn rebuild_while_in_progress_is_rejected() {
        let (manager, _) = manager_with(vec![NameRecord::new(1, "Ava", Gender::Female, 0.5)]);
        let lane = manager.shared.try_rebuild_lane();
        assert!(lane.is_some());
        assert_eq!(manager.rebuild().unwrap_err(), RebuildError::InProgress);
        drop(lane);
        assert!(manager.rebuild().is_ok());
    }
}
