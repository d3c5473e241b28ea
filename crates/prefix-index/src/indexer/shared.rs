//! Shared, generation-swapped index state.
//!
//! Readers clone the current `Arc<IndexGeneration>` under a read lock held
//! only for the clone, then work on that generation without any lock. A
//! rebuild constructs the next generation off to the side and swaps the
//! pointer under a write lock held only for the assignment, so a reader
//! sees either the old or the new generation in full.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard, RwLock};

use super::build::{IndexBuildProgress, IndexBuildState};
use crate::storage::NodeStore;

/// One immutable build of the index.
#[derive(Debug)]
pub struct IndexGeneration {
    /// Monotonic build number; 0 is the empty index before the first build.
    pub generation: u64,
    pub built_at: Option<DateTime<Utc>>,
    pub store: NodeStore,
}

impl IndexGeneration {
    pub fn empty() -> Self {
        Self {
            generation: 0,
            built_at: None,
            store: NodeStore::empty(),
        }
    }

    /// Number of complete names indexed.
    pub fn names(&self) -> usize {
        self.store.complete_names()
    }
}

/// Shared state for the prefix index.
#[derive(Debug)]
pub struct SharedPrefixIndex {
    current: RwLock<Arc<IndexGeneration>>,
    /// Current build state (atomic for lock-free reads).
    pub build_state: AtomicU8,
    pub build_progress: IndexBuildProgress,
    /// Last build error message.
    pub build_last_error: Mutex<Option<String>>,
    rebuild_lane: Mutex<()>,
    last_generation: AtomicU64,
}

impl Default for SharedPrefixIndex {
    fn default() -> Self {
        Self {
            current: RwLock::new(Arc::new(IndexGeneration::empty())),
            build_state: AtomicU8::new(IndexBuildState::Idle as u8),
            build_progress: IndexBuildProgress::default(),
            build_last_error: Mutex::new(None),
            rebuild_lane: Mutex::new(()),
            last_generation: AtomicU64::new(0),
        }
    }
}

impl SharedPrefixIndex {
    /// Returns the generation currently serving reads.
    pub fn snapshot(&self) -> Arc<IndexGeneration> {
        self.current.read().clone()
    }

    /// Claims the rebuild lane, or `None` if a rebuild already holds it.
    pub fn try_rebuild_lane(&self) -> Option<MutexGuard<'_, ()>> {
        self.rebuild_lane.try_lock()
    }

    /// Publishes `store` as the next generation and returns it.
    ///
    /// Callers must hold the rebuild lane.
    pub fn install(&self, store: NodeStore) -> Arc<IndexGeneration> {
        let generation = Arc::new(IndexGeneration {
            generation: self.last_generation.fetch_add(1, Ordering::SeqCst) + 1,
            built_at: Some(Utc::now()),
            store,
        });
        let previous = std::mem::replace(&mut *self.current.write(), generation.clone());
        // Freeing the old store happens outside the write lock.
        drop(previous);
        generation
    }

    pub fn state(&self) -> IndexBuildState {
        IndexBuildState::load(&self.build_state)
    }

    pub fn last_error(&self) -> Option<String> {
        self.build_last_error.lock().clone()
    }
}
