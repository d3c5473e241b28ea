//! Materialized prefix aggregation index over a corpus of names.
//!
//! This crate provides:
//! - An ordered, invariant-checked builder producing one node per prefix
//!   with descendant aggregates (counts, gender mix, origins, popularity)
//! - A flat node store with lexical and per-depth range scans
//! - Subtree filters, highlighting and bounded-depth tree reconstruction
//! - A query façade with atomic, generation-swapped full rebuilds

pub mod config;
pub mod error;
pub mod indexer;
pub mod query;
pub mod search;
pub mod source;
pub mod storage;
pub mod types;

// Re-export main types
pub use config::IndexConfig;
pub use error::{BuildError, PrefixIndexError, RebuildError, Result, SourceError};
pub use indexer::{build_node_store, verify, IndexGeneration};
pub use query::{
    reconstruct, AnnotatedNode, HighlightSet, NodeFilters, SubtreeRequest, TreeNode, TreeParams,
};
pub use search::{
    IndexStatus, PrefixIndexManager, PrefixNamesResult, SearchHit, SearchResults, SubtreeResult,
};
pub use source::{MemoryNameSource, NameSource};
pub use storage::{NodeId, NodeStore, PrefixNode};
pub use types::{Gender, GenderCounts, HighlightReason, NameId, NameRecord, PopularityRange};
