//! Result payloads returned by the query façade.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::query::{AnnotatedNode, AppliedFilters, TreeNode};
use crate::types::{GenderCounts, NameRecord, PopularityRange};

/// Result of a bounded subtree fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtreeResult {
    /// Normalized root prefix.
    pub prefix: String,
    /// Nodes reachable in `root` and `nodes`.
    pub total_nodes: usize,
    /// Complete names among those nodes.
    pub total_names: usize,
    /// Effective depth after clamping.
    pub max_depth: usize,
    pub filters_applied: AppliedFilters,
    /// The root-prefix node itself, when present and not filtered out. Its
    /// children are carried in `nodes`.
    pub root: Option<TreeNode>,
    pub nodes: Vec<TreeNode>,
    /// Index generation the result was computed on.
    pub generation: u64,
}

impl SubtreeResult {
    pub(crate) fn empty(
        prefix: String,
        max_depth: usize,
        filters_applied: AppliedFilters,
        generation: u64,
    ) -> Self {
        Self {
            prefix,
            total_nodes: 0,
            total_names: 0,
            max_depth,
            filters_applied,
            root: None,
            nodes: Vec::new(),
            generation,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_nodes == 0
    }
}

/// Complete names under one prefix, with that prefix's statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefixNamesResult {
    pub prefix: String,
    /// Complete names at or under the prefix.
    pub total_count: u64,
    pub names: Vec<NameRecord>,
    pub gender_distribution: GenderCounts,
    pub top_origins: Vec<String>,
    pub popularity_stats: PopularityRange,
}

/// A complete-name search hit with its record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub node: AnnotatedNode,
    pub name: NameRecord,
}

/// Result of a free-text prefix search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub complete_names: Vec<SearchHit>,
    pub intermediate_nodes: Vec<AnnotatedNode>,
    /// Candidates matched before failed record lookups were dropped.
    pub total_results: usize,
}

/// Index status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStatus {
    /// Current build state.
    pub state: String,
    /// Generation currently serving reads.
    pub generation: u64,
    pub total_nodes: usize,
    pub total_names: usize,
    /// When the serving generation was built.
    pub built_at: Option<DateTime<Utc>>,
    /// Unix timestamp when the last rebuild started.
    pub started_at: Option<u64>,
    /// Unix timestamp when the last rebuild finished.
    pub finished_at: Option<u64>,
    pub last_duration_ms: Option<u64>,
    pub completed_builds: u64,
    pub failed_builds: u64,
    /// Error message if the last rebuild failed.
    pub last_error: Option<String>,
}
