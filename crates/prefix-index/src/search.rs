//! Query façade for the prefix index.
//!
//! This module provides:
//! - The main PrefixIndexManager API
//! - Query evaluation over a single index generation
//! - Leaf-record enrichment through the name source

mod engine;
mod enrich;
mod manager;
mod results;

// Re-export main types
pub use engine::{fetch_subtree, list_prefix_names, search_prefixes};
pub use enrich::{enrich, fetch_records};
pub use manager::PrefixIndexManager;
pub use results::{IndexStatus, PrefixNamesResult, SearchHit, SearchResults, SubtreeResult};
