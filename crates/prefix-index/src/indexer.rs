//! Prefix index construction.
//!
//! This module handles building the node set and publishing it:
//! - Normalizing corpus names into index keys
//! - Constructing nodes in lexical order and folding aggregates bottom-up
//! - Verifying node invariants before a build is accepted
//! - Holding the generation pointer that readers snapshot

mod build;
mod construct;
mod invariants;
mod normalize;
mod shared;

pub use build::{
    unix_now_secs, zero_to_none, IndexBuildProgress, IndexBuildState, ProgressSnapshot,
};
pub use construct::build_node_store;
pub use invariants::verify;
pub use normalize::{normalize_key, normalize_origin, validate_key};
pub use shared::{IndexGeneration, SharedPrefixIndex};
