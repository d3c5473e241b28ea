//! Query-time processing over snapshot copies of prefix nodes.
//!
//! This module provides the pieces the query façade composes:
//! - Annotated node copies carrying per-query fields
//! - Subtree filters (gender exclusivity, origin, popularity overlap)
//! - Highlight tagging
//! - Bounded-depth hierarchy reconstruction
//! - Raw parameter parsing for request layers

mod annotated;
mod filter;
mod hierarchy;
mod highlight;
mod params;
mod request;

pub use annotated::AnnotatedNode;
pub use filter::{filter_nodes, NodeFilters};
pub use hierarchy::{reconstruct, TreeNode};
pub use highlight::{highlight, HighlightSet};
pub use params::{
    parse_gender, parse_highlight_name_ids, parse_highlight_prefixes, parse_max_depth,
    parse_popularity, TreeParams,
};
pub use request::{AppliedFilters, SubtreeRequest};
