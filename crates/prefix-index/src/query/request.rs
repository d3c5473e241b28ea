use serde::Serialize;

use super::filter::NodeFilters;
use super::highlight::HighlightSet;

/// Parameters of a bounded subtree fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtreeRequest {
    /// Prefix to start from; empty means the whole index.
    pub root_prefix: String,
    /// Requested depth below the root; clamped to `[1, 10]`, `None` uses the
    /// configured default.
    pub max_depth: Option<usize>,
    pub filters: NodeFilters,
    pub highlight: HighlightSet,
    /// Attach full name records to complete-name nodes.
    pub include_leaf_detail: bool,
}

impl SubtreeRequest {
    pub fn new(root_prefix: impl Into<String>) -> Self {
        Self {
            root_prefix: root_prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_filters(mut self, filters: NodeFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_highlight(mut self, highlight: HighlightSet) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_leaf_detail(mut self, include: bool) -> Self {
        self.include_leaf_detail = include;
        self
    }
}

/// Filters echoed back in a subtree result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppliedFilters {
    pub gender: Option<String>,
    pub origin_country: Option<String>,
    pub min_popularity: Option<f64>,
    pub max_popularity: Option<f64>,
}

impl From<&NodeFilters> for AppliedFilters {
    fn from(filters: &NodeFilters) -> Self {
        Self {
            gender: filters.gender.map(|g| g.as_str().to_string()),
            origin_country: filters.origin_country.clone(),
            min_popularity: filters.min_popularity,
            max_popularity: filters.max_popularity,
        }
    }
}
