//! Subtree filters.
//!
//! Every predicate is evaluated over a node's inclusive subtree profile, so
//! a filter selects whole subtrees rather than individual leaves:
//! - gender is an exclusivity test (the category is present, all others absent)
//! - origin is a membership test on the subtree's origin set
//! - popularity bounds are overlap tests against the subtree's range

use serde::{Deserialize, Serialize};

use crate::indexer::normalize_origin;
use crate::storage::PrefixNode;
use crate::types::Gender;

/// Optional subtree filters; `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeFilters {
    pub gender: Option<Gender>,
    pub origin_country: Option<String>,
    pub min_popularity: Option<f64>,
    pub max_popularity: Option<f64>,
}

impl NodeFilters {
    pub fn is_empty(&self) -> bool {
        self.gender.is_none()
            && self.origin_country.is_none()
            && self.min_popularity.is_none()
            && self.max_popularity.is_none()
    }

    /// Returns the filters with the origin trimmed and blank origins dropped.
    pub fn normalized(mut self) -> Self {
        self.origin_country = normalize_origin(self.origin_country.as_deref());
        self
    }

    pub fn matches(&self, node: &PrefixNode) -> bool {
        if self.is_empty() {
            return true;
        }
        let profile = node.profile();

        if let Some(gender) = self.gender {
            if !profile.gender_counts.is_exclusively(gender) {
                return false;
            }
        }
        if let Some(origin) = self.origin_country.as_deref() {
            if !profile.contains_origin(origin) {
                return false;
            }
        }

        let has_names = profile.names > 0;
        if let Some(min) = self.min_popularity {
            if !has_names || profile.popularity_range.max < min {
                return false;
            }
        }
        if let Some(max) = self.max_popularity {
            if !has_names || profile.popularity_range.min > max {
                return false;
            }
        }
        true
    }
}

/// Keeps the nodes whose subtree passes `filters`, preserving order.
pub fn filter_nodes<'a, I>(nodes: I, filters: &NodeFilters) -> Vec<&'a PrefixNode>
where
    I: IntoIterator<Item = &'a PrefixNode>,
{
    nodes
        .into_iter()
        .filter(|node| filters.matches(node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::indexer::build_node_store;
    use crate::storage::NodeStore;
    use crate::types::NameRecord;

    fn store() -> NodeStore {
        build_node_store(
            vec![
                NameRecord::new(1, "An", Gender::Female, 0.5).with_origin("Greece"),
                NameRecord::new(2, "Ann", Gender::Female, 0.4).with_origin("England"),
                NameRecord::new(3, "Andy", Gender::Male, 0.2).with_origin("Scotland"),
                NameRecord::new(4, "Bea", Gender::Female, 0.8),
            ],
            &IndexConfig::default(),
        )
        .unwrap()
    }

    fn passes(store: &NodeStore, prefix: &str, filters: &NodeFilters) -> bool {
        filters.matches(store.find(prefix).unwrap())
    }

    fn gender(g: Gender) -> NodeFilters {
        NodeFilters {
            gender: Some(g),
            ..NodeFilters::default()
        }
    }

    #[test]
    fn gender_filter_is_exclusive() {
        let store = store();
        let female = gender(Gender::Female);
        assert!(!passes(&store, "an", &female));
        assert!(passes(&store, "ann", &female));
        assert!(passes(&store, "be", &female));
        assert!(passes(&store, "andy", &gender(Gender::Male)));
        assert!(!passes(&store, "a", &gender(Gender::Male)));
    }

    #[test]
    fn origin_filter_is_node_level_membership() {
        let store = store();
        let scotland = NodeFilters {
            origin_country: Some("Scotland".into()),
            ..NodeFilters::default()
        };
        assert!(passes(&store, "a", &scotland));
        assert!(passes(&store, "and", &scotland));
        assert!(!passes(&store, "ann", &scotland));
        assert!(!passes(&store, "b", &scotland));
    }

    #[test]
    fn popularity_filters_test_range_overlap() {
        let store = store();
        let at_least = NodeFilters {
            min_popularity: Some(0.45),
            ..NodeFilters::default()
        };
        assert!(passes(&store, "a", &at_least));
        assert!(!passes(&store, "andy", &at_least));

        let at_most = NodeFilters {
            max_popularity: Some(0.3),
            ..NodeFilters::default()
        };
        assert!(passes(&store, "a", &at_most));
        assert!(!passes(&store, "bea", &at_most));
    }

    #[test]
    fn filter_nodes_keeps_order() {
        let store = store();
        let kept = filter_nodes(store.iter(), &gender(Gender::Female));
        let prefixes: Vec<_> = kept.iter().map(|n| n.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["ann", "b", "be", "bea"]);
    }

    #[test]
    fn blank_origin_is_not_a_filter() {
        let filters = NodeFilters {
            origin_country: Some("  ".into()),
            ..NodeFilters::default()
        }
        .normalized();
        assert!(filters.is_empty());
    }
}
