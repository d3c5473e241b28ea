//! Query evaluation over one index generation.
//!
//! Every function here reads a single `IndexGeneration` and never touches the
//! shared pointer, so a result is always consistent with exactly one build.

use super::enrich::{enrich, fetch_records};
use super::results::{PrefixNamesResult, SearchHit, SearchResults, SubtreeResult};
use crate::config::IndexConfig;
use crate::error::{PrefixIndexError, Result};
use crate::indexer::{normalize_key, normalize_origin, IndexGeneration};
use crate::query::{
    filter_nodes, highlight, reconstruct, AnnotatedNode, AppliedFilters, SubtreeRequest, TreeNode,
};
use crate::source::NameSource;
use crate::storage::{LeafProfile, PrefixNode};
use crate::types::{Gender, NameId};

/// Fetches the filtered, highlighted subtree below `request.root_prefix`.
///
/// The scan covers the root node and every node up to `max_depth` characters
/// longer. A root with no matching nodes yields an empty result, not an error.
pub fn fetch_subtree(
    generation: &IndexGeneration,
    request: &SubtreeRequest,
    config: &IndexConfig,
    source: &dyn NameSource,
) -> SubtreeResult {
    let store = &generation.store;
    let root = normalize_key(&request.root_prefix);
    let max_depth = config.clamp_depth(request.max_depth);
    let filters = request.filters.clone().normalized();
    let applied = AppliedFilters::from(&filters);

    let root_len = root.chars().count();
    let root_id = if root.is_empty() {
        None
    } else {
        match store.find(&root) {
            Some(node) => Some(node.id),
            None => return SubtreeResult::empty(root, max_depth, applied, generation.generation),
        }
    };

    let mut matched = filter_nodes(
        store.scan_depth_range(&root, root_len, root_len + max_depth),
        &filters,
    );
    if matched.is_empty() {
        return SubtreeResult::empty(root, max_depth, applied, generation.generation);
    }
    // Node ids follow lexical prefix order.
    matched.sort_unstable_by_key(|node| node.id);

    let annotated = highlight(
        matched.into_iter().map(AnnotatedNode::from).collect(),
        &request.highlight,
    );
    let mut root_node = annotated
        .first()
        .filter(|node| Some(node.node.id) == root_id)
        .cloned()
        .map(TreeNode::new);

    let mut forest = reconstruct(&annotated, root_id, max_depth, 0);
    if request.include_leaf_detail {
        enrich(forest.iter_mut().chain(root_node.as_mut()), source);
    }

    // Orphans dropped by reconstruction are not counted.
    let (mut total_nodes, mut total_names) = (0, 0);
    for tree in forest.iter_mut().chain(root_node.as_mut()) {
        tree.walk_mut(&mut |node: &mut TreeNode| {
            total_nodes += 1;
            if node.node.node.is_complete_name {
                total_names += 1;
            }
        });
    }

    SubtreeResult {
        prefix: root,
        total_nodes,
        total_names,
        max_depth,
        filters_applied: applied,
        root: root_node,
        nodes: forest,
        generation: generation.generation,
    }
}

/// Lists complete names at or under `prefix` with the prefix's statistics.
///
/// Statistics come from the prefix node itself and do not depend on `limit`
/// or the leaf filters.
pub fn list_prefix_names(
    generation: &IndexGeneration,
    prefix: &str,
    limit: Option<usize>,
    gender: Option<Gender>,
    origin_country: Option<&str>,
    config: &IndexConfig,
    source: &dyn NameSource,
) -> Result<PrefixNamesResult> {
    let store = &generation.store;
    let key = normalize_key(prefix);
    let node = store
        .find(&key)
        .ok_or_else(|| PrefixIndexError::NotFound(prefix.to_string()))?;

    let limit = config.clamp_names_limit(limit);
    let origin = normalize_origin(origin_country);
    let ids: Vec<NameId> = store
        .scan_prefix(&key)
        .filter(|candidate| {
            candidate
                .own
                .as_ref()
                .is_some_and(|own| leaf_matches(own, gender, origin.as_deref()))
        })
        .filter_map(|candidate| candidate.name_id)
        .take(limit)
        .collect();

    let mut records = fetch_records(source, &ids);
    let names = ids.iter().filter_map(|id| records.remove(id)).collect();

    let profile = node.profile();
    Ok(PrefixNamesResult {
        prefix: key,
        total_count: profile.names,
        names,
        gender_distribution: profile.gender_counts,
        top_origins: profile
            .origins()
            .into_iter()
            .take(config.top_origins)
            .map(str::to_string)
            .collect(),
        popularity_stats: profile.popularity_range,
    })
}

fn leaf_matches(own: &LeafProfile, gender: Option<Gender>, origin: Option<&str>) -> bool {
    gender.is_none_or(|gender| own.gender == gender)
        && origin.is_none_or(|origin| own.origin_country.as_deref() == Some(origin))
}

/// Case-insensitive prefix search ordered by `(prefix_length, prefix)`.
pub fn search_prefixes(
    generation: &IndexGeneration,
    query: &str,
    limit: Option<usize>,
    config: &IndexConfig,
    source: &dyn NameSource,
) -> Result<SearchResults> {
    let store = &generation.store;
    let key = normalize_key(query);
    if key.is_empty() {
        return Err(PrefixIndexError::Validation(
            "search query must not be empty".to_string(),
        ));
    }
    let limit = config.clamp_search_limit(limit);
    let query_len = key.chars().count();

    let candidates: Vec<&PrefixNode> = store
        .scan_depth_range(&key, query_len, store.max_depth())
        .take(limit)
        .collect();
    let total_results = candidates.len();

    let ids: Vec<NameId> = candidates.iter().filter_map(|node| node.name_id).collect();
    let mut records = fetch_records(source, &ids);

    let mut complete_names = Vec::new();
    let mut intermediate_nodes = Vec::new();
    for node in candidates {
        let score = query_len as f64 / node.prefix_length as f64;
        let annotated = AnnotatedNode::from(node).with_match_score(score);
        match node.name_id {
            Some(id) => {
                if let Some(name) = records.remove(&id) {
                    complete_names.push(SearchHit {
                        node: annotated,
                        name,
                    });
                }
            }
            None => intermediate_nodes.push(annotated),
        }
    }

    Ok(SearchResults {
        query: key,
        complete_names,
        intermediate_nodes,
        total_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::build_node_store;
    use crate::query::{HighlightSet, NodeFilters};
    use crate::source::MemoryNameSource;
    use crate::types::{HighlightReason, NameRecord};

    fn corpus() -> Vec<NameRecord> {
        vec![
            NameRecord::new(1, "An", Gender::Female, 0.5).with_origin("Greece"),
            NameRecord::new(2, "Ann", Gender::Female, 0.4).with_origin("England"),
            NameRecord::new(3, "Andy", Gender::Male, 0.2).with_origin("Scotland"),
            NameRecord::new(4, "Emma", Gender::Female, 0.9).with_origin("Germany"),
            NameRecord::new(5, "Emmett", Gender::Male, 0.3).with_origin("England"),
        ]
    }

    fn fixture() -> (IndexGeneration, MemoryNameSource, IndexConfig) {
        let config = IndexConfig::default();
        let store = build_node_store(corpus(), &config).unwrap();
        let generation = IndexGeneration {
            generation: 1,
            built_at: None,
            store,
        };
        (generation, MemoryNameSource::from_records(corpus()), config)
    }

    fn forest_prefixes(result: &SubtreeResult) -> Vec<String> {
        let mut out = Vec::new();
        let mut nodes = result.nodes.clone();
        for tree in &mut nodes {
            tree.walk_mut(&mut |t: &mut crate::query::TreeNode| out.push(t.node.node.prefix.clone()));
        }
        out
    }

    #[test]
    fn subtree_scans_root_and_bounded_depth() {
        let (generation, source, config) = fixture();
        let request = SubtreeRequest::new("A").with_max_depth(1);
        let result = fetch_subtree(&generation, &request, &config, &source);

        assert_eq!(result.prefix, "a");
        assert_eq!(result.max_depth, 1);
        assert_eq!(result.root.as_ref().map(|n| n.node.node.prefix.as_str()), Some("a"));
        assert_eq!(forest_prefixes(&result), vec!["an"]);
        assert_eq!(result.total_nodes, 2);
        assert_eq!(result.total_names, 1);
    }

    #[test]
    fn subtree_from_empty_root_starts_at_length_one() {
        let (generation, source, config) = fixture();
        let request = SubtreeRequest::new("").with_max_depth(2);
        let result = fetch_subtree(&generation, &request, &config, &source);

        assert!(result.root.is_none());
        let tops: Vec<_> = result
            .nodes
            .iter()
            .map(|t| t.node.node.prefix.as_str())
            .collect();
        assert_eq!(tops, vec!["a", "e"]);
        assert_eq!(result.nodes[0].children[0].node.node.prefix, "an");
        assert!(result.nodes[0].children[0].children.is_empty());
    }

    #[test]
    fn subtree_missing_root_echoes_filters() {
        let (generation, source, config) = fixture();
        let filters = NodeFilters {
            gender: Some(Gender::Female),
            origin_country: Some("Peru".into()),
            ..NodeFilters::default()
        };
        let request = SubtreeRequest::new("Zed").with_filters(filters);
        let result = fetch_subtree(&generation, &request, &config, &source);

        assert!(result.is_empty());
        assert!(result.nodes.is_empty());
        assert_eq!(result.filters_applied.gender.as_deref(), Some("female"));
        assert_eq!(result.filters_applied.origin_country.as_deref(), Some("Peru"));
    }

    #[test]
    fn subtree_gender_filter_and_highlight() {
        let (generation, source, config) = fixture();
        let request = SubtreeRequest::new("an")
            .with_max_depth(2)
            .with_filters(NodeFilters {
                gender: Some(Gender::Female),
                ..NodeFilters::default()
            })
            .with_highlight(HighlightSet::new(["ann"], [NameId(2)]));
        let result = fetch_subtree(&generation, &request, &config, &source);

        assert!(result.root.is_none());
        assert_eq!(forest_prefixes(&result), vec!["ann"]);
        let ann = &result.nodes[0].node;
        assert_eq!(ann.highlight_reason, Some(HighlightReason::PrefixMatch));
        assert_eq!(result.total_names, 1);
    }

    #[test]
    fn subtree_leaf_detail_is_opt_in() {
        let (generation, source, config) = fixture();
        let plain = fetch_subtree(
            &generation,
            &SubtreeRequest::new("ann").with_max_depth(1),
            &config,
            &source,
        );
        assert!(plain.nodes.is_empty());
        assert!(plain.root.is_some());

        let detailed = fetch_subtree(
            &generation,
            &SubtreeRequest::new("an").with_leaf_detail(true),
            &config,
            &source,
        );
        let ann = detailed
            .nodes
            .iter()
            .find(|t| t.node.node.prefix == "ann")
            .unwrap();
        assert_eq!(ann.name.as_ref().map(|r| r.id), Some(NameId(2)));
    }

    #[test]
    fn subtree_leaf_detail_covers_a_complete_root() {
        let (generation, source, config) = fixture();
        let result = fetch_subtree(
            &generation,
            &SubtreeRequest::new("Ann").with_leaf_detail(true),
            &config,
            &source,
        );
        let root = result.root.as_ref().unwrap();
        assert!(root.node.node.is_complete_name);
        assert!(root.children.is_empty());
        assert_eq!(root.name.as_ref().map(|r| r.name.as_str()), Some("Ann"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["root"]["name"]["name"], "Ann");
    }

    #[test]
    fn subtree_counts_skip_nodes_cut_off_by_filters() {
        let config = IndexConfig::default();
        let corpus = vec![
            NameRecord::new(1, "An", Gender::Female, 0.5),
            NameRecord::new(2, "Ann", Gender::Female, 0.4),
            NameRecord::new(3, "Andy", Gender::Male, 0.2),
        ];
        let generation = IndexGeneration {
            generation: 1,
            built_at: None,
            store: build_node_store(corpus.clone(), &config).unwrap(),
        };
        let source = MemoryNameSource::from_records(corpus);
        let request = SubtreeRequest::new("").with_filters(NodeFilters {
            gender: Some(Gender::Female),
            ..NodeFilters::default()
        });
        let result = fetch_subtree(&generation, &request, &config, &source);

        assert!(result.nodes.is_empty());
        assert_eq!(result.total_nodes, 0);
        assert_eq!(result.total_names, 0);
        assert!(result.is_empty());
    }

    #[test]
    fn prefix_names_reports_node_statistics() {
        let (generation, source, config) = fixture();
        let result =
            list_prefix_names(&generation, "Em", Some(1), None, None, &config, &source).unwrap();

        assert_eq!(result.names.len(), 1);
        assert_eq!(result.total_count, 2);
        assert_eq!(result.gender_distribution.female, 1);
        assert_eq!(result.gender_distribution.male, 1);
        assert_eq!(result.popularity_stats.min, 0.3);
        assert_eq!(result.popularity_stats.max, 0.9);
        assert!((result.popularity_stats.avg - 0.6).abs() < 1e-9);
        assert_eq!(result.top_origins, vec!["England", "Germany"]);
    }

    #[test]
    fn prefix_names_filters_leaves_by_record() {
        let (generation, source, config) = fixture();
        let males =
            list_prefix_names(&generation, "a", None, Some(Gender::Male), None, &config, &source)
                .unwrap();
        let names: Vec<_> = males.names.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Andy"]);

        let english = list_prefix_names(
            &generation,
            "a",
            None,
            None,
            Some(" England "),
            &config,
            &source,
        )
        .unwrap();
        assert_eq!(english.names.len(), 1);
        assert_eq!(english.names[0].name, "Ann");
        assert_eq!(english.total_count, 3);
    }

    #[test]
    fn prefix_names_includes_the_prefix_name_itself() {
        let (generation, source, config) = fixture();
        let result =
            list_prefix_names(&generation, "an", None, None, None, &config, &source).unwrap();
        let names: Vec<_> = result.names.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["An", "Andy", "Ann"]);
        assert_eq!(result.total_count, 3);
    }

    #[test]
    fn prefix_names_unknown_prefix_is_not_found() {
        let (generation, source, config) = fixture();
        for prefix in ["zz", ""] {
            let result = list_prefix_names(&generation, prefix, None, None, None, &config, &source);
            assert!(matches!(result, Err(PrefixIndexError::NotFound(_))));
        }
    }

    #[test]
    fn search_orders_by_length_then_prefix() {
        let (generation, source, config) = fixture();
        let results = search_prefixes(&generation, "AN", None, &config, &source).unwrap();

        assert_eq!(results.query, "an");
        assert_eq!(results.total_results, 4);
        let complete: Vec<_> = results
            .complete_names
            .iter()
            .map(|hit| hit.node.node.prefix.as_str())
            .collect();
        assert_eq!(complete, vec!["an", "ann", "andy"]);
        let intermediate: Vec<_> = results
            .intermediate_nodes
            .iter()
            .map(|n| n.node.prefix.as_str())
            .collect();
        assert_eq!(intermediate, vec!["and"]);
        assert_eq!(results.complete_names[0].node.match_score, 1.0);
        assert!((results.complete_names[2].node.match_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn search_limit_bounds_candidates() {
        let (generation, source, config) = fixture();
        let results = search_prefixes(&generation, "e", Some(2), &config, &source).unwrap();
        assert_eq!(results.total_results, 2);
        assert_eq!(results.intermediate_nodes.len(), 2);
    }

    #[test]
    fn search_drops_missing_records_but_counts_them() {
        let (generation, source, config) = fixture();
        source.remove(NameId(2));
        let results = search_prefixes(&generation, "ann", None, &config, &source).unwrap();
        assert_eq!(results.total_results, 1);
        assert!(results.complete_names.is_empty());
        assert!(results.intermediate_nodes.is_empty());
    }

    #[test]
    fn search_rejects_blank_query_and_tolerates_no_match() {
        let (generation, source, config) = fixture();
        assert!(matches!(
            search_prefixes(&generation, "   ", None, &config, &source),
            Err(PrefixIndexError::Validation(_))
        ));
        let none = search_prefixes(&generation, "zzzzzzz", None, &config, &source).unwrap();
        assert_eq!(none.total_results, 0);
        assert!(none.complete_names.is_empty());
    }
}
