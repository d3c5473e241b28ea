//! Node store construction from a corpus snapshot.
//!
//! Records are normalized, sorted by key and inserted in one ordered pass.
//! Because keys arrive in lexical order, every prefix a name introduces
//! sorts after every prefix created before it, so node ids come out in
//! lexical prefix order and parents are found on a chain stack instead of a
//! map lookup. Aggregates are then folded bottom-up, one prefix length at a
//! time from the longest down, so a node is finalized before its parent
//! reads it.

use std::collections::BTreeSet;

use rayon::prelude::*;

use super::invariants::verify_nodes;
use super::normalize::{normalize_record, NormalizedRecord};
use crate::config::IndexConfig;
use crate::error::BuildError;
use crate::storage::{LeafProfile, NodeId, NodeStore, PrefixNode};
use crate::types::{GenderCounts, NameRecord, PopularityAccumulator};

/// Builds a complete, invariant-checked node store from `corpus`.
pub fn build_node_store(
    corpus: Vec<NameRecord>,
    config: &IndexConfig,
) -> Result<NodeStore, BuildError> {
    if corpus.is_empty() {
        return Err(BuildError::EmptyCorpus);
    }

    let records = normalize_corpus(corpus, config.max_name_length)?;
    let mut nodes = insert_prefixes(&records)?;
    aggregate_bottom_up(&mut nodes);
    verify_nodes(&nodes)?;

    log::debug!(
        "prefix index built names={} nodes={}",
        records.len(),
        nodes.len()
    );

    Ok(NodeStore::from_sorted(nodes))
}

/// Normalizes records in parallel, sorts them by key and rejects duplicates.
fn normalize_corpus(
    corpus: Vec<NameRecord>,
    max_length: usize,
) -> Result<Vec<NormalizedRecord>, BuildError> {
    let mut records = corpus
        .into_par_iter()
        .map(|record| normalize_record(record, max_length))
        .collect::<Result<Vec<_>, _>>()?;

    records.par_sort_unstable_by(|a, b| {
        a.key
            .cmp(&b.key)
            .then_with(|| a.record.id.cmp(&b.record.id))
    });

    if let Some(pair) = records.windows(2).find(|pair| pair[0].key == pair[1].key) {
        return Err(BuildError::DuplicateName {
            key: pair[0].key.clone(),
            first: pair[0].record.id,
            second: pair[1].record.id,
        });
    }

    Ok(records)
}

/// Creates one node per distinct prefix, in lexical order.
fn insert_prefixes(records: &[NormalizedRecord]) -> Result<Vec<PrefixNode>, BuildError> {
    let mut nodes: Vec<PrefixNode> = Vec::new();
    // chain[i] is the node for the (i + 1)-character prefix of the last key.
    let mut chain: Vec<NodeId> = Vec::new();
    let mut previous = "";

    for entry in records {
        let shared = common_prefix_chars(previous, &entry.key);
        chain.truncate(shared);

        let ends = entry
            .key
            .char_indices()
            .map(|(offset, c)| offset + c.len_utf8());
        for (depth, end) in ends.enumerate().skip(shared) {
            let id = NodeId::new(nodes.len());
            nodes.push(PrefixNode::new(
                id,
                entry.key[..end].to_string(),
                depth + 1,
                chain.last().copied(),
            ));
            chain.push(id);
        }

        // Sorted, duplicate-free keys never end on an existing node.
        let Some(leaf) = chain.last().copied().filter(|_| chain.len() == entry.length) else {
            return Err(BuildError::InvariantViolation {
                prefix: entry.key.clone(),
                detail: "complete name did not produce a terminal node".to_string(),
            });
        };
        nodes[leaf.get()].mark_complete(
            entry.record.id,
            LeafProfile {
                gender: entry.record.gender,
                origin_country: entry.record.origin_country.clone(),
                popularity: entry.record.popularity,
            },
        );

        previous = &entry.key;
    }

    Ok(nodes)
}

fn common_prefix_chars(left: &str, right: &str) -> usize {
    left.chars()
        .zip(right.chars())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Aggregate being accumulated for a node from its already-final children.
#[derive(Debug, Default)]
struct PendingAggregate {
    children: u32,
    descendants: u64,
    gender_counts: GenderCounts,
    origins: BTreeSet<String>,
    popularity: PopularityAccumulator,
}

/// Folds aggregates from the longest prefixes up to the roots.
fn aggregate_bottom_up(nodes: &mut [PrefixNode]) {
    let max_depth = nodes.iter().map(|node| node.prefix_length).max().unwrap_or(0);
    let mut by_depth: Vec<Vec<usize>> = vec![Vec::new(); max_depth + 1];
    for (index, node) in nodes.iter().enumerate() {
        by_depth[node.prefix_length].push(index);
    }

    let mut pending: Vec<PendingAggregate> =
        (0..nodes.len()).map(|_| PendingAggregate::default()).collect();

    for index in by_depth.into_iter().rev().flatten() {
        let aggregate = std::mem::take(&mut pending[index]);
        let node = &mut nodes[index];
        node.child_count = aggregate.children;
        node.total_descendants = aggregate.descendants;
        node.gender_counts = aggregate.gender_counts;
        node.popularity_range = aggregate.popularity.finish();
        node.origin_countries = aggregate.origins;

        let Some(parent) = node.parent_id else {
            continue;
        };
        let into = &mut pending[parent.get()];
        into.children += 1;
        into.descendants += node.total_descendants;
        into.gender_counts.add(&node.gender_counts);
        into.origins.extend(node.origin_countries.iter().cloned());
        into.popularity.merge(&aggregate.popularity);

        if let Some(own) = node.own.as_ref() {
            into.descendants += 1;
            into.gender_counts.increment(own.gender);
            if let Some(origin) = own.origin_country.as_ref() {
                into.origins.insert(origin.clone());
            }
            into.popularity.push(own.popularity);
        }
    }
}
