//! Structural and aggregate invariants of a built node set.
//!
//! 1. `child_count` equals the number of nodes naming this node as parent.
//! 2. `total_descendants` equals the sum over children of
//!    `child.total_descendants + child.is_complete_name`.
//! 3. Gender counts sum to `total_descendants`.
//! 4. `min <= avg <= max` when there are descendants; zeroed otherwise.
//! 5. Every prefix exists exactly once and every non-root node's parent is
//!    the node for its prefix minus the last character.

use crate::error::BuildError;
use crate::storage::{NodeStore, PrefixNode};
use crate::types::PopularityRange;

/// Verifies every invariant over a built store.
pub fn verify(store: &NodeStore) -> Result<(), BuildError> {
    verify_nodes(store.as_slice())
}

pub(crate) fn verify_nodes(nodes: &[PrefixNode]) -> Result<(), BuildError> {
    let mut child_counts = vec![0u32; nodes.len()];
    let mut descendants = vec![0u64; nodes.len()];

    for (index, node) in nodes.iter().enumerate() {
        if node.id.get() != index {
            return violation(node, format!("id {} stored at slot {index}", node.id));
        }
        if index > 0 && nodes[index - 1].prefix >= node.prefix {
            return violation(node, "prefixes are not strictly increasing".to_string());
        }
        let length = node.prefix.chars().count();
        if length == 0 || length != node.prefix_length {
            return violation(
                node,
                format!("prefix_length {} but prefix has {length} characters", node.prefix_length),
            );
        }
        if node.is_complete_name != node.name_id.is_some()
            || node.is_complete_name != node.own.is_some()
        {
            return violation(node, "name_id must be set iff the node is a complete name".to_string());
        }

        match node.parent_id {
            None if length == 1 => {}
            None => return violation(node, "non-root node has no parent".to_string()),
            Some(_) if length == 1 => {
                return violation(node, "single-character prefix has a parent".to_string())
            }
            Some(parent_id) => {
                let Some(parent) = nodes.get(parent_id.get()) else {
                    return violation(node, format!("parent {parent_id} is missing"));
                };
                let expected: String = node.prefix.chars().take(length - 1).collect();
                if parent.prefix != expected {
                    return violation(
                        node,
                        format!("parent prefix {:?}, expected {expected:?}", parent.prefix),
                    );
                }
                child_counts[parent_id.get()] += 1;
                descendants[parent_id.get()] +=
                    node.total_descendants + u64::from(node.is_complete_name);
            }
        }
    }

    for (index, node) in nodes.iter().enumerate() {
        if node.child_count != child_counts[index] {
            return violation(
                node,
                format!("child_count {} but {} children", node.child_count, child_counts[index]),
            );
        }
        if node.total_descendants != descendants[index] {
            return violation(
                node,
                format!(
                    "total_descendants {} but children account for {}",
                    node.total_descendants, descendants[index]
                ),
            );
        }
        if node.gender_counts.total() != node.total_descendants {
            return violation(
                node,
                format!(
                    "gender counts sum to {} but total_descendants is {}",
                    node.gender_counts.total(),
                    node.total_descendants
                ),
            );
        }
        let range = &node.popularity_range;
        if node.total_descendants > 0 {
            if !(range.min <= range.avg && range.avg <= range.max) {
                return violation(node, format!("popularity range out of order: {range:?}"));
            }
        } else if *range != PopularityRange::default() || !node.origin_countries.is_empty() {
            return violation(node, "node without descendants has aggregates".to_string());
        }
    }

    Ok(())
}

fn violation(node: &PrefixNode, detail: String) -> Result<(), BuildError> {
    Err(BuildError::InvariantViolation {
        prefix: node.prefix.clone(),
        detail,
    })
}
