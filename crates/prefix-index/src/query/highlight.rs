//! Highlight tagging for query results.
//!
//! A node is highlighted when its prefix is one of the requested prefixes
//! (`prefix_match`), or failing that when its name id is one of the requested
//! ids (`name_selected`). Prefix matches are checked first and a node carries
//! at most one reason.

use std::collections::BTreeSet;

use super::annotated::AnnotatedNode;
use crate::indexer::normalize_key;
use crate::storage::PrefixNode;
use crate::types::{HighlightReason, NameId};

/// Prefixes and name ids a caller wants highlighted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet {
    prefixes: BTreeSet<String>,
    name_ids: BTreeSet<NameId>,
}

impl HighlightSet {
    /// Builds a set, folding prefixes into index key form and dropping blanks.
    pub fn new<P, S, I>(prefixes: P, name_ids: I) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
        I: IntoIterator<Item = NameId>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|prefix| normalize_key(prefix.as_ref()))
            .filter(|prefix| !prefix.is_empty())
            .collect();
        Self {
            prefixes,
            name_ids: name_ids.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.name_ids.is_empty()
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    pub fn name_ids(&self) -> impl Iterator<Item = NameId> + '_ {
        self.name_ids.iter().copied()
    }

    /// First matching reason for `node`, if any.
    pub fn reason_for(&self, node: &PrefixNode) -> Option<HighlightReason> {
        if self.prefixes.contains(&node.prefix) {
            return Some(HighlightReason::PrefixMatch);
        }
        match node.name_id {
            Some(id) if self.name_ids.contains(&id) => Some(HighlightReason::NameSelected),
            _ => None,
        }
    }
}

/// Tags every node with its highlight reason, clearing stale annotations.
pub fn highlight(mut nodes: Vec<AnnotatedNode>, set: &HighlightSet) -> Vec<AnnotatedNode> {
    for annotated in &mut nodes {
        let reason = set.reason_for(&annotated.node);
        annotated.set_highlight(reason);
    }
    nodes
}
