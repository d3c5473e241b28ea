//! Prefix node types.
//!
//! A `PrefixNode` carries aggregates over the complete names strictly
//! beneath it. A complete-name node additionally carries its own
//! `LeafProfile`, which is kept out of its aggregate so that
//! `total_descendants` counts descendants only.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::index_types::NodeId;
use crate::types::{Gender, GenderCounts, NameId, PopularityAccumulator, PopularityRange};

// ---------------------------------------------------------------------------
// Leaf profile
// ---------------------------------------------------------------------------

/// Attributes of the name a complete-name node stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafProfile {
    pub gender: Gender,
    pub origin_country: Option<String>,
    pub popularity: f64,
}

// ---------------------------------------------------------------------------
// PrefixNode
// ---------------------------------------------------------------------------

/// One node of the prefix index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixNode {
    pub id: NodeId,
    pub prefix: String,
    /// Length in characters, not bytes.
    pub prefix_length: usize,
    pub is_complete_name: bool,
    pub name_id: Option<NameId>,
    pub parent_id: Option<NodeId>,
    pub child_count: u32,
    pub total_descendants: u64,
    pub gender_counts: GenderCounts,
    pub origin_countries: BTreeSet<String>,
    pub popularity_range: PopularityRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub own: Option<LeafProfile>,
}

impl PrefixNode {
    /// Creates a node with empty aggregates.
    pub fn new(id: NodeId, prefix: String, prefix_length: usize, parent_id: Option<NodeId>) -> Self {
        Self {
            id,
            prefix,
            prefix_length,
            is_complete_name: false,
            name_id: None,
            parent_id,
            child_count: 0,
            total_descendants: 0,
            gender_counts: GenderCounts::default(),
            origin_countries: BTreeSet::new(),
            popularity_range: PopularityRange::default(),
            own: None,
        }
    }

    /// Marks this node as the terminal node of a complete name.
    pub fn mark_complete(&mut self, name_id: NameId, own: LeafProfile) {
        self.is_complete_name = true;
        self.name_id = Some(name_id);
        self.own = Some(own);
    }

    /// Returns the statistics of the subtree rooted here, counting this
    /// node's own name when it is complete.
    pub fn profile(&self) -> SubtreeProfile<'_> {
        let Some(own) = self.own.as_ref() else {
            return SubtreeProfile {
                names: self.total_descendants,
                gender_counts: self.gender_counts,
                popularity_range: self.popularity_range,
                origins: &self.origin_countries,
                own_origin: None,
            };
        };

        let mut gender_counts = self.gender_counts;
        gender_counts.increment(own.gender);

        let mut popularity =
            PopularityAccumulator::from_range(&self.popularity_range, self.total_descendants);
        popularity.push(own.popularity);

        SubtreeProfile {
            names: self.total_descendants + 1,
            gender_counts,
            popularity_range: popularity.finish(),
            origins: &self.origin_countries,
            own_origin: own.origin_country.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Inclusive subtree view
// ---------------------------------------------------------------------------

/// Statistics over every complete name at or beneath a node.
///
/// For an intermediate node this equals the stored aggregate.
#[derive(Debug, Clone, Copy)]
pub struct SubtreeProfile<'a> {
    pub names: u64,
    pub gender_counts: GenderCounts,
    pub popularity_range: PopularityRange,
    origins: &'a BTreeSet<String>,
    own_origin: Option<&'a str>,
}

impl<'a> SubtreeProfile<'a> {
    pub fn contains_origin(&self, country: &str) -> bool {
        self.own_origin == Some(country) || self.origins.contains(country)
    }

    /// Deduplicated origin countries in lexical order.
    pub fn origins(&self) -> Vec<&'a str> {
        let mut merged: BTreeSet<&'a str> = self.origins.iter().map(String::as_str).collect();
        if let Some(own) = self.own_origin {
            merged.insert(own);
        }
        merged.into_iter().collect()
    }
}
