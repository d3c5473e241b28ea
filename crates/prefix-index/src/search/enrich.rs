//! Leaf-record enrichment through the name source.
//!
//! Lookups run in parallel. A lookup that fails or finds nothing is logged
//! and omitted; it never fails the surrounding query.

use fnv::FnvHashMap;
use rayon::prelude::*;

use crate::query::TreeNode;
use crate::source::NameSource;
use crate::types::{NameId, NameRecord};

/// Fetches the records for `ids`, skipping any that cannot be loaded.
pub fn fetch_records(source: &dyn NameSource, ids: &[NameId]) -> FnvHashMap<NameId, NameRecord> {
    ids.par_iter()
        .filter_map(|&id| match source.get_by_id(id) {
            Ok(Some(record)) => Some((id, record)),
            Ok(None) => {
                log::warn!("name record {id} missing from name source");
                None
            }
            Err(error) => {
                log::warn!("name record {id} lookup failed: {error}");
                None
            }
        })
        .collect()
}

/// Attaches records to every complete-name node in `trees`.
pub fn enrich<'a, I>(trees: I, source: &dyn NameSource)
where
    I: IntoIterator<Item = &'a mut TreeNode>,
{
    let mut trees: Vec<&'a mut TreeNode> = trees.into_iter().collect();
    let mut ids = Vec::new();
    for tree in trees.iter_mut() {
        tree.walk_mut(&mut |node: &mut TreeNode| {
            if let Some(id) = node.node.node.name_id {
                ids.push(id);
            }
        });
    }
    if ids.is_empty() {
        return;
    }

    let mut records = fetch_records(source, &ids);
    for tree in trees.iter_mut() {
        tree.walk_mut(&mut |node: &mut TreeNode| {
            if let Some(id) = node.node.node.name_id {
                node.name = records.remove(&id);
            }
        });
    }
}
