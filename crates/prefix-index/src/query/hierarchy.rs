//! Bounded-depth tree reconstruction from a flat node list.
//!
//! Pure over its inputs: no store access and no collaborator I/O. Leaf
//! records are attached afterwards by a separate enrichment pass.

use fnv::FnvHashMap;
use serde::Serialize;

use super::annotated::AnnotatedNode;
use crate::storage::NodeId;
use crate::types::NameRecord;

/// A node with its reconstructed children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub node: AnnotatedNode,
    /// Full record for complete names, when enrichment was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NameRecord>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// A node with no children and no record attached.
    pub fn new(node: AnnotatedNode) -> Self {
        Self {
            node,
            name: None,
            children: Vec::new(),
        }
    }

    /// Visits this node and every node beneath it, parents first.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut TreeNode)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }

    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }
}

/// Rebuilds the forest hanging under `root_parent`.
///
/// Top-level entries are the nodes whose `parent_id` equals `root_parent`.
/// Recursion stops once `current_depth` reaches `max_depth`, leaving the
/// children of boundary nodes empty. Siblings keep their order in `nodes`.
/// Nodes whose parent is absent from `nodes` are unreachable and dropped.
pub fn reconstruct(
    nodes: &[AnnotatedNode],
    root_parent: Option<NodeId>,
    max_depth: usize,
    current_depth: usize,
) -> Vec<TreeNode> {
    if current_depth >= max_depth {
        return Vec::new();
    }
    let mut groups: FnvHashMap<Option<NodeId>, Vec<usize>> = FnvHashMap::default();
    for (index, annotated) in nodes.iter().enumerate() {
        groups
            .entry(annotated.node.parent_id)
            .or_default()
            .push(index);
    }
    assemble(nodes, &groups, root_parent, max_depth, current_depth)
}

fn assemble(
    nodes: &[AnnotatedNode],
    groups: &FnvHashMap<Option<NodeId>, Vec<usize>>,
    parent: Option<NodeId>,
    max_depth: usize,
    depth: usize,
) -> Vec<TreeNode> {
    if depth >= max_depth {
        return Vec::new();
    }
    let Some(members) = groups.get(&parent) else {
        return Vec::new();
    };
    members
        .iter()
        .map(|&index| {
            let annotated = &nodes[index];
            let mut tree = TreeNode::new(annotated.clone());
            tree.children = assemble(
                nodes,
                groups,
                Some(annotated.node.id),
                max_depth,
                depth + 1,
            );
            tree
        })
        .collect()
}
