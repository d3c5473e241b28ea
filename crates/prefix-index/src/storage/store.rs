//! Flat node store with lexical and per-depth scans.
//!
//! Nodes live in a dense vector indexed by `NodeId`. The builder assigns ids
//! in lexical prefix order, so the vector itself is the lexical index and
//! prefix scans are a binary search followed by a contiguous walk. A second
//! table lists ids per prefix length, each list also in lexical order.

use super::index_types::NodeId;
use super::node::PrefixNode;

#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: Vec<PrefixNode>,
    /// `by_depth[d]` holds ids of nodes with `prefix_length == d`.
    by_depth: Vec<Vec<NodeId>>,
    complete_names: usize,
}

impl NodeStore {
    /// Creates an empty store.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps nodes produced by the builder.
    ///
    /// `nodes[i].id` must equal `NodeId::new(i)` and nodes must be sorted by
    /// prefix; the builder guarantees both and `indexer::verify` checks them.
    pub(crate) fn from_sorted(nodes: Vec<PrefixNode>) -> Self {
        let max_depth = nodes.iter().map(|n| n.prefix_length).max().unwrap_or(0);
        let mut by_depth = vec![Vec::new(); max_depth + 1];
        let mut complete_names = 0;
        for node in &nodes {
            by_depth[node.prefix_length].push(node.id);
            if node.is_complete_name {
                complete_names += 1;
            }
        }
        Self {
            nodes,
            by_depth,
            complete_names,
        }
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&PrefixNode> {
        self.nodes.get(id.get())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of complete-name nodes.
    pub fn complete_names(&self) -> usize {
        self.complete_names
    }

    /// Longest prefix length present.
    pub fn max_depth(&self) -> usize {
        self.by_depth.len().saturating_sub(1)
    }

    /// Iterates over all nodes in lexical prefix order.
    pub fn iter(&self) -> impl Iterator<Item = &PrefixNode> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[PrefixNode] {
        &self.nodes
    }

    /// Exact lookup by prefix.
    pub fn find(&self, prefix: &str) -> Option<&PrefixNode> {
        let pos = self
            .nodes
            .binary_search_by(|node| node.prefix.as_str().cmp(prefix))
            .ok()?;
        self.nodes.get(pos)
    }

    /// Nodes whose prefix starts with `prefix`, in lexical order.
    pub fn scan_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a PrefixNode> + 'a {
        let start = self
            .nodes
            .partition_point(|node| node.prefix.as_str() < prefix);
        self.nodes[start..]
            .iter()
            .take_while(move |node| node.prefix.starts_with(prefix))
    }

    /// Nodes at exactly `depth` whose prefix starts with `prefix`, in lexical order.
    pub fn scan_prefix_at_depth<'a>(
        &'a self,
        prefix: &'a str,
        depth: usize,
    ) -> impl Iterator<Item = &'a PrefixNode> + 'a {
        let ids: &[NodeId] = self.by_depth.get(depth).map(Vec::as_slice).unwrap_or(&[]);
        let start = ids.partition_point(|id| self.nodes[id.get()].prefix.as_str() < prefix);
        ids[start..]
            .iter()
            .map(move |id| &self.nodes[id.get()])
            .take_while(move |node| node.prefix.starts_with(prefix))
    }

    /// Nodes whose prefix starts with `prefix` and whose length lies in
    /// `min_depth..=max_depth`, ordered by `(prefix_length, prefix)`.
    pub fn scan_depth_range<'a>(
        &'a self,
        prefix: &'a str,
        min_depth: usize,
        max_depth: usize,
    ) -> impl Iterator<Item = &'a PrefixNode> + 'a {
        let upper = max_depth.min(self.max_depth());
        (min_depth..=upper).flat_map(move |depth| self.scan_prefix_at_depth(prefix, depth))
    }
}
