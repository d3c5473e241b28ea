//! Query-scoped node copies.

use serde::Serialize;

use crate::storage::PrefixNode;
use crate::types::HighlightReason;

/// An owned copy of a stored node carrying per-query annotations.
///
/// Created fresh for every query; the stored node never carries these
/// fields, so concurrent queries cannot see each other's annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedNode {
    #[serde(flatten)]
    pub node: PrefixNode,
    pub match_score: f64,
    pub is_highlighted: bool,
    pub highlight_reason: Option<HighlightReason>,
}

impl AnnotatedNode {
    pub fn new(node: PrefixNode) -> Self {
        Self {
            node,
            match_score: 0.0,
            is_highlighted: false,
            highlight_reason: None,
        }
    }

    pub fn with_match_score(mut self, score: f64) -> Self {
        self.match_score = score;
        self
    }

    pub(crate) fn set_highlight(&mut self, reason: Option<HighlightReason>) {
        self.is_highlighted = reason.is_some();
        self.highlight_reason = reason;
    }
}

impl From<&PrefixNode> for AnnotatedNode {
    fn from(node: &PrefixNode) -> Self {
        Self::new(node.clone())
    }
}
