//! Storage layer for the prefix index.
//!
//! - `index_types` - Compact node ids (`NodeId`)
//! - `node` - Prefix nodes, leaf profiles and inclusive subtree views
//! - `store` - Flat node store with lexical and per-depth scans

mod index_types;
mod node;
mod store;

pub use index_types::NodeId;
pub use node::{LeafProfile, PrefixNode, SubtreeProfile};
pub use store::NodeStore;
