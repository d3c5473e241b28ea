use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrefixIndexError, Result};

pub const MIN_TREE_DEPTH: usize = 1;
pub const MAX_TREE_DEPTH: usize = 10;

/// Tunables for building and querying the prefix index.
///
/// Missing fields in a config file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Longest accepted name, in characters.
    pub max_name_length: usize,
    pub default_max_depth: usize,
    pub default_names_limit: usize,
    pub max_names_limit: usize,
    pub default_search_limit: usize,
    pub max_search_limit: usize,
    /// Origins reported in leaf-listing statistics.
    pub top_origins: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_name_length: 50,
            default_max_depth: 3,
            default_names_limit: 100,
            max_names_limit: 1000,
            default_search_limit: 20,
            max_search_limit: 100,
            top_origins: 5,
        }
    }
}

impl IndexConfig {
    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|error| PrefixIndexError::Config {
            path: path.to_path_buf(),
            message: format!("failed to read config: {error}"),
        })?;
        let config: IndexConfig =
            serde_json::from_str(&data).map_err(|error| PrefixIndexError::Config {
                path: path.to_path_buf(),
                message: format!("failed to parse config: {error}"),
            })?;
        config.validate().map_err(|message| PrefixIndexError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.max_name_length == 0 {
            return Err("max_name_length must be positive".to_string());
        }
        if self.max_names_limit == 0 || self.max_search_limit == 0 {
            return Err("result limits must be positive".to_string());
        }
        Ok(())
    }

    /// Clamps a requested tree depth into the supported range.
    pub fn clamp_depth(&self, depth: Option<usize>) -> usize {
        depth
            .unwrap_or(self.default_max_depth)
            .clamp(MIN_TREE_DEPTH, MAX_TREE_DEPTH)
    }

    pub fn clamp_names_limit(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or(self.default_names_limit)
            .clamp(1, self.max_names_limit)
    }

    pub fn clamp_search_limit(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or(self.default_search_limit)
            .clamp(1, self.max_search_limit)
    }
}
