//! Parsing of raw, string-typed request parameters.
//!
//! These helpers sit between an HTTP layer and the query façade. Scalar
//! parameters are strict and fail with `Validation`; comma-separated lists
//! are permissive and drop entries they cannot use.

use serde::Deserialize;

use super::filter::NodeFilters;
use super::highlight::HighlightSet;
use super::request::SubtreeRequest;
use crate::config::{MAX_TREE_DEPTH, MIN_TREE_DEPTH};
use crate::error::{PrefixIndexError, Result};
use crate::types::{Gender, NameId};

/// Raw parameters of a subtree fetch, as received from a query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    pub prefix: String,
    pub max_depth: Option<String>,
    pub gender: Option<String>,
    pub origin_country: Option<String>,
    pub min_popularity: Option<String>,
    pub max_popularity: Option<String>,
    pub highlight_prefixes: String,
    pub highlight_name_ids: String,
    pub include_names: bool,
}

/// Parses an optional gender; blank means no filter.
pub fn parse_gender(raw: Option<&str>) -> Result<Option<Gender>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// Parses a tree depth and clamps it into `[1, 10]`.
pub fn parse_max_depth(raw: &str) -> Result<usize> {
    let depth: i64 = raw.trim().parse().map_err(|_| {
        PrefixIndexError::Validation(format!("max_depth must be an integer, got {raw:?}"))
    })?;
    let clamped = depth.clamp(MIN_TREE_DEPTH as i64, MAX_TREE_DEPTH as i64);
    Ok(clamped as usize)
}

/// Parses an optional popularity bound; blank means no bound.
pub fn parse_popularity(name: &str, raw: Option<&str>) -> Result<Option<f64>> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
        _ => Err(PrefixIndexError::Validation(format!(
            "{name} must be a number, got {value:?}"
        ))),
    }
}

/// Splits a comma-separated prefix list, dropping blank entries.
pub fn parse_highlight_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a comma-separated id list, dropping blank and non-numeric entries.
pub fn parse_highlight_name_ids(raw: &str) -> Vec<NameId> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<u64>() {
            Ok(id) => Some(NameId(id)),
            Err(_) => {
                log::debug!("dropping unparseable highlight name id {entry:?}");
                None
            }
        })
        .collect()
}

impl SubtreeRequest {
    /// Validates raw parameters into a request.
    pub fn from_params(params: &TreeParams) -> Result<Self> {
        let max_depth = params
            .max_depth
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(parse_max_depth)
            .transpose()?;

        let filters = NodeFilters {
            gender: parse_gender(params.gender.as_deref())?,
            origin_country: params.origin_country.clone(),
            min_popularity: parse_popularity("min_popularity", params.min_popularity.as_deref())?,
            max_popularity: parse_popularity("max_popularity", params.max_popularity.as_deref())?,
        }
        .normalized();

        let highlight = HighlightSet::new(
            parse_highlight_prefixes(&params.highlight_prefixes),
            parse_highlight_name_ids(&params.highlight_name_ids),
        );

        Ok(SubtreeRequest {
            root_prefix: params.prefix.clone(),
            max_depth,
            filters,
            highlight,
            include_leaf_detail: params.include_names,
        })
    }
}
