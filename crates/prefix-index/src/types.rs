//! Core value types shared by the builder, the store and the query façade.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PrefixIndexError;

/// Identifier of a name record in the name source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameId(pub u64);

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for NameId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Gender category of a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unisex,
    Neutral,
}

impl Gender {
    pub const ALL: [Gender; 4] = [Self::Male, Self::Female, Self::Unisex, Self::Neutral];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unisex => "unisex",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = PrefixIndexError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "unisex" => Ok(Self::Unisex),
            "neutral" => Ok(Self::Neutral),
            other => Err(PrefixIndexError::Validation(format!(
                "unknown gender {other:?}, expected one of male, female, unisex, neutral"
            ))),
        }
    }
}

/// A name record as provided by the name source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRecord {
    pub id: NameId,
    pub name: String,
    pub gender: Gender,
    pub origin_country: Option<String>,
    pub popularity: f64,
}

impl NameRecord {
    pub fn new(id: u64, name: impl Into<String>, gender: Gender, popularity: f64) -> Self {
        Self {
            id: NameId(id),
            name: name.into(),
            gender,
            origin_country: None,
            popularity,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin_country = Some(origin.into());
        self
    }
}

/// Per-category name counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderCounts {
    pub male: u64,
    pub female: u64,
    pub unisex: u64,
    pub neutral: u64,
}

impl GenderCounts {
    pub fn get(&self, gender: Gender) -> u64 {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
            Gender::Unisex => self.unisex,
            Gender::Neutral => self.neutral,
        }
    }

    pub fn increment(&mut self, gender: Gender) {
        match gender {
            Gender::Male => self.male += 1,
            Gender::Female => self.female += 1,
            Gender::Unisex => self.unisex += 1,
            Gender::Neutral => self.neutral += 1,
        }
    }

    pub fn add(&mut self, other: &GenderCounts) {
        self.male += other.male;
        self.female += other.female;
        self.unisex += other.unisex;
        self.neutral += other.neutral;
    }

    pub fn total(&self) -> u64 {
        self.male + self.female + self.unisex + self.neutral
    }

    /// True when `gender` is present and every other category is empty.
    pub fn is_exclusively(&self, gender: Gender) -> bool {
        self.get(gender) > 0
            && Gender::ALL
                .iter()
                .filter(|other| **other != gender)
                .all(|other| self.get(*other) == 0)
    }
}

/// Popularity bounds and mean over a set of names. Zeroed when empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PopularityRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Running popularity statistics used while aggregating.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopularityAccumulator {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

impl PopularityAccumulator {
    /// Seeds an accumulator from an already finalized range over `count` names.
    pub fn from_range(range: &PopularityRange, count: u64) -> Self {
        if count == 0 {
            return Self::default();
        }
        Self {
            min: range.min,
            max: range.max,
            sum: range.avg * count as f64,
            count,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &PopularityAccumulator) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn finish(&self) -> PopularityRange {
        if self.count == 0 {
            return PopularityRange::default();
        }
        // Clamp so rounding in the mean can never escape [min, max].
        let avg = (self.sum / self.count as f64).clamp(self.min, self.max);
        PopularityRange {
            min: self.min,
            max: self.max,
            avg,
        }
    }
}

/// Why a node was highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightReason {
    PrefixMatch,
    NameSelected,
}

impl HighlightReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrefixMatch => "prefix_match",
            Self::NameSelected => "name_selected",
        }
    }
}
