//! Scope level ordering.
//!
//! Every truncation decision in the drill stack is made by comparing levels,
//! so the order declared here is the single source of truth:
//!
//! `Root < Region < SubRegion < Leaf < Custom`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Kind of scope in the drill hierarchy.
///
/// Variant order is the level order; `Ord` is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeLevel {
    /// App-level starting scope (e.g. the whole country).
    Root,
    /// Top administrative scope below the root.
    Region,
    /// District within a region.
    SubRegion,
    /// Narrowest administrative scope (sub-district).
    Leaf,
    /// Ad-hoc selection drawn below any administrative scope.
    Custom,
}

impl ScopeLevel {
    /// Returns the wire tag used in query tokens.
    pub fn as_tag(&self) -> &'static str {
        match self {
            ScopeLevel::Root => "root",
            ScopeLevel::Region => "region",
            ScopeLevel::SubRegion => "sub_region",
            ScopeLevel::Leaf => "leaf",
            ScopeLevel::Custom => "custom",
        }
    }

    /// Returns the human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ScopeLevel::Root => "Root",
            ScopeLevel::Region => "Region",
            ScopeLevel::SubRegion => "Sub-region",
            ScopeLevel::Leaf => "Leaf",
            ScopeLevel::Custom => "Custom",
        }
    }

    /// Parse a wire tag exactly (no normalization).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "root" => Some(ScopeLevel::Root),
            "region" => Some(ScopeLevel::Region),
            "sub_region" => Some(ScopeLevel::SubRegion),
            "leaf" => Some(ScopeLevel::Leaf),
            "custom" => Some(ScopeLevel::Custom),
            _ => None,
        }
    }

    /// All levels, shallowest first.
    pub const fn all() -> &'static [ScopeLevel] {
        &[
            ScopeLevel::Root,
            ScopeLevel::Region,
            ScopeLevel::SubRegion,
            ScopeLevel::Leaf,
            ScopeLevel::Custom,
        ]
    }
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for ScopeLevel {
    type Err = ModelError;

    /// Parse a level from user input.
    /// Accepts wire tags case-insensitively, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "subregion" | "district" => Ok(ScopeLevel::SubRegion),
            other => {
                ScopeLevel::from_tag(other).ok_or_else(|| ModelError::UnknownLevel(s.to_string()))
            }
        }
    }
}
