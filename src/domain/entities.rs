//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Earliest year accepted by a [`YearRange`].
pub const MIN_YEAR: i32 = 1900;
/// Latest year accepted by a [`YearRange`].
pub const MAX_YEAR: i32 = 2023;

/// Whether an aid appeal was issued for a disaster record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Appeal {
    Yes,
    No,
}

impl Appeal {
    /// Interpret a raw `Appeal` cell. Only the literal `Yes` counts as an appeal.
    pub fn from_field(value: &str) -> Self {
        if value.trim() == "Yes" {
            Appeal::Yes
        } else {
            Appeal::No
        }
    }
}

impl fmt::Display for Appeal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Appeal::Yes => write!(f, "Yes"),
            Appeal::No => write!(f, "No"),
        }
    }
}

/// One validated dataset row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Start year of the disaster, used for range filtering
    pub start_year: i32,
    /// Year of the aid-appeal event, used as leaf label
    pub year: i32,
    pub appeal: Appeal,
    pub country: String,
    pub continent: String,
}

impl Record {
    pub fn new(
        start_year: i32,
        year: i32,
        appeal: Appeal,
        country: impl Into<String>,
        continent: impl Into<String>,
    ) -> Self {
        Self {
            start_year,
            year,
            appeal,
            country: country.into(),
            continent: continent.into(),
        }
    }
}

/// Inclusive year interval within `[MIN_YEAR, MAX_YEAR]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    /// Create a validated range.
    ///
    /// Fails if either bound lies outside `[MIN_YEAR, MAX_YEAR]` or if `min > max`.
    pub fn new(min: i32, max: i32) -> Result<Self, DomainError> {
        for year in [min, max] {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(DomainError::YearOutOfBounds {
                    year,
                    min: MIN_YEAR,
                    max: MAX_YEAR,
                });
            }
        }
        if min > max {
            return Err(DomainError::InvertedYearRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// The whole selectable domain.
    pub fn full() -> Self {
        Self {
            min: MIN_YEAR,
            max: MAX_YEAR,
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }

    /// Navigation path carrying the range as two trailing segments.
    pub fn route(&self, base: &str) -> String {
        format!("{}/{}/{}", base.trim_end_matches('/'), self.min, self.max)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Node of the rendered hierarchy. Leaves carry no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of levels below and including this node.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(0)
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(TreeNode::leaf_count).sum()
        }
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Names of the direct children, in order.
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Per-country summary of the event years found in one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryAggregate {
    pub country: String,
    pub continent: String,
    /// Event years in row encounter order, duplicates kept
    pub years: Vec<i32>,
}

impl CountryAggregate {
    pub fn new(country: impl Into<String>, continent: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            continent: continent.into(),
            years: Vec::new(),
        }
    }
}

/// Labels and limits applied when building a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    pub root_label: String,
    pub yes_label: String,
    pub no_label: String,
    /// Maximum number of characters kept from a country name
    pub name_width: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            root_label: "Appealed for aid?".into(),
            yes_label: "Yes".into(),
            no_label: "No".into(),
            name_width: 14,
        }
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string.
///
/// Returns the input unchanged if expansion fails.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_bounds_outside_domain_when_creating_range_then_fails() {
        assert!(YearRange::new(1899, 2000).is_err());
        assert!(YearRange::new(1950, 2024).is_err());
    }

    #[test]
    fn given_inverted_bounds_when_creating_range_then_fails() {
        let err = YearRange::new(2000, 1990).unwrap_err();
        assert!(matches!(err, DomainError::InvertedYearRange { .. }));
    }

    #[test]
    fn given_single_year_range_when_checking_contains_then_bounds_are_inclusive() {
        let range = YearRange::new(2000, 2000).unwrap();
        assert!(range.contains(2000));
        assert!(!range.contains(1999));
        assert!(!range.contains(2001));
    }

    #[test]
    fn given_base_with_trailing_slash_when_routing_then_appends_segments() {
        let range = YearRange::new(1990, 2010).unwrap();
        assert_eq!(range.route("/aid-politics-yes/"), "/aid-politics-yes/1990/2010");
    }

    #[test]
    fn given_appeal_cells_when_parsing_then_only_literal_yes_is_yes() {
        assert_eq!(Appeal::from_field("Yes"), Appeal::Yes);
        assert_eq!(Appeal::from_field(" Yes "), Appeal::Yes);
        assert_eq!(Appeal::from_field("yes"), Appeal::No);
        assert_eq!(Appeal::from_field(""), Appeal::No);
    }

    #[test]
    fn given_leaf_node_when_serializing_then_omits_children() {
        let json = serde_json::to_string(&TreeNode::leaf("2001")).unwrap();
        assert_eq!(json, r#"{"name":"2001"}"#);
    }
}
