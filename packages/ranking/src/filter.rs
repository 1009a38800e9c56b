//! Display filters over a resource list.
//!
//! Each predicate is independent and skipped when inactive, so the order
//! they are checked in does not change the result set.

use std::fmt;
use std::str::FromStr;

use resource_map_resource_models::{Resource, ResourceCategory};
use serde::Deserialize;

/// Category selection: every category or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum CategoryFilter {
    /// No category restriction.
    #[default]
    All,
    /// Only resources of this category.
    Only(ResourceCategory),
}

impl CategoryFilter {
    /// Returns `true` if `category` passes this filter.
    #[must_use]
    pub fn accepts(self, category: ResourceCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

/// Error for a category name that is neither `All` nor a known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category {value:?}: expected All, Food, Health, Shelter or Unclassified")]
pub struct UnknownCategoryError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for CategoryFilter {
    type Err = UnknownCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<ResourceCategory>()
            .map(Self::Only)
            .map_err(|_| UnknownCategoryError {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = UnknownCategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(category) => write!(f, "{category}"),
        }
    }
}

/// The combined display filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Category restriction.
    pub category: CategoryFilter,
    /// Keep only resources tagged `wheelchair=yes`.
    pub wheelchair_only: bool,
    /// Case-insensitive substring matched against name or address.
    /// Blank text disables the predicate.
    pub text: String,
}

impl ResourceFilter {
    /// Returns `true` if `resource` passes every active predicate.
    #[must_use]
    pub fn matches(&self, resource: &Resource) -> bool {
        if !self.category.accepts(resource.category) {
            return false;
        }

        if self.wheelchair_only && !resource.wheelchair {
            return false;
        }

        if self.text.trim().is_empty() {
            return true;
        }

        // Surrounding whitespace is part of the needle once it is active.
        let needle = self.text.to_lowercase();

        resource.name.to_lowercase().contains(&needle)
            || resource.address.to_lowercase().contains(&needle)
    }
}
