//! Listing metadata: item condition and the fixed category list.

use serde::{Deserialize, Serialize};

/// Categories a listing may be filed under.
pub const CATEGORIES: &[&str] = &[
    "Electronics",
    "Books",
    "Clothing",
    "Furniture",
    "Sports Equipment",
    "School Supplies",
    "Dorm Essentials",
    "Video Games",
    "Musical Instruments",
    "Miscellaneous",
];

/// Returns `true` if `category` is one of [`CATEGORIES`] (exact match).
#[must_use]
pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

/// The [`CATEGORIES`] entry equal to `category` ignoring case and surrounding
/// whitespace.
#[must_use]
pub fn canonical_category(category: &str) -> Option<&'static str> {
    let category = category.trim();
    CATEGORIES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(category))
}

/// A condition string that is not one of the fixed values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized condition: {0:?}")]
pub struct UnknownCondition(pub String);

/// Physical condition of a listed item.
///
/// Persisted with the human-readable labels shown to buyers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Condition {
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Like New")]
    LikeNew,
    #[serde(rename = "Used - Excellent")]
    UsedExcellent,
    #[default]
    #[serde(rename = "Used - Good")]
    UsedGood,
    #[serde(rename = "Used - Fair")]
    UsedFair,
    #[serde(rename = "Used - Poor")]
    UsedPoor,
}

impl Condition {
    /// Every condition, best first.
    pub const ALL: [Self; 6] = [
        Self::New,
        Self::LikeNew,
        Self::UsedExcellent,
        Self::UsedGood,
        Self::UsedFair,
        Self::UsedPoor,
    ];

    /// The persisted label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::LikeNew => "Like New",
            Self::UsedExcellent => "Used - Excellent",
            Self::UsedGood => "Used - Good",
            Self::UsedFair => "Used - Fair",
            Self::UsedPoor => "Used - Poor",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Condition {
    type Err = UnknownCondition;

    /// Accepts the label (`"Like New"`) or a dashed slug (`"like-new"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        let slug = |label: &str| {
            label
                .to_ascii_lowercase()
                .replace(" - ", "-")
                .replace(' ', "-")
        };
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted) || slug(c.label()) == slug(wanted))
            .ok_or_else(|| UnknownCondition(s.to_owned()))
    }
}
