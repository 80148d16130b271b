//! Status enums for various records.
//!
//! All of these are persisted as lowercase strings, so `Display`/`FromStr`
//! and serde agree on the spelling.

use serde::{Deserialize, Serialize};

/// A status string that does not name any known state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized {kind}: {value:?}")]
pub struct UnknownStatus {
    /// Which kind of status was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Order lifecycle status.
///
/// `Pending` is the only non-terminal state: it may move to `Completed` or
/// `Canceled`, and nothing moves out of either of those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    #[serde(alias = "cancelled")]
    Canceled,
}

impl OrderStatus {
    /// Returns `true` for states no transition may leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    /// Returns `true` if `self -> next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed | Self::Canceled)
        )
    }

    /// The persisted spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            _ => Err(UnknownStatus {
                kind: "order status",
                value: s.to_owned(),
            }),
        }
    }
}

/// Forum question status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    #[default]
    Pending,
    Answered,
}

impl std::fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Answered => write!(f, "answered"),
        }
    }
}

impl std::str::FromStr for QuestionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "answered" => Ok(Self::Answered),
            _ => Err(UnknownStatus {
                kind: "question status",
                value: s.to_owned(),
            }),
        }
    }
}

/// How a discount code or sale promotion reduces a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `amount` is a percentage of the eligible subtotal.
    Percent,
    /// `amount` is a flat dollar reduction.
    Fixed,
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percent => write!(f, "percent"),
            Self::Fixed => write!(f, "fixed"),
        }
    }
}

impl std::str::FromStr for DiscountKind {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percent" | "%" => Ok(Self::Percent),
            "fixed" | "$" => Ok(Self::Fixed),
            _ => Err(UnknownStatus {
                kind: "discount type",
                value: s.to_owned(),
            }),
        }
    }
}
