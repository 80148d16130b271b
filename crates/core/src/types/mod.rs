//! Core types for Campus Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod listing;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use listing::{CATEGORIES, Condition, UnknownCondition, canonical_category, is_known_category};
pub use price::{Price, PriceError, TAX_RATE};
pub use status::*;
