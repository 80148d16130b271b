//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login and profile changes
//! - `listings` - Posting, editing and browsing products
//! - `orders` - Checkout and the order status lifecycle
//! - `pricing` - Sale, tax and discount arithmetic
//! - `forum` - Community questions and admin answers
//! - `admin` - Admin console and data maintenance
//!
//! Services borrow a [`crate::store::RecordStore`] and are cheap to build per
//! call; [`crate::state::AppState`] hands them out.

pub mod admin;
pub mod auth;
pub mod forum;
pub mod listings;
pub mod orders;
pub mod pricing;
