//! Repositories over the record store.
//!
//! Each repository borrows a [`RecordStore`] and works on one collection.
//! Every mutation loads the whole collection, edits it in memory and saves
//! it back in a single write.
//!
//! # Collections
//!
//! - [`users::UserRepository`] - `csv_users`
//! - [`products::ProductRepository`] - `csv_products`
//! - [`orders::OrderRepository`] - `csv_orders`
//! - [`discounts::DiscountRepository`] - `csv_discounts`
//! - [`discounts::SaleRepository`] - `csv_sales`
//! - [`questions::QuestionRepository`] - `csv_questions`

pub mod discounts;
pub mod orders;
pub mod products;
pub mod questions;
pub mod users;

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The record store failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Requested record was not found.
    #[error("not found")]
    NotFound,

    /// Uniqueness violation (e.g., duplicate email or code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}
