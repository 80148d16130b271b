//! Unified error handling.
//!
//! Every service operation returns [`Result<T>`]. The variants follow the
//! marketplace's error taxonomy: validation problems are reported back to the
//! user, missing records and illegal transitions abort one operation, and
//! storage failures are always surfaced.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::store::StoreError;

/// Application-level error type for marketplace operations.
#[derive(Debug, Error)]
pub enum MarketError {
    /// A referenced user, product, order or question does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing required field, non-positive price, malformed email and the like.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Status change from a terminal state or to a state that is not reachable.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// The acting user may not perform this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Registration or login failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// The record store failed or holds corrupt data.
    #[error("Storage failure: {0}")]
    Storage(#[source] RepositoryError),
}

impl MarketError {
    /// Whether the message is meant for the person who triggered it, as
    /// opposed to an operator.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl From<RepositoryError> for MarketError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("record not found".to_owned()),
            RepositoryError::Conflict(msg) => Self::InvalidInput(msg),
            other => Self::Storage(other),
        }
    }
}

impl From<StoreError> for MarketError {
    fn from(err: StoreError) -> Self {
        Self::Storage(RepositoryError::Store(err))
    }
}

/// Result type alias for `MarketError`.
pub type Result<T> = std::result::Result<T, MarketError>;
