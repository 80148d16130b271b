//! Record store: named collections of flat records persisted as CSV text.
//!
//! # Layout
//!
//! Each [`Collection`] is one text blob stored under `csv_<name>`:
//!
//! - `csv_users` - accounts ([`crate::models::User`])
//! - `csv_products` - live listings ([`crate::models::Product`])
//! - `csv_orders` - order history ([`crate::models::Order`])
//! - `csv_discounts` - discount codes ([`crate::models::Discount`])
//! - `csv_questions` - forum questions ([`crate::models::Question`])
//! - `csv_sales` - sale promotions ([`crate::models::SalePromotion`])
//!
//! `save` always replaces a whole collection with a single write. There is
//! no cross-process locking: two writers on one collection race and the last
//! write wins.

pub mod codec;
mod file;
mod memory;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use codec::{CodecError, Record};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Key of the marker written once sample data has been seeded.
pub const INITIALIZED_KEY: &str = "hasInitialized";

/// A named set of records of one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Products,
    Orders,
    Discounts,
    Questions,
    Sales,
}

impl Collection {
    /// Every collection, in seeding order.
    pub const ALL: [Self; 6] = [
        Self::Users,
        Self::Products,
        Self::Orders,
        Self::Discounts,
        Self::Questions,
        Self::Sales,
    ];

    /// Short collection name (`products`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Discounts => "discounts",
            Self::Questions => "questions",
            Self::Sales => "sales",
        }
    }

    /// Storage key the collection's blob lives under (`csv_products`).
    #[must_use]
    pub fn key(self) -> String {
        format!("csv_{}", self.name())
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Collection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::UnknownCollection(s.to_owned()))
    }
}

/// Errors raised by the persistence medium.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the medium failed.
    #[error("storage I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A write would exceed the medium's capacity.
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Stored text could not be decoded (or records could not be encoded).
    #[error("corrupt collection {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: CodecError,
    },

    /// No collection has this name.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}

/// A synchronous-from-the-caller key/value medium holding text blobs.
///
/// Implementations must make `write` all-or-nothing for a single key.
pub trait RecordStore: Send + Sync {
    /// Read the blob stored under `key`, or `None` if it was never written.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Replace the blob stored under `key`.
    fn write(&self, key: &str, blob: String)
    -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Load a collection as typed records. Never-written collections are empty.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` if a row does not match `T`'s schema, or
/// the medium's error if the read fails.
pub async fn load<S, T>(store: &S, collection: Collection) -> Result<Vec<T>, StoreError>
where
    S: RecordStore,
    T: DeserializeOwned,
{
    let key = collection.key();
    let Some(blob) = store.read(&key).await? else {
        return Ok(Vec::new());
    };
    codec::decode(&blob).map_err(|source| StoreError::Corrupt { key, source })
}

/// Replace a collection with `rows` in a single write.
///
/// # Errors
///
/// Returns the medium's error if the write fails (including quota errors).
pub async fn save<S, T>(store: &S, collection: Collection, rows: &[T]) -> Result<(), StoreError>
where
    S: RecordStore,
    T: Serialize,
{
    let key = collection.key();
    let blob = codec::encode(rows).map_err(|source| StoreError::Corrupt {
        key: key.clone(),
        source,
    })?;
    tracing::debug!(collection = %collection, rows = rows.len(), bytes = blob.len(), "Saving collection");
    store.write(&key, blob).await
}

/// Load a collection as untyped string maps.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` for malformed text.
pub async fn load_records<S: RecordStore>(
    store: &S,
    collection: Collection,
) -> Result<Vec<Record>, StoreError> {
    let key = collection.key();
    let Some(blob) = store.read(&key).await? else {
        return Ok(Vec::new());
    };
    codec::decode_records(&blob).map_err(|source| StoreError::Corrupt { key, source })
}

/// Replace a collection with untyped string maps.
///
/// # Errors
///
/// Returns the medium's error if the write fails.
pub async fn save_records<S: RecordStore>(
    store: &S,
    collection: Collection,
    records: &[Record],
) -> Result<(), StoreError> {
    let key = collection.key();
    let blob = codec::encode_records(records).map_err(|source| StoreError::Corrupt {
        key: key.clone(),
        source,
    })?;
    store.write(&key, blob).await
}
