//! Product repository.

use campus_market_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::Product;
use crate::store::{self, Collection, RecordStore};

/// Repository for live listings.
pub struct ProductRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: RecordStore> ProductRepository<'a, S> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// All live listings in stored order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(store::load(self.store, Collection::Products).await?)
    }

    /// Get a listing by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.list().await?.into_iter().find(|p| &p.id == id))
    }

    /// Listings posted by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn by_seller(&self, seller: &UserId) -> Result<Vec<Product>, RepositoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|p| &p.seller_id == seller)
            .collect())
    }

    /// Append a new listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is already listed.
    pub async fn create(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut products = self.list().await?;
        if products.iter().any(|p| p.id == product.id) {
            return Err(RepositoryError::Conflict(format!(
                "product {} already exists",
                product.id
            )));
        }
        products.push(product.clone());
        store::save(self.store, Collection::Products, &products).await?;
        Ok(product)
    }

    /// Replace an existing listing, matched by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing is gone.
    pub async fn update(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut products = self.list().await?;
        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = product.clone();
        store::save(self.store, Collection::Products, &products).await?;
        Ok(product)
    }

    /// Remove a listing.
    ///
    /// Removing an id that is not listed is not an error and does not write.
    ///
    /// # Returns
    ///
    /// Returns `true` if the listing was removed, `false` if it was already gone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read or written.
    pub async fn remove(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let mut products = self.list().await?;
        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == before {
            return Ok(false);
        }
        store::save(self.store, Collection::Products, &products).await?;
        Ok(true)
    }

    /// Replace the whole collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn replace_all(&self, products: &[Product]) -> Result<(), RepositoryError> {
        Ok(store::save(self.store, Collection::Products, products).await?)
    }
}
