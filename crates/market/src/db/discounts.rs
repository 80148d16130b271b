//! Discount code and sale promotion repositories.

use campus_market_core::{DiscountId, SaleId};

use super::RepositoryError;
use crate::models::{Discount, SalePromotion};
use crate::store::{self, Collection, RecordStore};

/// Repository for discount codes.
pub struct DiscountRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: RecordStore> DiscountRepository<'a, S> {
    /// Create a new discount repository.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// All discount codes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn list(&self) -> Result<Vec<Discount>, RepositoryError> {
        Ok(store::load(self.store, Collection::Discounts).await?)
    }

    /// Find a discount by code, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Discount>, RepositoryError> {
        let code = code.trim();
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|d| d.code.eq_ignore_ascii_case(code)))
    }

    /// Add a discount code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists.
    pub async fn create(&self, discount: Discount) -> Result<Discount, RepositoryError> {
        let mut discounts = self.list().await?;
        if discounts
            .iter()
            .any(|d| d.code.eq_ignore_ascii_case(&discount.code))
        {
            return Err(RepositoryError::Conflict(format!(
                "discount code {} already exists",
                discount.code
            )));
        }
        discounts.push(discount.clone());
        store::save(self.store, Collection::Discounts, &discounts).await?;
        Ok(discount)
    }

    /// Delete a discount code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no discount has this id.
    pub async fn delete(&self, id: &DiscountId) -> Result<(), RepositoryError> {
        let mut discounts = self.list().await?;
        let before = discounts.len();
        discounts.retain(|d| &d.id != id);
        if discounts.len() == before {
            return Err(RepositoryError::NotFound);
        }
        store::save(self.store, Collection::Discounts, &discounts).await?;
        Ok(())
    }

    /// Replace the whole collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn replace_all(&self, discounts: &[Discount]) -> Result<(), RepositoryError> {
        Ok(store::save(self.store, Collection::Discounts, discounts).await?)
    }
}

/// Repository for sale promotions.
pub struct SaleRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: RecordStore> SaleRepository<'a, S> {
    /// Create a new sale repository.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// All sale promotions, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn list(&self) -> Result<Vec<SalePromotion>, RepositoryError> {
        Ok(store::load(self.store, Collection::Sales).await?)
    }

    /// Add a sale promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn create(&self, sale: SalePromotion) -> Result<SalePromotion, RepositoryError> {
        let mut sales = self.list().await?;
        sales.push(sale.clone());
        store::save(self.store, Collection::Sales, &sales).await?;
        Ok(sale)
    }

    /// Delete a sale promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no sale has this id.
    pub async fn delete(&self, id: &SaleId) -> Result<(), RepositoryError> {
        let mut sales = self.list().await?;
        let before = sales.len();
        sales.retain(|s| &s.id != id);
        if sales.len() == before {
            return Err(RepositoryError::NotFound);
        }
        store::save(self.store, Collection::Sales, &sales).await?;
        Ok(())
    }

    /// Replace the whole collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn replace_all(&self, sales: &[SalePromotion]) -> Result<(), RepositoryError> {
        Ok(store::save(self.store, Collection::Sales, sales).await?)
    }
}
