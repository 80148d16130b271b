//! Order repository.

use campus_market_core::{OrderId, UserId};

use super::RepositoryError;
use crate::models::Order;
use crate::store::{self, Collection, RecordStore};

/// Repository for order history. Orders are appended and updated, never removed.
pub struct OrderRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: RecordStore> OrderRepository<'a, S> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Every order in stored order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(store::load(self.store, Collection::Orders).await?)
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.list().await?.into_iter().find(|o| &o.id == id))
    }

    /// Orders placed by `buyer`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn by_buyer(&self, buyer: &UserId) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|o| o.is_buyer(buyer))
            .collect())
    }

    /// Orders for listings sold by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn by_seller(&self, seller: &UserId) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|o| o.is_seller(seller))
            .collect())
    }

    /// Append `new_orders` with a single write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if any id is already used; nothing
    /// is written in that case.
    pub async fn append(&self, new_orders: &[Order]) -> Result<(), RepositoryError> {
        if new_orders.is_empty() {
            return Ok(());
        }
        let mut orders = self.list().await?;
        if let Some(dup) = new_orders
            .iter()
            .find(|n| orders.iter().any(|o| o.id == n.id))
        {
            return Err(RepositoryError::Conflict(format!(
                "order {} already exists",
                dup.id
            )));
        }
        orders.extend_from_slice(new_orders);
        store::save(self.store, Collection::Orders, &orders).await?;
        Ok(())
    }

    /// Replace an existing order, matched by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn update(&self, order: Order) -> Result<Order, RepositoryError> {
        let mut orders = self.list().await?;
        let slot = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = order.clone();
        store::save(self.store, Collection::Orders, &orders).await?;
        Ok(order)
    }

    /// Replace the whole collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn replace_all(&self, orders: &[Order]) -> Result<(), RepositoryError> {
        Ok(store::save(self.store, Collection::Orders, orders).await?)
    }
}
