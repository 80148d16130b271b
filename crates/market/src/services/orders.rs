//! Order lifecycle: checkout, status transitions and order views.
//!
//! # State machine
//!
//! ```text
//! pending --(seller/admin completes)--> completed
//! pending --(buyer/seller/admin cancels)--> canceled
//! ```
//!
//! Both end states are terminal. Completing an order removes its product from
//! the listings. The removal is written before the status so that a failure
//! between the two writes leaves a pending order whose retry succeeds, never a
//! completed order pointing at a still-listed product.

use chrono::{DateTime, Utc};

use campus_market_core::{OrderId, OrderStatus, ProductId, UserId};

use super::pricing::{self, Quote};
use crate::db::discounts::{DiscountRepository, SaleRepository};
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::{MarketError, Result};
use crate::models::{Adjustment, CurrentUser, Order, Product};
use crate::session::Session;
use crate::store::RecordStore;

/// Why a cart line did not become an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The product was sold or deleted since it was carted.
    NotListed,
    /// The listing has no seller id or seller name.
    MissingSeller,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotListed => write!(f, "no longer listed"),
            Self::MissingSeller => write!(f, "missing seller information"),
        }
    }
}

/// A cart line that did not become an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub product_id: ProductId,
    pub title: String,
    pub reason: SkipReason,
}

impl SkippedItem {
    fn new(item: &Product, reason: SkipReason) -> Self {
        Self {
            product_id: item.id.clone(),
            title: item.title.clone(),
            reason,
        }
    }
}

/// Result of a checkout: the orders written and the lines that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub orders: Vec<Order>,
    pub skipped: Vec<SkippedItem>,
}

impl CheckoutOutcome {
    /// Whether every cart line became an order.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Order lifecycle manager.
pub struct OrderService<'a, S> {
    orders: OrderRepository<'a, S>,
    products: ProductRepository<'a, S>,
    users: UserRepository<'a, S>,
    discounts: DiscountRepository<'a, S>,
    sales: SaleRepository<'a, S>,
}

impl<'a, S: RecordStore> OrderService<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            orders: OrderRepository::new(store),
            products: ProductRepository::new(store),
            users: UserRepository::new(store),
            discounts: DiscountRepository::new(store),
            sales: SaleRepository::new(store),
        }
    }

    /// Turn every cart line into a `pending` order.
    ///
    /// Each line is resolved against the live listings and ordered at the
    /// stored price. The seller's current email is looked up by id and tax is
    /// 8.25% of the line price. Lines that are no longer listed or lack a
    /// seller id or name are skipped and reported; the rest are appended with
    /// a single write.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` for an empty cart and
    /// `MarketError::Storage` if the orders cannot be written (no order is
    /// persisted in that case).
    pub async fn checkout(&self, cart: &[Product], buyer: &CurrentUser) -> Result<CheckoutOutcome> {
        if cart.is_empty() {
            return Err(MarketError::InvalidInput("cart is empty".to_owned()));
        }

        let listed = self.products.list().await?;
        let directory = self.users.email_directory().await?;
        let now = Utc::now();
        let mut outcome = CheckoutOutcome::default();

        for item in cart {
            let Some(product) = listed.iter().find(|p| p.id == item.id) else {
                tracing::warn!(product_id = %item.id, "Skipping cart item that is no longer listed");
                outcome.skipped.push(SkippedItem::new(item, SkipReason::NotListed));
                continue;
            };
            if !product.has_seller_identity() {
                tracing::warn!(product_id = %item.id, "Skipping cart item without seller identity");
                outcome.skipped.push(SkippedItem::new(item, SkipReason::MissingSeller));
                continue;
            }

            let seller_email = directory.get(&product.seller_id).cloned();
            if seller_email.is_none() {
                tracing::warn!(seller_id = %product.seller_id, "Seller email not found");
            }

            outcome.orders.push(Order {
                id: OrderId::generate(),
                buyer_id: buyer.id.clone(),
                buyer_name: buyer.name.clone(),
                buyer_email: Some(buyer.email.clone()),
                seller_id: product.seller_id.clone(),
                seller_name: product.seller_name.clone(),
                seller_email,
                product_id: product.id.clone(),
                product_title: product.title.clone(),
                product_image: Some(product.image_url.clone()).filter(|url| !url.is_empty()),
                category: Some(product.category.clone()),
                condition: Some(product.condition),
                price: product.price.with_tax(),
                subtotal: product.price,
                tax: product.price.tax(),
                status: OrderStatus::Pending,
                created_at: now,
                updated_at: None,
                completed_at: None,
            });
        }

        self.orders.append(&outcome.orders).await?;

        tracing::info!(
            buyer_id = %buyer.id,
            created = outcome.orders.len(),
            skipped = outcome.skipped.len(),
            "Checkout finished"
        );
        Ok(outcome)
    }

    /// Check out the session's cart as its logged-in user.
    ///
    /// After the orders are persisted the cart is cleared once. If lines were
    /// skipped for missing seller details the cart keeps exactly those; lines
    /// that are no longer listed are dropped. New orders are mirrored into the
    /// session's order cache.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` if nobody is logged in, plus the
    /// errors of [`Self::checkout`]. The cart is untouched on error.
    pub async fn checkout_session(&self, session: &mut Session) -> Result<CheckoutOutcome> {
        let buyer = session
            .user()
            .cloned()
            .ok_or_else(|| MarketError::Forbidden("log in to check out".to_owned()))?;

        let outcome = self.checkout(session.cart(), &buyer).await?;

        let keep: Vec<&ProductId> = outcome
            .skipped
            .iter()
            .filter(|s| s.reason == SkipReason::MissingSeller)
            .map(|s| &s.product_id)
            .collect();
        if keep.is_empty() {
            session.clear_cart();
        } else {
            session.retain_cart(|p| keep.contains(&&p.id));
        }
        for order in &outcome.orders {
            session.mirror_order(order.clone());
        }
        Ok(outcome)
    }

    /// Move an order to `new_status`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` if the order does not exist.
    /// Returns `MarketError::InvalidTransition` if the order is terminal or the
    /// target is not reachable; nothing is written in that case.
    pub async fn set_status(&self, order_id: &OrderId, new_status: OrderStatus) -> Result<Order> {
        let order = self.find(order_id).await?;
        self.transition(order, new_status, Utc::now()).await
    }

    /// [`Self::set_status`] on behalf of `actor`.
    ///
    /// Completion is allowed for the order's seller or an admin; cancellation
    /// for its buyer, its seller or an admin.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` if `actor` may not make this change,
    /// plus the errors of [`Self::set_status`].
    pub async fn set_status_as(
        &self,
        actor: &CurrentUser,
        order_id: &OrderId,
        new_status: OrderStatus,
    ) -> Result<Order> {
        let order = self.find(order_id).await?;

        let allowed = actor.is_admin
            || match new_status {
                OrderStatus::Completed => order.is_seller(&actor.id),
                OrderStatus::Canceled | OrderStatus::Pending => {
                    order.is_seller(&actor.id) || order.is_buyer(&actor.id)
                }
            };
        if !allowed {
            return Err(MarketError::Forbidden(format!(
                "you cannot mark order {order_id} {new_status}"
            )));
        }

        self.transition(order, new_status, Utc::now()).await
    }

    async fn find(&self, order_id: &OrderId) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("order {order_id}")))
    }

    async fn transition(
        &self,
        mut order: Order,
        new_status: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        if !order.status.can_transition_to(new_status) {
            return Err(MarketError::InvalidTransition(format!(
                "order {} is {} and cannot become {new_status}",
                order.id, order.status
            )));
        }

        if new_status == OrderStatus::Completed {
            let removed = self.products.remove(&order.product_id).await?;
            tracing::debug!(product_id = %order.product_id, removed, "Sold product delisted");
            order.completed_at = Some(now);
        }

        order.status = new_status;
        order.updated_at = Some(now);
        let order = self.orders.update(order).await?;

        tracing::info!(order_id = %order.id, status = %order.status, "Order status changed");
        Ok(order)
    }

    /// Price `cart` with active sales and an optional discount code.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` ("Invalid or expired code") if the
    /// code is unknown or outside its window, or if it covers nothing in the
    /// cart.
    pub async fn quote(
        &self,
        cart: &[Product],
        code: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Quote> {
        let sales = self.sales.list().await?;

        let discount = match code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => {
                let discount = self
                    .discounts
                    .find_by_code(code)
                    .await?
                    .filter(|d| d.is_active(now))
                    .ok_or_else(|| MarketError::InvalidInput("Invalid or expired code".to_owned()))?;
                if discount.is_scoped() && !cart.iter().any(|p| discount.applies_to(p)) {
                    return Err(MarketError::InvalidInput(format!(
                        "code {} does not apply to anything in your cart",
                        discount.code
                    )));
                }
                Some(discount)
            }
            None => None,
        };

        Ok(pricing::quote(cart, &sales, discount.as_ref(), now))
    }

    /// Orders `user` placed, newest first.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the orders cannot be read.
    pub async fn purchases(&self, user: &UserId) -> Result<Vec<Order>> {
        Ok(newest_first(self.orders.by_buyer(user).await?))
    }

    /// Orders for `user`'s listings, newest first.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the orders cannot be read.
    pub async fn sales(&self, user: &UserId) -> Result<Vec<Order>> {
        Ok(newest_first(self.orders.by_seller(user).await?))
    }

    /// Every order, newest first. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless `actor` is an admin.
    pub async fn all(&self, actor: &CurrentUser) -> Result<Vec<Order>> {
        if !actor.is_admin {
            return Err(MarketError::Forbidden("admin access required".to_owned()));
        }
        Ok(newest_first(self.orders.list().await?))
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}
