//! Order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_market_core::{Condition, Email, OrderId, OrderStatus, Price, ProductId, UserId};

/// One purchased cart line as stored in `csv_orders`.
///
/// Orders are never deleted. The product fields are a snapshot taken at
/// checkout and survive the product's removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub buyer_name: String,
    /// Empty on rows written before contact details were recorded.
    #[serde(default)]
    pub buyer_email: Option<Email>,
    pub seller_id: UserId,
    pub seller_name: String,
    #[serde(default)]
    pub seller_email: Option<Email>,
    pub product_id: ProductId,
    pub product_title: String,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub condition: Option<Condition>,
    /// Line total including tax.
    pub price: Price,
    pub subtotal: Price,
    pub tax: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    #[must_use]
    pub fn is_buyer(&self, user: &UserId) -> bool {
        &self.buyer_id == user
    }

    #[must_use]
    pub fn is_seller(&self, user: &UserId) -> bool {
        &self.seller_id == user
    }

    /// Whether either contact email is missing.
    #[must_use]
    pub const fn missing_contacts(&self) -> bool {
        self.buyer_email.is_none() || self.seller_email.is_none()
    }
}
