//! Discount codes and sale promotions.
//!
//! Both are price adjustments with the same shape. A [`Discount`] is applied
//! when the buyer enters its code; a [`SalePromotion`] applies to every
//! matching cart line while it is active.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use campus_market_core::{DiscountId, DiscountKind, Price, ProductId, SaleId};

use super::Product;

/// A discount code, stored in `csv_discounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: DiscountId,
    /// Upper-case code the buyer types at checkout.
    pub code: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// An automatic sale, stored in `csv_sales`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePromotion {
    pub id: SaleId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A price reduction with an optional scope and validity window.
pub trait Adjustment {
    fn kind(&self) -> DiscountKind;
    fn amount(&self) -> Decimal;
    fn category(&self) -> Option<&str>;
    fn product_id(&self) -> Option<&ProductId>;
    fn starts_at(&self) -> Option<DateTime<Utc>>;
    fn ends_at(&self) -> Option<DateTime<Utc>>;

    /// Whether `now` falls inside the validity window (both ends inclusive).
    fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.starts_at().is_none_or(|start| now >= start)
            && self.ends_at().is_none_or(|end| now <= end)
    }

    /// Whether the adjustment covers `product`. Unscoped adjustments cover
    /// everything.
    fn applies_to(&self, product: &Product) -> bool {
        let category_ok = self
            .category()
            .is_none_or(|c| c.eq_ignore_ascii_case(&product.category));
        let product_ok = self.product_id().is_none_or(|id| id == &product.id);
        category_ok && product_ok
    }

    /// Whether the adjustment is limited to a category or a product.
    fn is_scoped(&self) -> bool {
        self.category().is_some() || self.product_id().is_some()
    }

    /// Reduction granted on `eligible`, the pre-tax total of covered lines.
    ///
    /// Percent adjustments take a share of `eligible`; fixed adjustments are
    /// a flat amount whenever anything is eligible. The caller floors the
    /// order total at zero.
    fn reduction(&self, eligible: Price) -> Price {
        if !eligible.is_positive() {
            return Price::ZERO;
        }
        match self.kind() {
            DiscountKind::Percent => eligible.percent(self.amount()),
            DiscountKind::Fixed => Price::new(self.amount()).unwrap_or(Price::ZERO),
        }
    }

    /// Human-readable size of the reduction (`10% off`, `$5.00 off`).
    fn describe(&self) -> String {
        match self.kind() {
            DiscountKind::Percent => format!("{}% off", self.amount().normalize()),
            DiscountKind::Fixed => format!(
                "{} off",
                Price::new(self.amount()).unwrap_or(Price::ZERO).display()
            ),
        }
    }
}

macro_rules! impl_adjustment {
    ($ty:ty) => {
        impl Adjustment for $ty {
            fn kind(&self) -> DiscountKind {
                self.kind
            }

            fn amount(&self) -> Decimal {
                self.amount
            }

            fn category(&self) -> Option<&str> {
                self.category.as_deref()
            }

            fn product_id(&self) -> Option<&ProductId> {
                self.product_id.as_ref()
            }

            fn starts_at(&self) -> Option<DateTime<Utc>> {
                self.starts_at
            }

            fn ends_at(&self) -> Option<DateTime<Utc>> {
                self.ends_at
            }
        }
    };
}

impl_adjustment!(Discount);
impl_adjustment!(SalePromotion);
