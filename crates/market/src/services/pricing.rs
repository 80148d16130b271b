//! Cart totals: sale promotions, tax and discount codes.
//!
//! Pure functions over already-loaded records. Sales reduce each covered line
//! by the best active promotion; tax is charged on what remains; a discount
//! code then comes off the taxed total, which never drops below zero.

use chrono::{DateTime, Utc};

use campus_market_core::Price;

use crate::models::{Adjustment, Discount, Product, SalePromotion};

/// The breakdown shown before checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Sum of list prices.
    pub subtotal: Price,
    /// Total taken off by active sale promotions.
    pub sale_savings: Price,
    /// Tax on the subtotal after sale savings.
    pub tax: Price,
    /// The code that was applied, if any.
    pub discount_code: Option<String>,
    pub discount_amount: Price,
    /// `max(subtotal - sale_savings + tax - discount_amount, 0)`.
    pub total: Price,
}

/// The best active sale price for `product`, or `None` if no sale covers it.
#[must_use]
pub fn sale_price(product: &Product, sales: &[SalePromotion], now: DateTime<Utc>) -> Option<Price> {
    best_sale_reduction(product, sales, now).map(|cut| product.price.saturating_sub(cut))
}

fn best_sale_reduction(
    product: &Product,
    sales: &[SalePromotion],
    now: DateTime<Utc>,
) -> Option<Price> {
    sales
        .iter()
        .filter(|s| s.is_active(now) && s.applies_to(product))
        .map(|s| s.reduction(product.price).min(product.price))
        .max()
}

/// Price `cart` with any active `sales` and an optional already-validated `discount`.
///
/// A scoped discount only counts the lines it covers. Validity of the code
/// (existence, window) is the caller's concern.
#[must_use]
pub fn quote(
    cart: &[Product],
    sales: &[SalePromotion],
    discount: Option<&Discount>,
    now: DateTime<Utc>,
) -> Quote {
    let subtotal: Price = cart.iter().map(|p| p.price).sum();

    let line_prices: Vec<(&Product, Price)> = cart
        .iter()
        .map(|p| {
            let cut = best_sale_reduction(p, sales, now).unwrap_or(Price::ZERO);
            (p, p.price.saturating_sub(cut))
        })
        .collect();
    let after_sales: Price = line_prices.iter().map(|(_, price)| *price).sum();
    let sale_savings = subtotal.saturating_sub(after_sales);
    let tax = after_sales.tax();

    let discount_amount = discount.map_or(Price::ZERO, |d| {
        let eligible: Price = line_prices
            .iter()
            .filter(|(p, _)| d.applies_to(p))
            .map(|(_, price)| *price)
            .sum();
        d.reduction(eligible)
    });

    Quote {
        subtotal,
        sale_savings,
        tax,
        discount_code: discount.map(|d| d.code.clone()),
        discount_amount,
        total: (after_sales + tax).saturating_sub(discount_amount),
    }
}
