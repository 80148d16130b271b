//! Discount code and sale promotion commands (admin).

use chrono::{DateTime, Utc};
use clap::Args;
use rust_decimal::Decimal;

use campus_market::models::Adjustment;
use campus_market::services::admin::AdjustmentDraft;
use campus_market_core::{DiscountId, DiscountKind, ProductId, SaleId};

use super::{CliError, Context};

/// Fields of a discount code or sale promotion.
#[derive(Debug, Args)]
pub struct AdjustmentArgs {
    /// Code (discounts) or name (sales)
    #[arg(short, long)]
    label: String,
    #[arg(short, long)]
    amount: Decimal,
    /// percent or fixed
    #[arg(short, long, default_value = "percent")]
    kind: DiscountKind,
    /// Limit to one category
    #[arg(long)]
    category: Option<String>,
    /// Limit to one product id
    #[arg(long)]
    product: Option<String>,
    /// RFC 3339 start time
    #[arg(long)]
    starts_at: Option<DateTime<Utc>>,
    /// RFC 3339 end time
    #[arg(long)]
    ends_at: Option<DateTime<Utc>>,
}

impl From<AdjustmentArgs> for AdjustmentDraft {
    fn from(args: AdjustmentArgs) -> Self {
        Self {
            label: args.label,
            amount: args.amount,
            kind: args.kind,
            category: args.category,
            product_id: args.product.map(ProductId::from),
            starts_at: args.starts_at,
            ends_at: args.ends_at,
        }
    }
}

fn window(starts_at: Option<DateTime<Utc>>, ends_at: Option<DateTime<Utc>>) -> String {
    let day = |at: Option<DateTime<Utc>>, open: &str| {
        at.map_or_else(|| open.to_owned(), |t| t.format("%Y-%m-%d").to_string())
    };
    format!("{} to {}", day(starts_at, "always"), day(ends_at, "open-ended"))
}

/// List discount codes.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for non-admins.
pub async fn list_discounts(ctx: &Context) -> Result<(), CliError> {
    let discounts = ctx.state.admin().discounts(ctx.user()?).await?;
    if discounts.is_empty() {
        tracing::info!("No discount codes");
    }
    for discount in &discounts {
        tracing::info!(
            "[{}] {} | {} | {} | {}",
            discount.id,
            discount.code,
            discount.describe(),
            discount.category.as_deref().unwrap_or("all categories"),
            window(discount.starts_at, discount.ends_at)
        );
    }
    Ok(())
}

/// Create a discount code.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for non-admins or a validation error.
pub async fn add_discount(ctx: &Context, fields: AdjustmentArgs) -> Result<(), CliError> {
    let discount = ctx
        .state
        .admin()
        .add_discount(ctx.user()?, fields.into())
        .await?;
    tracing::info!("Created discount code {} ({})", discount.code, discount.id);
    Ok(())
}

/// Delete a discount code.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for non-admins or `MarketError::NotFound`.
pub async fn delete_discount(ctx: &Context, id: &str) -> Result<(), CliError> {
    ctx.state
        .admin()
        .delete_discount(ctx.user()?, &DiscountId::new(id))
        .await?;
    tracing::info!("Deleted discount {id}");
    Ok(())
}

/// List sale promotions.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for non-admins.
pub async fn list_sales(ctx: &Context) -> Result<(), CliError> {
    let now = Utc::now();
    let sales = ctx.state.admin().sales(ctx.user()?).await?;
    if sales.is_empty() {
        tracing::info!("No sales");
    }
    for sale in &sales {
        let state = if sale.is_active(now) {
            "active"
        } else {
            "inactive"
        };
        tracing::info!(
            "[{}] {} | {} | {} | {} | {state}",
            sale.id,
            sale.name,
            sale.describe(),
            sale.category.as_deref().unwrap_or("all categories"),
            window(sale.starts_at, sale.ends_at)
        );
    }
    Ok(())
}

/// Create a sale promotion.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for non-admins or a validation error.
pub async fn add_sale(ctx: &Context, fields: AdjustmentArgs) -> Result<(), CliError> {
    let sale = ctx.state.admin().add_sale(ctx.user()?, fields.into()).await?;
    tracing::info!("Created sale {} ({})", sale.name, sale.id);
    Ok(())
}

/// Delete a sale promotion.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for non-admins or `MarketError::NotFound`.
pub async fn delete_sale(ctx: &Context, id: &str) -> Result<(), CliError> {
    ctx.state
        .admin()
        .delete_sale(ctx.user()?, &SaleId::new(id))
        .await?;
    tracing::info!("Deleted sale {id}");
    Ok(())
}
