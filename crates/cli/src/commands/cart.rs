//! Cart commands.

use chrono::Utc;

use campus_market::services::pricing::Quote;
use campus_market_core::ProductId;

use super::products::describe;
use super::{CliError, Context};

/// Show the cart and its price quote.
///
/// # Errors
///
/// Returns `MarketError::InvalidInput` for an invalid or expired code.
pub async fn show(ctx: &Context, code: Option<&str>) -> Result<(), CliError> {
    let cart = ctx.session.cart();
    if cart.is_empty() {
        tracing::info!("Your cart is empty");
        return Ok(());
    }

    let now = Utc::now();
    let priced = ctx
        .state
        .listings()
        .with_sale_prices(cart.to_vec(), now)
        .await?;
    for (product, sale) in &priced {
        tracing::info!("{}", describe(product, *sale));
    }

    let quote = ctx.state.orders().quote(cart, code, now).await?;
    log_quote(&quote);
    Ok(())
}

fn log_quote(quote: &Quote) {
    tracing::info!("Subtotal: {}", quote.subtotal.display());
    if quote.sale_savings.is_positive() {
        tracing::info!("Sale savings: -{}", quote.sale_savings.display());
    }
    tracing::info!("Tax (8.25%): {}", quote.tax.display());
    if let Some(code) = &quote.discount_code {
        tracing::info!("Discount {code}: -{}", quote.discount_amount.display());
    }
    tracing::info!("Total: {}", quote.total.display());
}

/// Add a listing to the cart.
///
/// # Errors
///
/// Returns `MarketError::NotFound` if the product is not listed.
pub async fn add(ctx: &mut Context, id: &str) -> Result<(), CliError> {
    let product = ctx.state.listings().get(&ProductId::new(id)).await?;
    let title = product.title.clone();
    let change = ctx.session.add_to_cart(product);
    tracing::info!("{}: {title}", change.notice());
    Ok(())
}

pub fn remove(ctx: &mut Context, id: &str) {
    if ctx.session.remove_from_cart(&ProductId::new(id)) {
        tracing::info!("Removed {id} from your cart");
    } else {
        tracing::info!("{id} is not in your cart");
    }
}

pub fn clear(ctx: &mut Context) {
    ctx.session.clear_cart();
    tracing::info!("Cart cleared");
}

/// Turn the cart into orders.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn`, `MarketError::InvalidInput` for an empty
/// cart, or a storage error (the cart is kept). The session is saved as soon
/// as the orders are placed; if that write fails the error is returned.
pub async fn checkout(ctx: &mut Context) -> Result<(), CliError> {
    ctx.user()?;
    let outcome = ctx.state.orders().checkout_session(&mut ctx.session).await?;

    if let Err(e) = ctx.save().await {
        tracing::error!(
            placed = outcome.orders.len(),
            "Orders were placed but the cart could not be cleared on disk; \
             run `market-cli cart clear` before checking out again"
        );
        return Err(e);
    }

    for order in &outcome.orders {
        tracing::info!(
            "Order {} placed: {} from {} for {}",
            order.id,
            order.product_title,
            order.seller_name,
            order.price.display()
        );
    }
    for skipped in &outcome.skipped {
        tracing::warn!("Not ordered: {} ({})", skipped.title, skipped.reason);
    }
    if outcome.is_complete() {
        tracing::info!("Checkout complete. Sellers will contact you to arrange pickup");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use campus_market::{AppState, MarketConfig};

    use super::*;
    use crate::commands::account;

    async fn open(dir: &Path) -> Context {
        let state = AppState::from_config(MarketConfig {
            data_dir: dir.to_path_buf(),
            ..MarketConfig::default()
        });
        state.bootstrap().await.unwrap();
        Context::open(state).await.unwrap()
    }

    async fn jane_with_cart(dir: &Path) -> Context {
        let mut ctx = open(dir).await;
        account::login(&mut ctx, "jane@example.com", "password123".to_owned())
            .await
            .unwrap();
        add(&mut ctx, "3").await.unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_checkout_persists_the_emptied_cart() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = jane_with_cart(dir.path()).await;

        checkout(&mut ctx).await.unwrap();

        let reopened = open(dir.path()).await;
        assert!(reopened.session.user().is_some());
        assert!(reopened.session.cart().is_empty());
        assert!(
            reopened
                .session
                .orders()
                .iter()
                .any(|o| o.product_id.as_str() == "3" && o.buyer_email.is_some())
        );
    }

    #[tokio::test]
    async fn test_checkout_reports_unsaved_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = jane_with_cart(dir.path()).await;
        std::fs::create_dir(dir.path().join("session.json")).unwrap();

        let err = checkout(&mut ctx).await.unwrap_err();

        assert!(matches!(err, CliError::Io(_)));
        assert!(!err.is_user_facing());
        assert!(ctx.session.cart().is_empty());
    }
}
