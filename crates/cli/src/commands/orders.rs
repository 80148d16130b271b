//! Order commands.

use campus_market::MarketError;
use campus_market::models::Order;
use campus_market_core::{Email, OrderId, OrderStatus};

use super::{CliError, Context};

fn describe(order: &Order) -> String {
    format!(
        "[{}] {} | {} | {} | buyer: {} | seller: {} | {}",
        order.id,
        order.product_title,
        order.price.display(),
        order.status,
        order.buyer_name,
        order.seller_name,
        order.created_at.format("%Y-%m-%d %H:%M"),
    )
}

fn log_orders(orders: &[Order], empty: &str) {
    if orders.is_empty() {
        tracing::info!("{empty}");
    }
    for order in orders {
        tracing::info!("{}", describe(order));
    }
}

/// Orders the logged-in user placed.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn` or a storage error.
pub async fn purchases(ctx: &Context) -> Result<(), CliError> {
    let user = ctx.user()?;
    let orders = ctx.state.orders().purchases(&user.id).await?;
    log_orders(&orders, "You have not bought anything yet");
    Ok(())
}

/// Orders for the logged-in user's listings.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn` or a storage error.
pub async fn sales(ctx: &Context) -> Result<(), CliError> {
    let user = ctx.user()?;
    let orders = ctx.state.orders().sales(&user.id).await?;
    log_orders(&orders, "Nobody has ordered your listings yet");
    Ok(())
}

/// Every order.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for non-admins.
pub async fn all(ctx: &Context) -> Result<(), CliError> {
    let user = ctx.user()?;
    let orders = ctx.state.orders().all(user).await?;
    log_orders(&orders, "No orders");
    Ok(())
}

/// Show one of the logged-in user's orders, with contact details.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn` or `MarketError::NotFound` if the order is
/// not one of the user's.
pub fn show(ctx: &Context, id: &str) -> Result<(), CliError> {
    ctx.user()?;
    let order = ctx
        .session
        .cached_order(&OrderId::new(id))
        .ok_or_else(|| MarketError::NotFound(format!("order {id}")))?;

    tracing::info!("{}", describe(order));
    tracing::info!(
        "Subtotal {} + tax {} = {}",
        order.subtotal.display(),
        order.tax.display(),
        order.price.display()
    );
    let contact = |email: Option<&Email>| {
        email.map_or_else(|| "(no email on file)".to_owned(), ToString::to_string)
    };
    tracing::info!("Buyer contact: {}", contact(order.buyer_email.as_ref()));
    tracing::info!("Seller contact: {}", contact(order.seller_email.as_ref()));
    if let Some(completed_at) = order.completed_at {
        tracing::info!("Completed {}", completed_at.format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}

async fn change_status(ctx: &mut Context, id: &str, status: OrderStatus) -> Result<(), CliError> {
    let actor = ctx.user()?.clone();
    let order = ctx
        .state
        .orders()
        .set_status_as(&actor, &OrderId::new(id), status)
        .await?;
    tracing::info!("Order {} is now {}", order.id, order.status);
    ctx.session.refresh(ctx.state.store()).await?;
    Ok(())
}

/// Mark an order completed, delisting its product.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` unless the user is the seller or an admin,
/// or `MarketError::InvalidTransition` if the order is not pending.
pub async fn complete(ctx: &mut Context, id: &str) -> Result<(), CliError> {
    change_status(ctx, id, OrderStatus::Completed).await
}

/// Cancel an order.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for an unrelated user, or
/// `MarketError::InvalidTransition` if the order is not pending.
pub async fn cancel(ctx: &mut Context, id: &str) -> Result<(), CliError> {
    change_status(ctx, id, OrderStatus::Canceled).await
}
