//! Listing commands.

use chrono::Utc;
use clap::Args;

use campus_market::models::{Product, ProductDraft};
use campus_market::services::listings::BrowseQuery;
use campus_market_core::{Condition, Price, ProductId};

use super::{CliError, Context};

/// Fields of a listing.
#[derive(Debug, Args)]
pub struct ListingArgs {
    #[arg(short, long)]
    title: String,
    #[arg(short, long)]
    description: String,
    #[arg(long)]
    price: Price,
    #[arg(short, long)]
    category: String,
    /// new, like-new, used-excellent, used-good, used-fair or used-poor
    #[arg(long)]
    condition: Condition,
    #[arg(long)]
    image: Option<String>,
}

impl From<ListingArgs> for ProductDraft {
    fn from(args: ListingArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            price: args.price,
            category: args.category,
            condition: args.condition,
            image_url: args.image,
        }
    }
}

/// One-line summary of a listing, with its sale price if any.
pub fn describe(product: &Product, sale: Option<Price>) -> String {
    let price = match sale {
        Some(sale) => format!("{} (sale, was {})", sale.display(), product.price.display()),
        None => product.price.display(),
    };
    format!(
        "[{}] {} - {price} | {} | {} | seller: {}",
        product.id, product.title, product.category, product.condition, product.seller_name
    )
}

/// Browse the catalogue.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn list(ctx: &Context, query: &BrowseQuery) -> Result<(), CliError> {
    let listings = ctx.state.listings();
    let products = listings.browse(query).await?;
    if products.is_empty() {
        tracing::info!("No products match");
        return Ok(());
    }
    for (product, sale) in listings.with_sale_prices(products, Utc::now()).await? {
        tracing::info!("{}", describe(&product, sale));
    }
    Ok(())
}

/// Show one listing in full.
///
/// # Errors
///
/// Returns `MarketError::NotFound` if it is not listed.
pub async fn show(ctx: &Context, id: &str) -> Result<(), CliError> {
    let listings = ctx.state.listings();
    let product = listings.get(&ProductId::new(id)).await?;
    let priced = listings.with_sale_prices(vec![product], Utc::now()).await?;
    for (product, sale) in priced {
        tracing::info!("{}", describe(&product, sale));
        tracing::info!("{}", product.description);
        tracing::info!("Listed {}", product.created_at.format("%Y-%m-%d"));
    }
    Ok(())
}

/// The logged-in user's listings.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn`.
pub fn mine(ctx: &Context) -> Result<(), CliError> {
    ctx.user()?;
    if ctx.session.listings().is_empty() {
        tracing::info!("You have no listings");
    }
    for product in ctx.session.listings() {
        tracing::info!("{}", describe(product, None));
    }
    Ok(())
}

/// Post a listing.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn` or a validation error.
pub async fn create(ctx: &mut Context, fields: ListingArgs) -> Result<(), CliError> {
    let seller = ctx.user()?.clone();
    let product = ctx
        .state
        .listings()
        .create_listing(&seller, fields.into())
        .await?;
    tracing::info!("Listed {}", describe(&product, None));
    ctx.session.add_listing(product);
    Ok(())
}

/// Edit a listing.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn`, `MarketError::Forbidden` for someone
/// else's listing, or a validation error.
pub async fn edit(ctx: &mut Context, id: &str, fields: ListingArgs) -> Result<(), CliError> {
    let actor = ctx.user()?.clone();
    let product = ctx
        .state
        .listings()
        .update_listing(&actor, &ProductId::new(id), fields.into())
        .await?;
    tracing::info!("Updated {}", describe(&product, None));
    ctx.session.update_listing(product);
    Ok(())
}

/// Delete a listing.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn` or `MarketError::Forbidden` for someone
/// else's listing.
pub async fn delete(ctx: &mut Context, id: &str) -> Result<(), CliError> {
    let actor = ctx.user()?.clone();
    let id = ProductId::new(id);
    ctx.state.listings().delete_listing(&actor, &id).await?;
    ctx.session.remove_listing(&id);
    tracing::info!("Deleted listing {id}");
    Ok(())
}
