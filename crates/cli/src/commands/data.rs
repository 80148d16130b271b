//! Data directory maintenance.
//!
//! # Usage
//!
//! ```bash
//! market-cli data init
//! market-cli data reset --yes
//! market-cli data backfill
//! market-cli data export orders --out orders.csv
//! ```

use std::path::Path;

use campus_market::Collection;

use super::{CliError, Context};

/// Seed sample data unless already initialized.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub async fn init(ctx: &Context) -> Result<(), CliError> {
    if ctx.state.admin().initialize().await? {
        tracing::info!("Sample data written");
    } else {
        tracing::info!("Already initialized; nothing to do");
    }
    Ok(())
}

/// Overwrite the marketplace with sample data.
///
/// # Errors
///
/// Returns `CliError::Unconfirmed` without `--yes`, or an error if the store
/// cannot be written.
pub async fn reset(ctx: &mut Context, confirmed: bool) -> Result<(), CliError> {
    if !confirmed {
        return Err(CliError::Unconfirmed("reset all marketplace data"));
    }
    ctx.state.admin().reset().await?;
    ctx.session.refresh(ctx.state.store()).await?;
    tracing::info!("Marketplace data reset");
    Ok(())
}

/// Fill missing contact emails on orders.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub async fn backfill(ctx: &Context) -> Result<(), CliError> {
    let changed = ctx.state.admin().backfill_order_contacts().await?;
    tracing::info!("Updated {changed} order(s)");
    Ok(())
}

/// Dump one collection's stored text.
///
/// # Errors
///
/// Returns an error if the collection is unreadable or `out` cannot be written.
pub async fn export(ctx: &Context, collection: Collection, out: Option<&Path>) -> Result<(), CliError> {
    let text = ctx.state.admin().export(collection).await?;
    match out {
        Some(path) => {
            tokio::fs::write(path, &text).await?;
            tracing::info!(collection = %collection, path = %path.display(), "Exported");
        }
        None => tracing::info!("{collection}:\n{text}"),
    }
    Ok(())
}
