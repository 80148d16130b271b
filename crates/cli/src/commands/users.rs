//! Account administration commands.

use campus_market_core::UserId;

use super::{CliError, Context};

/// List accounts.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for non-admins.
pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let users = ctx.state.admin().users(ctx.user()?).await?;
    for user in &users {
        let role = if user.is_admin { "admin" } else { "student" };
        tracing::info!(
            "[{}] {} <{}> | {role} | joined {}",
            user.id,
            user.name,
            user.email,
            user.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

/// Grant or revoke admin rights.
///
/// # Errors
///
/// Returns `MarketError::Forbidden` for non-admins, `MarketError::InvalidInput`
/// when revoking your own rights, or `MarketError::NotFound`.
pub async fn set_admin(ctx: &Context, id: &str, is_admin: bool) -> Result<(), CliError> {
    let user = ctx
        .state
        .admin()
        .set_admin(ctx.user()?, &UserId::new(id), is_admin)
        .await?;
    let verb = if user.is_admin { "is now" } else { "is no longer" };
    tracing::info!("{} {verb} an admin", user.name);
    Ok(())
}
