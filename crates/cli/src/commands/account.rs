//! Account commands: register, login, logout and profile changes.

use secrecy::SecretString;

use campus_market::models::CurrentUser;
use campus_market::services::auth::{ProfileUpdate, Registration};

use super::{CliError, Context};

/// Register a student account and log in as it.
///
/// # Errors
///
/// Returns `CliError::Auth` if validation fails or the email is taken.
pub async fn register(
    ctx: &mut Context,
    name: String,
    email: String,
    password: String,
    confirm: Option<String>,
) -> Result<(), CliError> {
    let confirm_password = SecretString::from(confirm.unwrap_or_else(|| password.clone()));
    let user = ctx
        .state
        .auth()
        .register(Registration {
            name,
            email,
            password: SecretString::from(password),
            confirm_password,
        })
        .await?;

    tracing::info!("Welcome, {}! You are now logged in", user.name);
    ctx.session.login(CurrentUser::from(user));
    ctx.session.refresh(ctx.state.store()).await?;
    Ok(())
}

/// Log in.
///
/// # Errors
///
/// Returns `CliError::Auth` for a wrong email or password.
pub async fn login(ctx: &mut Context, email: &str, password: String) -> Result<(), CliError> {
    let user = ctx
        .state
        .auth()
        .login(email, &SecretString::from(password))
        .await?;

    tracing::info!("Logged in as {} <{}>", user.name, user.email);
    ctx.session.login(CurrentUser::from(user));
    ctx.session.refresh(ctx.state.store()).await?;
    Ok(())
}

pub fn logout(ctx: &mut Context) {
    ctx.session.logout();
    tracing::info!("Logged out");
}

pub fn whoami(ctx: &Context) {
    match ctx.session.user() {
        Some(user) => {
            let role = if user.is_admin { " (admin)" } else { "" };
            tracing::info!("{} <{}>{role} id={}", user.name, user.email, user.id);
        }
        None => tracing::info!("Not logged in"),
    }
    if !ctx.session.cart().is_empty() {
        tracing::info!("{} item(s) in cart", ctx.session.cart().len());
    }
}

/// Change the logged-in user's profile. Omitted fields keep their value.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn` or `CliError::Auth`.
pub async fn update(
    ctx: &mut Context,
    name: Option<String>,
    email: Option<String>,
    current_password: Option<String>,
    new_password: Option<String>,
) -> Result<(), CliError> {
    let current = ctx.user()?.clone();
    let update = ProfileUpdate {
        name: name.unwrap_or(current.name),
        email: email.unwrap_or_else(|| current.email.to_string()),
        current_password: current_password.map(SecretString::from),
        new_password: new_password.map(SecretString::from),
    };

    let user = ctx.state.auth().update_profile(&current.id, update).await?;
    tracing::info!("Profile updated: {} <{}>", user.name, user.email);
    ctx.session.update_user(CurrentUser::from(user));
    Ok(())
}
