//! Command implementations.
//!
//! Every command runs against a [`Context`]: the application state plus the
//! session restored from `session.json` and refreshed from the store.

pub mod account;
pub mod adjustments;
pub mod cart;
pub mod data;
pub mod forum;
pub mod orders;
pub mod products;
pub mod users;

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

use campus_market::config::ConfigError;
use campus_market::models::CurrentUser;
use campus_market::services::auth::AuthError;
use campus_market::{AppState, FileStore, MarketError, Session};

/// File inside the data directory holding the session snapshot.
const SESSION_FILE: &str = "session.json";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Market(#[from] MarketError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading or writing the session file failed.
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    /// The session could not be serialized.
    #[error("Session encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Not logged in. Run `market-cli account login` first")]
    NotLoggedIn,

    /// A destructive command was run without confirmation.
    #[error("Refusing to {0} without --yes")]
    Unconfirmed(&'static str),
}

impl CliError {
    /// Whether the message alone tells the user what to do. Other errors are
    /// reported with their full source chain.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        match self {
            Self::Market(e) => e.is_user_facing(),
            Self::Io(_) | Self::Encoding(_) => false,
            Self::Auth(_) | Self::Config(_) | Self::NotLoggedIn | Self::Unconfirmed(_) => true,
        }
    }
}

/// Application state plus the persisted session.
pub struct Context {
    pub state: AppState<FileStore>,
    pub session: Session,
    session_path: PathBuf,
}

impl Context {
    /// Restore the session and refresh it from the store.
    ///
    /// A missing session file starts a fresh session; an unreadable one is
    /// discarded with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or if the
    /// store cannot be read.
    pub async fn open(state: AppState<FileStore>) -> Result<Self, CliError> {
        let session_path = state.config().data_dir.join(SESSION_FILE);

        let mut session = match tokio::fs::read_to_string(&session_path).await {
            Ok(json) => Session::from_json(&json).unwrap_or_else(|e| {
                tracing::warn!(path = %session_path.display(), "Discarding unreadable session: {e}");
                Session::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Session::new(),
            Err(e) => return Err(e.into()),
        };

        let was_logged_in = session.user().is_some();
        session.refresh(state.store()).await?;
        if was_logged_in && session.user().is_none() {
            tracing::warn!("Your account no longer exists; you have been logged out");
        }

        Ok(Self {
            state,
            session,
            session_path,
        })
    }

    /// The logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NotLoggedIn` if nobody is logged in.
    pub fn user(&self) -> Result<&CurrentUser, CliError> {
        self.session.user().ok_or(CliError::NotLoggedIn)
    }

    /// Write the session back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self) -> Result<(), CliError> {
        if let Some(dir) = self.session_path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&self.session_path, self.session.to_json()?).await?;
        Ok(())
    }
}
