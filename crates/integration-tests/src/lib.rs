//! Integration tests for Campus Market.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p campus-market-integration-tests
//! ```
//!
//! Each test gets its own temporary data directory backed by a
//! [`FileStore`], so the full stack (services, repositories, CSV codec and
//! file writes) is exercised without touching a developer's data.
//!
//! # Test Categories
//!
//! - `order_lifecycle` - Checkout, completion and cancellation
//! - `pricing` - Tax, discount codes and sales
//! - `persistence` - Seeding, backfill, migration and raw collections
//! - `session` - Cart rules and refresh from the store

use secrecy::SecretString;
use tempfile::TempDir;

use campus_market::models::CurrentUser;
use campus_market::services::auth::AuthError;
use campus_market::{AppState, FileStore, MarketConfig, Session};

/// Password of every sample student account.
pub const STUDENT_PASSWORD: &str = "password123";
/// Password of the sample admin account.
pub const ADMIN_PASSWORD: &str = "admin123";

pub const ADMIN_EMAIL: &str = "admin@rowdymarketplace.com";
pub const JANE_EMAIL: &str = "jane@example.com";
pub const MIKE_EMAIL: &str = "mike@example.com";
pub const SARAH_EMAIL: &str = "sarah@example.com";

/// A marketplace rooted in a temporary directory.
pub struct TestContext {
    /// Kept alive so the directory outlives the test.
    pub dir: TempDir,
    pub state: AppState<FileStore>,
}

impl TestContext {
    /// An empty, unseeded marketplace.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = MarketConfig {
            data_dir: dir.path().to_path_buf(),
            seed_on_start: false,
            ..MarketConfig::default()
        };
        Self {
            state: AppState::from_config(config),
            dir,
        }
    }

    /// A marketplace holding the sample data.
    ///
    /// # Panics
    ///
    /// Panics if seeding fails.
    pub async fn seeded() -> Self {
        let ctx = Self::empty();
        let seeded = ctx
            .state
            .admin()
            .initialize()
            .await
            .expect("Failed to seed sample data");
        assert!(seeded);
        ctx
    }

    /// A second handle on the same data directory, as another process would
    /// open it.
    #[must_use]
    pub fn reopen(&self) -> AppState<FileStore> {
        AppState::from_config(self.state.config().clone())
    }

    /// Log in and return the session user.
    ///
    /// # Errors
    ///
    /// Returns the login error.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let user = self
            .state
            .auth()
            .login(email, &SecretString::from(password.to_owned()))
            .await?;
        Ok(CurrentUser::from(user))
    }

    /// A fresh session logged in as a sample account.
    ///
    /// # Panics
    ///
    /// Panics if the login fails.
    pub async fn session_for(&self, email: &str) -> Session {
        let password = if email == ADMIN_EMAIL {
            ADMIN_PASSWORD
        } else {
            STUDENT_PASSWORD
        };
        let user = self.login(email, password).await.expect("Failed to log in");
        let mut session = Session::new();
        session.login(user);
        session
            .refresh(self.state.store())
            .await
            .expect("Failed to refresh session");
        session
    }
}
