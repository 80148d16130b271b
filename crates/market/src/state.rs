//! Application state shared across commands.

use std::sync::Arc;

use crate::config::MarketConfig;
use crate::error::Result;
use crate::services::admin::AdminService;
use crate::services::auth::AuthService;
use crate::services::forum::ForumService;
use crate::services::listings::ListingService;
use crate::services::orders::OrderService;
use crate::store::{FileStore, RecordStore};

/// Configuration plus the record store, cheaply cloneable via `Arc`.
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

struct AppStateInner<S> {
    config: MarketConfig,
    store: S,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl AppState<FileStore> {
    /// State backed by the data directory named in `config`.
    #[must_use]
    pub fn from_config(config: MarketConfig) -> Self {
        let store = FileStore::new(&config.data_dir).with_load_delay(config.load_delay);
        Self::new(config, store)
    }
}

impl<S: RecordStore> AppState<S> {
    #[must_use]
    pub fn new(config: MarketConfig, store: S) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.inner.config
    }

    /// Get a reference to the record store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_, S> {
        AuthService::new(&self.inner.store, &self.inner.config.student_email_domain)
    }

    #[must_use]
    pub fn listings(&self) -> ListingService<'_, S> {
        ListingService::new(&self.inner.store)
    }

    #[must_use]
    pub fn orders(&self) -> OrderService<'_, S> {
        OrderService::new(&self.inner.store)
    }

    #[must_use]
    pub fn forum(&self) -> ForumService<'_, S> {
        ForumService::new(&self.inner.store)
    }

    #[must_use]
    pub fn admin(&self) -> AdminService<'_, S> {
        AdminService::new(&self.inner.store)
    }

    /// Prepare the store for use: migrate legacy passwords and, when
    /// `seed_on_start` is set, seed sample data on first run.
    ///
    /// # Returns
    ///
    /// Returns `true` if sample data was written.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the store cannot be read or written.
    pub async fn bootstrap(&self) -> Result<bool> {
        let admin = self.admin();
        if self.inner.config.seed_on_start {
            admin.initialize().await
        } else {
            admin.migrate_legacy_passwords().await?;
            Ok(false)
        }
    }
}
