//! Admin console and data maintenance.
//!
//! Data maintenance (`initialize`, `reset`, `backfill_order_contacts`,
//! `migrate_legacy_passwords`, `export`) runs without an actor; it is what
//! the operator does to the data directory. Everything else requires an
//! admin actor.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;

use campus_market_core::{
    DiscountId, DiscountKind, ProductId, SaleId, UserId, canonical_category,
};

use crate::db::discounts::{DiscountRepository, SaleRepository};
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::{MarketError, Result};
use crate::models::{CurrentUser, Discount, SalePromotion, User};
use crate::seed::SampleData;
use crate::services::auth::hash_password;
use crate::store::{self, Collection, INITIALIZED_KEY, RecordStore, StoreError, codec};

/// Legacy plaintext password column.
const LEGACY_PASSWORD_FIELD: &str = "password";
const PASSWORD_HASH_FIELD: &str = "passwordHash";

/// Input for a new discount code or sale promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentDraft {
    /// Discount code or sale name.
    pub label: String,
    pub amount: Decimal,
    pub kind: DiscountKind,
    pub category: Option<String>,
    pub product_id: Option<ProductId>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl AdjustmentDraft {
    fn validate(&mut self) -> Result<()> {
        self.label = self.label.trim().to_owned();
        if self.label.is_empty() {
            return Err(MarketError::InvalidInput("a code or name is required".to_owned()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(MarketError::InvalidInput(
                "amount must be greater than zero".to_owned(),
            ));
        }
        if self.kind == DiscountKind::Percent && self.amount > Decimal::ONE_HUNDRED {
            return Err(MarketError::InvalidInput(
                "a percentage cannot exceed 100".to_owned(),
            ));
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at)
            && end < start
        {
            return Err(MarketError::InvalidInput(
                "the end date is before the start date".to_owned(),
            ));
        }
        if let Some(category) = &self.category {
            let canonical = canonical_category(category).ok_or_else(|| {
                MarketError::InvalidInput(format!("unknown category: {category}"))
            })?;
            self.category = Some(canonical.to_owned());
        }
        Ok(())
    }
}

/// Admin service.
pub struct AdminService<'a, S> {
    store: &'a S,
    users: UserRepository<'a, S>,
    products: ProductRepository<'a, S>,
    orders: OrderRepository<'a, S>,
    discounts: DiscountRepository<'a, S>,
    sales: SaleRepository<'a, S>,
}

impl<'a, S: RecordStore> AdminService<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
            users: UserRepository::new(store),
            products: ProductRepository::new(store),
            orders: OrderRepository::new(store),
            discounts: DiscountRepository::new(store),
            sales: SaleRepository::new(store),
        }
    }

    // =========================================================================
    // Data maintenance
    // =========================================================================

    /// Seed the sample data unless the store was already initialized.
    ///
    /// Legacy plaintext passwords are migrated first in either case.
    ///
    /// # Returns
    ///
    /// Returns `true` if sample data was written.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if a collection cannot be read or written.
    pub async fn initialize(&self) -> Result<bool> {
        self.migrate_legacy_passwords().await?;

        if self.is_initialized().await? {
            tracing::debug!("Skipping sample data: already initialized");
            return Ok(false);
        }

        let data = SampleData::build()?;
        if self.discounts.list().await?.is_empty() {
            self.discounts.replace_all(&data.discounts).await?;
        }
        self.products.replace_all(&data.products).await?;
        self.users.replace_all(&data.users).await?;
        self.orders.replace_all(&data.orders).await?;
        self.backfill_order_contacts().await?;
        self.mark_initialized().await?;

        tracing::info!("Sample data initialized");
        Ok(true)
    }

    /// Overwrite users, products, orders and discounts with the sample data.
    ///
    /// Questions and sale promotions are kept.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if a collection cannot be written.
    pub async fn reset(&self) -> Result<()> {
        let data = SampleData::build()?;
        self.products.replace_all(&data.products).await?;
        self.users.replace_all(&data.users).await?;
        self.orders.replace_all(&data.orders).await?;
        self.discounts.replace_all(&data.discounts).await?;
        self.backfill_order_contacts().await?;
        self.mark_initialized().await?;

        tracing::warn!("Marketplace data reset to samples");
        Ok(())
    }

    /// Whether sample data has been seeded.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the marker cannot be read.
    pub async fn is_initialized(&self) -> Result<bool> {
        Ok(self.store.read(INITIALIZED_KEY).await?.as_deref() == Some("true"))
    }

    async fn mark_initialized(&self) -> Result<()> {
        Ok(self.store.write(INITIALIZED_KEY, "true".to_owned()).await?)
    }

    /// Fill missing buyer and seller emails on orders from the users collection.
    ///
    /// Emails that are already present are left alone. Users that no longer
    /// exist leave the field empty.
    ///
    /// # Returns
    ///
    /// Returns the number of orders changed; nothing is written when zero.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if a collection cannot be read or written.
    pub async fn backfill_order_contacts(&self) -> Result<usize> {
        let mut orders = self.orders.list().await?;
        if !orders.iter().any(|o| o.missing_contacts()) {
            return Ok(0);
        }

        let directory = self.users.email_directory().await?;
        let mut changed = 0;
        for order in orders.iter_mut().filter(|o| o.missing_contacts()) {
            let buyer_email = order
                .buyer_email
                .clone()
                .or_else(|| directory.get(&order.buyer_id).cloned());
            let seller_email = order
                .seller_email
                .clone()
                .or_else(|| directory.get(&order.seller_id).cloned());
            if buyer_email != order.buyer_email || seller_email != order.seller_email {
                order.buyer_email = buyer_email;
                order.seller_email = seller_email;
                changed += 1;
            }
        }

        if changed > 0 {
            self.orders.replace_all(&orders).await?;
            tracing::info!(changed, "Backfilled order contact emails");
        }
        Ok(changed)
    }

    /// Replace plaintext `password` columns in the users collection with
    /// Argon2id hashes.
    ///
    /// Works on untyped records so that rows written before hashing existed
    /// can still be read.
    ///
    /// # Returns
    ///
    /// Returns the number of accounts migrated; nothing is written when zero.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the users cannot be read or written.
    pub async fn migrate_legacy_passwords(&self) -> Result<usize> {
        let mut records = store::load_records(self.store, Collection::Users).await?;
        let mut migrated = 0;

        for record in &mut records {
            let Some(plaintext) = record.remove(LEGACY_PASSWORD_FIELD) else {
                continue;
            };
            let has_hash = record
                .get(PASSWORD_HASH_FIELD)
                .is_some_and(|h| !h.is_empty());
            if !has_hash {
                let hash = hash_password(&SecretString::from(plaintext))?;
                record.insert(PASSWORD_HASH_FIELD.to_owned(), hash);
            }
            migrated += 1;
        }

        if migrated > 0 {
            store::save_records(self.store, Collection::Users, &records).await?;
            tracing::info!(migrated, "Migrated plaintext passwords to hashes");
        }
        Ok(migrated)
    }

    /// The raw text of one collection, as stored.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the collection is unreadable.
    pub async fn export(&self, collection: Collection) -> Result<String> {
        let records = store::load_records(self.store, collection).await?;
        let text = codec::encode_records(&records).map_err(|source| StoreError::Corrupt {
            key: collection.key(),
            source,
        })?;
        Ok(text)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// All accounts.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless `actor` is an admin.
    pub async fn users(&self, actor: &CurrentUser) -> Result<Vec<User>> {
        require_admin(actor)?;
        Ok(self.users.list().await?)
    }

    /// Grant or revoke admin rights.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless `actor` is an admin,
    /// `MarketError::InvalidInput` if an admin revokes their own rights and
    /// `MarketError::NotFound` for an unknown user.
    pub async fn set_admin(&self, actor: &CurrentUser, user_id: &UserId, is_admin: bool) -> Result<User> {
        require_admin(actor)?;
        if &actor.id == user_id && !is_admin {
            return Err(MarketError::InvalidInput(
                "you cannot revoke your own admin access".to_owned(),
            ));
        }
        let mut user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("user {user_id}")))?;
        user.is_admin = is_admin;
        user.updated_at = Some(Utc::now());
        let user = self.users.update(user).await?;
        tracing::info!(user_id = %user.id, is_admin, actor_id = %actor.id, "Admin rights changed");
        Ok(user)
    }

    // =========================================================================
    // Discount codes
    // =========================================================================

    /// Create a discount code. The code is stored upper-case.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless `actor` is an admin and
    /// `MarketError::InvalidInput` for an invalid draft or a duplicate code.
    pub async fn add_discount(&self, actor: &CurrentUser, mut draft: AdjustmentDraft) -> Result<Discount> {
        require_admin(actor)?;
        draft.validate()?;
        let discount = self
            .discounts
            .create(Discount {
                id: DiscountId::generate(),
                code: draft.label.to_uppercase(),
                amount: draft.amount,
                kind: draft.kind,
                category: draft.category,
                product_id: draft.product_id,
                starts_at: draft.starts_at,
                ends_at: draft.ends_at,
                created_at: Utc::now(),
            })
            .await?;
        tracing::info!(code = %discount.code, "Discount code added");
        Ok(discount)
    }

    /// All discount codes.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless `actor` is an admin.
    pub async fn discounts(&self, actor: &CurrentUser) -> Result<Vec<Discount>> {
        require_admin(actor)?;
        Ok(self.discounts.list().await?)
    }

    /// Delete a discount code.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless `actor` is an admin and
    /// `MarketError::NotFound` for an unknown id.
    pub async fn delete_discount(&self, actor: &CurrentUser, id: &DiscountId) -> Result<()> {
        require_admin(actor)?;
        self.discounts.delete(id).await?;
        tracing::info!(discount_id = %id, "Discount code deleted");
        Ok(())
    }

    // =========================================================================
    // Sale promotions
    // =========================================================================

    /// Create a sale promotion.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless `actor` is an admin and
    /// `MarketError::InvalidInput` for an invalid draft.
    pub async fn add_sale(&self, actor: &CurrentUser, mut draft: AdjustmentDraft) -> Result<SalePromotion> {
        require_admin(actor)?;
        draft.validate()?;
        let sale = self
            .sales
            .create(SalePromotion {
                id: SaleId::generate(),
                name: draft.label,
                amount: draft.amount,
                kind: draft.kind,
                category: draft.category,
                product_id: draft.product_id,
                starts_at: draft.starts_at,
                ends_at: draft.ends_at,
                created_at: Utc::now(),
            })
            .await?;
        tracing::info!(sale_id = %sale.id, name = %sale.name, "Sale promotion added");
        Ok(sale)
    }

    /// All sale promotions.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless `actor` is an admin.
    pub async fn sales(&self, actor: &CurrentUser) -> Result<Vec<SalePromotion>> {
        require_admin(actor)?;
        Ok(self.sales.list().await?)
    }

    /// Delete a sale promotion.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` unless `actor` is an admin and
    /// `MarketError::NotFound` for an unknown id.
    pub async fn delete_sale(&self, actor: &CurrentUser, id: &SaleId) -> Result<()> {
        require_admin(actor)?;
        self.sales.delete(id).await?;
        tracing::info!(sale_id = %id, "Sale promotion deleted");
        Ok(())
    }
}

fn require_admin(actor: &CurrentUser) -> Result<()> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(MarketError::Forbidden("admin access required".to_owned()))
    }
}
