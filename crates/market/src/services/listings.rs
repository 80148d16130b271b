//! Listing management and browsing.

use chrono::{DateTime, Utc};

use campus_market_core::{Price, ProductId, UserId, canonical_category};

use crate::db::discounts::SaleRepository;
use crate::db::products::ProductRepository;
use crate::error::{MarketError, Result};
use crate::models::{Adjustment, CurrentUser, Product, ProductDraft, SalePromotion, can_manage};
use crate::services::pricing;
use crate::store::RecordStore;

/// Sort order for [`BrowseQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest listings first.
    #[default]
    Latest,
    Oldest,
    PriceLow,
    PriceHigh,
}

impl std::str::FromStr for SortOrder {
    type Err = MarketError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "latest" | "newest" => Ok(Self::Latest),
            "oldest" => Ok(Self::Oldest),
            "price-low" | "pricelow" => Ok(Self::PriceLow),
            "price-high" | "pricehigh" => Ok(Self::PriceHigh),
            _ => Err(MarketError::InvalidInput(format!("unknown sort order: {s}"))),
        }
    }
}

/// Filters for the product catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseQuery {
    /// Exact category, case-insensitive.
    pub category: Option<String>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub sort: SortOrder,
}

impl BrowseQuery {
    fn matches(&self, product: &Product) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| c.eq_ignore_ascii_case(&product.category));
        let search_ok = self.search.as_deref().map(str::trim).is_none_or(|term| {
            let term = term.to_lowercase();
            product.title.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term)
        });
        let min_ok = self.min_price.is_none_or(|min| product.price >= min);
        let max_ok = self.max_price.is_none_or(|max| product.price <= max);
        category_ok && search_ok && min_ok && max_ok
    }
}

/// Listing service.
pub struct ListingService<'a, S> {
    products: ProductRepository<'a, S>,
    sales: SaleRepository<'a, S>,
}

impl<'a, S: RecordStore> ListingService<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            products: ProductRepository::new(store),
            sales: SaleRepository::new(store),
        }
    }

    /// Post a new listing as `seller`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` if the draft is incomplete, the
    /// price is not positive or the category is unknown.
    pub async fn create_listing(
        &self,
        seller: &CurrentUser,
        mut draft: ProductDraft,
    ) -> Result<Product> {
        normalize(&mut draft)?;
        let product = Product {
            id: ProductId::generate(),
            title: draft.title,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            condition: draft.condition,
            seller_id: seller.id.clone(),
            seller_name: seller.name.clone(),
            image_url: draft.image_url.unwrap_or_default(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let product = self.products.create(product).await?;
        tracing::info!(product_id = %product.id, seller_id = %seller.id, "Listing created");
        Ok(product)
    }

    /// Edit a listing. Allowed for its seller or an admin.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` if the listing is gone,
    /// `MarketError::Forbidden` if `actor` may not manage it, and
    /// `MarketError::InvalidInput` for an invalid draft.
    pub async fn update_listing(
        &self,
        actor: &CurrentUser,
        id: &ProductId,
        mut draft: ProductDraft,
    ) -> Result<Product> {
        let mut product = self.managed(actor, id).await?;
        normalize(&mut draft)?;
        product.apply(draft, Utc::now());
        let product = self.products.update(product).await?;
        tracing::info!(product_id = %product.id, actor_id = %actor.id, "Listing updated");
        Ok(product)
    }

    /// Delete a listing. Allowed for its seller or an admin.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` if the listing is gone and
    /// `MarketError::Forbidden` if `actor` may not manage it.
    pub async fn delete_listing(&self, actor: &CurrentUser, id: &ProductId) -> Result<()> {
        self.managed(actor, id).await?;
        self.products.remove(id).await?;
        tracing::info!(product_id = %id, actor_id = %actor.id, "Listing deleted");
        Ok(())
    }

    /// Get one listing.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` if it is not listed.
    pub async fn get(&self, id: &ProductId) -> Result<Product> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("product {id}")))
    }

    /// Filter and sort the catalogue.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the listings cannot be read.
    pub async fn browse(&self, query: &BrowseQuery) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self
            .products
            .list()
            .await?
            .into_iter()
            .filter(|p| query.matches(p))
            .collect();

        match query.sort {
            SortOrder::Latest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => products.sort_by_key(|p| p.created_at),
            SortOrder::PriceLow => products.sort_by_key(|p| p.price),
            SortOrder::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
        }
        Ok(products)
    }

    /// Listings posted by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the listings cannot be read.
    pub async fn seller_listings(&self, seller: &UserId) -> Result<Vec<Product>> {
        Ok(self.products.by_seller(seller).await?)
    }

    /// Sale promotions running at `now`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the sales cannot be read.
    pub async fn active_sales(&self, now: DateTime<Utc>) -> Result<Vec<SalePromotion>> {
        let mut sales = self.sales.list().await?;
        sales.retain(|s| s.is_active(now));
        Ok(sales)
    }

    /// Each product paired with its sale price, if a sale covers it at `now`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the sales cannot be read.
    pub async fn with_sale_prices(
        &self,
        products: Vec<Product>,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Product, Option<Price>)>> {
        let sales = self.active_sales(now).await?;
        Ok(products
            .into_iter()
            .map(|p| {
                let sale = pricing::sale_price(&p, &sales, now);
                (p, sale)
            })
            .collect())
    }

    async fn managed(&self, actor: &CurrentUser, id: &ProductId) -> Result<Product> {
        let product = self.get(id).await?;
        if !can_manage(actor, &product) {
            return Err(MarketError::Forbidden(format!(
                "you cannot manage listing {id}"
            )));
        }
        Ok(product)
    }
}

/// Trim text fields, canonicalize the category and reject invalid drafts.
fn normalize(draft: &mut ProductDraft) -> Result<()> {
    draft.title = draft.title.trim().to_owned();
    draft.description = draft.description.trim().to_owned();
    if draft.title.is_empty() {
        return Err(MarketError::InvalidInput("title is required".to_owned()));
    }
    if draft.description.is_empty() {
        return Err(MarketError::InvalidInput("description is required".to_owned()));
    }
    if !draft.price.is_positive() {
        return Err(MarketError::InvalidInput(
            "price must be greater than zero".to_owned(),
        ));
    }
    let category = canonical_category(&draft.category)
        .ok_or_else(|| MarketError::InvalidInput(format!("unknown category: {}", draft.category)))?;
    draft.category = category.to_owned();
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use campus_market_core::{Condition, Email};

    use super::*;
    use crate::store::MemoryStore;

    fn actor(id: &str, is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            name: format!("User {id}"),
            email: Email::parse("user@my.utsa.edu").unwrap(),
            is_admin,
        }
    }

    fn draft(title: &str, price: &str, category: &str) -> ProductDraft {
        ProductDraft {
            title: title.to_owned(),
            description: format!("{title} in good shape"),
            price: price.parse().unwrap(),
            category: category.to_owned(),
            condition: Condition::UsedGood,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_validates() {
        let store = MemoryStore::new();
        let listings = ListingService::new(&store);
        let seller = actor("s1", false);

        for bad in [
            draft("", "5", "Books"),
            draft("Lamp", "0", "Books"),
            draft("Lamp", "5", "Spaceships"),
        ] {
            assert!(matches!(
                listings.create_listing(&seller, bad).await,
                Err(MarketError::InvalidInput(_))
            ));
        }

        let created = listings
            .create_listing(&seller, draft("  Lamp ", "5", "Dorm Essentials"))
            .await
            .unwrap();
        assert_eq!(created.title, "Lamp");
        assert_eq!(created.seller_name, "User s1");
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_can_manage() {
        let store = MemoryStore::new();
        let listings = ListingService::new(&store);
        let owner = actor("s1", false);
        let created = listings
            .create_listing(&owner, draft("Lamp", "5", "Books"))
            .await
            .unwrap();

        let err = listings
            .update_listing(&actor("x", false), &created.id, draft("Mine", "1", "Books"))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Forbidden(_)));

        let edited = listings
            .update_listing(&actor("admin", true), &created.id, draft("Lamp 2", "6", "Books"))
            .await
            .unwrap();
        assert_eq!(edited.created_at, created.created_at);
        assert!(edited.updated_at.is_some());
        assert_eq!(edited.seller_id, owner.id);

        assert!(matches!(
            listings.delete_listing(&actor("x", false), &created.id).await,
            Err(MarketError::Forbidden(_))
        ));
        listings.delete_listing(&owner, &created.id).await.unwrap();
        assert!(matches!(
            listings.delete_listing(&owner, &created.id).await,
            Err(MarketError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_browse_filters_and_sorts() {
        let store = MemoryStore::new();
        let listings = ListingService::new(&store);
        let seller = actor("s1", false);
        for (title, price, category) in [
            ("Calculator", "75", "School Supplies"),
            ("Desk Lamp", "20", "Dorm Essentials"),
            ("Microwave", "30", "Dorm Essentials"),
        ] {
            listings
                .create_listing(&seller, draft(title, price, category))
                .await
                .unwrap();
        }

        let dorm = listings
            .browse(&BrowseQuery {
                category: Some("dorm essentials".to_owned()),
                sort: SortOrder::PriceHigh,
                ..BrowseQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(dorm.len(), 2);
        assert_eq!(dorm[0].title, "Microwave");

        let cheap = listings
            .browse(&BrowseQuery {
                max_price: Some("25".parse().unwrap()),
                ..BrowseQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(cheap.len(), 1);

        let found = listings
            .browse(&BrowseQuery {
                search: Some("LAMP".to_owned()),
                ..BrowseQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(found[0].title, "Desk Lamp");

        let ascending = listings
            .browse(&BrowseQuery {
                sort: SortOrder::PriceLow,
                ..BrowseQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(ascending[0].title, "Desk Lamp");
    }

    #[tokio::test]
    async fn test_sale_prices() {
        let store = MemoryStore::new();
        let listings = ListingService::new(&store);
        let seller = actor("s1", false);
        let book = listings
            .create_listing(&seller, draft("Chem Text", "40", "Books"))
            .await
            .unwrap();
        let lamp = listings
            .create_listing(&seller, draft("Lamp", "20", "Dorm Essentials"))
            .await
            .unwrap();
        SaleRepository::new(&store)
            .create(SalePromotion {
                id: campus_market_core::SaleId::new("s1"),
                name: "Book Week".to_owned(),
                amount: rust_decimal_macros::dec!(25),
                kind: campus_market_core::DiscountKind::Percent,
                category: Some("Books".to_owned()),
                product_id: None,
                starts_at: None,
                ends_at: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let priced = listings
            .with_sale_prices(vec![book, lamp], Utc::now())
            .await
            .unwrap();
        assert_eq!(priced[0].1, Some("30".parse().unwrap()));
        assert_eq!(priced[1].1, None);
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("priceLow".parse::<SortOrder>().unwrap(), SortOrder::PriceLow);
        assert_eq!("price-high".parse::<SortOrder>().unwrap(), SortOrder::PriceHigh);
        assert!("cheapest".parse::<SortOrder>().is_err());
    }
}
