//! Session cache: the logged-in user, the cart and mirrored records.
//!
//! The session never writes to the record store. Callers persist through the
//! services first and then mirror the change here so views update at once.
//! [`Session::refresh`] reloads everything from the store, which wins on any
//! disagreement.

use serde::{Deserialize, Serialize};

use campus_market_core::{OrderId, ProductId};

use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::Result;
use crate::models::{CurrentUser, Order, Product};
use crate::store::RecordStore;

/// What [`Session::add_to_cart`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Added,
    /// The product id was already in the cart; nothing changed.
    AlreadyInCart,
    /// The product has no seller id or name and cannot be bought.
    MissingSeller,
}

impl CartChange {
    /// Notice to show the user.
    #[must_use]
    pub const fn notice(self) -> &'static str {
        match self {
            Self::Added => "Added to cart",
            Self::AlreadyInCart => "This item is already in your cart",
            Self::MissingSeller => "This item is missing seller information and cannot be added",
        }
    }
}

/// Per-user view state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    user: Option<CurrentUser>,
    cart: Vec<Product>,
    orders: Vec<Order>,
    listings: Vec<Product>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a session from its JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error if `json` is not a session snapshot.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize the session to JSON.
    ///
    /// # Errors
    ///
    /// Returns the encoder's error (only possible for non-string map keys).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn cart(&self) -> &[Product] {
        &self.cart
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[must_use]
    pub fn listings(&self) -> &[Product] {
        &self.listings
    }

    /// Replace the session user. Cached records of a previous user are dropped.
    pub fn login(&mut self, user: CurrentUser) {
        if self.user.as_ref().is_some_and(|u| u.id != user.id) {
            self.orders.clear();
            self.listings.clear();
        }
        self.user = Some(user);
    }

    /// Clear the user and every cache. The cart is kept.
    pub fn logout(&mut self) {
        self.user = None;
        self.orders.clear();
        self.listings.clear();
    }

    /// Update the session user's details after a profile change.
    pub fn update_user(&mut self, user: CurrentUser) {
        if self.user.as_ref().is_some_and(|u| u.id == user.id) {
            self.user = Some(user);
        }
    }

    /// Add a product snapshot to the cart, at most once per product id.
    pub fn add_to_cart(&mut self, product: Product) -> CartChange {
        if !product.has_seller_identity() {
            return CartChange::MissingSeller;
        }
        if self.cart.iter().any(|p| p.id == product.id) {
            return CartChange::AlreadyInCart;
        }
        self.cart.push(product);
        CartChange::Added
    }

    /// Remove a product from the cart. Returns whether it was there.
    pub fn remove_from_cart(&mut self, id: &ProductId) -> bool {
        let before = self.cart.len();
        self.cart.retain(|p| &p.id != id);
        self.cart.len() != before
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Keep only the cart lines matching `keep`.
    pub fn retain_cart(&mut self, keep: impl FnMut(&Product) -> bool) {
        self.cart.retain(keep);
    }

    /// Insert or replace a cached order.
    pub fn mirror_order(&mut self, order: Order) {
        upsert(&mut self.orders, order, |o| &o.id);
    }

    /// Cache a listing the user just created.
    pub fn add_listing(&mut self, product: Product) {
        upsert(&mut self.listings, product, |p| &p.id);
    }

    /// Replace a cached listing (and its cart snapshot, if carted).
    pub fn update_listing(&mut self, product: Product) {
        if let Some(slot) = self.cart.iter_mut().find(|p| p.id == product.id) {
            *slot = product.clone();
        }
        upsert(&mut self.listings, product, |p| &p.id);
    }

    /// Drop a listing from the caches and the cart.
    pub fn remove_listing(&mut self, id: &ProductId) {
        self.listings.retain(|p| &p.id != id);
        self.cart.retain(|p| &p.id != id);
    }

    /// Cached order by id.
    #[must_use]
    pub fn cached_order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == id)
    }

    /// Reload the caches from `store`.
    ///
    /// The user's details are re-read (a deleted account logs the session
    /// out), orders and listings are replaced, and cart lines whose product
    /// is no longer listed are dropped. Cart snapshots take the stored
    /// product's current fields.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if a collection cannot be read. The
    /// session is unchanged in that case.
    pub async fn refresh<S: RecordStore>(&mut self, store: &S) -> Result<()> {
        let products = ProductRepository::new(store).list().await?;

        let (user, orders, listings) = match &self.user {
            Some(current) => match UserRepository::new(store).get_by_id(&current.id).await? {
                Some(stored) => {
                    let orders: Vec<Order> = OrderRepository::new(store)
                        .list()
                        .await?
                        .into_iter()
                        .filter(|o| o.is_buyer(&stored.id) || o.is_seller(&stored.id))
                        .collect();
                    let listings: Vec<Product> = products
                        .iter()
                        .filter(|p| p.seller_id == stored.id)
                        .cloned()
                        .collect();
                    (Some(CurrentUser::from(stored)), orders, listings)
                }
                None => (None, Vec::new(), Vec::new()),
            },
            None => (None, Vec::new(), Vec::new()),
        };

        let before = self.cart.len();
        self.cart = self
            .cart
            .iter()
            .filter_map(|item| products.iter().find(|p| p.id == item.id).cloned())
            .collect();
        if self.cart.len() != before {
            tracing::info!(
                dropped = before - self.cart.len(),
                "Removed cart items that are no longer listed"
            );
        }

        self.user = user;
        self.orders = orders;
        self.listings = listings;
        Ok(())
    }
}

fn upsert<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> &K) {
    match items.iter_mut().find(|existing| key(existing) == key(&item)) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use campus_market_core::{Condition, Email, UserId};

    use super::*;
    use crate::store::MemoryStore;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Item {id}"),
            description: String::new(),
            price: "10".parse().unwrap(),
            category: "Books".to_owned(),
            condition: Condition::New,
            seller_id: UserId::new("s1"),
            seller_name: "Sam".to_owned(),
            image_url: String::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn user(id: &str) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            name: "U".to_owned(),
            email: Email::parse("u@my.utsa.edu").unwrap(),
            is_admin: false,
        }
    }

    #[test]
    fn test_duplicate_add_is_a_no_op() {
        let mut session = Session::new();
        assert_eq!(session.add_to_cart(product("p1")), CartChange::Added);
        assert_eq!(session.add_to_cart(product("p1")), CartChange::AlreadyInCart);
        assert_eq!(session.cart().len(), 1);
    }

    #[test]
    fn test_add_without_seller_rejected() {
        let mut session = Session::new();
        let mut orphan = product("p1");
        orphan.seller_id = UserId::new("");
        assert_eq!(session.add_to_cart(orphan), CartChange::MissingSeller);
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_logout_clears_user_and_caches_but_keeps_cart() {
        let mut session = Session::new();
        session.login(user("u1"));
        session.add_listing(product("p9"));
        session.add_to_cart(product("p1"));
        session.logout();
        assert!(session.user().is_none());
        assert!(session.listings().is_empty());
        assert_eq!(session.cart().len(), 1);
    }

    #[test]
    fn test_listing_mirrors() {
        let mut session = Session::new();
        session.add_to_cart(product("p1"));
        session.add_listing(product("p1"));
        let mut edited = product("p1");
        edited.title = "Edited".to_owned();
        session.update_listing(edited);
        assert_eq!(session.listings().len(), 1);
        assert_eq!(session.cart()[0].title, "Edited");

        session.remove_listing(&ProductId::new("p1"));
        assert!(session.listings().is_empty());
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_json_snapshot() {
        let mut session = Session::new();
        session.login(user("u1"));
        session.add_to_cart(product("p1"));
        let restored = Session::from_json(&session.to_json().unwrap()).unwrap();
        assert_eq!(restored, session);
    }

    #[tokio::test]
    async fn test_refresh_store_wins() {
        let store = MemoryStore::new();
        ProductRepository::new(&store)
            .create(product("p2"))
            .await
            .unwrap();

        let mut session = Session::new();
        session.login(user("ghost"));
        session.add_to_cart(product("p1"));
        let mut stale = product("p2");
        stale.title = "Stale".to_owned();
        session.add_to_cart(stale);

        session.refresh(&store).await.unwrap();

        assert!(session.user().is_none());
        assert_eq!(session.cart().len(), 1);
        assert_eq!(session.cart()[0].title, "Item p2");
    }
}
