//! Listing records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_market_core::{Condition, Price, ProductId, UserId};

use super::CurrentUser;

/// A live listing as stored in `csv_products`.
///
/// A product disappears from the collection once an order for it is
/// completed; the order keeps a denormalized copy of its descriptive fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub condition: Condition,
    pub seller_id: UserId,
    pub seller_name: String,
    #[serde(default)]
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether the listing names both a seller id and a seller name.
    ///
    /// Rows imported from older data may lack either, and such products can
    /// be neither carted nor checked out.
    #[must_use]
    pub fn has_seller_identity(&self) -> bool {
        !self.seller_id.is_empty() && !self.seller_name.trim().is_empty()
    }

    /// Overwrite the editable fields from `draft`, keeping id, seller and
    /// creation time.
    pub fn apply(&mut self, draft: ProductDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.description = draft.description;
        self.price = draft.price;
        self.category = draft.category;
        self.condition = draft.condition;
        if let Some(image_url) = draft.image_url {
            self.image_url = image_url;
        }
        self.updated_at = Some(now);
    }
}

/// The seller-editable part of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub condition: Condition,
    /// `None` keeps the current image on update.
    pub image_url: Option<String>,
}

/// Whether `user` may edit or delete `product`.
///
/// This is the only ownership check for listing mutations.
#[must_use]
pub fn can_manage(user: &CurrentUser, product: &Product) -> bool {
    user.is_admin || user.id == product.seller_id
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campus_market_core::Email;

    use super::*;

    fn product(seller: &str) -> Product {
        Product {
            id: ProductId::new("p1"),
            title: "Desk Lamp".to_owned(),
            description: "Adjustable".to_owned(),
            price: "20.00".parse().unwrap(),
            category: "Dorm Essentials".to_owned(),
            condition: Condition::UsedExcellent,
            seller_id: UserId::new(seller),
            seller_name: "Sarah Williams".to_owned(),
            image_url: String::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn user(id: &str, is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            name: "Someone".to_owned(),
            email: Email::parse("someone@my.utsa.edu").unwrap(),
            is_admin,
        }
    }

    #[test]
    fn test_can_manage() {
        let listing = product("4");
        assert!(can_manage(&user("4", false), &listing));
        assert!(can_manage(&user("1", true), &listing));
        assert!(!can_manage(&user("2", false), &listing));
    }

    #[test]
    fn test_seller_identity() {
        let mut listing = product("4");
        assert!(listing.has_seller_identity());
        listing.seller_name = "  ".to_owned();
        assert!(!listing.has_seller_identity());
        listing = product("");
        assert!(!listing.has_seller_identity());
    }

    #[test]
    fn test_apply_keeps_identity_and_creation_time() {
        let mut listing = product("4");
        let created_at = listing.created_at;
        let now = Utc::now();
        listing.apply(
            ProductDraft {
                title: "Lamp".to_owned(),
                description: "Bright".to_owned(),
                price: "15".parse().unwrap(),
                category: "Furniture".to_owned(),
                condition: Condition::UsedGood,
                image_url: None,
            },
            now,
        );
        assert_eq!(listing.id.as_str(), "p1");
        assert_eq!(listing.seller_id.as_str(), "4");
        assert_eq!(listing.created_at, created_at);
        assert_eq!(listing.updated_at, Some(now));
        assert_eq!(listing.title, "Lamp");
    }
}
