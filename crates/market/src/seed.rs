//! Sample data written on first start and on reset.
//!
//! Orders 1 and 3 are completed, so their products are not listed.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;

use campus_market_core::{
    Condition, DiscountId, DiscountKind, Email, OrderId, OrderStatus, Price, ProductId, UserId,
};

use crate::models::{Discount, Order, Product, User};
use crate::services::auth::{AuthError, hash_password};

/// Everything [`crate::services::admin::AdminService::reset`] writes.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub discounts: Vec<Discount>,
}

impl SampleData {
    /// Build the sample collections, hashing the sample passwords.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn build() -> Result<Self, AuthError> {
        let all_products = products();
        let orders = orders(&all_products);
        let products = all_products
            .into_iter()
            .filter(|p| {
                !orders
                    .iter()
                    .any(|o| o.status == OrderStatus::Completed && o.product_id == p.id)
            })
            .collect();

        Ok(Self {
            users: users()?,
            products,
            orders,
            discounts: discounts(),
        })
    }
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn dollars(whole: i64) -> Price {
    Price::new(Decimal::from(whole)).unwrap_or(Price::ZERO)
}

fn email(raw: &str) -> Result<Email, AuthError> {
    Ok(Email::parse(raw)?)
}

fn users() -> Result<Vec<User>, AuthError> {
    let admin_password = SecretString::from("admin123".to_owned());
    let student_password = SecretString::from("password123".to_owned());

    let accounts = [
        ("1", "Admin User", "admin@rowdymarketplace.com", true, at(2023, 3, 1, 0, 0)),
        ("2", "Jane Smith", "jane@example.com", false, at(2023, 3, 10, 8, 45)),
        ("3", "Mike Johnson", "mike@example.com", false, at(2023, 3, 11, 9, 30)),
        ("4", "Sarah Williams", "sarah@example.com", false, at(2023, 3, 12, 10, 15)),
    ];

    accounts
        .into_iter()
        .map(|(id, name, address, is_admin, created_at)| {
            let password = if is_admin {
                &admin_password
            } else {
                &student_password
            };
            Ok(User {
                id: UserId::new(id),
                name: name.to_owned(),
                email: email(address)?,
                password_hash: hash_password(password)?,
                is_admin,
                created_at,
                updated_at: None,
            })
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    title: &str,
    description: &str,
    price: i64,
    category: &str,
    condition: Condition,
    seller: (&str, &str),
    image: &str,
    created_at: DateTime<Utc>,
) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_owned(),
        description: description.to_owned(),
        price: dollars(price),
        category: category.to_owned(),
        condition,
        seller_id: UserId::new(seller.0),
        seller_name: seller.1.to_owned(),
        image_url: format!("/images/products/{image}"),
        created_at,
        updated_at: None,
    }
}

fn products() -> Vec<Product> {
    let jane = ("2", "Jane Smith");
    let mike = ("3", "Mike Johnson");
    let sarah = ("4", "Sarah Williams");
    vec![
        product(
            "1",
            "TI-84 Plus Calculator",
            "Lightly used graphing calculator, perfect for calculus classes",
            75,
            "School Supplies",
            Condition::UsedGood,
            jane,
            "calculator.jpg",
            at(2023, 3, 15, 10, 30),
        ),
        product(
            "2",
            "Chemistry Textbook",
            "Introductory Chemistry, 5th Edition. No highlights or notes.",
            45,
            "Books",
            Condition::LikeNew,
            mike,
            "textbook-chem.jpg",
            at(2023, 3, 16, 14, 45),
        ),
        product(
            "3",
            "Dorm Microwave",
            "Small microwave, works perfectly. Moving out and need to sell.",
            30,
            "Dorm Essentials",
            Condition::UsedFair,
            sarah,
            "microwave.jpg",
            at(2023, 3, 17, 9, 15),
        ),
        product(
            "4",
            "UTSA Hoodie",
            "Medium sized UTSA hoodie, worn only a few times",
            25,
            "Clothing",
            Condition::UsedExcellent,
            jane,
            "hoodie.jpg",
            at(2023, 3, 18, 16, 20),
        ),
        product(
            "6",
            "Desk Lamp",
            "Adjustable desk lamp with USB charging port",
            20,
            "Dorm Essentials",
            Condition::UsedExcellent,
            sarah,
            "lamp.jpg",
            at(2023, 3, 20, 13, 25),
        ),
    ]
}

/// Sample orders carry no contact emails; seeding backfills them.
fn orders(products: &[Product]) -> Vec<Order> {
    let completed = OrderStatus::Completed;
    let placed = [
        ("1", ("2", "Jane Smith"), "2", completed, at(2023, 3, 25, 15, 30), Some(at(2023, 3, 27, 14, 20))),
        ("2", ("3", "Mike Johnson"), "3", OrderStatus::Pending, at(2023, 3, 26, 10, 45), None),
        ("3", ("4", "Sarah Williams"), "4", completed, at(2023, 3, 27, 9, 15), Some(at(2023, 3, 28, 16, 40))),
    ];

    placed
        .into_iter()
        .filter_map(|(id, buyer, product_id, status, created_at, completed_at)| {
            let product = products.iter().find(|p| p.id.as_str() == product_id)?;
            Some(Order {
                id: OrderId::new(id),
                buyer_id: UserId::new(buyer.0),
                buyer_name: buyer.1.to_owned(),
                buyer_email: None,
                seller_id: product.seller_id.clone(),
                seller_name: product.seller_name.clone(),
                seller_email: None,
                product_id: product.id.clone(),
                product_title: product.title.clone(),
                product_image: Some(product.image_url.clone()),
                category: Some(product.category.clone()),
                condition: Some(product.condition),
                price: product.price.with_tax(),
                subtotal: product.price,
                tax: product.price.tax(),
                status,
                created_at,
                updated_at: completed_at,
                completed_at,
            })
        })
        .collect()
}

fn discount(id: &str, code: &str, amount: i64, kind: DiscountKind, category: Option<&str>) -> Discount {
    Discount {
        id: DiscountId::new(id),
        code: code.to_owned(),
        amount: Decimal::from(amount),
        kind,
        category: category.map(str::to_owned),
        product_id: None,
        starts_at: None,
        ends_at: None,
        created_at: at(2023, 3, 1, 0, 0),
    }
}

fn discounts() -> Vec<Discount> {
    vec![
        discount("1", "ROWDY10", 10, DiscountKind::Percent, None),
        discount("2", "WELCOME5", 5, DiscountKind::Fixed, None),
        discount("3", "BOOKS15", 15, DiscountKind::Percent, Some("Books")),
    ]
}
