//! Checkout, completion and cancellation against a file-backed store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::Utc;
use rust_decimal_macros::dec;

use campus_market::db::products::ProductRepository;
use campus_market::models::{CurrentUser, Product};
use campus_market::services::orders::SkipReason;
use campus_market::{MarketError, Session};
use campus_market_core::{Condition, Email, OrderId, OrderStatus, Price, ProductId, UserId};
use campus_market_integration_tests::{JANE_EMAIL, MIKE_EMAIL, SARAH_EMAIL, TestContext};

async fn listed(ctx: &TestContext, id: &str) -> Product {
    ctx.state.listings().get(&ProductId::new(id)).await.unwrap()
}

async fn is_listed(ctx: &TestContext, id: &str) -> bool {
    ProductRepository::new(ctx.state.store())
        .get(&ProductId::new(id))
        .await
        .unwrap()
        .is_some()
}

#[tokio::test]
async fn test_single_item_checkout_amounts() {
    let ctx = TestContext::empty();
    let cart = [Product {
        id: ProductId::new("p1"),
        title: "Chemistry Textbook".to_owned(),
        description: "5th edition".to_owned(),
        price: Price::new(dec!(45.00)).unwrap(),
        category: "Books".to_owned(),
        condition: Condition::LikeNew,
        seller_id: UserId::new("s1"),
        seller_name: "Mike".to_owned(),
        image_url: String::new(),
        created_at: Utc::now(),
        updated_at: None,
    }];
    let buyer = CurrentUser {
        id: UserId::new("b1"),
        name: "Buyer".to_owned(),
        email: Email::parse("b@x.edu").unwrap(),
        is_admin: false,
    };
    ProductRepository::new(ctx.state.store())
        .create(cart[0].clone())
        .await
        .unwrap();

    let outcome = ctx.state.orders().checkout(&cart, &buyer).await.unwrap();

    assert!(outcome.is_complete());
    let order = &outcome.orders[0];
    assert_eq!(order.subtotal.amount(), dec!(45.00));
    assert_eq!(order.tax.amount(), dec!(3.7125));
    assert_eq!(order.price.amount(), dec!(48.7125));
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.seller_email.is_none());

    // Amounts survive the CSV round trip exactly.
    let stored = ctx.reopen().orders().purchases(&buyer.id).await.unwrap();
    assert_eq!(stored, outcome.orders);
}

#[tokio::test]
async fn test_checkout_persists_every_line_then_clears_cart() {
    let ctx = TestContext::seeded().await;
    let mut session = ctx.session_for(JANE_EMAIL).await;
    session.add_to_cart(listed(&ctx, "3").await);
    session.add_to_cart(listed(&ctx, "6").await);

    let outcome = ctx
        .state
        .orders()
        .checkout_session(&mut session)
        .await
        .unwrap();

    assert_eq!(outcome.orders.len(), 2);
    assert!(outcome.orders.iter().all(|o| o.status == OrderStatus::Pending));
    assert!(session.cart().is_empty());

    let stored = ctx.reopen().orders().purchases(&UserId::new("2")).await.unwrap();
    for order in &outcome.orders {
        assert!(stored.contains(order));
        assert!(session.cached_order(&order.id).is_some());
        assert_eq!(order.buyer_email.as_ref().unwrap().as_str(), JANE_EMAIL);
        assert_eq!(order.seller_email.as_ref().unwrap().as_str(), SARAH_EMAIL);
    }
}

#[tokio::test]
async fn test_checkout_requires_a_user_and_items() {
    let ctx = TestContext::seeded().await;

    let mut anonymous = Session::new();
    anonymous.add_to_cart(listed(&ctx, "1").await);
    assert!(matches!(
        ctx.state.orders().checkout_session(&mut anonymous).await,
        Err(MarketError::Forbidden(_))
    ));
    assert_eq!(anonymous.cart().len(), 1);

    let mut empty = ctx.session_for(MIKE_EMAIL).await;
    assert!(matches!(
        ctx.state.orders().checkout_session(&mut empty).await,
        Err(MarketError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_stale_cart_line_is_not_ordered() {
    let ctx = TestContext::seeded().await;
    let mut jane = ctx.session_for(JANE_EMAIL).await;
    jane.add_to_cart(listed(&ctx, "3").await);
    jane.add_to_cart(listed(&ctx, "6").await);

    // Sold elsewhere while the session still holds it.
    ctx.state
        .orders()
        .set_status(&OrderId::new("2"), OrderStatus::Completed)
        .await
        .unwrap();

    let outcome = ctx.state.orders().checkout_session(&mut jane).await.unwrap();

    assert_eq!(outcome.orders.len(), 1);
    assert_eq!(outcome.orders[0].product_id.as_str(), "6");
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].reason, SkipReason::NotListed);
    assert!(jane.cart().is_empty());
    let sales = ctx.reopen().orders().sales(&UserId::new("4")).await.unwrap();
    let jane_id = UserId::new("2");
    assert!(
        !sales
            .iter()
            .any(|o| o.product_id.as_str() == "3" && o.is_buyer(&jane_id))
    );
}

#[tokio::test]
async fn test_completion_delists_once_and_is_terminal() {
    let ctx = TestContext::seeded().await;
    let sarah = ctx.session_for(SARAH_EMAIL).await.user().cloned().unwrap();
    let orders = ctx.state.orders();
    let pending = OrderId::new("2");

    let completed = orders
        .set_status_as(&sarah, &pending, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert!(!is_listed(&ctx, "3").await);

    let before = ctx.reopen().orders().sales(&sarah.id).await.unwrap();
    assert!(matches!(
        orders
            .set_status_as(&sarah, &pending, OrderStatus::Completed)
            .await,
        Err(MarketError::InvalidTransition(_))
    ));
    assert!(matches!(
        orders
            .set_status_as(&sarah, &pending, OrderStatus::Canceled)
            .await,
        Err(MarketError::InvalidTransition(_))
    ));
    let after = ctx.reopen().orders().sales(&sarah.id).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_completing_a_second_order_for_a_sold_product() {
    let ctx = TestContext::seeded().await;
    let mut jane = ctx.session_for(JANE_EMAIL).await;
    jane.add_to_cart(listed(&ctx, "3").await);
    let outcome = ctx.state.orders().checkout_session(&mut jane).await.unwrap();
    let janes_order = outcome.orders[0].id.clone();

    let orders = ctx.state.orders();
    orders
        .set_status(&OrderId::new("2"), OrderStatus::Completed)
        .await
        .unwrap();
    assert!(!is_listed(&ctx, "3").await);

    // The product is already gone; the removal step is a no-op.
    let order = orders
        .set_status(&janes_order, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    let remaining = ctx
        .state
        .listings()
        .seller_listings(&UserId::new("4"))
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
}

#[tokio::test]
async fn test_who_may_change_status() {
    let ctx = TestContext::seeded().await;
    let mut jane = ctx.session_for(JANE_EMAIL).await;
    let buyer = jane.user().cloned().unwrap();
    let mike = ctx.session_for(MIKE_EMAIL).await.user().cloned().unwrap();
    jane.add_to_cart(listed(&ctx, "6").await);
    let outcome = ctx.state.orders().checkout_session(&mut jane).await.unwrap();
    let id = outcome.orders[0].id.clone();
    let orders = ctx.state.orders();

    for (actor, status) in [
        (&buyer, OrderStatus::Completed),
        (&mike, OrderStatus::Completed),
        (&mike, OrderStatus::Canceled),
    ] {
        assert!(matches!(
            orders.set_status_as(actor, &id, status).await,
            Err(MarketError::Forbidden(_))
        ));
    }

    let canceled = orders
        .set_status_as(&buyer, &id, OrderStatus::Canceled)
        .await
        .unwrap();
    assert_eq!(canceled.status, OrderStatus::Canceled);
    assert!(canceled.completed_at.is_none());
    assert!(is_listed(&ctx, "6").await);

    assert!(matches!(
        orders.set_status(&id, OrderStatus::Completed).await,
        Err(MarketError::InvalidTransition(_))
    ));
    assert!(is_listed(&ctx, "6").await);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let ctx = TestContext::seeded().await;
    assert!(matches!(
        ctx.state
            .orders()
            .set_status(&OrderId::new("nope"), OrderStatus::Completed)
            .await,
        Err(MarketError::NotFound(_))
    ));
}
