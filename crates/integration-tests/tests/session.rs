//! Session cart rules and refresh from the store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use campus_market::CartChange;
use campus_market::db::users::UserRepository;
use campus_market::models::ProductDraft;
use campus_market_core::{Condition, OrderId, OrderStatus, ProductId, UserId};
use campus_market_integration_tests::{JANE_EMAIL, MIKE_EMAIL, SARAH_EMAIL, TestContext};

#[tokio::test]
async fn test_refresh_loads_only_the_users_records() {
    let ctx = TestContext::seeded().await;
    let session = ctx.session_for(SARAH_EMAIL).await;

    // Sarah sold order 2 (pending) and bought order 3.
    let mut ids: Vec<&str> = session.orders().iter().map(|o| o.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["2", "3"]);
    let mut listings: Vec<&str> = session.listings().iter().map(|p| p.id.as_str()).collect();
    listings.sort_unstable();
    assert_eq!(listings, ["3", "6"]);
}

#[tokio::test]
async fn test_duplicate_add_keeps_one_line() {
    let ctx = TestContext::seeded().await;
    let mut session = ctx.session_for(JANE_EMAIL).await;
    let lamp = ctx.state.listings().get(&ProductId::new("6")).await.unwrap();

    assert_eq!(session.add_to_cart(lamp.clone()), CartChange::Added);
    assert_eq!(session.add_to_cart(lamp), CartChange::AlreadyInCart);
    assert_eq!(session.cart().len(), 1);
}

#[tokio::test]
async fn test_sold_items_drop_out_of_other_carts() {
    let ctx = TestContext::seeded().await;
    let mut jane = ctx.session_for(JANE_EMAIL).await;
    jane.add_to_cart(ctx.state.listings().get(&ProductId::new("3")).await.unwrap());
    jane.add_to_cart(ctx.state.listings().get(&ProductId::new("6")).await.unwrap());

    let mut sarah = ctx.session_for(SARAH_EMAIL).await;
    let seller = sarah.user().cloned().unwrap();
    let order = ctx
        .state
        .orders()
        .set_status_as(&seller, &OrderId::new("2"), OrderStatus::Completed)
        .await
        .unwrap();
    sarah.mirror_order(order);
    sarah.refresh(ctx.state.store()).await.unwrap();
    assert_eq!(sarah.listings().len(), 1);

    jane.refresh(ctx.state.store()).await.unwrap();
    assert_eq!(jane.cart().len(), 1);
    assert_eq!(jane.cart()[0].id, ProductId::new("6"));
}

#[tokio::test]
async fn test_refresh_picks_up_edits_and_profile_changes() {
    let ctx = TestContext::seeded().await;
    let mut mike = ctx.session_for(MIKE_EMAIL).await;
    mike.add_to_cart(ctx.state.listings().get(&ProductId::new("6")).await.unwrap());

    let sarah = ctx.session_for(SARAH_EMAIL).await.user().cloned().unwrap();
    ctx.state
        .listings()
        .update_listing(
            &sarah,
            &ProductId::new("6"),
            ProductDraft {
                title: "Desk Lamp (LED)".to_owned(),
                description: "Adjustable desk lamp with USB charging port".to_owned(),
                price: "18".parse().unwrap(),
                category: "Dorm Essentials".to_owned(),
                condition: Condition::UsedExcellent,
                image_url: None,
            },
        )
        .await
        .unwrap();

    let users = UserRepository::new(ctx.state.store());
    let mut stored = users.get_by_id(&UserId::new("3")).await.unwrap().unwrap();
    stored.name = "Michael Johnson".to_owned();
    users.update(stored).await.unwrap();

    mike.refresh(ctx.state.store()).await.unwrap();
    assert_eq!(mike.cart()[0].title, "Desk Lamp (LED)");
    assert_eq!(mike.cart()[0].price, "18".parse().unwrap());
    assert_eq!(mike.user().unwrap().name, "Michael Johnson");
}

#[tokio::test]
async fn test_deleted_account_is_logged_out_on_refresh() {
    let ctx = TestContext::seeded().await;
    let mut mike = ctx.session_for(MIKE_EMAIL).await;
    mike.add_to_cart(ctx.state.listings().get(&ProductId::new("1")).await.unwrap());

    let users = UserRepository::new(ctx.state.store());
    let remaining: Vec<_> = users
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.id != UserId::new("3"))
        .collect();
    users.replace_all(&remaining).await.unwrap();

    mike.refresh(ctx.state.store()).await.unwrap();
    assert!(mike.user().is_none());
    assert!(mike.orders().is_empty());
    assert_eq!(mike.cart().len(), 1);
}
