//! Seeding, backfill, legacy migration and raw collection access.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use campus_market::db::RepositoryError;
use campus_market::db::orders::OrderRepository;
use campus_market::services::auth::AuthError;
use campus_market::services::forum::Inquiry;
use campus_market::store::{self, Collection, Record, RecordStore, StoreError};
use campus_market::{AppState, MarketConfig, MarketError, MemoryStore};
use campus_market_core::{OrderId, ProductId, UserId};
use campus_market_integration_tests::{MIKE_EMAIL, STUDENT_PASSWORD, TestContext};

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[tokio::test]
async fn test_seeding_is_one_shot_and_visible_to_other_handles() {
    let ctx = TestContext::seeded().await;
    assert!(!ctx.state.admin().initialize().await.unwrap());

    let other = ctx.reopen();
    assert!(other.admin().is_initialized().await.unwrap());
    let products = other.listings().browse(&Default::default()).await.unwrap();
    assert_eq!(products.len(), 3);
    assert!(ctx.dir.path().join("csv_products.csv").exists());
    assert!(ctx.dir.path().join("hasInitialized.csv").exists());
}

#[tokio::test]
async fn test_seeded_orders_are_backfilled() {
    let ctx = TestContext::seeded().await;
    let orders = OrderRepository::new(ctx.state.store()).list().await.unwrap();
    assert_eq!(orders.len(), 3);
    assert!(orders.iter().all(|o| !o.missing_contacts()));

    // Clearing a contact and backfilling restores it from the users collection.
    let repo = OrderRepository::new(ctx.state.store());
    let mut order = repo.get(&OrderId::new("2")).await.unwrap().unwrap();
    order.buyer_email = None;
    repo.update(order).await.unwrap();
    assert_eq!(ctx.state.admin().backfill_order_contacts().await.unwrap(), 1);
    let order = repo.get(&OrderId::new("2")).await.unwrap().unwrap();
    assert_eq!(order.buyer_email.unwrap().as_str(), MIKE_EMAIL);
    assert_eq!(ctx.state.admin().backfill_order_contacts().await.unwrap(), 0);
}

#[tokio::test]
async fn test_reset_restores_samples_and_keeps_questions() {
    let ctx = TestContext::seeded().await;
    let mut session = ctx.session_for(MIKE_EMAIL).await;
    session.add_to_cart(
        ctx.state
            .listings()
            .get(&ProductId::new("6"))
            .await
            .unwrap(),
    );
    ctx.state.orders().checkout_session(&mut session).await.unwrap();
    ctx.state
        .forum()
        .ask(Inquiry {
            name: "Mike".to_owned(),
            email: MIKE_EMAIL.to_owned(),
            question: "Can I list a bike?".to_owned(),
            category: "Selling".to_owned(),
        })
        .await
        .unwrap();

    ctx.state.admin().reset().await.unwrap();

    let orders = OrderRepository::new(ctx.state.store()).list().await.unwrap();
    assert_eq!(orders.len(), 3);
    assert_eq!(ctx.state.forum().list(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_untyped_records_round_trip_through_files() {
    let ctx = TestContext::empty();
    let store = ctx.state.store();
    let records = vec![
        record(&[("id", "1"), ("note", "comma, \"quoted\"\nand newline"), ("extra", "")]),
        record(&[("id", "2"), ("note", "plain"), ("extra", "x")]),
    ];

    store::save_records(store, Collection::Questions, &records)
        .await
        .unwrap();
    let other = ctx.reopen();
    let loaded = store::load_records(other.store(), Collection::Questions)
        .await
        .unwrap();
    assert_eq!(loaded, records);

    let exported = ctx.state.admin().export(Collection::Questions).await.unwrap();
    assert!(exported.starts_with("extra,id,note\n"));
}

#[tokio::test]
async fn test_legacy_plaintext_passwords_are_migrated() {
    let ctx = TestContext::empty();
    let legacy = vec![record(&[
        ("id", "9"),
        ("name", "Legacy Student"),
        ("email", "legacy@my.utsa.edu"),
        ("password", STUDENT_PASSWORD),
        ("isAdmin", "false"),
        ("createdAt", "2023-03-05T12:00:00Z"),
    ])];
    store::save_records(ctx.state.store(), Collection::Users, &legacy)
        .await
        .unwrap();

    assert!(!ctx.state.bootstrap().await.unwrap());

    let raw = ctx
        .state
        .store()
        .read(&Collection::Users.key())
        .await
        .unwrap()
        .unwrap();
    assert!(!raw.contains(STUDENT_PASSWORD));
    let user = ctx
        .login("legacy@my.utsa.edu", STUDENT_PASSWORD)
        .await
        .unwrap();
    assert_eq!(user.id, UserId::new("9"));
    assert!(matches!(
        ctx.login("legacy@my.utsa.edu", "wrong-password").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_quota_failure_is_surfaced() {
    let store = MemoryStore::new().with_quota(64);
    let state = AppState::new(MarketConfig::default(), store);

    let err = state.admin().initialize().await.unwrap_err();
    assert!(matches!(err, MarketError::Storage(_)));
    assert!(!err.is_user_facing());
    assert!(!state.admin().is_initialized().await.unwrap());
}

#[tokio::test]
async fn test_corrupt_collection_is_reported() {
    let ctx = TestContext::seeded().await;
    ctx.state
        .store()
        .write(&Collection::Orders.key(), "id,status\n1,shipped\n".to_owned())
        .await
        .unwrap();

    let err = ctx.state.orders().purchases(&UserId::new("2")).await.unwrap_err();
    let MarketError::Storage(source) = err else {
        panic!("expected a storage failure, got {err}");
    };
    assert!(matches!(
        source,
        RepositoryError::Store(StoreError::Corrupt { .. })
    ));
}
