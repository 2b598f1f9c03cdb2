//! Carts and sessions surviving a restart, stored on disk.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use pos_storefront::cart::{CartLineItem, CartStore, Unit, persist};
use pos_storefront::models::{UserSession, keys};
use pos_storefront::services::SessionStore;
use pos_storefront::storage::{FileStore, KeyValueStore};
use pos_storefront_core::{LineId, Money, UserId, VariantId};
use pos_storefront_integration_tests::{shampoo, soap};

async fn file_store(dir: &tempfile::TempDir) -> Arc<FileStore> {
    Arc::new(FileStore::open(dir.path().join("data")).await.unwrap())
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let product = shampoo();
    let variant = product.variant(&VariantId::new("V1")).unwrap();

    let mut cart = CartStore::initialize(file_store(&dir).await).await;
    cart.add_or_increment(CartLineItem::from_product(&soap()));
    cart.add_or_increment(CartLineItem::from_variant(&product, variant).with_counts(3, 2));
    let before = cart.items().to_vec();
    cart.teardown().await;

    let cart = CartStore::initialize(file_store(&dir).await).await;
    assert_eq!(cart.items(), before.as_slice());
    assert_eq!(cart.total(), Money::from_units(330));
    cart.teardown().await;
}

#[tokio::test]
async fn test_teardown_writes_the_final_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let id = LineId::new("P1");

    let mut cart = CartStore::initialize(file_store(&dir).await).await;
    cart.add_or_increment(CartLineItem::from_product(&soap()));
    for _ in 0..20 {
        cart.increment(&id, Unit::Piece);
    }
    cart.teardown().await;

    let storage = file_store(&dir).await;
    let raw = storage.get(keys::CART).await.unwrap().unwrap();
    let lines = persist::decode(&raw);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].pieces(), 21);
}

#[tokio::test]
async fn test_empty_cart_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();

    let mut cart = CartStore::initialize(file_store(&dir).await).await;
    cart.add_or_increment(CartLineItem::from_product(&soap()));
    cart.flush().await;
    assert!(dir.path().join("data").join("cart.json").exists());

    cart.remove(&LineId::new("P1"));
    cart.teardown().await;
    assert!(!dir.path().join("data").join("cart.json").exists());
}

#[tokio::test]
async fn test_legacy_cart_file_is_normalised() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_store(&dir).await;
    storage
        .set(
            keys::CART,
            r#"[
                {"_id": "P7", "productName": "Tea", "unitPrice": "40", "cartonPrice": 450,
                 "rule": 12, "quantity": 3, "subtotal": 999},
                {"_id": "P8-V1", "product": "P8", "variantId": "V1", "variantName": "1kg",
                 "name": "Rice", "salesPrice": 5, "salesPriceofCarton": 50,
                 "salesPriceOfCarton": 0, "rule": 10, "noOfPieces": 1, "noOfCartons": 1}
            ]"#,
        )
        .await
        .unwrap();

    let cart = CartStore::initialize(storage).await;

    let tea = cart.get(&LineId::new("P7")).unwrap();
    assert_eq!(tea.display_name(), "Tea");
    assert_eq!(tea.pieces(), 3);
    assert_eq!(tea.subtotal(), Money::from_units(120));

    let rice = cart.get(&LineId::new("P8-V1")).unwrap();
    assert_eq!(rice.carton_price(), Money::from_units(50));
    assert_eq!(rice.quantity(), 11);
    assert_eq!(rice.subtotal(), Money::from_units(55));
    cart.teardown().await;
}

#[tokio::test]
async fn test_corrupt_cart_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_store(&dir).await;
    storage.set(keys::CART, "{\"oops\":").await.unwrap();

    let cart = CartStore::initialize(storage).await;
    assert!(cart.is_empty());
    cart.teardown().await;
}

#[tokio::test]
async fn test_session_survives_restart_until_logout() {
    let dir = tempfile::tempdir().unwrap();
    let user = UserSession::new(UserId::new("U1"), "Ayesha").with_email("a@example.com");

    let mut session = SessionStore::load(file_store(&dir).await).await;
    session.login(user.clone()).await.unwrap();

    let mut session = SessionStore::load(file_store(&dir).await).await;
    assert_eq!(session.current(), Some(&user));
    session.logout().await.unwrap();

    let session = SessionStore::load(file_store(&dir).await).await;
    assert!(session.current().is_none());
}
