//! Login, checkout and re-order against a recording gateway.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use chrono::FixedOffset;
use serde_json::json;

use pos_storefront::cart::{CartLineItem, CartStore};
use pos_storefront::config::CheckoutDefaults;
use pos_storefront::models::{OrderSummary, UserSession, keys};
use pos_storefront::services::{
    self, CheckoutError, CheckoutOptions, SessionStore, build_sale_order,
};
use pos_storefront::storage::{KeyValueStore, MemoryStore};
use pos_storefront_core::{LineId, Money, PaymentMethod, ProductId, UserId, VariantId};
use pos_storefront_integration_tests::{FixedCatalog, RecordingGateway, shampoo, soap};

fn options() -> CheckoutOptions {
    let defaults = CheckoutDefaults {
        sales_person: Some(UserId::new("SP1")),
        ..CheckoutDefaults::default()
    };
    CheckoutOptions::from_defaults(&defaults, PaymentMethod::BankTransfer).unwrap()
}

async fn logged_in(storage: &Arc<MemoryStore>) -> SessionStore<MemoryStore> {
    let mut session = SessionStore::load(Arc::clone(storage)).await;
    session
        .login(UserSession::new(UserId::new("U1"), "Ayesha"))
        .await
        .unwrap();
    session
}

async fn filled_cart(storage: &Arc<MemoryStore>) -> CartStore {
    let product = shampoo();
    let variant = product.variant(&VariantId::new("V1")).unwrap();

    let mut cart = CartStore::initialize(Arc::clone(storage)).await;
    cart.add_or_increment(CartLineItem::from_product(&soap()));
    cart.add_or_increment(CartLineItem::from_variant(&product, variant).with_counts(3, 2));
    cart.flush().await;
    cart
}

#[tokio::test]
async fn test_checkout_places_order_and_empties_cart() {
    let storage = Arc::new(MemoryStore::new());
    let session = logged_in(&storage).await;
    let mut cart = filled_cart(&storage).await;
    let gateway = RecordingGateway::default();

    let receipt = services::submit(&mut cart, session.current(), &options(), &gateway)
        .await
        .unwrap();

    assert_eq!(receipt.label(), Some("INV-0001"));
    assert!(cart.is_empty());
    assert_eq!(storage.get(keys::CART).await.unwrap(), None);

    let orders = gateway.orders.lock().unwrap();
    let order = serde_json::to_value(&orders[0]).unwrap();
    assert_eq!(order["customer"], "U1");
    assert_eq!(order["salesPerson"], "SP1");
    assert_eq!(order["paymentMethod"], "Bank Transfer");
    assert_eq!(order["notes"], "Pickup from 'Default location'");
    assert_eq!(order["totalAmount"].as_f64(), Some(330.0));
    assert_eq!(order["products"].as_array().unwrap().len(), 2);
    assert_eq!(order["products"][1]["quantity"], 27);
}

#[tokio::test]
async fn test_rejected_checkout_keeps_cart() {
    let storage = Arc::new(MemoryStore::new());
    let session = logged_in(&storage).await;
    let mut cart = filled_cart(&storage).await;
    let before = cart.items().to_vec();
    let gateway = RecordingGateway::rejecting("Insufficient stock for Shampoo");

    let err = services::submit(&mut cart, session.current(), &options(), &gateway)
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        CheckoutError::Api(api) if api.user_message() == "Insufficient stock for Shampoo"
    ));
    assert_eq!(cart.items(), before.as_slice());

    cart.teardown().await;
    let cart = CartStore::initialize(storage).await;
    assert_eq!(cart.items(), before.as_slice());
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let storage = Arc::new(MemoryStore::new());
    let session = SessionStore::load(Arc::clone(&storage)).await;
    let mut cart = filled_cart(&storage).await;
    let gateway = RecordingGateway::default();

    let err = services::submit(&mut cart, session.current(), &options(), &gateway)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::NotLoggedIn));
    assert_eq!(gateway.accepted(), 0);
    assert_eq!(cart.len(), 2);
}

#[test]
fn test_sale_date_keeps_local_offset() {
    let user = UserSession::new(UserId::new("U1"), "Ayesha");
    let line = CartLineItem::from_product(&soap());
    let date = chrono::DateTime::parse_from_rfc3339("2025-04-09T09:05:00-04:00").unwrap();

    let order = build_sale_order(Some(&user), &[line], &options(), date).unwrap();
    assert_eq!(order.sales_date, "2025-04-09T09:05:00-04:00");
    assert_eq!(date.offset(), &FixedOffset::west_opt(4 * 3600).unwrap());
}

#[tokio::test]
async fn test_reorder_rebuilds_lines_from_history() {
    let storage = Arc::new(MemoryStore::new());
    let mut cart = CartStore::initialize(Arc::clone(&storage)).await;
    let catalog = FixedCatalog {
        products: vec![shampoo()],
    };

    let order: OrderSummary = serde_json::from_value(json!({
        "_id": "O9",
        "invoiceNumber": "INV-0009",
        "orderStatus": "Completed",
        "totalAmount": 230,
        "products": [
            {
                "product": {"_id": "P1", "name": "Shampoo"},
                "variantId": "V1",
                "variantValue": "250ml",
                "noOfPieces": 3,
                "noOfCartons": 2,
                "unitPrice": 10,
                "cartonPrice": 100
            },
            {"product": {"_id": "P404", "name": "Discontinued"}, "quantity": 1}
        ]
    }))
    .unwrap();

    let summary = services::reorder(&mut cart, &order, &catalog).await;
    assert_eq!(summary.added, 1);
    assert_eq!(summary.skipped, vec![ProductId::new("P404")]);

    let line = cart.get(&LineId::new("P1-V1")).unwrap();
    assert_eq!(line.rule().get(), 12);
    assert_eq!(line.quantity(), 27);
    assert_eq!(line.subtotal(), Money::from_units(230));
    assert_eq!(line.remaining_stock(), 200);

    cart.flush().await;
    assert!(storage.get(keys::CART).await.unwrap().is_some());
}
