//! Integration tests for the POS storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pos-storefront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - cart store behaviour end to end
//! - `persistence` - carts and sessions surviving a restart, on disk
//! - `checkout_flow` - login, checkout and re-order against a recording gateway
//!
//! This library holds the shared fixtures. No test talks to the network.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;

use serde_json::{Value, json};

use pos_storefront::api::ApiError;
use pos_storefront::models::CatalogProduct;
use pos_storefront::services::{CatalogSource, SaleOrder, SaleReceipt, SalesGateway};
use pos_storefront_core::{OrderId, ProductId};

/// Parse a catalog document fixture.
///
/// # Panics
///
/// Panics if `value` is not a valid product document.
#[must_use]
pub fn product(value: Value) -> CatalogProduct {
    serde_json::from_value(value).expect("fixture is a valid product")
}

/// Simple product sold per piece only (rule 1).
#[must_use]
pub fn soap() -> CatalogProduct {
    product(json!({
        "_id": "P1",
        "name": "Soap",
        "productType": "Simple Product",
        "salesPrice": 100,
        "rule": 1,
        "remainingStock": 50
    }))
}

/// Variant product whose `V1` variant comes 12 to a carton.
#[must_use]
pub fn shampoo() -> CatalogProduct {
    product(json!({
        "_id": "P1",
        "name": "Shampoo",
        "brand": {"_id": "B1", "name": "Sunsilk"},
        "productType": "Variant Type Product",
        "variants": [
            {
                "variantId": "V1",
                "variantValue": "250ml",
                "salesPrice": 10,
                "salesPriceOfCarton": 100,
                "rule": 12,
                "remainingStock": 200
            },
            {
                "variantId": "V2",
                "variantValue": "500ml",
                "salesPrice": "18.5",
                "salesPriceofCarton": 200,
                "rule": 6,
                "remainingStock": 0
            }
        ]
    }))
}

/// Sales gateway that records orders, or rejects them with a message.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    pub reject: Option<String>,
    pub orders: Mutex<Vec<SaleOrder>>,
}

impl RecordingGateway {
    #[must_use]
    pub fn rejecting(msg: &str) -> Self {
        Self {
            reject: Some(msg.to_string()),
            ..Self::default()
        }
    }

    /// Number of orders accepted so far.
    ///
    /// # Panics
    ///
    /// Panics if the order log mutex is poisoned.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.orders.lock().expect("order log lock").len()
    }
}

impl SalesGateway for RecordingGateway {
    async fn create_sale(&self, order: &SaleOrder) -> Result<SaleReceipt, ApiError> {
        if let Some(msg) = &self.reject {
            return Err(ApiError::Rejected(msg.clone()));
        }
        let mut orders = self.orders.lock().expect("order log lock");
        orders.push(order.clone());
        Ok(SaleReceipt {
            id: Some(OrderId::new(format!("O{}", orders.len()))),
            invoice_number: Some(format!("INV-{:04}", orders.len())),
        })
    }
}

/// Catalog that serves a fixed set of products.
#[derive(Debug, Default)]
pub struct FixedCatalog {
    pub products: Vec<CatalogProduct>,
}

impl CatalogSource for FixedCatalog {
    async fn product(&self, id: &ProductId) -> Result<CatalogProduct, ApiError> {
        self.products
            .iter()
            .find(|product| &product.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Product".to_string()))
    }
}
