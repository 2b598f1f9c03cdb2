//! Put the lines of a past order back into the cart.

use std::future::Future;

use tracing::{info, instrument, warn};

use pos_storefront_core::ProductId;

use crate::api::ApiError;
use crate::cart::{CartLineItem, CartStore};
use crate::models::{CatalogProduct, OrderSummary};

/// Source of current product documents.
pub trait CatalogSource: Send + Sync {
    fn product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<CatalogProduct, ApiError>> + Send;
}

/// Outcome of a re-order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorderSummary {
    /// Lines written into the cart.
    pub added: usize,
    /// Products that could not be fetched.
    pub skipped: Vec<ProductId>,
}

/// Copy every line of `order` into the cart with its historical counts.
///
/// Each product is fetched again for its current rule and stock. A line
/// already in the cart is replaced. Products that fail to load are skipped
/// and reported; the rest of the order is still added.
#[instrument(skip_all, fields(order_id = %order.id, lines = order.products.len()))]
pub async fn reorder<C: CatalogSource>(
    cart: &mut CartStore,
    order: &OrderSummary,
    catalog: &C,
) -> ReorderSummary {
    let mut summary = ReorderSummary::default();

    for line in &order.products {
        let product = match catalog.product(&line.product.id).await {
            Ok(product) => product,
            Err(e) => {
                warn!(product_id = %line.product.id, error = %e, "Skipping re-order line");
                summary.skipped.push(line.product.id.clone());
                continue;
            }
        };

        cart.update_item(CartLineItem::from_order_line(line, &product));
        summary.added += 1;
    }

    info!(
        added = summary.added,
        skipped = summary.skipped.len(),
        "Order copied into cart"
    );
    summary
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use pos_storefront_core::Money;

    use super::*;
    use crate::storage::MemoryStore;

    struct FixedCatalog(Vec<CatalogProduct>);

    impl CatalogSource for FixedCatalog {
        async fn product(&self, id: &ProductId) -> Result<CatalogProduct, ApiError> {
            self.0
                .iter()
                .find(|product| &product.id == id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound("Product".to_string()))
        }
    }

    fn catalog() -> FixedCatalog {
        let product = serde_json::from_value(json!({
            "_id": "P1",
            "name": "Soap",
            "salesPrice": 10,
            "salesPriceOfCarton": 100,
            "rule": 12,
            "remainingStock": 40
        }))
        .unwrap();
        FixedCatalog(vec![product])
    }

    fn order() -> OrderSummary {
        serde_json::from_value(json!({
            "_id": "O1",
            "invoiceNumber": "INV-7",
            "products": [
                {
                    "product": {"_id": "P1", "name": "Soap"},
                    "noOfPieces": 2,
                    "noOfCartons": 1,
                    "unitPrice": 9,
                    "cartonPrice": 0
                },
                {"product": "GONE", "quantity": 3}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_reorder_adds_fetchable_lines() {
        let mut cart = CartStore::initialize(Arc::new(MemoryStore::new())).await;

        let summary = reorder(&mut cart, &order(), &catalog()).await;

        assert_eq!(summary.added, 1);
        assert_eq!(summary.skipped, vec![ProductId::new("GONE")]);

        let line = &cart.items()[0];
        assert_eq!(line.pieces(), 2);
        assert_eq!(line.cartons(), 1);
        assert_eq!(line.quantity(), 14);
        // Historical unit price, catalog carton price
        assert_eq!(line.subtotal(), Money::from_units(118));
    }

    #[tokio::test]
    async fn test_reorder_replaces_existing_line() {
        let mut cart = CartStore::initialize(Arc::new(MemoryStore::new())).await;
        let product = catalog().0.remove(0);
        cart.add_or_increment(CartLineItem::from_product(&product).with_counts(7, 0));

        reorder(&mut cart, &order(), &catalog()).await;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].pieces(), 2);
        assert_eq!(cart.items()[0].cartons(), 1);
    }
}
