//! Past orders as returned by the order history endpoint.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use pos_storefront_core::{Money, OrderId, OrderStatus, ProductId, VariantId};

use super::de;

/// A previously placed sale.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub invoice_number: Option<String>,
    #[serde(default, deserialize_with = "opt_datetime")]
    pub sales_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub order_status: OrderStatus,
    #[serde(default, deserialize_with = "de::opt_money")]
    pub total_amount: Option<Money>,
    #[serde(default, deserialize_with = "de::lossy_seq")]
    pub products: Vec<OrderLine>,
}

impl OrderSummary {
    /// Invoice number when assigned, otherwise the order id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.invoice_number
            .as_deref()
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// One product line of a past order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product: ProductRef,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub variant_name: Option<String>,
    /// Variant display value, used to match the variant on re-order.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub variant_value: Option<String>,
    #[serde(default, deserialize_with = "de::opt_count")]
    pub quantity: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_count")]
    pub no_of_pieces: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_count")]
    pub no_of_cartons: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_money")]
    pub unit_price: Option<Money>,
    #[serde(default, deserialize_with = "de::opt_money")]
    pub carton_price: Option<Money>,
    #[serde(default, deserialize_with = "de::opt_money")]
    pub subtotal: Option<Money>,
}

/// Reference to the ordered product: either its id or the populated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl<'de> Deserialize<'de> for ProductRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Populated {
            #[serde(rename = "_id")]
            id: ProductId,
            #[serde(default, deserialize_with = "de::opt_text")]
            name: Option<String>,
            #[serde(default, deserialize_with = "de::opt_image")]
            image: Option<String>,
        }

        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(Self {
                id: ProductId::new(id),
                name: None,
                image: None,
            }),
            value @ Value::Object(_) => {
                let populated: Populated =
                    serde_json::from_value(value).map_err(serde::de::Error::custom)?;
                Ok(Self {
                    id: populated.id,
                    name: populated.name,
                    image: populated.image,
                })
            }
            other => Err(serde::de::Error::custom(format!(
                "expected product id or document, got {other}"
            ))),
        }
    }
}

/// Order history payload (`{ orders: [...] }`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderHistory {
    #[serde(default, deserialize_with = "de::lossy_seq")]
    pub orders: Vec<OrderSummary>,
}

fn opt_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)
        .ok()
        .flatten()
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_history_parsing() {
        let history: OrderHistory = serde_json::from_value(json!({
            "orders": [
                {
                    "_id": "O1",
                    "invoiceNumber": "INV-0042",
                    "orderStatus": "Pending",
                    "salesDate": "2025-03-01T10:15:00+05:00",
                    "totalAmount": 230,
                    "products": [
                        {
                            "product": {"_id": "P1", "name": "Shampoo", "image": "p1.png"},
                            "variantId": "V1",
                            "variantName": "250ml",
                            "variantValue": "250ml",
                            "quantity": 27,
                            "noOfPieces": 3,
                            "noOfCartons": 2,
                            "unitPrice": 10,
                            "cartonPrice": 100,
                            "subtotal": 230
                        },
                        {"product": "P2", "quantity": "1"}
                    ]
                },
                {"_id": "O2", "orderStatus": "Shipped"}
            ]
        }))
        .unwrap();

        assert_eq!(history.orders.len(), 2);

        let first = &history.orders[0];
        assert_eq!(first.label(), "INV-0042");
        assert_eq!(first.order_status, OrderStatus::Pending);
        assert!(first.sales_date.is_some());
        assert_eq!(first.total_amount, Some(Money::from_units(230)));
        assert_eq!(first.products.len(), 2);

        let line = &first.products[0];
        assert_eq!(line.product.id.as_str(), "P1");
        assert_eq!(line.product.name.as_deref(), Some("Shampoo"));
        assert_eq!(line.no_of_cartons, Some(2));
        assert_eq!(line.carton_price, Some(Money::from_units(100)));

        assert_eq!(first.products[1].product.id.as_str(), "P2");
        assert_eq!(first.products[1].quantity, Some(1));

        let second = &history.orders[1];
        assert_eq!(second.label(), "O2");
        assert_eq!(second.order_status, OrderStatus::Other);
        assert!(second.products.is_empty());
    }

    #[test]
    fn test_product_ref_rejects_other_shapes() {
        assert!(serde_json::from_value::<ProductRef>(json!(42)).is_err());
    }
}
