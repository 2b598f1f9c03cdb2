//! Cart serialization.
//!
//! The cart is stored as an ordered JSON array of line records. Writing always
//! uses the canonical field names. Reading also accepts the spellings found in
//! carts saved by earlier app versions:
//!
//! | Field        | Read from (first match wins)                                   |
//! |--------------|----------------------------------------------------------------|
//! | unit price   | `salesPrice`, `unitPrice`                                      |
//! | carton price | first non-zero of `salesPriceOfCarton`, `salesPriceofCarton`, `cartonPrice` |
//! | name         | `name`, `productName`                                          |
//! | product id   | `product`, `_id`                                               |
//! | counts       | `noOfPieces`/`noOfCartons`; legacy `quantity` as pieces if both absent |
//!
//! `quantity` and `subtotal` on disk are ignored and recomputed. The line id is
//! rebuilt from the product and variant ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use pos_storefront_core::{LineId, Money, ProductId, Rule, VariantId};

use super::line::{CartLineItem, LineDetails, LineKind, LinePricing};
use crate::models::de;

// =============================================================================
// Writing
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LineRecord<'a> {
    #[serde(rename = "_id")]
    id: &'a LineId,
    product: &'a ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant_id: Option<&'a VariantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant_name: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    sales_price: Money,
    sales_price_of_carton: Money,
    rule: Rule,
    no_of_pieces: u32,
    no_of_cartons: u32,
    quantity: u64,
    subtotal: Money,
    remaining_stock: u32,
}

impl<'a> From<&'a CartLineItem> for LineRecord<'a> {
    fn from(line: &'a CartLineItem) -> Self {
        let details = line.details();
        Self {
            id: line.id(),
            product: line.product_id(),
            product_type: details.product_type.as_deref(),
            variant_id: line.variant_id(),
            variant_name: line.variant_name(),
            name: &details.name,
            image: details.image.as_deref(),
            item_code: details.item_code.as_deref(),
            brand: details.brand.as_deref(),
            category: details.category.as_deref(),
            sales_price: line.unit_price(),
            sales_price_of_carton: line.carton_price(),
            rule: line.rule(),
            no_of_pieces: line.pieces(),
            no_of_cartons: line.cartons(),
            quantity: line.quantity(),
            subtotal: line.subtotal(),
            remaining_stock: line.remaining_stock(),
        }
    }
}

/// Serialize lines to the persisted JSON format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(lines: &[CartLineItem]) -> Result<String, serde_json::Error> {
    let records: Vec<LineRecord<'_>> = lines.iter().map(LineRecord::from).collect();
    serde_json::to_string(&records)
}

// =============================================================================
// Reading
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLine {
    #[serde(rename = "_id", default, deserialize_with = "de::opt_id")]
    id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    product: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    product_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    variant_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    variant_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    variant_value: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    product_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_image")]
    image: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    item_code: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    brand: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    category: Option<String>,
    #[serde(default, deserialize_with = "de::opt_money")]
    sales_price: Option<Money>,
    #[serde(default, deserialize_with = "de::opt_money")]
    unit_price: Option<Money>,
    #[serde(default, deserialize_with = "de::opt_money")]
    sales_price_of_carton: Option<Money>,
    #[serde(
        default,
        rename = "salesPriceofCarton",
        deserialize_with = "de::opt_money"
    )]
    legacy_sales_price_of_carton: Option<Money>,
    #[serde(default, deserialize_with = "de::opt_money")]
    carton_price: Option<Money>,
    #[serde(default, deserialize_with = "de::opt_count")]
    rule: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_count")]
    no_of_pieces: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_count")]
    no_of_cartons: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_count")]
    quantity: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_count")]
    remaining_stock: Option<u32>,
}

impl StoredLine {
    fn into_line(self) -> Option<CartLineItem> {
        let product_id = ProductId::new(self.product.or(self.id)?);

        let kind = match self.variant_id {
            Some(variant_id) => LineKind::Variant {
                variant_id: VariantId::new(variant_id),
                variant_name: self
                    .variant_name
                    .or(self.variant_value)
                    .unwrap_or_default(),
            },
            None => LineKind::Simple,
        };

        let carton_price = [
            self.sales_price_of_carton,
            self.legacy_sales_price_of_carton,
            self.carton_price,
        ]
        .into_iter()
        .flatten()
        .find(|price| !price.is_zero())
        .unwrap_or(Money::ZERO);

        let (pieces, cartons) = match (self.no_of_pieces, self.no_of_cartons) {
            (None, None) => (self.quantity.unwrap_or(0), 0),
            (pieces, cartons) => (pieces.unwrap_or(0), cartons.unwrap_or(0)),
        };

        let line = CartLineItem::new(
            product_id,
            kind,
            LineDetails {
                name: self.name.or(self.product_name).unwrap_or_default(),
                image: self.image,
                item_code: self.item_code,
                brand: self.brand,
                category: self.category,
                product_type: self.product_type,
            },
            LinePricing {
                unit_price: self.sales_price.or(self.unit_price).unwrap_or(Money::ZERO),
                carton_price,
                rule: Rule::from_raw(self.rule),
            },
            self.remaining_stock.unwrap_or(0),
        )
        .with_counts(pieces, cartons);

        (!line.is_empty()).then_some(line)
    }
}

/// Parse a persisted cart.
///
/// Never fails: unparseable input yields an empty cart, undecodable or empty
/// lines are skipped, and a repeated line id keeps the position of its first
/// occurrence with the contents of its last.
#[must_use]
pub fn decode(raw: &str) -> Vec<CartLineItem> {
    let values: Vec<Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(error = %e, "Persisted cart is unreadable, starting empty");
            return Vec::new();
        }
    };

    let mut lines: Vec<CartLineItem> = Vec::with_capacity(values.len());
    let mut positions: HashMap<LineId, usize> = HashMap::new();

    for (index, value) in values.into_iter().enumerate() {
        let stored: StoredLine = match serde_json::from_value(value) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(index, error = %e, "Skipping undecodable cart line");
                continue;
            }
        };

        let Some(line) = stored.into_line() else {
            warn!(index, "Skipping cart line without product id or quantity");
            continue;
        };

        if let Some(slot) = positions
            .get(line.id())
            .and_then(|&position| lines.get_mut(position))
        {
            *slot = line;
        } else {
            positions.insert(line.id().clone(), lines.len());
            lines.push(line);
        }
    }

    lines
}
